//! Engine configuration loading and validation (`~/.config/ncx/config.toml`).

pub mod config;
pub mod validate;

pub use config::{EngineConfig, EngineSection, POOL_TRACE_LEVEL, ServiceOptions};
pub use validate::validate_config;
