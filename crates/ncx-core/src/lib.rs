//! Shared types and errors for the ncx credential scheduler.

pub mod error;
pub mod service_spec;
pub mod types;

pub use error::NcxError;
pub use service_spec::{ServiceSpec, default_port};
pub use types::{EnumerationOrder, LoginPair, NextPair, OutputFormat, ServiceId, Transport};
