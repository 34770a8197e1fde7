//! Per-service credential scheduler: catalog walking, retry pool, admission
//! counters, and the attempt sessions handed to protocol modules.

pub mod admission;
pub mod attempt;
pub mod catalog;
pub mod cursor;
pub mod pool;
pub mod service;
pub mod target;

pub use admission::{ServiceSnapshot, ServiceStatus};
pub use attempt::{AttemptOutcome, AttemptSession, SessionFlags};
pub use catalog::CredentialCatalog;
pub use cursor::PairCursor;
pub use pool::{PendingLedger, RetryQueue};
pub use service::{
    AdmissionLimits, AttemptCounters, AuthRate, ListState, MAX_HOST_INFO_LEN, ServiceScheduler,
};
pub use target::Target;
