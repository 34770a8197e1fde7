//! Per-service scheduling state.
//!
//! A [`ServiceScheduler`] owns everything needed to decide which credential
//! pair a service gets next: its cursor into a shared catalog, the retry
//! queue and pending ledger, admission parameters and attempt counters.
//! It is driven from a single control loop and does no locking of its own.

use chrono::{DateTime, Utc};
use ncx_config::{EngineConfig, ServiceOptions};
use ncx_core::{EnumerationOrder, LoginPair, NextPair, ServiceId, Transport};
use serde::Serialize;
use std::any::Any;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::catalog::CredentialCatalog;
use crate::cursor::PairCursor;
use crate::pool::{PendingLedger, RetryQueue};
use crate::target::Target;

/// Upper bound (bytes, including room for a terminator) of the rendered
/// host-info string.
pub const MAX_HOST_INFO_LEN: usize = 1024;

/// Connection admission knobs. `None` means unset / no limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionLimits {
    pub min_connection_limit: Option<u32>,
    pub max_connection_limit: Option<u32>,
    /// Target number of concurrent attempts; adapted by an external timing
    /// controller.
    pub ideal_parallelism: u32,
    pub auth_tries: Option<u32>,
    pub connection_delay: Option<Duration>,
    pub connection_retries: Option<u32>,
}

impl Default for AdmissionLimits {
    fn default() -> Self {
        Self {
            min_connection_limit: None,
            max_connection_limit: None,
            ideal_parallelism: 1,
            auth_tries: None,
            connection_delay: None,
            connection_retries: None,
        }
    }
}

impl AdmissionLimits {
    /// Clamp a parallelism value into `[max(min, 1), max]`.
    pub fn clamp(&self, value: u32) -> u32 {
        let mut value = value.max(self.min_connection_limit.unwrap_or(1)).max(1);
        if let Some(max) = self.max_connection_limit {
            value = value.min(max.max(1));
        }
        value
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttemptCounters {
    pub total_attempts: u64,
    pub finished_attempts: u64,
    pub failed_connections: u64,
    /// Attempts that got far enough for the protocol to be judged compatible.
    pub supported_attempts: u64,
    pub active_connections: u32,
}

/// Progress flags of a service's credential list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListState {
    pub active: bool,
    pub full: bool,
    pub wait: bool,
    pub pair_fini: bool,
    pub finishing: bool,
    pub finished: bool,
    pub just_started: bool,
}

/// Last measured authentication rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuthRate {
    pub per_second: f64,
    pub measured_at: DateTime<Utc>,
}

pub struct ServiceScheduler {
    id: ServiceId,
    pub name: String,
    target: Option<Arc<Target>>,
    pub transport: Transport,
    pub port: u16,
    pub ssl: bool,

    catalog: Arc<CredentialCatalog>,
    config: Arc<EngineConfig>,
    cursor: PairCursor,
    retry: RetryQueue,
    pending: PendingLedger,

    pub(crate) limits: AdmissionLimits,
    pub(crate) counters: AttemptCounters,
    pub(crate) just_started: bool,
    pub(crate) found: Vec<LoginPair>,

    module_data: Option<Box<dyn Any + Send>>,
    host_info: Option<String>,
    pub(crate) last_activity: Option<DateTime<Utc>>,
    last_auth_rate: Option<AuthRate>,
}

impl std::fmt::Debug for ServiceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceScheduler")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("target", &self.target.as_ref().map(|t| t.name_ip()))
            .field("port", &self.port)
            .field("cursor", &self.cursor)
            .field("pool", &self.retry.len())
            .field("mirror_pool", &self.pending.len())
            .field("counters", &self.counters)
            .finish()
    }
}

impl ServiceScheduler {
    /// New scheduler over `catalog`. Walk order is taken from `config` and
    /// fixed for the scheduler's lifetime.
    pub fn new(
        name: impl Into<String>,
        catalog: Arc<CredentialCatalog>,
        config: Arc<EngineConfig>,
    ) -> Self {
        let order = config.order();
        Self {
            id: ServiceId::new(),
            name: name.into(),
            target: None,
            transport: Transport::default(),
            port: 0,
            ssl: false,
            catalog,
            config,
            cursor: PairCursor::new(order),
            retry: RetryQueue::default(),
            pending: PendingLedger::default(),
            limits: AdmissionLimits::default(),
            counters: AttemptCounters::default(),
            just_started: true,
            found: Vec::new(),
            module_data: None,
            host_info: None,
            last_activity: None,
            last_auth_rate: None,
        }
    }

    /// Copy of this service definition for another target.
    ///
    /// Identity and admission values are copied and the catalog is shared,
    /// but iteration starts from the first pair, ideal parallelism is back
    /// to 1, counters are zero and no retry state is inherited. The copy is
    /// not bound to a target.
    pub fn replicate(&self) -> Self {
        let mut copy = Self::new(
            self.name.clone(),
            Arc::clone(&self.catalog),
            Arc::clone(&self.config),
        );
        copy.transport = self.transport;
        copy.port = self.port;
        copy.ssl = self.ssl;
        copy.limits = AdmissionLimits {
            ideal_parallelism: 1,
            ..self.limits.clone()
        };
        copy
    }

    pub fn id(&self) -> ServiceId {
        self.id
    }

    pub fn catalog(&self) -> &Arc<CredentialCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn order(&self) -> EnumerationOrder {
        self.cursor.order()
    }

    pub fn cursor(&self) -> &PairCursor {
        &self.cursor
    }

    pub fn target(&self) -> Option<&Arc<Target>> {
        self.target.as_ref()
    }

    pub fn bind_target(&mut self, target: Arc<Target>) {
        self.target = Some(target);
    }

    pub fn limits(&self) -> &AdmissionLimits {
        &self.limits
    }

    pub fn counters(&self) -> &AttemptCounters {
        &self.counters
    }

    /// Pairs reported as valid credentials, in the order they were found.
    pub fn found(&self) -> &[LoginPair] {
        &self.found
    }

    /// Copy admission options (from configuration) into this scheduler.
    pub fn apply_options(&mut self, options: &ServiceOptions) {
        self.limits.min_connection_limit = options.min_connection_limit;
        self.limits.max_connection_limit = options.max_connection_limit;
        self.limits.auth_tries = options.auth_tries;
        self.limits.connection_delay = options.connection_delay();
        self.limits.connection_retries = options.connection_retries;
        if let Some(ssl) = options.ssl {
            self.ssl = ssl;
        }
    }

    /// Entry point for the timing controller. The stored value is kept
    /// inside the configured connection limits and never drops below 1.
    pub fn set_ideal_parallelism(&mut self, value: u32) {
        let clamped = self.limits.clamp(value);
        if clamped != self.limits.ideal_parallelism {
            debug!(
                service = %self.name,
                from = self.limits.ideal_parallelism,
                to = clamped,
                "Ideal parallelism changed"
            );
        }
        self.limits.ideal_parallelism = clamped;
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    pub fn last_auth_rate(&self) -> Option<AuthRate> {
        self.last_auth_rate
    }

    pub fn record_auth_rate(&mut self, per_second: f64) {
        self.last_auth_rate = Some(AuthRate {
            per_second,
            measured_at: Utc::now(),
        });
    }

    pub fn set_module_data<T: Any + Send>(&mut self, data: T) {
        self.module_data = Some(Box::new(data));
    }

    pub fn module_data<T: Any>(&self) -> Option<&T> {
        self.module_data.as_deref()?.downcast_ref::<T>()
    }

    pub fn module_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.module_data.as_deref_mut()?.downcast_mut::<T>()
    }

    /// Render `"<name>://<host>:<port>"` into the cached buffer.
    ///
    /// Rebuilt on every call so it tracks the current name, target and port.
    ///
    /// # Panics
    ///
    /// If no target has been bound.
    pub fn host_info(&mut self) -> &str {
        let Some(target) = self.target.as_ref() else {
            panic!(
                "host_info: tried to print host info with uninitialized target (service '{}')",
                self.name
            );
        };
        let buf = self
            .host_info
            .get_or_insert_with(|| String::with_capacity(MAX_HOST_INFO_LEN));
        buf.clear();
        let _ = write!(buf, "{}://{}:{}", self.name, target.name_ip(), self.port);
        truncate_on_char_boundary(buf, MAX_HOST_INFO_LEN - 1);
        buf.as_str()
    }

    /// Next credential pair to try.
    ///
    /// Retry-queue entries always come first, even after the catalog is
    /// exhausted. `Exhausted` is permanent for fresh pairs but later
    /// [`append_to_pool`](Self::append_to_pool) calls are still served.
    pub fn next_pair(&mut self) -> NextPair {
        if let Some(pair) = self.retry.pop() {
            self.trace_pool("extract", &pair);
            return NextPair::Pool(pair);
        }

        if self.cursor.is_exhausted() {
            return NextPair::Exhausted;
        }

        match self.cursor.advance(&self.catalog) {
            Some(pair) => NextPair::Fresh(pair),
            None => {
                if self.config.traces_pool() {
                    let list = match self.cursor.order() {
                        EnumerationOrder::UsersPerPassword => "Password",
                        EnumerationOrder::PasswordsPerUser => "Username",
                    };
                    let info = self.trace_label();
                    debug!(service = %info, "{list} list finished!");
                }
                NextPair::Exhausted
            }
        }
    }

    /// Queue a pair for retry.
    ///
    /// Always appended to the retry queue; recorded in the pending ledger
    /// only if not already there.
    ///
    /// # Panics
    ///
    /// If `user` or `pass` is empty.
    pub fn append_to_pool(&mut self, user: &str, pass: &str) {
        assert!(
            !user.is_empty(),
            "append_to_pool: tried to append empty user into pair pool"
        );
        assert!(
            !pass.is_empty(),
            "append_to_pool: tried to append empty password into pair pool"
        );

        let pair = LoginPair::new(user, pass);
        self.retry.push(pair.clone());
        self.trace_pool("append", &pair);
        self.pending.insert(pair);
    }

    /// Clear a pair's pending-ledger entry. Empty arguments and unknown pairs
    /// are ignored; the retry queue is never touched.
    pub fn remove_from_pool(&mut self, user: &str, pass: &str) {
        if user.is_empty() || pass.is_empty() {
            return;
        }
        let pair = LoginPair::new(user, pass);
        if self.pending.remove(&pair) {
            self.trace_pool("removed", &pair);
        }
    }

    pub fn is_pool_empty(&self) -> bool {
        self.retry.is_empty()
    }

    pub fn is_mirror_pool_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pool_len(&self) -> usize {
        self.retry.len()
    }

    pub fn mirror_pool_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, pair: &LoginPair) -> bool {
        self.pending.contains(pair)
    }

    fn trace_pool(&mut self, action: &str, pair: &LoginPair) {
        if !self.config.traces_pool() {
            return;
        }
        let info = self.trace_label();
        debug!(service = %info, user = %pair.user, pass = %pair.pass, "Pool: {action}");
    }

    /// Host info when a target is bound, the bare service name otherwise.
    fn trace_label(&mut self) -> String {
        if self.target.is_some() {
            self.host_info().to_string()
        } else {
            self.name.clone()
        }
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
