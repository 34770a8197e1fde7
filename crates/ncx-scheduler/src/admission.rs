//! Connection admission: how many attempts a service may run, handing out
//! attempt sessions, and folding their outcomes back into the scheduler.

use chrono::{DateTime, Utc};
use ncx_core::{LoginPair, NextPair, ServiceId, Transport};
use serde::Serialize;
use tracing::{debug, info};

use crate::attempt::{AttemptOutcome, AttemptSession};
use crate::service::{AttemptCounters, AuthRate, ListState, ServiceScheduler};

/// Summary of where a service stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    /// Can take more attempts.
    Active,
    /// Admission budget used up.
    Full,
    /// Connection delay since the last opened attempt has not elapsed.
    Waiting,
    /// No pairs left to hand out; attempts or pending retries outstanding.
    Finishing,
    /// Nothing left to do.
    Finished,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Full => write!(f, "full"),
            Self::Waiting => write!(f, "waiting"),
            Self::Finishing => write!(f, "finishing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Serializable view of a scheduler for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSnapshot {
    pub id: ServiceId,
    pub name: String,
    pub host: Option<String>,
    pub port: u16,
    pub transport: Transport,
    pub ssl: bool,
    pub status: ServiceStatus,
    pub ideal_parallelism: u32,
    pub effective_parallelism: u32,
    pub counters: AttemptCounters,
    pub pool: usize,
    pub mirror_pool: usize,
    pub found: Vec<LoginPair>,
    pub last_activity: Option<DateTime<Utc>>,
    pub last_auth_rate: Option<AuthRate>,
}

impl ServiceScheduler {
    /// Ideal parallelism kept inside the min/max connection limits.
    pub fn effective_parallelism(&self) -> u32 {
        self.limits.clamp(self.limits.ideal_parallelism)
    }

    /// Attempts that may be opened right now.
    pub fn admission_budget(&self) -> u32 {
        self.effective_parallelism()
            .saturating_sub(self.counters.active_connections)
    }

    /// Whether the configured connection delay still holds back new attempts.
    pub fn is_waiting(&self, now: DateTime<Utc>) -> bool {
        let (Some(delay), Some(last)) = (self.limits.connection_delay, self.last_activity) else {
            return false;
        };
        // A delay too large to represent holds back for good.
        match chrono::Duration::from_std(delay) {
            Ok(delay) => last
                .checked_add_signed(delay)
                .is_none_or(|until| now < until),
            Err(_) => true,
        }
    }

    /// Current list flags.
    pub fn list_state(&self) -> ListState {
        self.list_state_at(Utc::now())
    }

    fn list_state_at(&self, now: DateTime<Utc>) -> ListState {
        let pair_fini = self.cursor().is_drained(self.catalog()) && self.is_pool_empty();
        let idle = self.counters.active_connections == 0;
        let finished = pair_fini && idle && self.is_mirror_pool_empty();
        ListState {
            active: !finished,
            full: self.admission_budget() == 0,
            wait: self.is_waiting(now),
            pair_fini,
            finishing: pair_fini && !finished,
            finished,
            just_started: self.just_started,
        }
    }

    pub fn status(&self) -> ServiceStatus {
        let state = self.list_state();
        if state.finished {
            ServiceStatus::Finished
        } else if state.finishing {
            ServiceStatus::Finishing
        } else if state.full {
            ServiceStatus::Full
        } else if state.wait {
            ServiceStatus::Waiting
        } else {
            ServiceStatus::Active
        }
    }

    /// Hand out a session bound to the next pair, if the budget, the
    /// connection delay and the credential supply allow it.
    pub fn open_attempt(&mut self) -> Option<AttemptSession> {
        if self.admission_budget() == 0 {
            return None;
        }
        let now = Utc::now();
        if self.is_waiting(now) {
            return None;
        }

        let (pair, from_pool) = match self.next_pair() {
            NextPair::Pool(pair) => (pair, true),
            NextPair::Fresh(pair) => (pair, false),
            NextPair::Exhausted => return None,
        };

        let mut session = AttemptSession::new(self);
        debug!(
            service = %self.name,
            user = %pair.user,
            from_pool,
            active = self.counters.active_connections + 1,
            "Opened attempt"
        );
        session.bind_pair(pair, from_pool);

        self.counters.total_attempts += 1;
        self.counters.active_connections += 1;
        self.just_started = false;
        self.last_activity = Some(now);
        Some(session)
    }

    /// Record the outcome of a finished session and release it.
    ///
    /// Accepted or refused pairs are resolved and leave the pending ledger;
    /// interrupted ones go back into the retry pool.
    ///
    /// # Panics
    ///
    /// If the session was opened by another scheduler.
    pub fn close_attempt(&mut self, session: AttemptSession, outcome: AttemptOutcome) {
        assert!(
            session.belongs_to(self),
            "close_attempt: session of service {} reported to service {} ({})",
            session.service_id(),
            self.id(),
            self.name
        );

        self.counters.active_connections = self.counters.active_connections.saturating_sub(1);
        self.counters.finished_attempts += 1;
        if session.flags.auth_complete {
            self.counters.supported_attempts += 1;
        }

        let Some(pair) = session.pair() else {
            return;
        };
        match outcome {
            AttemptOutcome::Succeeded => {
                info!(service = %self.name, user = %pair.user, "Valid credentials found");
                self.remove_from_pool(&pair.user, &pair.pass);
                self.found.push(pair.clone());
            }
            AttemptOutcome::Rejected => {
                self.remove_from_pool(&pair.user, &pair.pass);
            }
            AttemptOutcome::Interrupted => {
                self.counters.failed_connections += 1;
                debug!(
                    service = %self.name,
                    user = %pair.user,
                    failed = self.counters.failed_connections,
                    "Attempt interrupted, requeueing pair"
                );
                self.append_to_pool(&pair.user, &pair.pass);
            }
        }
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        ServiceSnapshot {
            id: self.id(),
            name: self.name.clone(),
            host: self.target().map(|t| t.name_ip().to_string()),
            port: self.port,
            transport: self.transport,
            ssl: self.ssl,
            status: self.status(),
            ideal_parallelism: self.limits.ideal_parallelism,
            effective_parallelism: self.effective_parallelism(),
            counters: self.counters,
            pool: self.pool_len(),
            mirror_pool: self.mirror_pool_len(),
            found: self.found.clone(),
            last_activity: self.last_activity,
            last_auth_rate: self.last_auth_rate(),
        }
    }
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
