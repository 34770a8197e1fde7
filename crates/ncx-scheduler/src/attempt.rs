//! One in-flight authentication attempt.

use ncx_core::{LoginPair, ServiceId};
use serde::Serialize;

use crate::service::ServiceScheduler;

/// Progress flags advanced by the protocol module driving the attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionFlags {
    /// The peer answered at least once.
    pub peer_alive: bool,
    pub auth_complete: bool,
    pub auth_success: bool,
    /// A check for a closed connection is pending.
    pub check_closed: bool,
    pub peer_might_close: bool,
    pub finished_normally: bool,
}

/// How an attempt ended, as reported back to its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptOutcome {
    /// The credentials were accepted.
    Succeeded,
    /// The credentials were refused.
    Rejected,
    /// The connection broke before a verdict; the pair has to be retried.
    Interrupted,
}

/// A single authentication attempt against one service.
///
/// Holds the [`ServiceId`] of the scheduler that spawned it rather than the
/// scheduler itself; it is fixed at construction. The two working buffers
/// belong to the protocol module and are released with the session.
#[derive(Debug)]
pub struct AttemptSession {
    service: ServiceId,
    pair: Option<LoginPair>,
    from_pool: bool,
    /// Protocol-module state code.
    pub state: u32,
    pub flags: SessionFlags,
    /// Logins tried over this connection.
    pub login_attempts: u32,
    buf: Option<Vec<u8>>,
    misc_info: Option<Vec<u8>>,
}

impl AttemptSession {
    pub fn new(service: &ServiceScheduler) -> Self {
        Self {
            service: service.id(),
            pair: None,
            from_pool: false,
            state: 0,
            flags: SessionFlags::default(),
            login_attempts: 0,
            buf: None,
            misc_info: None,
        }
    }

    pub fn service_id(&self) -> ServiceId {
        self.service
    }

    pub fn belongs_to(&self, service: &ServiceScheduler) -> bool {
        self.service == service.id()
    }

    pub(crate) fn bind_pair(&mut self, pair: LoginPair, from_pool: bool) {
        self.pair = Some(pair);
        self.from_pool = from_pool;
    }

    /// Credential pair this attempt is trying, if one was bound.
    pub fn pair(&self) -> Option<&LoginPair> {
        self.pair.as_ref()
    }

    /// Whether the pair came from the retry queue.
    pub fn is_from_pool(&self) -> bool {
        self.from_pool
    }

    pub fn record_login_attempt(&mut self) -> u32 {
        self.login_attempts += 1;
        self.login_attempts
    }

    /// Whether another login fits on this connection under `auth_tries`.
    pub fn has_tries_left(&self, auth_tries: Option<u32>) -> bool {
        auth_tries.is_none_or(|limit| self.login_attempts < limit)
    }

    pub fn buf(&self) -> Option<&[u8]> {
        self.buf.as_deref()
    }

    /// Working buffer, allocated on first use.
    pub fn buf_mut(&mut self) -> &mut Vec<u8> {
        self.buf.get_or_insert_with(Vec::new)
    }

    pub fn release_buf(&mut self) {
        self.buf = None;
    }

    pub fn misc_info(&self) -> Option<&[u8]> {
        self.misc_info.as_deref()
    }

    pub fn misc_info_mut(&mut self) -> &mut Vec<u8> {
        self.misc_info.get_or_insert_with(Vec::new)
    }

    pub fn release_misc_info(&mut self) {
        self.misc_info = None;
    }
}
