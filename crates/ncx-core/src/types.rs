use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Transport a service is reached over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Tcp,
    Udp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order in which the username/password cross-product is walked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnumerationOrder {
    /// Every username is tried with one password before the next password.
    #[default]
    UsersPerPassword,
    /// Every password is tried with one username before the next username
    /// (`--passwords-first`).
    PasswordsPerUser,
}

impl std::fmt::Display for EnumerationOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsersPerPassword => write!(f, "users-per-password"),
            Self::PasswordsPerUser => write!(f, "passwords-per-user"),
        }
    }
}

/// One username/password candidate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoginPair {
    pub user: String,
    pub pass: String,
}

impl LoginPair {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

impl std::fmt::Display for LoginPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.user, self.pass)
    }
}

/// Result of asking a scheduler for its next credential pair.
///
/// `Exhausted` is not an error: retries appended later can still be served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextPair {
    /// Pulled from the retry queue.
    Pool(LoginPair),
    /// Next pair of the catalog cross-product.
    Fresh(LoginPair),
    /// Catalog walked to the end and retry queue empty.
    Exhausted,
}

impl NextPair {
    pub fn pair(&self) -> Option<&LoginPair> {
        match self {
            Self::Pool(pair) | Self::Fresh(pair) => Some(pair),
            Self::Exhausted => None,
        }
    }

    pub fn into_pair(self) -> Option<LoginPair> {
        match self {
            Self::Pool(pair) | Self::Fresh(pair) => Some(pair),
            Self::Exhausted => None,
        }
    }

    pub fn is_from_pool(&self) -> bool {
        matches!(self, Self::Pool(_))
    }
}

/// Identity of one scheduler instance, used by attempt sessions as their
/// non-owning back-reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(Ulid);

impl ServiceId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output format for CLI responses
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
