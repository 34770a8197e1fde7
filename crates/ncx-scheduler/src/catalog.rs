//! Username/password lists shared by every scheduler targeting the same
//! service definition.

use anyhow::{Context, Result};
use ncx_core::NcxError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Two ordered, immutable credential lists.
///
/// Duplicates are kept and order is the enumeration order. Iteration
/// positions live in each scheduler's [`PairCursor`](crate::PairCursor),
/// never here, so one `Arc<CredentialCatalog>` can back any number of
/// schedulers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialCatalog {
    users: Vec<String>,
    passwords: Vec<String>,
}

impl CredentialCatalog {
    pub fn new<U, P>(users: U, passwords: P) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
            passwords: passwords.into_iter().map(Into::into).collect(),
        }
    }

    /// Load both lists from newline-separated wordlist files.
    pub fn from_files(users: &Path, passwords: &Path) -> Result<Self> {
        let open = |path: &Path| -> Result<BufReader<File>> {
            let file = File::open(path)
                .with_context(|| format!("Failed to open wordlist: {}", path.display()))?;
            Ok(BufReader::new(file))
        };

        let users = read_wordlist(open(users)?, &users.display().to_string())?;
        let passwords = read_wordlist(open(passwords)?, &passwords.display().to_string())?;
        debug!(
            users = users.len(),
            passwords = passwords.len(),
            "Loaded credential catalog"
        );
        Ok(Self { users, passwords })
    }

    /// Load both lists from arbitrary readers. Labels are used in errors.
    pub fn from_readers<U: BufRead, P: BufRead>(
        users: U,
        users_label: &str,
        passwords: P,
        passwords_label: &str,
    ) -> Result<Self> {
        Ok(Self {
            users: read_wordlist(users, users_label)?,
            passwords: read_wordlist(passwords, passwords_label)?,
        })
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn passwords(&self) -> &[String] {
        &self.passwords
    }

    /// Size of the cross-product.
    pub fn pair_count(&self) -> usize {
        self.users.len().saturating_mul(self.passwords.len())
    }

    pub fn is_empty(&self) -> bool {
        self.pair_count() == 0
    }
}

/// One entry per line; trailing `\r` stripped, blank lines skipped.
fn read_wordlist<R: BufRead>(reader: R, label: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read line {} of {}", lineno + 1, label))?;
        let word = line.strip_suffix('\r').unwrap_or(&line);
        if word.is_empty() {
            continue;
        }
        words.push(word.to_string());
    }
    if words.is_empty() {
        return Err(NcxError::EmptyWordlist {
            path: label.to_string(),
        }
        .into());
    }
    Ok(words)
}
