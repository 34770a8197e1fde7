//! Position within the username x password cross-product.

use crate::catalog::CredentialCatalog;
use ncx_core::{EnumerationOrder, LoginPair};

/// Per-scheduler walk over a [`CredentialCatalog`].
///
/// In [`EnumerationOrder::UsersPerPassword`] the user index is the minor
/// (fast) index; [`EnumerationOrder::PasswordsPerUser`] swaps the roles.
/// Once the major index runs off its list the cursor is exhausted for good;
/// only [`rewind`](Self::rewind) starts it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCursor {
    order: EnumerationOrder,
    user_idx: usize,
    pass_idx: usize,
    exhausted: bool,
}

impl PairCursor {
    pub fn new(order: EnumerationOrder) -> Self {
        Self {
            order,
            user_idx: 0,
            pass_idx: 0,
            exhausted: false,
        }
    }

    pub fn order(&self) -> EnumerationOrder {
        self.order
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// `(user_index, password_index)` of the next pair to hand out.
    pub fn position(&self) -> (usize, usize) {
        (self.user_idx, self.pass_idx)
    }

    /// True when the next [`advance`](Self::advance) cannot produce a pair.
    ///
    /// Unlike [`is_exhausted`](Self::is_exhausted) this does not wait for
    /// that call to be made.
    pub fn is_drained(&self, catalog: &CredentialCatalog) -> bool {
        if self.exhausted {
            return true;
        }
        let (users, passwords) = (catalog.users().len(), catalog.passwords().len());
        let (minor, minor_len, major, major_len) = match self.order {
            EnumerationOrder::UsersPerPassword => (self.user_idx, users, self.pass_idx, passwords),
            EnumerationOrder::PasswordsPerUser => (self.pass_idx, passwords, self.user_idx, users),
        };
        if minor_len == 0 || major_len == 0 {
            return true;
        }
        let major = if minor == minor_len { major + 1 } else { major };
        major >= major_len
    }

    pub fn rewind(&mut self) {
        self.user_idx = 0;
        self.pass_idx = 0;
        self.exhausted = false;
    }

    /// Produce the next fresh pair, advancing exactly one step.
    pub fn advance(&mut self, catalog: &CredentialCatalog) -> Option<LoginPair> {
        if self.exhausted {
            return None;
        }
        let users = catalog.users();
        let passwords = catalog.passwords();
        if users.is_empty() || passwords.is_empty() {
            self.exhausted = true;
            return None;
        }

        let (minor, minor_len, major, major_len) = match self.order {
            EnumerationOrder::UsersPerPassword => (
                &mut self.user_idx,
                users.len(),
                &mut self.pass_idx,
                passwords.len(),
            ),
            EnumerationOrder::PasswordsPerUser => (
                &mut self.pass_idx,
                passwords.len(),
                &mut self.user_idx,
                users.len(),
            ),
        };

        if *minor == minor_len {
            *minor = 0;
            *major += 1;
        }
        if *major >= major_len {
            self.exhausted = true;
            return None;
        }
        *minor += 1;

        let (user, pass) = match self.order {
            EnumerationOrder::UsersPerPassword => (self.user_idx - 1, self.pass_idx),
            EnumerationOrder::PasswordsPerUser => (self.user_idx, self.pass_idx - 1),
        };
        Some(LoginPair::new(&users[user], &passwords[pass]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(cursor: &mut PairCursor, catalog: &CredentialCatalog) -> Vec<(String, String)> {
        std::iter::from_fn(|| cursor.advance(catalog))
            .map(|p| (p.user, p.pass))
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(u, p)| (u.to_string(), p.to_string()))
            .collect()
    }

    #[test]
    fn test_users_per_password_order() {
        let catalog = CredentialCatalog::new(["admin", "root"], ["123", "pass"]);
        let mut cursor = PairCursor::new(EnumerationOrder::UsersPerPassword);
        assert_eq!(
            drain(&mut cursor, &catalog),
            pairs(&[
                ("admin", "123"),
                ("root", "123"),
                ("admin", "pass"),
                ("root", "pass"),
            ])
        );
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_passwords_per_user_order() {
        let catalog = CredentialCatalog::new(["admin", "root"], ["123", "pass", "x"]);
        let mut cursor = PairCursor::new(EnumerationOrder::PasswordsPerUser);
        assert_eq!(
            drain(&mut cursor, &catalog),
            pairs(&[
                ("admin", "123"),
                ("admin", "pass"),
                ("admin", "x"),
                ("root", "123"),
                ("root", "pass"),
                ("root", "x"),
            ])
        );
    }

    #[test]
    fn test_exhaustion_is_permanent() {
        let catalog = CredentialCatalog::new(["a"], ["b"]);
        let mut cursor = PairCursor::new(EnumerationOrder::UsersPerPassword);
        assert!(cursor.advance(&catalog).is_some());
        for _ in 0..5 {
            assert!(cursor.advance(&catalog).is_none());
        }
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_empty_lists_exhaust_immediately() {
        let mut cursor = PairCursor::new(EnumerationOrder::UsersPerPassword);
        let no_users = CredentialCatalog::new(Vec::<String>::new(), ["pw"]);
        assert!(cursor.advance(&no_users).is_none());
        assert!(cursor.is_exhausted());

        let mut cursor = PairCursor::new(EnumerationOrder::PasswordsPerUser);
        let no_passwords = CredentialCatalog::new(["u"], Vec::<String>::new());
        assert!(cursor.advance(&no_passwords).is_none());
    }

    #[test]
    fn test_duplicates_are_enumerated() {
        let catalog = CredentialCatalog::new(["root", "root"], ["toor"]);
        let mut cursor = PairCursor::new(EnumerationOrder::UsersPerPassword);
        assert_eq!(drain(&mut cursor, &catalog).len(), 2);
    }

    #[test]
    fn test_is_drained_before_exhaustion_is_flagged() {
        let catalog = CredentialCatalog::new(["a", "b"], ["1", "2"]);
        for order in [
            EnumerationOrder::UsersPerPassword,
            EnumerationOrder::PasswordsPerUser,
        ] {
            let mut cursor = PairCursor::new(order);
            for _ in 0..4 {
                assert!(!cursor.is_drained(&catalog));
                assert!(cursor.advance(&catalog).is_some());
            }
            assert!(cursor.is_drained(&catalog));
            assert!(!cursor.is_exhausted());
            assert!(cursor.advance(&catalog).is_none());
            assert!(cursor.is_exhausted());
        }
    }

    #[test]
    fn test_rewind_restarts_walk() {
        let catalog = CredentialCatalog::new(["a", "b"], ["1"]);
        let mut cursor = PairCursor::new(EnumerationOrder::UsersPerPassword);
        drain(&mut cursor, &catalog);
        cursor.rewind();
        assert_eq!(cursor.position(), (0, 0));
        assert_eq!(cursor.advance(&catalog), Some(LoginPair::new("a", "1")));
    }
}
