//! Auth operations: register / login / logout / session validation
//! (spec.md §4.4). The digest itself is deliberately weak per spec.md §1
//! Non-goals ("strong cryptographic password hashing" is explicitly out
//! of scope) and spec.md §9 ("retain semantics... isolate behind a
//! `PasswordHasher` capability").

use crate::core_types::UserId;
use crate::error::ServerError;
use crate::session::{Session, SessionRegistry};
use crate::store::Store;

/// Capability boundary around the password digest so the weak scheme
/// can be swapped without touching call sites (spec.md §9).
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// The legacy digest this system was specified to keep: unsalted MD5
/// hex. Constant-time comparison, no cryptographic strength claimed.
pub struct WeakMd5Hasher;

impl PasswordHasher for WeakMd5Hasher {
    fn hash(&self, password: &str) -> String {
        format!("{:x}", md5::compute(password.as_bytes()))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        let candidate = self.hash(password);
        constant_time_eq(candidate.as_bytes(), digest.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub struct AuthService<'a> {
    store: &'a Store,
    sessions: &'a SessionRegistry,
    hasher: &'a dyn PasswordHasher,
    starting_balance: f64,
}

impl<'a> AuthService<'a> {
    pub fn new(
        store: &'a Store,
        sessions: &'a SessionRegistry,
        hasher: &'a dyn PasswordHasher,
        starting_balance: f64,
    ) -> Self {
        Self {
            store,
            sessions,
            hasher,
            starting_balance,
        }
    }

    /// spec.md §4.4 Register.
    pub fn register(&self, username: &str, password: &str, now: i64) -> Result<UserId, ServerError> {
        if !(3..=31).contains(&username.len()) {
            return Err(ServerError::InvalidRequest("username must be 3-31 chars"));
        }
        if !(6..=64).contains(&password.len()) {
            return Err(ServerError::InvalidRequest("password must be 6-64 chars"));
        }
        if self.store.get_user_by_username(username)?.is_some() {
            return Err(ServerError::UserExists);
        }
        let digest = self.hasher.hash(password);
        self.store.create_user(username, &digest, self.starting_balance, now)
    }

    /// spec.md §4.4 Login.
    pub fn login(&self, username: &str, password: &str, now: i64) -> Result<(String, UserId), ServerError> {
        let user = self
            .store
            .get_user_by_username(username)?
            .ok_or(ServerError::InvalidCredentials)?;
        if user.banned {
            return Err(ServerError::Banned);
        }
        if !self.hasher.verify(password, &user.password_digest) {
            return Err(ServerError::InvalidCredentials);
        }
        self.store.set_last_login(user.user_id, now)?;
        let token = self.sessions.create(user.user_id, now);
        Ok((token, user.user_id))
    }

    /// spec.md §4.4 Validate session.
    pub fn validate(&self, token: &str, now: i64) -> Result<Session, ServerError> {
        self.sessions.validate(token, now)
    }

    /// spec.md §4.4 Logout.
    pub fn logout(&self, token: &str) {
        self.sessions.logout(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harness() -> (Store, SessionRegistry, WeakMd5Hasher) {
        (Store::open(":memory:").unwrap(), SessionRegistry::new(3600), WeakMd5Hasher)
    }

    #[test]
    fn register_then_login_round_trips() {
        let (store, sessions, hasher) = harness();
        let auth = AuthService::new(&store, &sessions, &hasher, 100.0);

        let user_id = auth.register("alice", "password", 0).unwrap();
        let (token, login_user_id) = auth.login("alice", "password", 0).unwrap();
        assert_eq!(user_id, login_user_id);
        assert_eq!(token.len(), 32);

        assert!(matches!(
            auth.login("alice", "wrong-pw", 0),
            Err(ServerError::InvalidCredentials)
        ));
    }

    #[test]
    fn register_rejects_short_username_and_password() {
        let (store, sessions, hasher) = harness();
        let auth = AuthService::new(&store, &sessions, &hasher, 100.0);
        assert!(auth.register("ab", "password", 0).is_err());
        assert!(auth.register("alice", "short", 0).is_err());
    }

    #[test]
    fn register_rejects_duplicate_username() {
        let (store, sessions, hasher) = harness();
        let auth = AuthService::new(&store, &sessions, &hasher, 100.0);
        auth.register("alice", "password", 0).unwrap();
        assert!(matches!(auth.register("alice", "password2", 0), Err(ServerError::UserExists)));
    }

    #[test]
    fn new_user_starts_with_configured_balance() {
        let (store, sessions, hasher) = harness();
        let auth = AuthService::new(&store, &sessions, &hasher, 100.0);
        let user_id = auth.register("alice", "password", 0).unwrap();
        assert_eq!(store.get_user(user_id).unwrap().unwrap().balance, 100.0);
    }
}
