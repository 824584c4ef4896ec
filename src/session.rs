//! Session registry: opaque session tokens, last-activity clock, optional
//! fd binding. Spec.md §3 (Session), §4.4 (validate), §5 ("reads
//! dominate").
//!
//! Grounded on the teacher's `api_auth::ts_store::TsStore`: a `DashMap`
//! keyed by an opaque string, entries mutated in place rather than
//! replaced, so reads never block behind a writer touching a different
//! key.

use dashmap::DashMap;
use rand::RngCore;

use crate::core_types::UserId;
use crate::error::ServerError;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub fd: Option<i32>,
    pub login_time: i64,
    pub last_activity: i64,
    pub active: bool,
}

/// Generate a fresh 32-hex-character token from an OS-backed CSPRNG.
///
/// The teacher's source system seeded its token PRNG from `time(NULL)`
/// (spec.md §9, flagged as a defect to fix); this draws straight from
/// `rand`'s OS-backed generator instead, so the prohibition on
/// cryptographic password hashing (spec.md §1 Non-goals) never leaked
/// into session-token unguessability too.
fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct SessionRegistry {
    sessions: DashMap<String, Session>,
    ttl_secs: i64,
}

impl SessionRegistry {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_secs,
        }
    }

    /// Create and register a new session for `user_id`, returning its token.
    pub fn create(&self, user_id: UserId, now: i64) -> String {
        let token = generate_token();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id,
                fd: None,
                login_time: now,
                last_activity: now,
                active: true,
            },
        );
        token
    }

    /// Validate a token against spec.md §4.4: unknown token, inactive
    /// session, or idle past the TTL all surface as `SessionExpired`. On
    /// success, slides the activity window forward to `now`.
    pub fn validate(&self, token: &str, now: i64) -> Result<Session, ServerError> {
        let mut entry = self
            .sessions
            .get_mut(token)
            .ok_or(ServerError::SessionExpired)?;

        if !entry.active {
            return Err(ServerError::SessionExpired);
        }
        if now - entry.last_activity > self.ttl_secs {
            entry.active = false;
            return Err(ServerError::SessionExpired);
        }

        entry.last_activity = now;
        Ok(entry.clone())
    }

    /// Bind a session to a connection's fd, for routing push-style
    /// notifications (spec.md §3).
    pub fn bind_fd(&self, token: &str, fd: i32) {
        if let Some(mut entry) = self.sessions.get_mut(token) {
            entry.fd = Some(fd);
        }
    }

    /// Remove a session row entirely (spec.md §4.4 Logout).
    pub fn logout(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Sweep every session whose idle time exceeds the TTL, marking it
    /// inactive. Intended to run periodically alongside the trade reaper.
    pub fn sweep_expired(&self, now: i64) -> usize {
        let mut expired = 0;
        for mut entry in self.sessions.iter_mut() {
            if entry.active && now - entry.last_activity > self.ttl_secs {
                entry.active = false;
                expired += 1;
            }
        }
        expired
    }
}
