//! Process-wide services threaded into the dispatcher (spec.md §9:
//! "lift [shared mutable globals] to a single server-state value
//! threaded into handlers"). One instance lives for the process
//! lifetime behind an `Arc`, shared by every worker thread.

use crate::auth::{PasswordHasher, WeakMd5Hasher};
use crate::config::ServerConfig;
use crate::session::SessionRegistry;
use crate::store::Store;

pub struct AppState {
    pub store: Store,
    pub sessions: SessionRegistry,
    pub hasher: Box<dyn PasswordHasher>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let store = Store::open(&config.db_path)?;
        let sessions = SessionRegistry::new(config.session_ttl_secs);
        Ok(Self {
            store,
            sessions,
            hasher: Box::new(WeakMd5Hasher),
            config,
        })
    }

    /// Run the background maintenance sweep (spec.md §4.7 reaper, §4.8
    /// trade-lock unlock, §5 session sweep). Intended to be called
    /// periodically by a dedicated maintenance thread, not per-request.
    pub fn run_maintenance_sweep(&self, now: i64) {
        match self.store.sweep_expire_trades(now) {
            Ok(n) if n > 0 => tracing::info!(count = n, "expired stale pending trades"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "trade expiry sweep failed"),
        }
        match self.store.sweep_unlock_expired(now, self.config.trade_lock_ttl_secs) {
            Ok(n) if n > 0 => tracing::info!(count = n, "unlocked trade-locked instances past TTL"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "trade-lock sweep failed"),
        }
        let expired_sessions = self.sessions.sweep_expired(now);
        if expired_sessions > 0 {
            tracing::info!(count = expired_sessions, "expired idle sessions");
        }
    }
}
