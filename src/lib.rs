//! tradesim-server — the server half of a multiplayer virtual-item
//! trading simulator: auth, case opening, a seller-listed marketplace,
//! and peer-to-peer item/cash trading over a length-prefixed binary
//! protocol.
//!
//! # Modules
//!
//! - [`core_types`] - shared id aliases, Rarity/WearBand enums
//! - [`config`] - boot-time constants + env overrides
//! - [`error`] - typed `ServerError` / wire `ErrorCode`
//! - [`protocol`] - frame codec (header, CRC, partial I/O loops)
//! - [`store`] - relational persistence, one table module per entity group
//! - [`session`] - opaque session token registry
//! - [`worker_pool`] - bounded FIFO job queue + fixed worker threads
//! - [`auth`] - register/login/logout/validate
//! - [`rarity`] - case-opening random rolls
//! - [`domain`] - the three critical transactional operations + side-effect hooks
//! - [`wire`] - response payload text encoding
//! - [`handlers`] - one function per wire message group
//! - [`dispatcher`] - msg_type routing + ERROR frame shape
//! - [`state`] - process-wide `AppState`
//! - [`net`] - TCP acceptor + per-connection loop
//! - [`logging`] - structured logging setup

pub mod auth;
pub mod config;
pub mod core_types;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod net;
pub mod protocol;
pub mod rarity;
pub mod session;
pub mod state;
pub mod store;
pub mod wire;
pub mod worker_pool;

/// Current unix timestamp in seconds. The one place the rest of the
/// crate reaches for wall-clock time, so tests can hand in an explicit
/// `now` instead.
pub fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
