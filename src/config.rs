//! Server configuration: boot-time constants + a handful of env overrides.
//!
//! No hot reload. See SPEC_FULL.md §A.3.

/// Default listen port (spec.md §6); overridden by the CLI positional arg.
pub const DEFAULT_PORT: u16 = 8888;

/// Fixed worker thread count (spec.md §4.2).
pub const WORKER_COUNT: usize = 8;

/// Bounded job queue capacity (spec.md §4.2).
pub const QUEUE_CAPACITY: usize = 1000;

/// Session idle timeout, seconds (spec.md §4.4).
pub const SESSION_TTL_SECS: i64 = 3600;

/// Pending trade offer TTL, seconds (spec.md §3 TradeOffer).
pub const TRADE_TTL_SECS: i64 = 15 * 60;

/// Market trade-lock duration, seconds (spec.md §4.8).
pub const TRADE_LOCK_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Market seller fee rate (spec.md §4.6).
pub const MARKET_FEE_RATE: f64 = 0.15;

/// Flat key price added to every case-opening cost (spec.md §4.5).
pub const KEY_PRICE: f64 = 2.5;

/// Starting balance for newly registered users (spec.md §4.4).
pub const STARTING_BALANCE: f64 = 100.0;

/// Report count at/above which a warning broadcast fires (spec.md §4.9).
pub const REPORT_WARNING_THRESHOLD: i64 = 5;

/// Max payload length of a single frame, bytes (spec.md §4.1).
pub const MAX_PAYLOAD_LEN: u32 = 4096;

/// Fixed 16-byte frame header size (spec.md §4.1).
pub const FRAME_HEADER_LEN: usize = 16;

/// Frame magic number (spec.md §4.1).
pub const FRAME_MAGIC: u16 = 0xABCD;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub worker_count: usize,
    pub queue_capacity: usize,
    pub session_ttl_secs: i64,
    pub trade_ttl_secs: i64,
    pub trade_lock_ttl_secs: i64,
    pub market_fee_rate: f64,
    pub key_price: f64,
    pub starting_balance: f64,
    pub db_path: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub rotation: String,
    pub use_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            worker_count: WORKER_COUNT,
            queue_capacity: QUEUE_CAPACITY,
            session_ttl_secs: SESSION_TTL_SECS,
            trade_ttl_secs: TRADE_TTL_SECS,
            trade_lock_ttl_secs: TRADE_LOCK_TTL_SECS,
            market_fee_rate: MARKET_FEE_RATE,
            key_price: KEY_PRICE,
            starting_balance: STARTING_BALANCE,
            db_path: "tradesim.sqlite3".to_string(),
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_file: "tradesim-server.log".to_string(),
            rotation: "daily".to_string(),
            use_json: false,
        }
    }
}

impl ServerConfig {
    /// Build config from defaults, then environment overrides, then an
    /// optional CLI port. Mirrors the teacher's `Database::connect` style
    /// of reading an env var with a typed fallback.
    pub fn from_env(cli_port: Option<u16>) -> Self {
        let mut cfg = Self::default();

        if let Some(port) = std::env::var("TRADESIM_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            cfg.port = port;
        }
        if let Some(workers) = std::env::var("TRADESIM_WORKERS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            cfg.worker_count = workers;
        }
        if let Ok(path) = std::env::var("TRADESIM_DB_PATH") {
            cfg.db_path = path;
        }
        if let Ok(level) = std::env::var("TRADESIM_LOG_LEVEL") {
            cfg.log_level = level;
        }

        if let Some(port) = cli_port {
            cfg.port = port;
        }

        cfg
    }
}
