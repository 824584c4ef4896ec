//! DDL for every table in spec.md §6's persistent state layout, plus
//! `trade_items` (Design Notes: replace fixed 10-element offered/requested
//! arrays with a child table).

pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    password_digest TEXT NOT NULL,
    balance         REAL NOT NULL,
    created_at      INTEGER NOT NULL,
    last_login      INTEGER,
    banned          INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS skin_definitions (
    definition_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    rarity        INTEGER NOT NULL,
    base_price    REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS case_definitions (
    case_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    price   REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS case_contents (
    case_id       INTEGER NOT NULL REFERENCES case_definitions(case_id),
    definition_id INTEGER NOT NULL REFERENCES skin_definitions(definition_id),
    PRIMARY KEY (case_id, definition_id)
);

CREATE TABLE IF NOT EXISTS skin_instances (
    instance_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    definition_id INTEGER NOT NULL REFERENCES skin_definitions(definition_id),
    rarity        INTEGER NOT NULL,
    wear          REAL NOT NULL,
    pattern_seed  INTEGER NOT NULL,
    stattrak      INTEGER NOT NULL,
    owner_id      INTEGER NOT NULL REFERENCES users(user_id),
    acquired_at   INTEGER NOT NULL,
    tradable      INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_skin_instances_owner ON skin_instances(owner_id);

CREATE TABLE IF NOT EXISTS inventory (
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    instance_id INTEGER NOT NULL REFERENCES skin_instances(instance_id),
    PRIMARY KEY (user_id, instance_id)
);
CREATE INDEX IF NOT EXISTS idx_inventory_owner ON inventory(user_id);

CREATE TABLE IF NOT EXISTS market_listings (
    listing_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    seller_id   INTEGER NOT NULL REFERENCES users(user_id),
    instance_id INTEGER NOT NULL REFERENCES skin_instances(instance_id),
    price       REAL NOT NULL,
    listed_at   INTEGER NOT NULL,
    sold        INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_market_listings_seller ON market_listings(seller_id, sold);
CREATE INDEX IF NOT EXISTS idx_market_listings_instance ON market_listings(instance_id, sold);

CREATE TABLE IF NOT EXISTS trades (
    trade_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    from_user     INTEGER NOT NULL REFERENCES users(user_id),
    to_user       INTEGER NOT NULL REFERENCES users(user_id),
    offered_cash  REAL NOT NULL,
    requested_cash REAL NOT NULL,
    status        INTEGER NOT NULL,
    created_at    INTEGER NOT NULL,
    expires_at    INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_trades_status_users ON trades(status, from_user, to_user);

CREATE TABLE IF NOT EXISTS trade_items (
    trade_id    INTEGER NOT NULL REFERENCES trades(trade_id),
    side        INTEGER NOT NULL, -- 0 = offered (from_user), 1 = requested (to_user)
    instance_id INTEGER NOT NULL REFERENCES skin_instances(instance_id)
);
CREATE INDEX IF NOT EXISTS idx_trade_items_trade ON trade_items(trade_id);

CREATE TABLE IF NOT EXISTS sessions (
    token         TEXT PRIMARY KEY,
    user_id       INTEGER NOT NULL REFERENCES users(user_id),
    login_time    INTEGER NOT NULL,
    last_activity INTEGER NOT NULL,
    active        INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transaction_logs (
    log_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id   INTEGER NOT NULL REFERENCES users(user_id),
    kind      TEXT NOT NULL,
    amount    REAL NOT NULL,
    details   TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_transaction_logs_user ON transaction_logs(user_id);

CREATE TABLE IF NOT EXISTS reports (
    report_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    reporter_id INTEGER NOT NULL REFERENCES users(user_id),
    reported_id INTEGER NOT NULL REFERENCES users(user_id),
    reason      TEXT,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_reports_reported ON reports(reported_id);

CREATE TABLE IF NOT EXISTS rarity_multipliers (
    rarity     INTEGER PRIMARY KEY,
    multiplier REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS wear_multipliers (
    band       TEXT PRIMARY KEY,
    multiplier REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS price_history (
    entry_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    instance_id INTEGER NOT NULL REFERENCES skin_instances(instance_id),
    kind        INTEGER NOT NULL, -- 0 = buy, 1 = sell
    price       REAL NOT NULL,
    recorded_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_price_history_instance ON price_history(instance_id);

CREATE TABLE IF NOT EXISTS quests (
    user_id   INTEGER NOT NULL REFERENCES users(user_id),
    quest_type TEXT NOT NULL,
    progress  REAL NOT NULL DEFAULT 0,
    target    REAL NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    claimed   INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, quest_type)
);

CREATE TABLE IF NOT EXISTS achievements (
    user_id           INTEGER NOT NULL REFERENCES users(user_id),
    achievement_type  TEXT NOT NULL,
    unlocked          INTEGER NOT NULL DEFAULT 0,
    claimed           INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, achievement_type)
);

CREATE TABLE IF NOT EXISTS login_streaks (
    user_id         INTEGER PRIMARY KEY REFERENCES users(user_id),
    current_streak  INTEGER NOT NULL DEFAULT 0,
    last_login_date TEXT,
    last_reward_date TEXT
);

CREATE TABLE IF NOT EXISTS chat_messages (
    message_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(user_id),
    text       TEXT NOT NULL,
    sent_at    INTEGER NOT NULL
);
"#;
