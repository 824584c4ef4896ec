//! Leaderboard reporting surface (SPEC_FULL.md §B). A pure read wrapper
//! around the Store queries; no caching, no push.

use crate::error::ServerError;
use crate::store::{LeaderboardEntry, Store};

pub enum LeaderboardKind {
    NetWorth,
    LuckiestUnboxers,
    MostProfitable,
}

pub fn top(store: &Store, kind: LeaderboardKind, limit: i64) -> Result<Vec<LeaderboardEntry>, ServerError> {
    match kind {
        LeaderboardKind::NetWorth => store.top_traders_by_net_worth(limit),
        LeaderboardKind::LuckiestUnboxers => store.luckiest_unboxers(limit),
        LeaderboardKind::MostProfitable => store.most_profitable_traders(limit),
    }
}
