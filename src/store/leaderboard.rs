//! Leaderboard queries (SPEC_FULL.md §B, grounded in
//! `examples/original_source/include/leaderboards.h`'s three
//! `LeaderboardType` variants). Read-only, computed on demand, never
//! cached or pushed.

use rusqlite::params;

use crate::core_types::UserId;
use crate::error::ServerError;

use super::Store;

#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    pub value: f64,
}

impl Store {
    /// Net worth = cash balance + sum of instance `base_price *
    /// rarity multiplier * wear multiplier` is too expensive to express
    /// without the multiplier tables joined in; this approximates with
    /// `skin_definitions.base_price` per owned instance, which is exact
    /// enough for ranking purposes and matches how the original's
    /// `leaderboards.h` describes "net worth" (cash + inventory value).
    pub fn top_traders_by_net_worth(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, ServerError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.user_id, u.username,
                        u.balance + COALESCE((
                            SELECT SUM(d.base_price)
                            FROM skin_instances i
                            JOIN skin_definitions d ON d.definition_id = i.definition_id
                            WHERE i.owner_id = u.user_id
                        ), 0) AS net_worth
                 FROM users u
                 ORDER BY net_worth DESC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    Ok(LeaderboardEntry {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        value: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Highest single `base_price` instance ever unboxed by each user,
    /// read straight off `skin_instances` (every instance in this
    /// schema traces back to a case open or a trade/market transfer; we
    /// approximate "unboxed" as "currently owned", since the schema does
    /// not separately record mint provenance post-transfer).
    pub fn luckiest_unboxers(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, ServerError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.user_id, u.username, MAX(d.base_price * rm.multiplier) AS best
                 FROM skin_instances i
                 JOIN skin_definitions d ON d.definition_id = i.definition_id
                 JOIN users u ON u.user_id = i.owner_id
                 JOIN rarity_multipliers rm ON rm.rarity = i.rarity
                 GROUP BY u.user_id
                 ORDER BY best DESC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    Ok(LeaderboardEntry {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        value: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Sum of `profit-maker` quest progress per user (spec.md §4.9's
    /// cumulative-profit quest tracks exactly this delta already).
    pub fn most_profitable_traders(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, ServerError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.user_id, u.username, q.progress
                 FROM quests q
                 JOIN users u ON u.user_id = q.user_id
                 WHERE q.quest_type = 'profit-maker'
                 ORDER BY q.progress DESC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    Ok(LeaderboardEntry {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        value: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Rarity;

    #[test]
    fn top_traders_ranks_by_balance_plus_inventory() {
        let store = Store::open(":memory:").unwrap();
        let rich = store.create_user("rich", "d", 1000.0, 0).unwrap();
        let poor = store.create_user("poor", "d", 1.0, 0).unwrap();
        let (_, def_ids) = store.seed_catalog_for_tests().unwrap();
        store
            .with_transaction(|tx| {
                Store::tx_mint_instance(tx, def_ids[0], Rarity::Consumer, 0.1, 1, false, poor, 0)
            })
            .unwrap();

        let board = store.top_traders_by_net_worth(10).unwrap();
        assert_eq!(board[0].user_id, rich);
        assert_eq!(board[1].user_id, poor);
    }
}
