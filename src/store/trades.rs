//! Peer trades. spec.md §3 (Trade), §4.7 (send/accept/decline/cancel),
//! §4.7.1 (atomic swap). Design Notes: `trade_items` replaces the fixed
//! 10-element offered/requested arrays with a child table keyed by side.

use rusqlite::params;

use crate::core_types::{InstanceId, TradeId, UserId};
use crate::error::ServerError;

use super::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Offered,
    Requested,
}

impl TradeSide {
    fn to_db(self) -> i64 {
        match self {
            TradeSide::Offered => 0,
            TradeSide::Requested => 1,
        }
    }

    fn from_db(v: i64) -> Self {
        if v == 1 { TradeSide::Requested } else { TradeSide::Offered }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
    Expired,
}

impl TradeStatus {
    fn to_db(self) -> i64 {
        match self {
            TradeStatus::Pending => 0,
            TradeStatus::Accepted => 1,
            TradeStatus::Declined => 2,
            TradeStatus::Cancelled => 3,
            TradeStatus::Expired => 4,
        }
    }

    fn from_db(v: i64) -> Self {
        match v {
            1 => TradeStatus::Accepted,
            2 => TradeStatus::Declined,
            3 => TradeStatus::Cancelled,
            4 => TradeStatus::Expired,
            _ => TradeStatus::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TradeOfferRow {
    pub trade_id: TradeId,
    pub from_user: UserId,
    pub to_user: UserId,
    pub offered_cash: f64,
    pub requested_cash: f64,
    pub status: TradeStatus,
    pub created_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct TradeItemRow {
    pub trade_id: TradeId,
    pub side: TradeSide,
    pub instance_id: InstanceId,
}

fn row_to_offer(row: &rusqlite::Row) -> rusqlite::Result<TradeOfferRow> {
    let status_raw: i64 = row.get(5)?;
    Ok(TradeOfferRow {
        trade_id: row.get(0)?,
        from_user: row.get(1)?,
        to_user: row.get(2)?,
        offered_cash: row.get(3)?,
        requested_cash: row.get(4)?,
        status: TradeStatus::from_db(status_raw),
        created_at: row.get(6)?,
        expires_at: row.get(7)?,
    })
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<TradeItemRow> {
    let side_raw: i64 = row.get(1)?;
    Ok(TradeItemRow {
        trade_id: row.get(0)?,
        side: TradeSide::from_db(side_raw),
        instance_id: row.get(2)?,
    })
}

const SELECT_OFFER: &str = "SELECT trade_id, from_user, to_user, offered_cash, requested_cash, status, created_at, expires_at FROM trades";
const SELECT_ITEMS: &str = "SELECT trade_id, side, instance_id FROM trade_items";

impl Store {
    /// Create a pending trade offer plus its item rows inside the
    /// caller's transaction (spec.md §4.7 Send). Items are supplied
    /// already split by side.
    pub fn tx_create_trade(
        tx: &rusqlite::Transaction,
        from_user: UserId,
        to_user: UserId,
        offered_cash: f64,
        requested_cash: f64,
        offered_items: &[InstanceId],
        requested_items: &[InstanceId],
        now: i64,
        expires_at: i64,
    ) -> Result<TradeId, ServerError> {
        tx.execute(
            "INSERT INTO trades (from_user, to_user, offered_cash, requested_cash, status, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                from_user,
                to_user,
                offered_cash,
                requested_cash,
                TradeStatus::Pending.to_db(),
                now,
                expires_at
            ],
        )?;
        let trade_id = tx.last_insert_rowid();
        for instance_id in offered_items {
            tx.execute(
                "INSERT INTO trade_items (trade_id, side, instance_id) VALUES (?1, ?2, ?3)",
                params![trade_id, TradeSide::Offered.to_db(), instance_id],
            )?;
        }
        for instance_id in requested_items {
            tx.execute(
                "INSERT INTO trade_items (trade_id, side, instance_id) VALUES (?1, ?2, ?3)",
                params![trade_id, TradeSide::Requested.to_db(), instance_id],
            )?;
        }
        Ok(trade_id)
    }

    pub fn get_trade(&self, trade_id: TradeId) -> Result<Option<TradeOfferRow>, ServerError> {
        self.with_conn(|conn| {
            use rusqlite::OptionalExtension;
            let sql = format!("{SELECT_OFFER} WHERE trade_id = ?1");
            conn.query_row(&sql, params![trade_id], row_to_offer)
                .optional()
                .map_err(ServerError::from)
        })
    }

    pub fn tx_get_trade(tx: &rusqlite::Transaction, trade_id: TradeId) -> Result<TradeOfferRow, ServerError> {
        use rusqlite::OptionalExtension;
        let sql = format!("{SELECT_OFFER} WHERE trade_id = ?1");
        tx.query_row(&sql, params![trade_id], row_to_offer)
            .optional()?
            .ok_or(ServerError::ItemNotFound)
    }

    pub fn get_trade_items(&self, trade_id: TradeId) -> Result<Vec<TradeItemRow>, ServerError> {
        self.with_conn(|conn| {
            let sql = format!("{SELECT_ITEMS} WHERE trade_id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![trade_id], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn tx_get_trade_items(
        tx: &rusqlite::Transaction,
        trade_id: TradeId,
    ) -> Result<Vec<TradeItemRow>, ServerError> {
        let sql = format!("{SELECT_ITEMS} WHERE trade_id = ?1");
        let mut stmt = tx.prepare(&sql)?;
        let rows = stmt
            .query_map(params![trade_id], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Trades addressed to or sent by a user that are still pending
    /// (spec.md §4.7 List).
    pub fn list_pending_trades_for(&self, user_id: UserId) -> Result<Vec<TradeOfferRow>, ServerError> {
        self.with_conn(|conn| {
            let sql = format!(
                "{SELECT_OFFER} WHERE status = ?1 AND (from_user = ?2 OR to_user = ?2) ORDER BY created_at DESC, trade_id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![TradeStatus::Pending.to_db(), user_id], row_to_offer)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn tx_set_trade_status(
        tx: &rusqlite::Transaction,
        trade_id: TradeId,
        status: TradeStatus,
    ) -> Result<(), ServerError> {
        let updated = tx.execute(
            "UPDATE trades SET status = ?1 WHERE trade_id = ?2",
            params![status.to_db(), trade_id],
        )?;
        if updated == 0 {
            return Err(ServerError::ItemNotFound);
        }
        Ok(())
    }

    /// Expire trades past `expires_at` that are still pending (spec.md
    /// §4.7.1 background reaper). Returns the number of rows expired.
    pub fn sweep_expire_trades(&self, now: i64) -> Result<usize, ServerError> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE trades SET status = ?1 WHERE status = ?2 AND expires_at < ?3",
                params![TradeStatus::Expired.to_db(), TradeStatus::Pending.to_db(), now],
            )?;
            Ok(affected)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Rarity;

    fn seed_two_users_with_items(store: &Store) -> (UserId, UserId, InstanceId, InstanceId) {
        let alice = store.create_user("alice", "d", 100.0, 0).unwrap();
        let bob = store.create_user("bob", "d", 100.0, 0).unwrap();
        let (_, def_ids) = store.seed_catalog_for_tests().unwrap();
        let alice_item = store
            .with_transaction(|tx| {
                Store::tx_mint_instance(tx, def_ids[0], Rarity::Consumer, 0.1, 1, false, alice, 0)
            })
            .unwrap();
        let bob_item = store
            .with_transaction(|tx| {
                Store::tx_mint_instance(tx, def_ids[1], Rarity::Industrial, 0.1, 1, false, bob, 0)
            })
            .unwrap();
        (alice, bob, alice_item, bob_item)
    }

    #[test]
    fn create_trade_persists_offer_and_items_by_side() {
        let store = Store::open(":memory:").unwrap();
        let (alice, bob, alice_item, bob_item) = seed_two_users_with_items(&store);

        let trade_id = store
            .with_transaction(|tx| {
                Store::tx_create_trade(tx, alice, bob, 0.0, 0.0, &[alice_item], &[bob_item], 0, 3600)
            })
            .unwrap();

        let offer = store.get_trade(trade_id).unwrap().unwrap();
        assert_eq!(offer.status, TradeStatus::Pending);

        let items = store.get_trade_items(trade_id).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.side == TradeSide::Offered && i.instance_id == alice_item));
        assert!(items.iter().any(|i| i.side == TradeSide::Requested && i.instance_id == bob_item));
    }

    #[test]
    fn sweep_expire_trades_only_touches_pending_past_deadline() {
        let store = Store::open(":memory:").unwrap();
        let (alice, bob, alice_item, bob_item) = seed_two_users_with_items(&store);
        let trade_id = store
            .with_transaction(|tx| {
                Store::tx_create_trade(tx, alice, bob, 0.0, 0.0, &[alice_item], &[bob_item], 0, 100)
            })
            .unwrap();

        assert_eq!(store.sweep_expire_trades(50).unwrap(), 0);
        assert_eq!(store.sweep_expire_trades(100).unwrap(), 0);
        assert_eq!(store.sweep_expire_trades(101).unwrap(), 1);
        assert_eq!(store.get_trade(trade_id).unwrap().unwrap().status, TradeStatus::Expired);
    }

    #[test]
    fn list_pending_trades_for_finds_both_directions() {
        let store = Store::open(":memory:").unwrap();
        let (alice, bob, alice_item, bob_item) = seed_two_users_with_items(&store);
        store
            .with_transaction(|tx| {
                Store::tx_create_trade(tx, alice, bob, 0.0, 0.0, &[alice_item], &[bob_item], 0, 3600)
            })
            .unwrap();

        assert_eq!(store.list_pending_trades_for(alice).unwrap().len(), 1);
        assert_eq!(store.list_pending_trades_for(bob).unwrap().len(), 1);
    }

    #[test]
    fn list_pending_trades_for_orders_most_recent_first() {
        let store = Store::open(":memory:").unwrap();
        let (alice, bob, alice_item, bob_item) = seed_two_users_with_items(&store);

        let first = store
            .with_transaction(|tx| Store::tx_create_trade(tx, alice, bob, 0.0, 0.0, &[alice_item], &[], 0, 3600))
            .unwrap();
        let second = store
            .with_transaction(|tx| Store::tx_create_trade(tx, alice, bob, 0.0, 0.0, &[], &[bob_item], 10, 3600))
            .unwrap();

        let offers = store.list_pending_trades_for(alice).unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].trade_id, second);
        assert_eq!(offers[1].trade_id, first);
    }
}
