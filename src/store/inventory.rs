//! Skin instances and inventory membership. spec.md §3 (SkinInstance,
//! Inventory membership invariant), §4.8 (trade lock).

use rusqlite::params;

use crate::core_types::{DefinitionId, InstanceId, Rarity, UserId};
use crate::error::ServerError;

use super::Store;

#[derive(Debug, Clone)]
pub struct SkinInstanceRow {
    pub instance_id: InstanceId,
    pub definition_id: DefinitionId,
    pub rarity: Rarity,
    pub wear: f64,
    pub pattern_seed: i64,
    pub stattrak: bool,
    pub owner_id: UserId,
    pub acquired_at: i64,
    pub tradable: bool,
}

fn row_to_instance(row: &rusqlite::Row) -> rusqlite::Result<SkinInstanceRow> {
    let rarity_raw: i64 = row.get(2)?;
    Ok(SkinInstanceRow {
        instance_id: row.get(0)?,
        definition_id: row.get(1)?,
        rarity: Rarity::from_db(rarity_raw).unwrap_or(Rarity::Consumer),
        wear: row.get(3)?,
        pattern_seed: row.get(4)?,
        stattrak: row.get::<_, i64>(5)? != 0,
        owner_id: row.get(6)?,
        acquired_at: row.get(7)?,
        tradable: row.get::<_, i64>(8)? != 0,
    })
}

const SELECT_INSTANCE: &str = "SELECT instance_id, definition_id, rarity, wear, pattern_seed, stattrak, owner_id, acquired_at, tradable FROM skin_instances";

impl Store {
    pub fn get_instance(&self, instance_id: InstanceId) -> Result<Option<SkinInstanceRow>, ServerError> {
        self.with_conn(|conn| {
            use rusqlite::OptionalExtension;
            let sql = format!("{SELECT_INSTANCE} WHERE instance_id = ?1");
            conn.query_row(&sql, params![instance_id], row_to_instance)
                .optional()
                .map_err(ServerError::from)
        })
    }

    pub fn list_inventory(&self, user_id: UserId) -> Result<Vec<SkinInstanceRow>, ServerError> {
        self.with_conn(|conn| {
            let sql = format!("{SELECT_INSTANCE} WHERE owner_id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![user_id], row_to_instance)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Mint a new instance and its inventory row inside the caller's
    /// transaction. Does not touch balance — callers debit separately
    /// inside the same transaction (spec.md §4.5.1).
    pub fn tx_mint_instance(
        tx: &rusqlite::Transaction,
        definition_id: DefinitionId,
        rarity: Rarity,
        wear: f64,
        pattern_seed: i64,
        stattrak: bool,
        owner_id: UserId,
        now: i64,
    ) -> Result<InstanceId, ServerError> {
        tx.execute(
            "INSERT INTO skin_instances (definition_id, rarity, wear, pattern_seed, stattrak, owner_id, acquired_at, tradable)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
            params![
                definition_id,
                rarity.to_db(),
                wear,
                pattern_seed,
                stattrak as i64,
                owner_id,
                now
            ],
        )?;
        let instance_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO inventory (user_id, instance_id) VALUES (?1, ?2)",
            params![owner_id, instance_id],
        )?;
        Ok(instance_id)
    }

    pub fn tx_get_instance(
        tx: &rusqlite::Transaction,
        instance_id: InstanceId,
    ) -> Result<SkinInstanceRow, ServerError> {
        use rusqlite::OptionalExtension;
        let sql = format!("{SELECT_INSTANCE} WHERE instance_id = ?1");
        tx.query_row(&sql, params![instance_id], row_to_instance)
            .optional()?
            .ok_or(ServerError::ItemNotFound)
    }

    /// Reassign ownership: update the instance row, delete the old
    /// inventory row, insert the new one. Caller must already hold an
    /// open transaction (spec.md §4.7.1/§4.6 atomic swap/buy).
    pub fn tx_transfer_owner(
        tx: &rusqlite::Transaction,
        instance_id: InstanceId,
        from_user: UserId,
        to_user: UserId,
    ) -> Result<(), ServerError> {
        let updated = tx.execute(
            "UPDATE skin_instances SET owner_id = ?1 WHERE instance_id = ?2 AND owner_id = ?3",
            params![to_user, instance_id, from_user],
        )?;
        if updated == 0 {
            return Err(ServerError::PermissionDenied);
        }
        tx.execute(
            "DELETE FROM inventory WHERE user_id = ?1 AND instance_id = ?2",
            params![from_user, instance_id],
        )?;
        tx.execute(
            "INSERT INTO inventory (user_id, instance_id) VALUES (?1, ?2)",
            params![to_user, instance_id],
        )?;
        Ok(())
    }

    /// Apply the market trade lock: `tradable = false`, reset the lock
    /// clock (spec.md §4.6 List).
    pub fn tx_apply_trade_lock(
        tx: &rusqlite::Transaction,
        instance_id: InstanceId,
        now: i64,
    ) -> Result<(), ServerError> {
        tx.execute(
            "UPDATE skin_instances SET tradable = 0, acquired_at = ?1 WHERE instance_id = ?2",
            params![now, instance_id],
        )?;
        Ok(())
    }

    /// Unlock instances whose 7-day trade lock has expired (spec.md
    /// §4.8 background sweep). Returns the number of rows unlocked.
    pub fn sweep_unlock_expired(&self, now: i64, lock_ttl_secs: i64) -> Result<usize, ServerError> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE skin_instances SET tradable = 1
                 WHERE tradable = 0 AND (?1 - acquired_at) >= ?2",
                params![now, lock_ttl_secs],
            )?;
            Ok(affected)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store_with_user() -> (Store, UserId) {
        let store = Store::open(":memory:").unwrap();
        let user_id = store.create_user("alice", "digest", 100.0, 0).unwrap();
        (store, user_id)
    }

    #[test]
    fn mint_creates_matching_inventory_row() {
        let (store, user_id) = make_store_with_user();
        let (_, def_ids) = store.seed_catalog_for_tests().unwrap();

        let instance_id = store
            .with_transaction(|tx| {
                Store::tx_mint_instance(tx, def_ids[0], Rarity::Consumer, 0.05, 3, false, user_id, 0)
            })
            .unwrap();

        let inv = store.list_inventory(user_id).unwrap();
        assert_eq!(inv.len(), 1);
        assert_eq!(inv[0].instance_id, instance_id);
        assert_eq!(inv[0].owner_id, user_id);
        assert!(inv[0].tradable);
    }

    #[test]
    fn transfer_owner_moves_inventory_row_not_duplicates() {
        let (store, seller) = make_store_with_user();
        let buyer = store.create_user("bob", "digest", 50.0, 0).unwrap();
        let (_, def_ids) = store.seed_catalog_for_tests().unwrap();

        let instance_id = store
            .with_transaction(|tx| {
                Store::tx_mint_instance(tx, def_ids[0], Rarity::Consumer, 0.05, 3, false, seller, 0)
            })
            .unwrap();

        store
            .with_transaction(|tx| Store::tx_transfer_owner(tx, instance_id, seller, buyer))
            .unwrap();

        assert_eq!(store.list_inventory(seller).unwrap().len(), 0);
        let buyer_inv = store.list_inventory(buyer).unwrap();
        assert_eq!(buyer_inv.len(), 1);
        assert_eq!(buyer_inv[0].owner_id, buyer);
    }

    #[test]
    fn sweep_unlock_expired_only_unlocks_after_ttl() {
        let (store, user_id) = make_store_with_user();
        let (_, def_ids) = store.seed_catalog_for_tests().unwrap();
        let instance_id = store
            .with_transaction(|tx| {
                Store::tx_mint_instance(tx, def_ids[0], Rarity::Consumer, 0.05, 3, false, user_id, 0)
            })
            .unwrap();
        store
            .with_transaction(|tx| Store::tx_apply_trade_lock(tx, instance_id, 0))
            .unwrap();

        assert_eq!(store.sweep_unlock_expired(100, 7 * 24 * 3600).unwrap(), 0);
        assert_eq!(
            store
                .sweep_unlock_expired(7 * 24 * 3600, 7 * 24 * 3600)
                .unwrap(),
            1
        );
        assert!(store.get_instance(instance_id).unwrap().unwrap().tradable);
    }
}
