//! Market listings. spec.md §3 (MarketListing), §4.6 (list/buy/delist/search).

use rusqlite::params;

use crate::core_types::{InstanceId, ListingId, UserId};
use crate::error::ServerError;

use super::Store;

#[derive(Debug, Clone)]
pub struct MarketListingRow {
    pub listing_id: ListingId,
    pub seller_id: UserId,
    pub instance_id: InstanceId,
    pub price: f64,
    pub listed_at: i64,
    pub sold: bool,
}

fn row_to_listing(row: &rusqlite::Row) -> rusqlite::Result<MarketListingRow> {
    Ok(MarketListingRow {
        listing_id: row.get(0)?,
        seller_id: row.get(1)?,
        instance_id: row.get(2)?,
        price: row.get(3)?,
        listed_at: row.get(4)?,
        sold: row.get::<_, i64>(5)? != 0,
    })
}

const SELECT_LISTING: &str =
    "SELECT listing_id, seller_id, instance_id, price, listed_at, sold FROM market_listings";

impl Store {
    pub fn list_active_listings(&self) -> Result<Vec<MarketListingRow>, ServerError> {
        self.with_conn(|conn| {
            let sql = format!("{SELECT_LISTING} WHERE sold = 0");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_listing)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_listing(&self, listing_id: ListingId) -> Result<Option<MarketListingRow>, ServerError> {
        self.with_conn(|conn| {
            use rusqlite::OptionalExtension;
            let sql = format!("{SELECT_LISTING} WHERE listing_id = ?1");
            conn.query_row(&sql, params![listing_id], row_to_listing)
                .optional()
                .map_err(ServerError::from)
        })
    }

    /// Substring match across the joined definition name, active
    /// listings only (spec.md §4.6 "Search by name").
    pub fn search_listings_by_name(&self, term: &str) -> Result<Vec<MarketListingRow>, ServerError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.listing_id, l.seller_id, l.instance_id, l.price, l.listed_at, l.sold
                 FROM market_listings l
                 JOIN skin_instances i ON i.instance_id = l.instance_id
                 JOIN skin_definitions d ON d.definition_id = i.definition_id
                 WHERE l.sold = 0 AND d.name LIKE ?1",
            )?;
            let pattern = format!("%{term}%");
            let rows = stmt
                .query_map(params![pattern], row_to_listing)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Create a listing (not sold). Caller applies the trade lock on the
    /// instance separately inside the same transaction.
    pub fn tx_create_listing(
        tx: &rusqlite::Transaction,
        seller_id: UserId,
        instance_id: InstanceId,
        price: f64,
        now: i64,
    ) -> Result<ListingId, ServerError> {
        tx.execute(
            "INSERT INTO market_listings (seller_id, instance_id, price, listed_at, sold) VALUES (?1, ?2, ?3, ?4, 0)",
            params![seller_id, instance_id, price, now],
        )?;
        Ok(tx.last_insert_rowid())
    }

    pub fn tx_get_listing(
        tx: &rusqlite::Transaction,
        listing_id: ListingId,
    ) -> Result<MarketListingRow, ServerError> {
        use rusqlite::OptionalExtension;
        let sql = format!("{SELECT_LISTING} WHERE listing_id = ?1");
        tx.query_row(&sql, params![listing_id], row_to_listing)
            .optional()?
            .ok_or(ServerError::ItemNotFound)
    }

    pub fn tx_mark_sold(tx: &rusqlite::Transaction, listing_id: ListingId) -> Result<(), ServerError> {
        tx.execute(
            "UPDATE market_listings SET sold = 1 WHERE listing_id = ?1",
            params![listing_id],
        )?;
        Ok(())
    }

    /// Remove a listing row outright (spec.md §4.6 Delist — only while
    /// `sold = false`; caller checks that before calling).
    pub fn tx_delete_listing(tx: &rusqlite::Transaction, listing_id: ListingId) -> Result<(), ServerError> {
        let deleted = tx.execute(
            "DELETE FROM market_listings WHERE listing_id = ?1 AND sold = 0",
            params![listing_id],
        )?;
        if deleted == 0 {
            return Err(ServerError::InvalidRequest("listing already sold or missing"));
        }
        Ok(())
    }
}
