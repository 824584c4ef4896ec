//! Market engine: list / buy / delist / search (spec.md §4.6).

use crate::core_types::{InstanceId, ListingId, UserId};
use crate::error::ServerError;
use crate::store::{MarketListingRow, Store};

pub struct MarketService<'a> {
    store: &'a Store,
    fee_rate: f64,
}

impl<'a> MarketService<'a> {
    pub fn new(store: &'a Store, fee_rate: f64) -> Self {
        Self { store, fee_rate }
    }

    /// spec.md §4.6 List: caller must own the instance; applies the
    /// market trade-lock as part of the same transaction.
    pub fn list(&self, seller_id: UserId, instance_id: InstanceId, price: f64, now: i64) -> Result<ListingId, ServerError> {
        self.store.with_transaction(|tx| {
            let instance = Store::tx_get_instance(tx, instance_id)?;
            if instance.owner_id != seller_id {
                return Err(ServerError::PermissionDenied);
            }
            Store::tx_apply_trade_lock(tx, instance_id, now)?;
            Store::tx_create_listing(tx, seller_id, instance_id, price, now)
        })
    }

    /// spec.md §4.6 Buy: atomic debit/credit + ownership transfer +
    /// listing state change, fee applied to the seller's payout.
    pub fn buy(&self, buyer_id: UserId, listing_id: ListingId, now: i64) -> Result<(), ServerError> {
        self.store.with_transaction(|tx| {
            let listing = Store::tx_get_listing(tx, listing_id)?;
            if listing.sold {
                return Err(ServerError::InvalidRequest("listing already sold"));
            }
            if listing.seller_id == buyer_id {
                return Err(ServerError::PermissionDenied);
            }

            let buyer = Store::tx_get_user(tx, buyer_id)?;
            if buyer.balance < listing.price {
                return Err(ServerError::InsufficientFunds);
            }
            let seller = Store::tx_get_user(tx, listing.seller_id)?;

            let fee = listing.price * self.fee_rate;
            let payout = listing.price - fee;

            Store::tx_set_balance(tx, buyer_id, buyer.balance - listing.price)?;
            Store::tx_set_balance(tx, listing.seller_id, seller.balance + payout)?;
            Store::tx_mark_sold(tx, listing_id)?;
            Store::tx_transfer_owner(tx, listing.instance_id, listing.seller_id, buyer_id)?;

            Store::tx_record_transaction(tx, buyer_id, "market_buy", -listing.price, Some(&format!("listing_id={listing_id}")), now)?;
            Store::tx_record_transaction(tx, listing.seller_id, "market_sell", payout, Some(&format!("listing_id={listing_id}")), now)?;
            Store::tx_record_price_history(tx, listing.instance_id, false, listing.price, now)?;
            Store::tx_record_price_history(tx, listing.instance_id, true, listing.price, now)?;

            Ok(())
        })
    }

    /// spec.md §4.6 Delist: only while unsold.
    pub fn delist(&self, seller_id: UserId, listing_id: ListingId) -> Result<(), ServerError> {
        self.store.with_transaction(|tx| {
            let listing = Store::tx_get_listing(tx, listing_id)?;
            if listing.seller_id != seller_id {
                return Err(ServerError::PermissionDenied);
            }
            Store::tx_delete_listing(tx, listing_id)
        })
    }

    pub fn list_active(&self) -> Result<Vec<MarketListingRow>, ServerError> {
        self.store.list_active_listings()
    }

    pub fn search(&self, term: &str) -> Result<Vec<MarketListingRow>, ServerError> {
        self.store.search_listings_by_name(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Rarity;

    fn seeded_seller_with_item(store: &Store) -> (UserId, InstanceId) {
        let seller = store.create_user("seller", "d", 50.0, 0).unwrap();
        let (_, def_ids) = store.seed_catalog_for_tests().unwrap();
        let instance_id = store
            .with_transaction(|tx| {
                Store::tx_mint_instance(tx, def_ids[0], Rarity::Consumer, 0.1, 1, false, seller, 0)
            })
            .unwrap();
        (seller, instance_id)
    }

    #[test]
    fn buy_applies_fee_and_transfers_ownership() {
        let store = Store::open(":memory:").unwrap();
        let (seller, instance_id) = seeded_seller_with_item(&store);
        let buyer = store.create_user("buyer", "d", 200.0, 0).unwrap();

        let market = MarketService::new(&store, 0.15);
        let listing_id = market.list(seller, instance_id, 100.0, 0).unwrap();
        market.buy(buyer, listing_id, 1).unwrap();

        assert_eq!(store.get_user(buyer).unwrap().unwrap().balance, 100.0);
        assert_eq!(store.get_user(seller).unwrap().unwrap().balance, 50.0 + 85.0);
        assert_eq!(store.get_instance(instance_id).unwrap().unwrap().owner_id, buyer);
        assert!(store.get_listing(listing_id).unwrap().unwrap().sold);
    }

    #[test]
    fn buy_rejects_insufficient_funds_without_mutating_state() {
        let store = Store::open(":memory:").unwrap();
        let (seller, instance_id) = seeded_seller_with_item(&store);
        let buyer = store.create_user("buyer", "d", 10.0, 0).unwrap();
        let market = MarketService::new(&store, 0.15);
        let listing_id = market.list(seller, instance_id, 100.0, 0).unwrap();

        assert!(matches!(market.buy(buyer, listing_id, 1), Err(ServerError::InsufficientFunds)));
        assert_eq!(store.get_user(buyer).unwrap().unwrap().balance, 10.0);
        assert!(!store.get_listing(listing_id).unwrap().unwrap().sold);
    }

    #[test]
    fn list_by_non_owner_is_rejected() {
        let store = Store::open(":memory:").unwrap();
        let (_seller, instance_id) = seeded_seller_with_item(&store);
        let other = store.create_user("other", "d", 0.0, 0).unwrap();
        let market = MarketService::new(&store, 0.15);

        assert!(matches!(
            market.list(other, instance_id, 10.0, 0),
            Err(ServerError::PermissionDenied)
        ));
    }

    #[test]
    fn delist_then_buy_fails_not_found() {
        let store = Store::open(":memory:").unwrap();
        let (seller, instance_id) = seeded_seller_with_item(&store);
        let market = MarketService::new(&store, 0.15);
        let listing_id = market.list(seller, instance_id, 10.0, 0).unwrap();
        market.delist(seller, listing_id).unwrap();

        let buyer = store.create_user("buyer", "d", 100.0, 0).unwrap();
        assert!(market.buy(buyer, listing_id, 1).is_err());
    }
}
