//! Trade engine: send / accept / decline / cancel / list / reaper
//! (spec.md §4.7), atomic swap contract (§4.7.1).

use crate::core_types::{InstanceId, TradeId, UserId};
use crate::error::ServerError;
use crate::store::{Store, TradeItemRow, TradeOfferRow, TradeSide, TradeStatus};

pub struct TradeService<'a> {
    store: &'a Store,
    trade_ttl_secs: i64,
}

impl<'a> TradeService<'a> {
    pub fn new(store: &'a Store, trade_ttl_secs: i64) -> Self {
        Self { store, trade_ttl_secs }
    }

    /// spec.md §4.7 Send offer.
    pub fn send_offer(
        &self,
        from_user: UserId,
        to_user: UserId,
        offered_items: &[InstanceId],
        offered_cash: f64,
        requested_items: &[InstanceId],
        requested_cash: f64,
        now: i64,
    ) -> Result<TradeId, ServerError> {
        if from_user == to_user {
            return Err(ServerError::InvalidTrade("cannot trade with yourself"));
        }
        if offered_items.is_empty() && requested_items.is_empty() && offered_cash == 0.0 && requested_cash == 0.0 {
            return Err(ServerError::InvalidTrade("at least one side must be non-empty"));
        }

        self.store.with_transaction(|tx| {
            for &instance_id in offered_items {
                let instance = Store::tx_get_instance(tx, instance_id)?;
                if instance.owner_id != from_user {
                    return Err(ServerError::InvalidTrade("offered item not owned by sender"));
                }
            }
            for &instance_id in requested_items {
                let instance = Store::tx_get_instance(tx, instance_id)?;
                if instance.owner_id != to_user {
                    return Err(ServerError::InvalidTrade("requested item not owned by recipient"));
                }
            }

            let sender = Store::tx_get_user(tx, from_user)?;
            if sender.balance < offered_cash {
                return Err(ServerError::InsufficientFunds);
            }
            let recipient = Store::tx_get_user(tx, to_user)?;
            if recipient.balance < requested_cash {
                return Err(ServerError::InsufficientFunds);
            }

            Store::tx_create_trade(
                tx,
                from_user,
                to_user,
                offered_cash,
                requested_cash,
                offered_items,
                requested_items,
                now,
                now + self.trade_ttl_secs,
            )
        })
    }

    /// spec.md §4.7 Accept + §4.7.1 atomic swap.
    pub fn accept(&self, to_user: UserId, trade_id: TradeId, now: i64) -> Result<(), ServerError> {
        self.store.with_transaction(|tx| {
            let trade = Store::tx_get_trade(tx, trade_id)?;
            if trade.to_user != to_user {
                return Err(ServerError::PermissionDenied);
            }
            if trade.status != TradeStatus::Pending {
                return Err(ServerError::InvalidTrade("trade is not pending"));
            }
            if now > trade.expires_at {
                Store::tx_set_trade_status(tx, trade_id, TradeStatus::Expired)?;
                return Err(ServerError::TradeExpired);
            }

            let items = Store::tx_get_trade_items(tx, trade_id)?;
            for item in &items {
                match item.side {
                    TradeSide::Offered => {
                        Store::tx_transfer_owner(tx, item.instance_id, trade.from_user, trade.to_user)?
                    }
                    TradeSide::Requested => {
                        Store::tx_transfer_owner(tx, item.instance_id, trade.to_user, trade.from_user)?
                    }
                }
            }

            if trade.offered_cash > 0.0 {
                transfer_cash(tx, trade.from_user, trade.to_user, trade.offered_cash)?;
            }
            if trade.requested_cash > 0.0 {
                transfer_cash(tx, trade.to_user, trade.from_user, trade.requested_cash)?;
            }

            Store::tx_set_trade_status(tx, trade_id, TradeStatus::Accepted)
        })
    }

    /// spec.md §4.7 Decline: only `to_user`, must be PENDING.
    pub fn decline(&self, to_user: UserId, trade_id: TradeId) -> Result<(), ServerError> {
        self.transition_pending(to_user, trade_id, |t| t.to_user, TradeStatus::Declined)
    }

    /// spec.md §4.7 Cancel: only `from_user`, must be PENDING.
    pub fn cancel(&self, from_user: UserId, trade_id: TradeId) -> Result<(), ServerError> {
        self.transition_pending(from_user, trade_id, |t| t.from_user, TradeStatus::Cancelled)
    }

    fn transition_pending(
        &self,
        caller: UserId,
        trade_id: TradeId,
        required_side: impl Fn(&TradeOfferRow) -> UserId,
        new_status: TradeStatus,
    ) -> Result<(), ServerError> {
        self.store.with_transaction(|tx| {
            let trade = Store::tx_get_trade(tx, trade_id)?;
            if required_side(&trade) != caller {
                return Err(ServerError::PermissionDenied);
            }
            if trade.status != TradeStatus::Pending {
                return Err(ServerError::InvalidTrade("trade is not pending"));
            }
            Store::tx_set_trade_status(tx, trade_id, new_status)
        })
    }

    /// spec.md §4.7 List active.
    pub fn list_pending_for(&self, user_id: UserId) -> Result<Vec<TradeOfferRow>, ServerError> {
        self.store.list_pending_trades_for(user_id)
    }

    pub fn trade_items(&self, trade_id: TradeId) -> Result<Vec<TradeItemRow>, ServerError> {
        self.store.get_trade_items(trade_id)
    }

    /// spec.md §4.7 Reaper: flips PENDING past `expires_at` to EXPIRED.
    pub fn reap_expired(&self, now: i64) -> Result<usize, ServerError> {
        self.store.sweep_expire_trades(now)
    }
}

fn transfer_cash(tx: &rusqlite::Transaction, from: UserId, to: UserId, amount: f64) -> Result<(), ServerError> {
    let sender = Store::tx_get_user(tx, from)?;
    if sender.balance < amount {
        return Err(ServerError::InsufficientFunds);
    }
    let recipient = Store::tx_get_user(tx, to)?;
    Store::tx_set_balance(tx, from, sender.balance - amount)?;
    Store::tx_set_balance(tx, to, recipient.balance + amount)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Rarity;

    fn seed_two_users_with_items(store: &Store, a_balance: f64, b_balance: f64) -> (UserId, UserId, InstanceId, InstanceId) {
        let a = store.create_user("a", "d", a_balance, 0).unwrap();
        let b = store.create_user("b", "d", b_balance, 0).unwrap();
        let (_, def_ids) = store.seed_catalog_for_tests().unwrap();
        let a_item = store
            .with_transaction(|tx| Store::tx_mint_instance(tx, def_ids[0], Rarity::Consumer, 0.1, 1, false, a, 0))
            .unwrap();
        let b_item = store
            .with_transaction(|tx| Store::tx_mint_instance(tx, def_ids[1], Rarity::Industrial, 0.1, 1, false, b, 0))
            .unwrap();
        (a, b, a_item, b_item)
    }

    #[test]
    fn accept_swaps_items_and_cash_both_ways() {
        let store = Store::open(":memory:").unwrap();
        let (a, b, a_item, b_item) = seed_two_users_with_items(&store, 100.0, 200.0);
        let trades = TradeService::new(&store, 900);

        let trade_id = trades.send_offer(a, b, &[a_item], 30.0, &[b_item], 10.0, 0).unwrap();
        trades.accept(b, trade_id, 1).unwrap();

        assert_eq!(store.get_user(a).unwrap().unwrap().balance, 80.0);
        assert_eq!(store.get_user(b).unwrap().unwrap().balance, 220.0);
        assert_eq!(store.get_instance(a_item).unwrap().unwrap().owner_id, b);
        assert_eq!(store.get_instance(b_item).unwrap().unwrap().owner_id, a);
        assert_eq!(store.get_trade(trade_id).unwrap().unwrap().status, TradeStatus::Accepted);
    }

    #[test]
    fn accept_past_expiry_flips_to_expired_and_moves_nothing() {
        let store = Store::open(":memory:").unwrap();
        let (a, b, a_item, b_item) = seed_two_users_with_items(&store, 100.0, 200.0);
        let trades = TradeService::new(&store, 900);
        let trade_id = trades.send_offer(a, b, &[a_item], 0.0, &[b_item], 0.0, 0).unwrap();

        let result = trades.accept(b, trade_id, 901);
        assert!(matches!(result, Err(ServerError::TradeExpired)));
        assert_eq!(store.get_trade(trade_id).unwrap().unwrap().status, TradeStatus::Expired);
        assert_eq!(store.get_instance(a_item).unwrap().unwrap().owner_id, a);
    }

    #[test]
    fn cancel_then_accept_is_rejected() {
        let store = Store::open(":memory:").unwrap();
        let (a, b, a_item, b_item) = seed_two_users_with_items(&store, 100.0, 200.0);
        let trades = TradeService::new(&store, 900);
        let trade_id = trades.send_offer(a, b, &[a_item], 0.0, &[b_item], 0.0, 0).unwrap();

        trades.cancel(a, trade_id).unwrap();
        assert_eq!(store.get_trade(trade_id).unwrap().unwrap().status, TradeStatus::Cancelled);
        assert!(trades.accept(b, trade_id, 1).is_err());
    }

    #[test]
    fn send_offer_rejects_item_not_owned_by_sender() {
        let store = Store::open(":memory:").unwrap();
        let (a, b, _a_item, b_item) = seed_two_users_with_items(&store, 100.0, 200.0);
        let trades = TradeService::new(&store, 900);

        let result = trades.send_offer(a, b, &[b_item], 0.0, &[], 0.0, 0);
        assert!(result.is_err());
    }
}
