//! Text encoding for response payloads. spec.md §6 pins the plain
//! scalar request shapes (`username:password`, `user_id:listing_id`,
//! ...) as colon-separated UTF-8; it leaves the wire layout of the
//! *struct* and *array* responses (MarketListing, TradeOffer, User,
//! Skin, Inventory, Case) unspecified beyond naming the fields. This
//! module picks one concrete, consistent encoding — colon-joined fields
//! per record, newline-joined records for arrays — extending the
//! scalar convention spec.md already uses rather than inventing an
//! unrelated binary struct layout. Recorded as an Open Question
//! decision in DESIGN.md.

use crate::core_types::{InstanceId, Rarity, WearBand};
use crate::domain::case_opening::SkinView;
use crate::store::{CaseRow, MarketListingRow, TradeItemRow, TradeOfferRow, TradeSide, UserRow};

pub fn split_once_colon(payload: &str) -> Option<(&str, &str)> {
    payload.split_once(':')
}

pub fn encode_user(user: &UserRow) -> String {
    format!(
        "{}:{}:{:.2}:{}:{}:{}",
        user.user_id,
        user.username,
        user.balance,
        user.created_at,
        user.last_login.map(|t| t.to_string()).unwrap_or_default(),
        user.banned as u8
    )
}

pub fn encode_skin(skin: &SkinView) -> String {
    format!(
        "{}:{}:{}:{}:{:.10}:{}:{}:{}:{}:{:.2}",
        skin.instance_id,
        skin.definition_id,
        skin.name,
        skin.rarity.as_str(),
        skin.wear,
        skin.wear_band.as_str(),
        skin.pattern_seed,
        skin.stattrak as u8,
        skin.owner_id,
        skin.current_price
    )
}

/// Encode a persisted instance row alongside its definition name and
/// derived current price — the shape returned by Skin-detail lookups
/// for instances that weren't just minted.
pub fn encode_instance_view(
    instance_id: InstanceId,
    definition_name: &str,
    rarity: Rarity,
    wear: f64,
    pattern_seed: i64,
    stattrak: bool,
    owner_id: i64,
    base_price: f64,
) -> String {
    let wear_band = WearBand::from_wear(wear);
    let current_price = base_price * rarity.multiplier() * wear_band.multiplier();
    format!(
        "{instance_id}:{definition_name}:{}:{wear:.10}:{}:{pattern_seed}:{}:{owner_id}:{current_price:.2}",
        rarity.as_str(),
        wear_band.as_str(),
        stattrak as u8,
    )
}

pub fn encode_listing(listing: &MarketListingRow) -> String {
    format!(
        "{}:{}:{}:{:.2}:{}:{}",
        listing.listing_id, listing.seller_id, listing.instance_id, listing.price, listing.listed_at, listing.sold as u8
    )
}

pub fn encode_listings(listings: &[MarketListingRow]) -> String {
    listings.iter().map(encode_listing).collect::<Vec<_>>().join("\n")
}

pub fn encode_case(case: &CaseRow) -> String {
    format!("{}:{}:{:.2}", case.case_id, case.name, case.price)
}

pub fn encode_cases(cases: &[CaseRow]) -> String {
    cases.iter().map(encode_case).collect::<Vec<_>>().join("\n")
}

pub fn encode_trade(trade: &TradeOfferRow, items: &[TradeItemRow]) -> String {
    let offered = items
        .iter()
        .filter(|i| i.side == TradeSide::Offered)
        .map(|i| i.instance_id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let requested = items
        .iter()
        .filter(|i| i.side == TradeSide::Requested)
        .map(|i| i.instance_id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}:{}:{}:{}:{:.2}:{}:{:.2}:{:?}:{}:{}",
        trade.trade_id,
        trade.from_user,
        trade.to_user,
        offered,
        trade.offered_cash,
        requested,
        trade.requested_cash,
        trade.status,
        trade.created_at,
        trade.expires_at
    )
}

pub fn encode_inventory(user_id: i64, instance_ids: &[InstanceId]) -> String {
    let ids = instance_ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",");
    format!("{}:{}:{}", user_id, ids, instance_ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_once_colon_splits_on_first_only() {
        assert_eq!(split_once_colon("a:b:c"), Some(("a", "b:c")));
        assert_eq!(split_once_colon("noop"), None);
    }

    #[test]
    fn encode_inventory_counts_match_ids() {
        let s = encode_inventory(1, &[10, 20, 30]);
        assert_eq!(s, "1:10,20,30:3");
    }
}
