//! Market handlers (spec.md §4.6, §6).

use crate::domain::market::MarketService;
use crate::error::ServerError;
use crate::state::AppState;
use crate::wire;

pub fn get_listings(state: &AppState, _payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let market = MarketService::new(&state.store, state.config.market_fee_rate);
    let listings = market.list_active()?;
    Ok(wire::encode_listings(&listings).into_bytes())
}

pub fn buy(state: &AppState, payload: &[u8], now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let (user_id, listing_id) = parse_two_ids(text)?;

    let market = MarketService::new(&state.store, state.config.market_fee_rate);
    market.buy(user_id, listing_id, now)?;
    Ok(Vec::new())
}

pub fn sell(state: &AppState, payload: &[u8], now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let mut parts = text.split(':');
    let user_id: i64 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(ServerError::InvalidRequest("expected user_id:instance_id:price"))?;
    let instance_id: i64 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(ServerError::InvalidRequest("expected user_id:instance_id:price"))?;
    let price: f64 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(ServerError::InvalidRequest("expected user_id:instance_id:price"))?;

    let market = MarketService::new(&state.store, state.config.market_fee_rate);
    let listing_id = market.list(user_id, instance_id, price, now)?;
    Ok((listing_id as u64).to_le_bytes().to_vec())
}

pub fn delist(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let (user_id, listing_id) = parse_two_ids(text)?;

    let market = MarketService::new(&state.store, state.config.market_fee_rate);
    market.delist(user_id, listing_id)?;
    Ok(Vec::new())
}

pub fn search(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let term = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let market = MarketService::new(&state.store, state.config.market_fee_rate);
    let listings = market.search(term)?;
    Ok(wire::encode_listings(&listings).into_bytes())
}

fn parse_two_ids(text: &str) -> Result<(i64, i64), ServerError> {
    let (a, b) = wire::split_once_colon(text).ok_or(ServerError::InvalidRequest("expected a:b"))?;
    let a: i64 = a.parse().map_err(|_| ServerError::InvalidRequest("non-numeric id"))?;
    let b: i64 = b.parse().map_err(|_| ServerError::InvalidRequest("non-numeric id"))?;
    Ok((a, b))
}
