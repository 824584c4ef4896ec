//! Trade handlers (spec.md §4.7, §6).
//!
//! Send request payload: `from_user:to_user:offered_ids:offered_cash:requested_ids:requested_cash`,
//! where an ids field is a comma-separated (possibly empty) list of
//! instance ids — the same scalar convention spec.md uses elsewhere,
//! extended for this one variable-length field (spec.md §9: "model as
//! variable-length lists with an explicit count at the boundary").

use crate::core_types::InstanceId;
use crate::domain::{hooks, trade::TradeService};
use crate::error::ServerError;
use crate::state::AppState;
use crate::wire;

fn parse_ids(field: &str) -> Result<Vec<InstanceId>, ServerError> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split(',')
        .map(|s| s.parse().map_err(|_| ServerError::InvalidRequest("non-numeric instance id")))
        .collect()
}

pub fn send(state: &AppState, payload: &[u8], now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let fields: Vec<&str> = text.split(':').collect();
    let [from_user, to_user, offered_ids, offered_cash, requested_ids, requested_cash] = fields[..] else {
        return Err(ServerError::InvalidRequest(
            "expected from_user:to_user:offered_ids:offered_cash:requested_ids:requested_cash",
        ));
    };

    let from_user: i64 = from_user.parse().map_err(|_| ServerError::InvalidRequest("bad from_user"))?;
    let to_user: i64 = to_user.parse().map_err(|_| ServerError::InvalidRequest("bad to_user"))?;
    let offered_cash: f64 = offered_cash.parse().map_err(|_| ServerError::InvalidRequest("bad offered_cash"))?;
    let requested_cash: f64 = requested_cash.parse().map_err(|_| ServerError::InvalidRequest("bad requested_cash"))?;
    let offered_items = parse_ids(offered_ids)?;
    let requested_items = parse_ids(requested_ids)?;

    let trades = TradeService::new(&state.store, state.config.trade_ttl_secs);
    let trade_id = trades.send_offer(from_user, to_user, &offered_items, offered_cash, &requested_items, requested_cash, now)?;

    let offer = state.store.get_trade(trade_id)?.ok_or(ServerError::ItemNotFound)?;
    let items = trades.trade_items(trade_id)?;
    Ok(wire::encode_trade(&offer, &items).into_bytes())
}

pub fn accept(state: &AppState, payload: &[u8], now: i64) -> Result<Vec<u8>, ServerError> {
    let (user_id, trade_id) = parse_two_ids(payload)?;
    let trades = TradeService::new(&state.store, state.config.trade_ttl_secs);
    trades.accept(user_id, trade_id, now)?;

    let offer = state.store.get_trade(trade_id)?.ok_or(ServerError::ItemNotFound)?;
    hooks::on_trade_accepted(&state.store, offer.from_user, offer.to_user)?;
    Ok(Vec::new())
}

pub fn decline(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let (user_id, trade_id) = parse_two_ids(payload)?;
    let trades = TradeService::new(&state.store, state.config.trade_ttl_secs);
    trades.decline(user_id, trade_id)?;
    Ok(Vec::new())
}

pub fn cancel(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let (user_id, trade_id) = parse_two_ids(payload)?;
    let trades = TradeService::new(&state.store, state.config.trade_ttl_secs);
    trades.cancel(user_id, trade_id)?;
    Ok(Vec::new())
}

pub fn list(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let user_id: i64 = text.trim().parse().map_err(|_| ServerError::InvalidRequest("bad user_id"))?;

    let trades = TradeService::new(&state.store, state.config.trade_ttl_secs);
    let offers = trades.list_pending_for(user_id)?;
    let rendered: Vec<String> = offers
        .iter()
        .map(|offer| {
            let items = trades.trade_items(offer.trade_id).unwrap_or_default();
            wire::encode_trade(offer, &items)
        })
        .collect();
    Ok(rendered.join("\n").into_bytes())
}

fn parse_two_ids(payload: &[u8]) -> Result<(i64, i64), ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let (a, b) = wire::split_once_colon(text).ok_or(ServerError::InvalidRequest("expected user_id:trade_id"))?;
    let a: i64 = a.parse().map_err(|_| ServerError::InvalidRequest("non-numeric id"))?;
    let b: i64 = b.parse().map_err(|_| ServerError::InvalidRequest("non-numeric id"))?;
    Ok((a, b))
}
