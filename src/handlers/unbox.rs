//! Case listing + case opening handlers (spec.md §4.5, §6).

use crate::domain::case_opening::CaseOpeningService;
use crate::domain::hooks;
use crate::error::ServerError;
use crate::state::AppState;
use crate::wire;

pub fn unbox(state: &AppState, payload: &[u8], now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let (user_id, case_id) = wire::split_once_colon(text).ok_or(ServerError::InvalidRequest("expected user_id:case_id"))?;
    let user_id: i64 = user_id.parse().map_err(|_| ServerError::InvalidRequest("bad user_id"))?;
    let case_id: i64 = case_id.parse().map_err(|_| ServerError::InvalidRequest("bad case_id"))?;

    let case = state.store.get_case(case_id)?.ok_or(ServerError::ItemNotFound)?;
    let cost = case.price + state.config.key_price;

    let service = CaseOpeningService::new(&state.store, state.config.key_price);
    let skin = service.open_case(user_id, case_id, now)?;

    let broadcast = hooks::on_case_opened(&state.store, user_id, &skin, cost, now)?;
    if broadcast {
        tracing::info!(user_id, rarity = skin.rarity.as_str(), "rare case-open broadcast");
    }

    Ok(wire::encode_skin(&skin).into_bytes())
}

pub fn list_cases(state: &AppState, _payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let cases = state.store.list_cases()?;
    Ok(wire::encode_cases(&cases).into_bytes())
}
