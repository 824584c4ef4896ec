//! Inventory / profile / skin-detail / user-search handlers (spec.md §6).

use crate::core_types::WearBand;
use crate::error::ServerError;
use crate::state::AppState;
use crate::wire;

pub fn get_inventory(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let user_id = parse_id(payload)?;
    let instances = state.store.list_inventory(user_id)?;
    let ids: Vec<_> = instances.iter().map(|i| i.instance_id).collect();
    Ok(wire::encode_inventory(user_id, &ids).into_bytes())
}

pub fn get_profile(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let user_id = parse_id(payload)?;
    let user = state.store.get_user(user_id)?.ok_or(ServerError::ItemNotFound)?;
    Ok(wire::encode_user(&user).into_bytes())
}

pub fn get_skin_detail(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let instance_id = parse_id(payload)?;
    let instance = state.store.get_instance(instance_id)?.ok_or(ServerError::ItemNotFound)?;
    let definition = state.store.get_definition(instance.definition_id)?.ok_or(ServerError::ItemNotFound)?;
    let wear_band = WearBand::from_wear(instance.wear);
    let current_price = definition.base_price * instance.rarity.multiplier() * wear_band.multiplier();
    Ok(format!(
        "{}:{}:{}:{:.10}:{}:{}:{}:{}:{:.2}",
        instance.instance_id,
        definition.name,
        instance.rarity.as_str(),
        instance.wear,
        wear_band.as_str(),
        instance.pattern_seed,
        instance.stattrak as u8,
        instance.owner_id,
        current_price
    )
    .into_bytes())
}

pub fn search_user(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let username = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let user = state
        .store
        .get_user_by_username(username)?
        .ok_or(ServerError::ItemNotFound)?;
    Ok(wire::encode_user(&user).into_bytes())
}

fn parse_id(payload: &[u8]) -> Result<i64, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    text.trim().parse().map_err(|_| ServerError::InvalidRequest("expected a numeric id"))
}
