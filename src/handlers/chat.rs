//! Chat persistence hook (spec.md §1: "chat broadcast transport" is out
//! of scope; only the persistence hook is specified).

use crate::error::ServerError;
use crate::state::AppState;

pub fn post(state: &AppState, payload: &[u8], now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    // No session-bound user id is threaded through the chat message
    // shape in spec.md §6; treat the payload as `user_id:text`.
    let (user_id, message) = crate::wire::split_once_colon(text).ok_or(ServerError::InvalidRequest("expected user_id:text"))?;
    let user_id: i64 = user_id.parse().map_err(|_| ServerError::InvalidRequest("bad user_id"))?;

    state.store.post_chat_message(user_id, message, now)?;
    Ok(Vec::new())
}
