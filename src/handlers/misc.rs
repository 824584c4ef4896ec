//! Heartbeat (spec.md §6).

use crate::error::ServerError;
use crate::state::AppState;

pub fn heartbeat(_state: &AppState, _payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    Ok(Vec::new())
}
