//! Register / login / logout (spec.md §4.4, §6).

use chrono::{DateTime, Duration, Utc};

use crate::auth::AuthService;
use crate::domain::hooks;
use crate::error::ServerError;
use crate::state::AppState;
use crate::wire;

/// Today's and yesterday's UTC calendar date, `YYYY-MM-DD`, for the
/// login-streak hook.
fn today_and_yesterday(now: i64) -> (String, String) {
    let today: DateTime<Utc> = DateTime::from_timestamp(now, 0).unwrap_or_else(Utc::now);
    let yesterday = today - Duration::days(1);
    (today.format("%Y-%m-%d").to_string(), yesterday.format("%Y-%m-%d").to_string())
}

pub fn register(state: &AppState, payload: &[u8], now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let (username, password) = wire::split_once_colon(text).ok_or(ServerError::InvalidRequest("expected username:password"))?;

    let auth = AuthService::new(&state.store, &state.sessions, state.hasher.as_ref(), state.config.starting_balance);
    let user_id = auth.register(username, password, now)?;
    Ok((user_id as u32).to_le_bytes().to_vec())
}

pub fn login(state: &AppState, payload: &[u8], now: i64) -> Result<Vec<u8>, ServerError> {
    let text = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let (username, password) = wire::split_once_colon(text).ok_or(ServerError::InvalidRequest("expected username:password"))?;

    let auth = AuthService::new(&state.store, &state.sessions, state.hasher.as_ref(), state.config.starting_balance);
    let (token, user_id) = auth.login(username, password, now)?;

    let (today, yesterday) = today_and_yesterday(now);
    if let Err(e) = hooks::on_login(&state.store, user_id, &today, &yesterday) {
        tracing::warn!(error = %e, user_id, "login-streak hook failed");
    }

    Ok(format!("{token}:{user_id}").into_bytes())
}

pub fn logout(state: &AppState, payload: &[u8], _now: i64) -> Result<Vec<u8>, ServerError> {
    let token = std::str::from_utf8(payload).map_err(|_| ServerError::InvalidRequest("payload not utf-8"))?;
    let auth = AuthService::new(&state.store, &state.sessions, state.hasher.as_ref(), state.config.starting_balance);
    auth.logout(token);
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn test_state() -> AppState {
        let mut config = ServerConfig::default();
        config.db_path = ":memory:".to_string();
        AppState::new(config).unwrap()
    }

    const DAY: i64 = 86_400;

    #[test]
    fn login_fires_streak_hook_without_failing_the_login() {
        let state = test_state();
        register(&state, b"alice:password", 0).unwrap();

        login(&state, b"alice:password", DAY).unwrap();
        // Logging in again the same day must not panic or error even
        // though the streak row already advanced past today.
        login(&state, b"alice:password", DAY + 10).unwrap();
    }

    #[test]
    fn register_then_login_round_trips() {
        let state = test_state();
        let id_bytes = register(&state, b"bob:secretpw", 0).unwrap();
        let user_id = u32::from_le_bytes(id_bytes.try_into().unwrap());
        assert_eq!(user_id, 1);

        let response = login(&state, b"bob:secretpw", 0).unwrap();
        let text = std::str::from_utf8(&response).unwrap();
        let (_, uid) = wire::split_once_colon(text).unwrap();
        assert_eq!(uid, "1");
    }
}
