//! Message-type routing + uniform ERROR response shape (spec.md §4.3).

use crate::error::ServerError;
use crate::handlers;
use crate::protocol::{Frame, MsgType};
use crate::state::AppState;

/// Dispatch one request frame to its handler and build the response
/// frame. Framing errors are handled by the caller (connection close,
/// not a dispatch-level concern); everything that reaches here gets
/// exactly one response frame, per spec.md §4.3.
pub fn dispatch(state: &AppState, request: &Frame, now: i64) -> Frame {
    let Some(msg_type) = MsgType::from_u16(request.msg_type) else {
        return error_frame(request.msg_type, request.sequence_num, ServerError::InvalidRequest("unknown message type"));
    };

    let result = route(state, msg_type, &request.payload, now);
    match result {
        Ok((response_type, payload)) => Frame::new(response_type.as_u16(), request.sequence_num, payload),
        Err(e) => error_frame(request.msg_type, request.sequence_num, e),
    }
}

fn route(state: &AppState, msg_type: MsgType, payload: &[u8], now: i64) -> Result<(MsgType, Vec<u8>), ServerError> {
    use MsgType::*;
    match msg_type {
        Register => handlers::auth::register(state, payload, now).map(|p| (RegisterOk, p)),
        Login => handlers::auth::login(state, payload, now).map(|p| (LoginOk, p)),
        Logout => handlers::auth::logout(state, payload, now).map(|p| (Logout, p)),

        MarketGetListings => handlers::market::get_listings(state, payload, now).map(|p| (MarketListings, p)),
        MarketBuy => handlers::market::buy(state, payload, now).map(|p| (MarketBuy, p)),
        MarketSell => handlers::market::sell(state, payload, now).map(|p| (MarketSell, p)),
        MarketDelist => handlers::market::delist(state, payload, now).map(|p| (MarketDelist, p)),
        MarketSearch => handlers::market::search(state, payload, now).map(|p| (MarketListings, p)),

        TradeSend => handlers::trade::send(state, payload, now).map(|p| (TradeNotify, p)),
        TradeAccept => handlers::trade::accept(state, payload, now).map(|p| (TradeCompleted, p)),
        TradeDecline => handlers::trade::decline(state, payload, now).map(|p| (TradeDecline, p)),
        TradeCancel => handlers::trade::cancel(state, payload, now).map(|p| (TradeCancel, p)),
        TradeList => handlers::trade::list(state, payload, now).map(|p| (TradeListResp, p)),

        InventoryGet => handlers::inventory::get_inventory(state, payload, now).map(|p| (InventoryResp, p)),
        ProfileGet => handlers::inventory::get_profile(state, payload, now).map(|p| (ProfileResp, p)),
        SkinDetailGet => handlers::inventory::get_skin_detail(state, payload, now).map(|p| (SkinDetailResp, p)),
        UserSearch => handlers::inventory::search_user(state, payload, now).map(|p| (UserSearchResp, p)),

        Unbox => handlers::unbox::unbox(state, payload, now).map(|p| (UnboxResp, p)),
        CaseList => handlers::unbox::list_cases(state, payload, now).map(|p| (CaseListResp, p)),

        Chat => handlers::chat::post(state, payload, now).map(|p| (Chat, p)),
        Heartbeat => handlers::misc::heartbeat(state, payload, now).map(|p| (Heartbeat, p)),

        // Terminal response types and Error are never request types; a
        // client sending one back is a protocol misuse.
        RegisterOk | LoginOk | MarketListings | TradeNotify | TradeCompleted | TradeListResp | InventoryResp
        | ProfileResp | SkinDetailResp | UserSearchResp | UnboxResp | CaseListResp | Error => {
            Err(ServerError::InvalidRequest("response-only message type sent as a request"))
        }
    }
}

fn error_frame(originating_msg_type: u16, sequence_num: u32, error: ServerError) -> Frame {
    tracing::debug!(originating_msg_type, error = %error, "request failed");
    let mut payload = Vec::with_capacity(6);
    payload.extend_from_slice(&originating_msg_type.to_le_bytes());
    payload.extend_from_slice(&error.code().as_u32().to_le_bytes());
    Frame::new(MsgType::Error.as_u16(), sequence_num, payload)
}
