//! Send -> accept a peer trade through the dispatcher, checking the
//! bilateral item-and-cash swap and that a declined offer can't later
//! be accepted.

mod support;

use tradesim_server::domain::case_opening::CaseOpeningService;
use tradesim_server::dispatcher::dispatch;
use tradesim_server::protocol::{Frame, MsgType};

fn mint_one(state: &tradesim_server::state::AppState, case_id: i64, owner: i64) -> i64 {
    let service = CaseOpeningService::new(&state.store, state.config.key_price);
    service.open_case(owner, case_id, 0).unwrap().instance_id
}

#[test]
fn send_then_accept_swaps_items_and_cash_both_ways() {
    let state = support::test_state();
    let (case_id, _) = support::seed_catalog(&state);

    let a = state.store.create_user("a", "d", 500.0, 0).unwrap();
    let b = state.store.create_user("b", "d", 500.0, 0).unwrap();
    let a_item = mint_one(&state, case_id, a);
    let b_item = mint_one(&state, case_id, b);

    let send_payload = format!("{a}:{b}:{a_item}:20:{b_item}:5").into_bytes();
    let send = Frame::new(MsgType::TradeSend.as_u16(), 1, send_payload);
    let response = dispatch(&state, &send, 0);
    assert_eq!(response.msg_type, MsgType::TradeNotify.as_u16());
    let text = std::str::from_utf8(&response.payload).unwrap();
    let trade_id: i64 = text.split(':').next().unwrap().parse().unwrap();

    let accept_payload = format!("{b}:{trade_id}").into_bytes();
    let accept = Frame::new(MsgType::TradeAccept.as_u16(), 2, accept_payload);
    let response = dispatch(&state, &accept, 1);
    assert_eq!(response.msg_type, MsgType::TradeCompleted.as_u16());

    assert_eq!(state.store.get_user(a).unwrap().unwrap().balance, 500.0 - 20.0 + 5.0);
    assert_eq!(state.store.get_user(b).unwrap().unwrap().balance, 500.0 - 5.0 + 20.0);
    assert_eq!(state.store.get_instance(a_item).unwrap().unwrap().owner_id, b);
    assert_eq!(state.store.get_instance(b_item).unwrap().unwrap().owner_id, a);
}

#[test]
fn declined_trade_cannot_be_accepted_afterward() {
    let state = support::test_state();
    let (case_id, _) = support::seed_catalog(&state);

    let a = state.store.create_user("a", "d", 500.0, 0).unwrap();
    let b = state.store.create_user("b", "d", 500.0, 0).unwrap();
    let a_item = mint_one(&state, case_id, a);

    let send_payload = format!("{a}:{b}:{a_item}:0::0").into_bytes();
    let send = Frame::new(MsgType::TradeSend.as_u16(), 1, send_payload);
    let response = dispatch(&state, &send, 0);
    let text = std::str::from_utf8(&response.payload).unwrap();
    let trade_id: i64 = text.split(':').next().unwrap().parse().unwrap();

    let decline_payload = format!("{b}:{trade_id}").into_bytes();
    let decline = Frame::new(MsgType::TradeDecline.as_u16(), 2, decline_payload);
    let response = dispatch(&state, &decline, 1);
    assert_eq!(response.msg_type, MsgType::TradeDecline.as_u16());

    let accept_payload = format!("{b}:{trade_id}").into_bytes();
    let accept = Frame::new(MsgType::TradeAccept.as_u16(), 3, accept_payload);
    let response = dispatch(&state, &accept, 2);
    assert_eq!(response.msg_type, MsgType::Error.as_u16());
    let code = u32::from_le_bytes(response.payload[2..6].try_into().unwrap());
    assert_eq!(code, tradesim_server::error::ErrorCode::InvalidTrade.as_u32());

    assert_eq!(state.store.get_instance(a_item).unwrap().unwrap().owner_id, a);
}

#[test]
fn list_pending_finds_offers_for_both_sender_and_recipient() {
    let state = support::test_state();
    let (case_id, _) = support::seed_catalog(&state);

    let a = state.store.create_user("a", "d", 500.0, 0).unwrap();
    let b = state.store.create_user("b", "d", 500.0, 0).unwrap();
    let a_item = mint_one(&state, case_id, a);

    let send_payload = format!("{a}:{b}:{a_item}:0::0").into_bytes();
    let send = Frame::new(MsgType::TradeSend.as_u16(), 1, send_payload);
    dispatch(&state, &send, 0);

    for user in [a, b] {
        let list = Frame::new(MsgType::TradeList.as_u16(), 2, user.to_string().into_bytes());
        let response = dispatch(&state, &list, 0);
        assert_eq!(response.msg_type, MsgType::TradeListResp.as_u16());
        assert!(!response.payload.is_empty());
    }
}
