//! Side-effect hooks fired by the critical transactional ops (spec.md
//! §4.9). Quest/achievement mutations use their own
//! read-then-check-then-insert transaction so "first time" flags cannot
//! unlock twice, but are otherwise run outside the critical section that
//! produced the triggering event, per spec.md §4.9's "outside the
//! critical section wherever possible."

use crate::config::REPORT_WARNING_THRESHOLD;
use crate::core_types::{Rarity, UserId};
use crate::domain::case_opening::SkinView;
use crate::error::ServerError;
use crate::store::{Store, QUESTS};

/// Case open → Lucky Gambler +1, Profit Maker += max(0, value - cost),
/// First-Knife unlock if Contraband, chat broadcast flag if rare.
///
/// Returns `true` if the event should be broadcast in chat (spec.md
/// §4.5 step 11: rarity ∈ {Covert, Contraband}); broadcast transport
/// itself is out of scope (spec.md §1), so the caller only gets the flag.
pub fn on_case_opened(store: &Store, user_id: UserId, skin: &SkinView, cost: f64, now: i64) -> Result<bool, ServerError> {
    let profit = (skin.current_price - cost).max(0.0);

    store.with_transaction(|tx| {
        let (_, lucky_target, _) = *QUESTS.iter().find(|(t, _, _)| *t == "lucky-gambler").unwrap();
        Store::tx_bump_quest_progress(tx, user_id, "lucky-gambler", lucky_target, 1.0)?;

        let (_, profit_target, _) = *QUESTS.iter().find(|(t, _, _)| *t == "profit-maker").unwrap();
        Store::tx_bump_quest_progress(tx, user_id, "profit-maker", profit_target, profit)?;

        if skin.rarity == Rarity::Contraband {
            Store::tx_unlock_achievement(tx, user_id, "first-knife")?;
        }
        Ok(())
    })?;

    Ok(matches!(skin.rarity, Rarity::Covert | Rarity::Contraband))
}

/// Trade accepted → First-Steps +1 and Social-Trader +1 on both sides,
/// First-Trade achievement on both.
pub fn on_trade_accepted(store: &Store, from_user: UserId, to_user: UserId) -> Result<(), ServerError> {
    store.with_transaction(|tx| {
        for user_id in [from_user, to_user] {
            let (_, first_steps_target, _) = *QUESTS.iter().find(|(t, _, _)| *t == "first-steps").unwrap();
            Store::tx_bump_quest_progress(tx, user_id, "first-steps", first_steps_target, 1.0)?;

            let (_, social_target, _) = *QUESTS.iter().find(|(t, _, _)| *t == "social-trader").unwrap();
            Store::tx_bump_quest_progress(tx, user_id, "social-trader", social_target, 1.0)?;

            Store::tx_unlock_achievement(tx, user_id, "first-trade")?;
        }
        Ok(())
    })
}

/// Market buy/sell → price-history rows, already written by
/// [`crate::domain::market::MarketService::buy`] inside its own
/// transaction; nothing further to do here. Kept as a named seam so
/// handlers have one place to call regardless of whether future
/// quest/achievement hooks attach to market activity too.
pub fn on_market_buy(_store: &Store) -> Result<(), ServerError> {
    Ok(())
}

/// Login → advance the streak, spec.md §4.9. `today`/`yesterday` are
/// `YYYY-MM-DD` strings; claiming the day's reward is a separate
/// idempotent operation the caller invokes once it observes the streak.
pub fn on_login(store: &Store, user_id: UserId, today: &str, yesterday: &str) -> Result<(i64, f64), ServerError> {
    store.with_transaction(|tx| Store::tx_record_login_streak(tx, user_id, today, yesterday))
}

/// Report → insert, warn if the reported user's open-report count
/// crosses the threshold. Returns `true` if a warning should fire.
pub fn on_report(store: &Store, reporter_id: UserId, reported_id: UserId, reason: Option<&str>, now: i64) -> Result<bool, ServerError> {
    store.file_report(reporter_id, reported_id, reason, now)?;
    let count = store.count_reports_against(reported_id)?;
    Ok(count >= REPORT_WARNING_THRESHOLD)
}
