//! Case-opening: the hardest transactional op (spec.md §4.5). Balance
//! debit, rarity/wear/stattrak/pattern rolls, mint, inventory insert, and
//! transaction log all happen inside one `Store::with_transaction` call
//! so a mid-operation error restores the balance automatically (the
//! transaction simply never commits).

use rand::Rng;

use crate::core_types::{CaseId, InstanceId, Rarity, UserId, WearBand};
use crate::error::ServerError;
use crate::rarity::{roll_pattern_seed, roll_rarity, roll_rarity_value, roll_stattrak, roll_wear};
use crate::store::Store;

/// Public shape of a minted (or otherwise displayed) skin, matching the
/// wire `Skin` struct (spec.md §6 Skin detail).
#[derive(Debug, Clone)]
pub struct SkinView {
    pub instance_id: InstanceId,
    pub definition_id: crate::core_types::DefinitionId,
    pub name: String,
    pub rarity: Rarity,
    pub wear: f64,
    pub wear_band: WearBand,
    pub pattern_seed: i64,
    pub stattrak: bool,
    pub owner_id: UserId,
    pub current_price: f64,
}

pub struct CaseOpeningService<'a> {
    store: &'a Store,
    key_price: f64,
}

impl<'a> CaseOpeningService<'a> {
    pub fn new(store: &'a Store, key_price: f64) -> Self {
        Self { store, key_price }
    }

    /// spec.md §4.5 algorithm, steps 1-11 (hooks fired via [`crate::domain::hooks`]
    /// by the caller once this returns, outside the critical section where
    /// the operation's own invariant permits — see spec.md §4.9).
    pub fn open_case(&self, user_id: UserId, case_id: CaseId, now: i64) -> Result<SkinView, ServerError> {
        self.open_case_with_rng(user_id, case_id, now, &mut rand::thread_rng())
    }

    /// Same algorithm with an injectable RNG, so callers validating
    /// spec.md §8 invariant #11 (empirical drop-rate convergence) can
    /// drive it with a seeded generator.
    pub fn open_case_with_rng(
        &self,
        user_id: UserId,
        case_id: CaseId,
        now: i64,
        rng: &mut impl Rng,
    ) -> Result<SkinView, ServerError> {
        let case = self.store.get_case(case_id)?.ok_or(ServerError::ItemNotFound)?;
        let cost = case.price + self.key_price;

        let available = self.store.case_content_rarities(case_id)?;
        if available.is_empty() {
            return Err(ServerError::ItemNotFound);
        }

        let rarity_roll = roll_rarity_value(rng);
        let rarity = roll_rarity(rarity_roll, &available);
        let candidates = self.store.case_definitions_of_rarity(case_id, rarity)?;
        let definition = candidates
            .get(rng.gen_range(0..candidates.len()))
            .cloned()
            .ok_or(ServerError::ItemNotFound)?;

        let wear = roll_wear(rng);
        let stattrak = roll_stattrak(rng, definition.rarity);
        let pattern_seed = roll_pattern_seed(rng);

        self.store.with_transaction(|tx| {
            let user = Store::tx_get_user(tx, user_id)?;
            if user.balance < cost {
                return Err(ServerError::InsufficientFunds);
            }
            Store::tx_set_balance(tx, user_id, user.balance - cost)?;

            let instance_id = Store::tx_mint_instance(
                tx,
                definition.definition_id,
                definition.rarity,
                wear,
                pattern_seed,
                stattrak,
                user_id,
                now,
            )?;

            let wear_band = WearBand::from_wear(wear);
            let current_price = definition.base_price * definition.rarity.multiplier() * wear_band.multiplier();

            Store::tx_record_transaction(
                tx,
                user_id,
                "case_open",
                -cost,
                Some(&format!("case_id={case_id} instance_id={instance_id}")),
                now,
            )?;

            Ok(SkinView {
                instance_id,
                definition_id: definition.definition_id,
                name: definition.name.clone(),
                rarity: definition.rarity,
                wear,
                wear_band,
                pattern_seed,
                stattrak,
                owner_id: user_id,
                current_price,
            })
        })
    }
}
