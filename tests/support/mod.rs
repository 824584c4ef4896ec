//! Shared scaffolding for integration tests: an in-memory `AppState` and
//! a minimal catalog seed. Integration test binaries link the crate
//! without `cfg(test)`, so the `#[cfg(test)]` seeding helpers living
//! next to each store module aren't visible here — this duplicates just
//! enough of that seeding via the same public `with_transaction` seam.

use rusqlite::params;
use tradesim_server::config::ServerConfig;
use tradesim_server::state::AppState;

pub fn test_state() -> AppState {
    let mut config = ServerConfig::default();
    config.db_path = ":memory:".to_string();
    AppState::new(config).unwrap()
}

/// Seed one case with five definitions, one per rarity from Consumer up
/// to Classified. Returns `(case_id, definition_ids)`.
pub fn seed_catalog(state: &AppState) -> (i64, Vec<i64>) {
    state
        .store
        .with_transaction(|tx| {
            tx.execute("INSERT INTO case_definitions (name, price) VALUES ('Integration Case', 8.0)", [])?;
            let case_id = tx.last_insert_rowid();

            let specs: [(&str, i64, f64); 5] = [
                ("Consumer Skin", 0, 1.0),
                ("Industrial Skin", 1, 2.0),
                ("Mil-Spec Skin", 2, 5.0),
                ("Restricted Skin", 3, 15.0),
                ("Classified Skin", 4, 60.0),
            ];
            let mut def_ids = Vec::new();
            for (name, rarity, price) in specs {
                tx.execute(
                    "INSERT INTO skin_definitions (name, rarity, base_price) VALUES (?1, ?2, ?3)",
                    params![name, rarity, price],
                )?;
                let def_id = tx.last_insert_rowid();
                tx.execute(
                    "INSERT INTO case_contents (case_id, definition_id) VALUES (?1, ?2)",
                    params![case_id, def_id],
                )?;
                def_ids.push(def_id);
            }
            Ok((case_id, def_ids))
        })
        .unwrap()
}
