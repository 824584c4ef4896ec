//! Case and skin-definition catalog reads. Both tables are immutable,
//! seeded once (spec.md §3) by an external loader out of this system's
//! scope (spec.md §1); this module only ever reads them, plus a small
//! `#[cfg(test)]` seeding helper used by this crate's own tests.

use rusqlite::params;

use crate::core_types::{CaseId, DefinitionId, Rarity};
use crate::error::ServerError;

use super::Store;

#[derive(Debug, Clone)]
pub struct CaseRow {
    pub case_id: CaseId,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct SkinDefinitionRow {
    pub definition_id: DefinitionId,
    pub name: String,
    pub rarity: Rarity,
    pub base_price: f64,
}

fn row_to_definition(row: &rusqlite::Row) -> rusqlite::Result<SkinDefinitionRow> {
    let rarity_raw: i64 = row.get(2)?;
    Ok(SkinDefinitionRow {
        definition_id: row.get(0)?,
        name: row.get(1)?,
        rarity: Rarity::from_db(rarity_raw).unwrap_or(Rarity::Consumer),
        base_price: row.get(3)?,
    })
}

impl Store {
    pub fn get_case(&self, case_id: CaseId) -> Result<Option<CaseRow>, ServerError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT case_id, name, price FROM case_definitions WHERE case_id = ?1",
                params![case_id],
                |row| {
                    Ok(CaseRow {
                        case_id: row.get(0)?,
                        name: row.get(1)?,
                        price: row.get(2)?,
                    })
                },
            )
            .optional_or_not_found()
        })
    }

    pub fn list_cases(&self) -> Result<Vec<CaseRow>, ServerError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT case_id, name, price FROM case_definitions")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CaseRow {
                        case_id: row.get(0)?,
                        name: row.get(1)?,
                        price: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Distinct rarities present in a case's content set (spec.md §4.5 step 3).
    pub fn case_content_rarities(&self, case_id: CaseId) -> Result<Vec<Rarity>, ServerError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT d.rarity FROM case_contents c
                 JOIN skin_definitions d ON d.definition_id = c.definition_id
                 WHERE c.case_id = ?1",
            )?;
            let rows = stmt
                .query_map(params![case_id], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().filter_map(Rarity::from_db).collect())
        })
    }

    /// Definitions in a case's content set at a specific rarity (spec.md §4.5 step 5).
    pub fn case_definitions_of_rarity(
        &self,
        case_id: CaseId,
        rarity: Rarity,
    ) -> Result<Vec<SkinDefinitionRow>, ServerError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT d.definition_id, d.name, d.rarity, d.base_price FROM case_contents c
                 JOIN skin_definitions d ON d.definition_id = c.definition_id
                 WHERE c.case_id = ?1 AND d.rarity = ?2",
            )?;
            let rows = stmt
                .query_map(params![case_id, rarity.to_db()], row_to_definition)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_definition(
        &self,
        definition_id: DefinitionId,
    ) -> Result<Option<SkinDefinitionRow>, ServerError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT definition_id, name, rarity, base_price FROM skin_definitions WHERE definition_id = ?1",
                params![definition_id],
                row_to_definition,
            )
            .optional_or_not_found()
        })
    }

    #[cfg(test)]
    pub fn seed_catalog_for_tests(&self) -> Result<(CaseId, Vec<DefinitionId>), ServerError> {
        self.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO case_definitions (name, price) VALUES ('Test Case', 8.0)",
                [],
            )?;
            let case_id = tx.last_insert_rowid();

            let specs: [(&str, Rarity, f64); 5] = [
                ("Consumer Skin", Rarity::Consumer, 1.0),
                ("Industrial Skin", Rarity::Industrial, 2.0),
                ("Mil-Spec Skin", Rarity::MilSpec, 5.0),
                ("Restricted Skin", Rarity::Restricted, 15.0),
                ("Classified Skin", Rarity::Classified, 60.0),
            ];
            let mut def_ids = Vec::new();
            for (name, rarity, price) in specs {
                tx.execute(
                    "INSERT INTO skin_definitions (name, rarity, base_price) VALUES (?1, ?2, ?3)",
                    params![name, rarity.to_db(), price],
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
    }
}

/// Small helper trait so `query_row(...).optional()` reads as "not found"
/// at call sites without importing `OptionalExtension` everywhere.
trait OptionalOrNotFound<T> {
    fn optional_or_not_found(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalOrNotFound<T> for rusqlite::Result<T> {
    fn optional_or_not_found(self) -> rusqlite::Result<Option<T>> {
        use rusqlite::OptionalExtension;
        self.optional()
    }
}
