//! User repository. Grounded on the teacher's `account::repository::UserRepository`
//! (row-struct + `From` conversion, one function per query shape).

use rusqlite::{Connection, OptionalExtension, params};

use crate::core_types::UserId;
use crate::error::ServerError;

use super::Store;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub user_id: UserId,
    pub username: String,
    pub password_digest: String,
    pub balance: f64,
    pub created_at: i64,
    pub last_login: Option<i64>,
    pub banned: bool,
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        user_id: row.get(0)?,
        username: row.get(1)?,
        password_digest: row.get(2)?,
        balance: row.get(3)?,
        created_at: row.get(4)?,
        last_login: row.get(5)?,
        banned: row.get::<_, i64>(6)? != 0,
    })
}

const SELECT_USER: &str = "SELECT user_id, username, password_digest, balance, created_at, last_login, banned FROM users";

impl Store {
    pub fn get_user(&self, user_id: UserId) -> Result<Option<UserRow>, ServerError> {
        self.with_conn(|conn| Ok(query_user_by(conn, "user_id = ?1", user_id)?))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, ServerError> {
        self.with_conn(|conn| {
            let sql = format!("{SELECT_USER} WHERE username = ?1");
            conn.query_row(&sql, params![username], row_to_user)
                .optional()
                .map_err(ServerError::from)
        })
    }

    /// Insert a new user with the starting balance. Fails with a unique
    /// constraint violation (surfaced as `ServerError::Store`) if the
    /// username is already taken; callers should check
    /// [`Store::get_user_by_username`] first to return `UserExists`
    /// without relying on the constraint.
    pub fn create_user(
        &self,
        username: &str,
        password_digest: &str,
        starting_balance: f64,
        now: i64,
    ) -> Result<UserId, ServerError> {
        self.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO users (username, password_digest, balance, created_at, banned) VALUES (?1, ?2, ?3, ?4, 0)",
                params![username, password_digest, starting_balance, now],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    pub fn set_last_login(&self, user_id: UserId, now: i64) -> Result<(), ServerError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET last_login = ?1 WHERE user_id = ?2",
                params![now, user_id],
            )?;
            Ok(())
        })
    }

    /// Used by transactional domain ops: the caller is already inside a
    /// `with_transaction` closure and must apply the write on that same
    /// `Transaction`, never a fresh connection borrow.
    pub fn tx_set_balance(
        tx: &rusqlite::Transaction,
        user_id: UserId,
        new_balance: f64,
    ) -> Result<(), ServerError> {
        let updated = tx.execute(
            "UPDATE users SET balance = ?1 WHERE user_id = ?2",
            params![new_balance, user_id],
        )?;
        if updated == 0 {
            return Err(ServerError::ItemNotFound);
        }
        Ok(())
    }

    pub fn tx_get_user(tx: &rusqlite::Transaction, user_id: UserId) -> Result<UserRow, ServerError> {
        query_user_by(tx, "user_id = ?1", user_id)?.ok_or(ServerError::ItemNotFound)
    }
}

fn query_user_by(
    conn: &Connection,
    predicate: &str,
    user_id: UserId,
) -> rusqlite::Result<Option<UserRow>> {
    let sql = format!("{SELECT_USER} WHERE {predicate}");
    conn.query_row(&sql, params![user_id], row_to_user).optional()
}
