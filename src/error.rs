//! Error taxonomy: a typed [`ServerError`] for everything a handler or a
//! Store operation can fail with, and the closed wire [`ErrorCode`] set
//! from spec.md §4.3 that every ERROR response carries.

use thiserror::Error;

/// The closed error code set, spec.md §4.3. Wire representation is `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    InvalidCredentials = 1,
    UserExists = 2,
    InsufficientFunds = 3,
    ItemNotFound = 4,
    PermissionDenied = 5,
    TradeExpired = 6,
    InvalidTrade = 7,
    SessionExpired = 8,
    ServerFull = 9,
    Banned = 10,
    TradeLocked = 11,
    InvalidRequest = 12,
    DatabaseError = 13,
}

impl ErrorCode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Typed error for domain/store failures inside a handler. Every variant
/// maps to exactly one [`ErrorCode`] via [`ServerError::code`].
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("username already registered")]
    UserExists,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("item not found")]
    ItemNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("trade expired")]
    TradeExpired,
    #[error("invalid trade: {0}")]
    InvalidTrade(&'static str),
    #[error("session expired")]
    SessionExpired,
    #[error("server full")]
    ServerFull,
    #[error("user is banned")]
    Banned,
    #[error("item is trade-locked")]
    TradeLocked,
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl ServerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ServerError::InvalidCredentials => ErrorCode::InvalidCredentials,
            ServerError::UserExists => ErrorCode::UserExists,
            ServerError::InsufficientFunds => ErrorCode::InsufficientFunds,
            ServerError::ItemNotFound => ErrorCode::ItemNotFound,
            ServerError::PermissionDenied => ErrorCode::PermissionDenied,
            ServerError::TradeExpired => ErrorCode::TradeExpired,
            ServerError::InvalidTrade(_) => ErrorCode::InvalidTrade,
            ServerError::SessionExpired => ErrorCode::SessionExpired,
            ServerError::ServerFull => ErrorCode::ServerFull,
            ServerError::Banned => ErrorCode::Banned,
            ServerError::TradeLocked => ErrorCode::TradeLocked,
            ServerError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ServerError::Store(_) => ErrorCode::DatabaseError,
        }
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
