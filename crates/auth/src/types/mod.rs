//! Shared types for authentication

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Verification session not found")]
    SessionNotFound,

    #[error("Verification session expired")]
    SessionExpired,

    #[error("Wrong code, {attempts_left} attempts left")]
    WrongCode { attempts_left: u32 },

    #[error("Too many failed attempts")]
    TooManyAttempts,

    #[error("Code already sent, retry in {retry_in_seconds}s")]
    ResendTooSoon { retry_in_seconds: u64 },

    #[error("Code delivery failed: {0}")]
    Delivery(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
