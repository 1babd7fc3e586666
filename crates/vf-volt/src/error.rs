//! Error types for voltage table construction.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum VoltError {
    #[error("Table too short: {what}")]
    TooShort { what: &'static str },

    #[error("Table not monotonic: {what}")]
    NotMonotonic { what: &'static str },

    #[error("Table value out of range: {what}")]
    OutOfRange { what: &'static str },

    #[error("Non-finite table value: {what}")]
    NonFinite { what: &'static str },
}

pub type VoltResult<T> = Result<T, VoltError>;
