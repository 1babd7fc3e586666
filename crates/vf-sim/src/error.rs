//! Error types for step sequencing.

use thiserror::Error;

/// Errors encountered while driving links through simulation steps.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<vf_components::ComponentError> for SimError {
    fn from(e: vf_components::ComponentError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
