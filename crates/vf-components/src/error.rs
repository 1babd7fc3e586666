//! Error types for link component operations.

use thiserror::Error;
use vf_core::error::VfError;

/// Errors that can occur while constructing or stepping link components.
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    /// Configuration or input data rejected at initialization time.
    /// Construction is all-or-nothing: on this error no component exists.
    #[error("Initialization failed: {what}")]
    Initialization { what: &'static str },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for VfError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::Initialization { what } => VfError::InvalidArg { what },
            ComponentError::NonPhysical { what } => VfError::Invariant { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::Initialization {
            what: "cell capacity must be positive",
        };
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn error_conversion() {
        let err = ComponentError::Initialization { what: "test" };
        let vf: VfError = err.into();
        assert!(matches!(vf, VfError::InvalidArg { .. }));
    }
}
