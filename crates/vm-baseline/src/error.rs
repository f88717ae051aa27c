use thiserror::Error;

/// Errors originating from the baseline engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BaselineError {
    /// The current vector does not have the fixed feature schema length.
    #[error("Le vecteur doit avoir {expected} dimensions (reçu {actual})")]
    InvalidDimension { expected: usize, actual: usize },
}
