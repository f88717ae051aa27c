use thiserror::Error;

/// Errors originating from the core types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A type code string that is not exactly four uppercase ASCII letters.
    #[error("Code de type invalide : {code:?}")]
    InvalidTypeCode {
        /// The rejected input.
        code: String,
    },
}
