use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// An operation was attempted before `initialize()`.
    #[error("Analyseur non initialisé : appeler initialize() d'abord")]
    NotInitialized,

    /// Recording was started with no stream connected.
    #[error("Aucun stream audio branché sur l'analyseur")]
    NotConnected,

    /// No audio input device found.
    #[error("Aucun périphérique audio d'entrée trouvé")]
    NoInputDevice,

    /// Audio stream error.
    #[error("Erreur de stream audio : {0}")]
    StreamError(String),

    /// Audio decode error.
    #[error("Erreur de décodage : {0}")]
    DecodeError(String),

    /// The sampling thread panicked; the analyzer it owned is lost.
    #[error("Le thread d'échantillonnage a paniqué")]
    DriverPanicked,
}
