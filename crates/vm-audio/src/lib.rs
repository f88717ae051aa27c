//! Audio capture, per-frame analysis, aggregation and classification for voicemirror.

pub mod analyzer;
pub mod batch_analyzer;
pub mod buffers;
pub mod capture;
pub mod classify;
pub mod decode;
pub mod driver;
pub mod error;
pub mod features;
pub mod fft;
pub mod graph;
pub mod metrics;
pub mod resonance;
pub mod smoothing;
pub mod stream;

pub use analyzer::SignalAnalyzer;
pub use classify::{ClassifierMode, classify, classify_prosody};
pub use driver::{DriverCommand, SamplingDriver};
pub use error::AudioError;
pub use resonance::{CoupleResonance, calculate_resonance};
