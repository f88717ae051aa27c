use std::sync::Arc;

use vm_core::clock::StreamClock;
use vm_core::config::AnalyzerConfig;
use vm_core::frame::FrameReading;
use vm_core::metrics::{AnalysisMetrics, AnalysisResult};
use vm_core::traits::AudioStream;

use crate::buffers::{SampleBuffers, TaggedSamples};
use crate::classify::{self, ClassifierMode};
use crate::error::AudioError;
use crate::features::{self, SILENCE_RMS_GATE};
use crate::graph::AnalyserGraph;
use crate::metrics;
use crate::resonance::{self, CoupleResonance};

/// Analyseur de signal : une frame par tick, buffers par passe.
///
/// Possédé par l'appelant. Cycle de vie :
/// `new` → `initialize` → `connect_stream` → `start` → `collect_sample`*
/// → `stop` → `analyze` → `reset` | `destroy`.
///
/// # Example
/// ```
/// use vm_audio::analyzer::SignalAnalyzer;
/// use vm_audio::stream::SampleStream;
/// use vm_core::config::AnalyzerConfig;
///
/// let sr = 16_000;
/// let tone: Vec<f32> = (0..sr as usize)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sr as f32).sin())
///     .collect();
///
/// let mut analyzer = SignalAnalyzer::new(AnalyzerConfig::default());
/// analyzer.initialize();
/// analyzer.connect_stream(SampleStream::new(tone, sr, 800)).unwrap();
/// analyzer.start().unwrap();
/// for _ in 0..20 {
///     analyzer.collect_sample().unwrap();
/// }
/// analyzer.stop();
/// assert!(!analyzer.samples().pitch.is_empty());
/// ```
pub struct SignalAnalyzer {
    config: AnalyzerConfig,
    graph: Option<AnalyserGraph>,
    stream: Option<Box<dyn AudioStream>>,
    incoming: Vec<f32>,
    time_buf: Vec<f32>,
    freq_buf: Vec<u8>,
    buffers: SampleBuffers,
    tagged: TaggedSamples,
    current_tag: Option<String>,
    recording: bool,
    clock: Arc<StreamClock>,
}

impl SignalAnalyzer {
    /// Create an idle analyzer. Nothing is allocated until [`initialize`].
    ///
    /// [`initialize`]: SignalAnalyzer::initialize
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        let clock = Arc::new(StreamClock::new(config.fallback_sample_rate));
        Self {
            config,
            graph: None,
            stream: None,
            incoming: Vec::new(),
            time_buf: Vec::new(),
            freq_buf: Vec::new(),
            buffers: SampleBuffers::default(),
            tagged: TaggedSamples::default(),
            current_tag: None,
            recording: false,
            clock,
        }
    }

    /// Allocate the analyser graph. Calling it twice is a no-op.
    pub fn initialize(&mut self) {
        if self.graph.is_some() {
            return;
        }
        let graph = AnalyserGraph::new(&self.config);
        self.time_buf = vec![0.0; graph.fft_size()];
        self.freq_buf = vec![0; graph.frequency_bin_count()];
        log::info!(
            "Analyseur initialisé : fft={} smoothing={} dB=[{}, {}]",
            graph.fft_size(),
            self.config.smoothing,
            self.config.min_db,
            self.config.max_db
        );
        self.graph = Some(graph);
    }

    /// `true` between `initialize` and `destroy`.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.graph.is_some()
    }

    /// `true` once a stream is wired in.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Wire `stream` into the graph, replacing (and releasing) any previous
    /// one. The graph adopts the stream's sample rate.
    ///
    /// # Errors
    /// [`AudioError::NotInitialized`] before `initialize`.
    pub fn connect_stream<S: AudioStream>(&mut self, stream: S) -> Result<(), AudioError> {
        let graph = self.graph.as_mut().ok_or(AudioError::NotInitialized)?;
        let sample_rate = stream.sample_rate();
        graph.set_sample_rate(sample_rate);
        self.clock.set_sample_rate(sample_rate);
        self.stream = Some(Box::new(stream));
        log::info!("Stream branché @ {sample_rate}Hz");
        Ok(())
    }

    /// Begin recording: subsequent `collect_sample` calls fill the buffers.
    ///
    /// # Errors
    /// [`AudioError::NotInitialized`] or [`AudioError::NotConnected`].
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.graph.is_none() {
            return Err(AudioError::NotInitialized);
        }
        if self.stream.is_none() {
            return Err(AudioError::NotConnected);
        }
        self.recording = true;
        log::debug!("Enregistrement démarré");
        Ok(())
    }

    /// Stop recording. Buffers are kept for `analyze`.
    pub fn stop(&mut self) {
        if self.recording {
            log::debug!("Enregistrement arrêté : {} frames", self.buffers.frame_count());
        }
        self.recording = false;
    }

    /// `true` between `start` and `stop`.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Sample one frame.
    ///
    /// Pulls whatever the stream delivered since the last call into the
    /// graph, then, while recording, measures the current window. Returns
    /// `Ok(None)` for silent frames and when not recording.
    ///
    /// # Errors
    /// [`AudioError::NotInitialized`] or [`AudioError::NotConnected`].
    pub fn collect_sample(&mut self) -> Result<Option<FrameReading>, AudioError> {
        let graph = self.graph.as_mut().ok_or(AudioError::NotInitialized)?;
        let stream = self.stream.as_mut().ok_or(AudioError::NotConnected)?;

        let count = stream.read_samples(&mut self.incoming);
        graph.push(&self.incoming);
        self.clock.advance(count);

        if !self.recording {
            return Ok(None);
        }

        graph.get_float_time_domain_data(&mut self.time_buf);
        graph.get_byte_frequency_data(&mut self.freq_buf);

        let level = features::rms(&self.time_buf);
        if level <= SILENCE_RMS_GATE {
            return Ok(None);
        }

        let sample_rate = graph.sample_rate();
        let reading = FrameReading {
            rms: level,
            pitch: features::detect_pitch(&self.time_buf, sample_rate)
                .filter(|&hz| features::in_voice_band(hz)),
            centroid: features::spectral_centroid(&self.freq_buf, sample_rate)
                .filter(|&hz| hz > 0.0),
            snr_db: features::snr_db(level),
            timestamp_ms: self.clock.pos_ms(),
        };

        self.buffers.push(&reading);
        self.tagged.push(self.current_tag.as_deref(), &reading);
        Ok(Some(reading))
    }

    /// Autocorrelation F0 estimate for `frame`, unrestricted by the voice band.
    #[must_use]
    pub fn detect_pitch(frame: &[f32], sample_rate: u32) -> Option<f32> {
        features::detect_pitch(frame, sample_rate)
    }

    /// Centroid of a byte spectrum, `None` when it carries no energy.
    #[must_use]
    pub fn calculate_spectral_centroid(bins: &[u8], sample_rate: u32) -> Option<f32> {
        features::spectral_centroid(bins, sample_rate)
    }

    /// Label subsequent samples with `tag`; `None` stops tagging.
    pub fn set_tag(&mut self, tag: Option<String>) {
        log::debug!("Tag actif : {tag:?}");
        self.current_tag = tag;
    }

    /// Active tag, if any.
    #[must_use]
    pub fn current_tag(&self) -> Option<&str> {
        self.current_tag.as_deref()
    }

    /// Clear every buffer and the analysis window between phases. The
    /// stream stays connected.
    pub fn reset(&mut self) {
        if let Some(graph) = self.graph.as_mut() {
            graph.clear();
        }
        self.buffers.clear();
        self.tagged.clear();
        self.current_tag = None;
        self.clock.reset();
    }

    /// Release the audio stream and every buffer.
    ///
    /// `initialize` must be called again afterwards. Dropping the analyzer
    /// releases the same resources.
    pub fn destroy(&mut self) {
        self.recording = false;
        if self.stream.take().is_some() {
            log::info!("Stream audio libéré");
        }
        self.graph = None;
        self.incoming = Vec::new();
        self.time_buf = Vec::new();
        self.freq_buf = Vec::new();
        self.reset();
    }

    /// Buffers of the current pass.
    #[must_use]
    pub fn samples(&self) -> &SampleBuffers {
        &self.buffers
    }

    /// Tagged frame sequence of the current pass.
    #[must_use]
    pub fn tagged_samples(&self) -> &TaggedSamples {
        &self.tagged
    }

    /// Aggregate the whole pass.
    #[must_use]
    pub fn calculate_metrics(&self) -> AnalysisMetrics {
        metrics::calculate_metrics(&self.buffers)
    }

    /// Aggregate only the samples recorded under `tag`.
    #[must_use]
    pub fn calculate_metrics_for_tag(&self, tag: &str) -> Option<AnalysisMetrics> {
        self.tagged.get(tag).as_ref().map(metrics::calculate_metrics)
    }

    /// Resonance between speakers tagged `A` and `B`, at the configured
    /// tick rate.
    #[must_use]
    pub fn calculate_resonance(&self) -> CoupleResonance {
        resonance::calculate_resonance(&self.tagged, f64::from(self.config.tick_rate))
    }

    /// Aggregate then classify the whole pass.
    #[must_use]
    pub fn analyze(&self, mode: ClassifierMode) -> AnalysisResult {
        classify::analyze(&self.buffers, mode)
    }

    /// Recording clock, shareable with a presentation layer.
    #[must_use]
    pub fn clock(&self) -> Arc<StreamClock> {
        Arc::clone(&self.clock)
    }

    /// Sample rate of the connected stream, or the configured fallback.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.graph
            .as_ref()
            .map_or(self.config.fallback_sample_rate, AnalyserGraph::sample_rate)
    }

    /// Configuration the analyzer was built with.
    #[must_use]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}
