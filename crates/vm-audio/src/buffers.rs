use std::collections::BTreeSet;

use vm_core::frame::FrameReading;

/// Buffers d'échantillons accumulés pendant une passe d'enregistrement.
///
/// Append-only pendant la session, vidés par `reset`. `volume`,
/// `timestamps_ms` et `snr_db` sont alignés (une entrée par frame non
/// silencieuse) ; `pitch` et `centroid` ne gardent que les valeurs valides.
///
/// # Example
/// ```
/// use vm_audio::buffers::SampleBuffers;
/// use vm_core::frame::FrameReading;
///
/// let mut buffers = SampleBuffers::default();
/// buffers.push(&FrameReading { rms: 0.1, pitch: Some(180.0), ..FrameReading::default() });
/// buffers.push(&FrameReading { rms: 0.2, centroid: Some(1800.0), ..FrameReading::default() });
/// assert_eq!(buffers.volume, vec![0.1, 0.2]);
/// assert_eq!(buffers.pitch, vec![180.0]);
/// assert_eq!(buffers.centroid, vec![1800.0]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBuffers {
    /// F0 estimates inside the voice band (Hz).
    pub pitch: Vec<f32>,
    /// RMS of every non-silent frame.
    pub volume: Vec<f32>,
    /// Positive spectral centroids (Hz).
    pub centroid: Vec<f32>,
    /// Frame positions (ms), aligned with `volume`.
    pub timestamps_ms: Vec<f64>,
    /// Local SNR (dB), aligned with `volume`.
    pub snr_db: Vec<f32>,
}

impl SampleBuffers {
    /// Build buffers directly from the three core sequences.
    ///
    /// Timestamps and SNR stay empty; the prosody block then uses its
    /// defaults.
    #[must_use]
    pub fn from_samples(pitch: Vec<f32>, volume: Vec<f32>, centroid: Vec<f32>) -> Self {
        Self {
            pitch,
            volume,
            centroid,
            ..Self::default()
        }
    }

    /// Append one validated reading.
    pub fn push(&mut self, reading: &FrameReading) {
        self.volume.push(reading.rms);
        self.timestamps_ms.push(reading.timestamp_ms);
        self.snr_db.push(reading.snr_db);
        if let Some(p) = reading.pitch {
            self.pitch.push(p);
        }
        if let Some(c) = reading.centroid {
            self.centroid.push(c);
        }
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.pitch.clear();
        self.volume.clear();
        self.centroid.clear();
        self.timestamps_ms.clear();
        self.snr_db.clear();
    }

    /// Number of non-silent frames recorded.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.volume.len()
    }

    /// `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volume.is_empty() && self.pitch.is_empty() && self.centroid.is_empty()
    }
}

impl<'a> FromIterator<&'a FrameReading> for SampleBuffers {
    fn from_iter<I: IntoIterator<Item = &'a FrameReading>>(iter: I) -> Self {
        let mut buffers = Self::default();
        for reading in iter {
            buffers.push(reading);
        }
        buffers
    }
}

/// Séquence des frames de la passe, chacune avec son étiquette (locuteur,
/// phase...) ou `None` quand aucun tag n'était actif.
///
/// L'ordre d'arrivée est conservé ; les buffers par tag en sont dérivés.
///
/// # Example
/// ```
/// use vm_audio::buffers::TaggedSamples;
/// use vm_core::frame::FrameReading;
///
/// let mut tagged = TaggedSamples::default();
/// tagged.push(Some("alice"), &FrameReading { rms: 0.1, ..FrameReading::default() });
/// tagged.push(Some("bob"), &FrameReading { rms: 0.3, ..FrameReading::default() });
/// tagged.push(None, &FrameReading { rms: 0.4, ..FrameReading::default() });
/// tagged.push(Some("alice"), &FrameReading { rms: 0.2, ..FrameReading::default() });
/// assert_eq!(tagged.tags(), ["alice", "bob"]);
/// assert_eq!(tagged.get("alice").map(|b| b.volume), Some(vec![0.1, 0.2]));
/// assert_eq!(tagged.len(), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TaggedSamples {
    frames: Vec<(Option<String>, FrameReading)>,
}

impl TaggedSamples {
    /// Append `reading` under `tag`.
    pub fn push(&mut self, tag: Option<&str>, reading: &FrameReading) {
        self.frames.push((tag.map(str::to_string), *reading));
    }

    /// Buffers built from the frames recorded under `tag`, if any.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<SampleBuffers> {
        let mut frames = self.frames_tagged(tag).peekable();
        frames.peek()?;
        Some(frames.collect())
    }

    /// Frames recorded under `tag`, in arrival order.
    pub fn frames_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a FrameReading> + 'a {
        self.frames
            .iter()
            .filter(move |(t, _)| t.as_deref() == Some(tag))
            .map(|(_, reading)| reading)
    }

    /// Every frame with its tag, in arrival order.
    pub fn frames(&self) -> impl Iterator<Item = (Option<&str>, &FrameReading)> {
        self.frames.iter().map(|(t, reading)| (t.as_deref(), reading))
    }

    /// Distinct tags seen, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let tags: BTreeSet<&str> = self.frames.iter().filter_map(|(t, _)| t.as_deref()).collect();
        tags.into_iter().collect()
    }

    /// Number of frames, tagged or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Drop every frame.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// `true` if no frame was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
