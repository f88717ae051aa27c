use vm_core::traits::AudioStream;

/// In-memory sample stream.
///
/// Hands out `hop` samples per read, the way a live capture delivers what
/// arrived since the previous tick. Used for decoded files and tests.
///
/// # Example
/// ```
/// use vm_audio::stream::SampleStream;
/// use vm_core::traits::AudioStream;
///
/// let mut stream = SampleStream::new(vec![0.1; 1000], 16_000, 400);
/// let mut buf = Vec::new();
/// assert_eq!(stream.read_samples(&mut buf), 400);
/// assert_eq!(stream.read_samples(&mut buf), 400);
/// assert_eq!(stream.read_samples(&mut buf), 200);
/// assert!(stream.is_exhausted());
/// ```
pub struct SampleStream {
    samples: Vec<f32>,
    pos: usize,
    hop: usize,
    sample_rate: u32,
}

impl SampleStream {
    /// Wrap `samples`. A `hop` of 0 is treated as 1.
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32, hop: usize) -> Self {
        Self {
            samples,
            pos: 0,
            hop: hop.max(1),
            sample_rate,
        }
    }

    /// Total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if the stream holds no samples at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `true` once every sample has been read.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.samples.len()
    }

    /// Number of reads needed to drain the stream.
    #[must_use]
    pub fn ticks(&self) -> usize {
        self.samples.len().div_ceil(self.hop)
    }
}

impl AudioStream for SampleStream {
    fn read_samples(&mut self, out: &mut Vec<f32>) -> usize {
        out.clear();
        let end = (self.pos + self.hop).min(self.samples.len());
        out.extend_from_slice(&self.samples[self.pos.min(end)..end]);
        let count = end.saturating_sub(self.pos);
        self.pos = end.max(self.pos);
        count
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
