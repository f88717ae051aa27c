/// Lissage temporel du spectre, bin par bin.
///
/// `smoothed = tau * previous + (1 - tau) * current`, appliqué à chaque
/// lecture du spectre, comme un nœud d'analyse de navigateur.
///
/// # Example
/// ```
/// use vm_audio::smoothing::SpectrumSmoother;
/// let mut s = SpectrumSmoother::new(0.5);
/// assert_eq!(s.smooth(&[1.0, 2.0]), &[0.5, 1.0]);
/// assert_eq!(s.smooth(&[1.0, 2.0]), &[0.75, 1.5]);
/// ```
pub struct SpectrumSmoother {
    tau: f32,
    prev: Vec<f32>,
}

impl SpectrumSmoother {
    /// Create a new smoother. `tau` is clamped to [0.0, 0.99].
    #[must_use]
    pub fn new(tau: f32) -> Self {
        Self {
            tau: tau.clamp(0.0, 0.99),
            prev: Vec::new(),
        }
    }

    /// Blend `current` into the running spectrum and return it.
    ///
    /// The running spectrum starts at zero and is resized (to zero) if the
    /// bin count changes.
    pub fn smooth(&mut self, current: &[f32]) -> &[f32] {
        if self.prev.len() != current.len() {
            self.prev.clear();
            self.prev.resize(current.len(), 0.0);
        }
        for (prev, &cur) in self.prev.iter_mut().zip(current) {
            let v = self.tau * *prev + (1.0 - self.tau) * cur;
            // Flush denormals and NaN from a bad frame.
            *prev = if v.is_finite() && v > f32::MIN_POSITIVE { v } else { 0.0 };
        }
        &self.prev
    }

    /// Forget the running spectrum.
    pub fn reset(&mut self) {
        self.prev.iter_mut().for_each(|v| *v = 0.0);
    }
}
