use realfft::RealFftPlanner;

/// FFT pipeline: Blackman-windowed real FFT using realfft.
///
/// Pre-allocates the FFT plan and scratch buffers for zero-allocation hot path.
///
/// # Example
/// ```
/// use vm_audio::fft::FftPipeline;
/// let fft = FftPipeline::new(2048);
/// assert_eq!(fft.bin_count(), 1024);
/// ```
pub struct FftPipeline {
    fft_size: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<realfft::num_complex::Complex<f32>>,
    scratch: Vec<realfft::num_complex::Complex<f32>>,
    magnitudes: Vec<f32>,
    plan: std::sync::Arc<dyn realfft::RealToComplex<f32>>,
    /// Blackman window coefficients (alpha = 0.16).
    window: Vec<f32>,
}

impl FftPipeline {
    /// Create a new FFT pipeline with the given window size.
    ///
    /// # Panics
    /// Panics if `size` is smaller than 2.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size >= 2, "FFT size must be >= 2");

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        let n = size as f32;
        let window: Vec<f32> = (0..size)
            .map(|i| {
                let x = 2.0 * std::f32::consts::PI * i as f32 / n;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Self {
            fft_size: size,
            input_buf,
            spectrum_buf,
            scratch,
            magnitudes: vec![0.0; size / 2],
            plan,
            window,
        }
    }

    /// Process `samples` through windowed FFT.
    ///
    /// Returns `N/2` magnitudes scaled by `1/N` (the Nyquist bin is dropped).
    /// Short input is zero-padded.
    ///
    /// # Example
    /// ```
    /// use vm_audio::fft::FftPipeline;
    /// let mut fft = FftPipeline::new(256);
    /// let samples = vec![0.0f32; 256];
    /// let spectrum = fft.process(&samples);
    /// assert_eq!(spectrum.len(), 128);
    /// assert!(spectrum.iter().all(|&m| m == 0.0));
    /// ```
    pub fn process(&mut self, samples: &[f32]) -> &[f32] {
        let n = self.fft_size.min(samples.len());

        // Copy and window
        for (i, slot) in self.input_buf.iter_mut().enumerate() {
            *slot = if i < n {
                samples[i] * self.window[i]
            } else {
                0.0
            };
        }

        // Forward FFT
        if self
            .plan
            .process_with_scratch(&mut self.input_buf, &mut self.spectrum_buf, &mut self.scratch)
            .is_err()
        {
            self.magnitudes.iter_mut().for_each(|m| *m = 0.0);
            return &self.magnitudes;
        }

        // Magnitude
        let scale = 1.0 / self.fft_size as f32;
        for (m, c) in self.magnitudes.iter_mut().zip(&self.spectrum_buf) {
            *m = (c.re * c.re + c.im * c.im).sqrt() * scale;
        }
        &self.magnitudes
    }

    /// FFT window size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of magnitude bins returned by [`FftPipeline::process`].
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_peaks_in_its_bin() {
        let size = 1024;
        let sr = 16_000.0f32;
        // 1000 Hz lands exactly on bin 64 (bin width 15.625 Hz).
        let samples: Vec<f32> = (0..size)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sr).sin())
            .collect();
        let mut fft = FftPipeline::new(size);
        let spectrum = fft.process(&samples);
        let peak = spectrum
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best })
            .0;
        assert_eq!(peak, 64);
    }
}
