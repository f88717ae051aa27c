//! Per-frame signal measurements: loudness, fundamental frequency and
//! spectral brightness.

/// RMS at or below this level is silence. Also the pitch detector's floor.
pub const SILENCE_RMS_GATE: f32 = 0.01;
/// Edge samples louder than this are trimmed before autocorrelation.
pub const TRIM_AMPLITUDE: f32 = 0.2;
/// Minimum trimmed window length for a pitch estimate.
pub const MIN_TRIMMED_LEN: usize = 10;
/// Lower bound (exclusive) of the human voice band.
pub const MIN_VOICE_HZ: f32 = 50.0;
/// Upper bound (exclusive) of the human voice band.
pub const MAX_VOICE_HZ: f32 = 500.0;
/// Fixed noise floor used for the local SNR estimate.
pub const NOISE_FLOOR: f32 = 0.001;

/// Root-mean-square amplitude. 0 for an empty frame.
///
/// # Example
/// ```
/// use vm_audio::features::rms;
/// assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
/// assert_eq!(rms(&[]), 0.0);
/// ```
#[must_use]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Local SNR (dB) of a frame against [`NOISE_FLOOR`].
#[must_use]
pub fn snr_db(rms: f32) -> f32 {
    20.0 * (rms / NOISE_FLOOR).log10()
}

/// `true` if `hz` lies strictly inside the human voice band.
#[inline]
#[must_use]
pub fn in_voice_band(hz: f32) -> bool {
    hz > MIN_VOICE_HZ && hz < MAX_VOICE_HZ
}

/// Autocorrelation pitch estimator.
///
/// Returns `None` for quiet frames, frames whose trimmed window is too short,
/// and frames with no positive-lag correlation peak. The result is NOT
/// restricted to the voice band; callers gate with [`in_voice_band`].
///
/// # Example
/// ```
/// use vm_audio::features::detect_pitch;
/// let sr = 16_000;
/// let frame: Vec<f32> = (0..2048)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 200.0 * i as f32 / sr as f32).sin())
///     .collect();
/// let hz = detect_pitch(&frame, sr).unwrap();
/// assert!((hz - 200.0).abs() < 5.0);
/// assert_eq!(detect_pitch(&vec![0.0; 2048], sr), None);
/// ```
#[must_use]
pub fn detect_pitch(frame: &[f32], sample_rate: u32) -> Option<f32> {
    if rms(frame) < SILENCE_RMS_GATE {
        return None;
    }

    // Trim the transient edges: first quiet sample from each end.
    let n = frame.len();
    let half = n.div_ceil(2);
    let start = (0..half)
        .find(|&i| frame[i].abs() < TRIM_AMPLITUDE)
        .unwrap_or(0);
    let end = (1..half)
        .find(|&i| frame[n - i].abs() < TRIM_AMPLITUDE)
        .map_or(n.saturating_sub(1), |i| n - i);

    if end <= start || end - start < MIN_TRIMMED_LEN {
        return None;
    }
    let slice = &frame[start..end];
    let len = slice.len();

    let corr = autocorrelate(slice);

    // Skip the zero-lag peak, then take the strongest remaining lag.
    let mut d = 0;
    while d + 1 < len && corr[d] > corr[d + 1] {
        d += 1;
    }

    let mut max_val = -1.0f32;
    let mut max_pos = None;
    for (i, &c) in corr.iter().enumerate().skip(d) {
        if c > max_val {
            max_val = c;
            max_pos = Some(i);
        }
    }

    match max_pos {
        Some(pos) if pos > 0 => Some(sample_rate as f32 / pos as f32),
        _ => None,
    }
}

/// Full-range autocorrelation, `c[k] = Σ x[j]·x[j+k]`.
fn autocorrelate(x: &[f32]) -> Vec<f32> {
    let n = x.len();
    (0..n)
        .map(|lag| {
            x[..n - lag]
                .iter()
                .zip(&x[lag..])
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Amplitude-weighted mean frequency of a quantized spectrum.
///
/// Bin `i` sits at `i * sample_rate / (2 * bins.len())` Hz. Returns `None`
/// when the spectrum carries no energy at all.
///
/// # Example
/// ```
/// use vm_audio::features::spectral_centroid;
/// let mut bins = vec![0u8; 1024];
/// assert_eq!(spectral_centroid(&bins, 16_000), None);
/// bins[128] = 200; // 1000 Hz
/// assert_eq!(spectral_centroid(&bins, 16_000), Some(1000.0));
/// ```
#[must_use]
pub fn spectral_centroid(bins: &[u8], sample_rate: u32) -> Option<f32> {
    if bins.is_empty() {
        return None;
    }
    let bin_width = sample_rate as f32 / (bins.len() * 2) as f32;

    let (numerator, denominator) =
        bins.iter()
            .enumerate()
            .fold((0.0f32, 0.0f32), |(num, den), (i, &amp)| {
                let amplitude = f32::from(amp);
                (num + i as f32 * bin_width * amplitude, den + amplitude)
            });

    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}
