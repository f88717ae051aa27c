/// Source d'échantillons audio branchée sur le graphe d'analyse.
///
/// Implémenté par : `AudioCapture` (micro via cpal) et `SampleStream`
/// (échantillons décodés ou synthétiques).
///
/// # Example
/// ```
/// use vm_core::traits::AudioStream;
///
/// struct Silence;
/// impl AudioStream for Silence {
///     fn read_samples(&mut self, out: &mut Vec<f32>) -> usize {
///         out.clear();
///         out.extend(std::iter::repeat(0.0).take(256));
///         256
///     }
///     fn sample_rate(&self) -> u32 { 16_000 }
/// }
///
/// let mut s = Silence;
/// let mut buf = Vec::new();
/// assert_eq!(s.read_samples(&mut buf), 256);
/// ```
pub trait AudioStream: Send + 'static {
    /// Replace `out` with every sample that became available since the last
    /// call (mono, f32, normalized to [-1, 1]).
    ///
    /// Returns how many samples were read. Never blocks.
    fn read_samples(&mut self, out: &mut Vec<f32>) -> usize;

    /// Sample rate of the stream in Hz.
    fn sample_rate(&self) -> u32;
}
