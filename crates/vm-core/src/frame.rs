use serde::Serialize;

/// Mesures extraites d'une frame non silencieuse.
///
/// Publiée par le driver d'échantillonnage pour les vumètres live ; les
/// buffers de l'analyseur ne gardent que les valeurs validées.
///
/// # Example
/// ```
/// use vm_core::frame::FrameReading;
/// let r = FrameReading { rms: 0.2, pitch: Some(220.0), ..FrameReading::default() };
/// assert!(r.is_voiced());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FrameReading {
    /// RMS de la frame temporelle.
    pub rms: f32,
    /// F0 estimée, seulement si dans la bande voix humaine.
    pub pitch: Option<f32>,
    /// Centroïde spectral en Hz, seulement si > 0.
    pub centroid: Option<f32>,
    /// SNR local estimé (dB) par rapport au plancher de bruit fixe.
    pub snr_db: f32,
    /// Position de la frame dans l'enregistrement (ms).
    pub timestamp_ms: f64,
}

impl FrameReading {
    /// `true` si une F0 valide a été détectée sur cette frame.
    #[inline]
    #[must_use]
    pub fn is_voiced(&self) -> bool {
        self.pitch.is_some()
    }
}
