use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Horloge d'enregistrement dérivée des échantillons consommés.
///
/// Le graphe d'analyse avance `sample_pos` à chaque lecture du stream.
/// Les timestamps des frames en découlent, ce qui rend une analyse offline
/// (fichier décodé en une passe) identique à une session live.
///
/// Tous les champs sont atomiques : partageable via `Arc` avec l'UI.
///
/// # Example
/// ```
/// use vm_core::clock::StreamClock;
/// let clock = StreamClock::new(16_000);
/// clock.advance(8_000);
/// assert!((clock.pos_secs() - 0.5).abs() < 1e-9);
/// ```
pub struct StreamClock {
    /// Échantillons consommés depuis le dernier `reset`.
    sample_pos: AtomicUsize,
    /// Sample rate du stream connecté.
    sample_rate: AtomicU32,
}

impl StreamClock {
    /// Crée une horloge à zéro.
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_pos: AtomicUsize::new(0),
            sample_rate: AtomicU32::new(sample_rate),
        }
    }

    /// Position courante en secondes.
    #[inline]
    #[must_use]
    pub fn pos_secs(&self) -> f64 {
        let rate = self.sample_rate.load(Ordering::Relaxed);
        if rate == 0 {
            return 0.0;
        }
        self.sample_pos.load(Ordering::Relaxed) as f64 / f64::from(rate)
    }

    /// Position courante en millisecondes.
    #[inline]
    #[must_use]
    pub fn pos_ms(&self) -> f64 {
        self.pos_secs() * 1000.0
    }

    /// Avance de `samples` échantillons.
    #[inline]
    pub fn advance(&self, samples: usize) {
        self.sample_pos.fetch_add(samples, Ordering::Relaxed);
    }

    /// Position courante en samples.
    #[inline]
    #[must_use]
    pub fn sample_pos(&self) -> usize {
        self.sample_pos.load(Ordering::Relaxed)
    }

    /// Met à jour le sample rate (au branchement d'un stream).
    #[inline]
    pub fn set_sample_rate(&self, rate: u32) {
        self.sample_rate.store(rate, Ordering::Relaxed);
    }

    /// Sample rate courant.
    #[inline]
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Relaxed)
    }

    /// Remet la position à zéro.
    #[inline]
    pub fn reset(&self) {
        self.sample_pos.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_basic_operations() {
        let clock = StreamClock::new(48000);
        assert_eq!(clock.sample_pos(), 0);

        clock.advance(24000);
        clock.advance(24000);
        assert!((clock.pos_secs() - 1.0).abs() < 0.001);
        assert!((clock.pos_ms() - 1000.0).abs() < 0.001);

        clock.set_sample_rate(16000);
        assert_eq!(clock.sample_rate(), 16000);
        assert!((clock.pos_secs() - 3.0).abs() < 0.001);

        clock.reset();
        assert_eq!(clock.sample_pos(), 0);
    }

    #[test]
    fn clock_zero_sample_rate() {
        let clock = StreamClock::new(0);
        clock.advance(100);
        assert_eq!(clock.pos_secs(), 0.0);
    }
}
