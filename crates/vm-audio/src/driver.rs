use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use triple_buffer::TripleBuffer;
use vm_core::clock::StreamClock;
use vm_core::frame::FrameReading;

use crate::analyzer::SignalAnalyzer;
use crate::error::AudioError;

/// Commandes envoyées au thread d'échantillonnage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCommand {
    /// Phase boundary: clear the analyzer's buffers.
    Reset,
    /// Label the following samples.
    Tag(String),
    /// Stop recording and hand the analyzer back.
    Stop,
}

/// Thread d'échantillonnage : un `collect_sample` par tick.
///
/// Le driver possède l'analyseur pendant toute la session ; `stop` rejoint
/// le thread et le rend. Aucun autre code ne peut donc lire les buffers
/// pendant l'échantillonnage. La dernière frame non silencieuse est publiée
/// via un triple buffer (vumètre live).
pub struct SamplingDriver {
    commands: flume::Sender<DriverCommand>,
    readings: triple_buffer::Output<FrameReading>,
    clock: Arc<StreamClock>,
    handle: Option<JoinHandle<Result<SignalAnalyzer, AudioError>>>,
}

impl SamplingDriver {
    /// Move `analyzer` into a new thread ticking `tick_rate` times per second.
    ///
    /// The analyzer should already be started; an idle analyzer is simply
    /// held until `stop`.
    ///
    /// # Errors
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(analyzer: SignalAnalyzer, tick_rate: u32) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = flume::unbounded();
        let (mut buf_input, buf_output) = TripleBuffer::new(&FrameReading::default()).split();
        let clock = analyzer.clock();

        let handle = thread::Builder::new()
            .name("vm-sampling".to_string())
            .spawn(move || run_sampling_loop(analyzer, tick_rate, &cmd_rx, &mut buf_input))?;

        log::info!("Driver d'échantillonnage démarré @ {tick_rate} ticks/s");

        Ok(Self {
            commands: cmd_tx,
            readings: buf_output,
            clock,
            handle: Some(handle),
        })
    }

    /// Queue a command for the next tick.
    pub fn send(&self, cmd: DriverCommand) {
        if self.commands.send(cmd).is_err() {
            log::warn!("Driver déjà arrêté, commande ignorée");
        }
    }

    /// Most recent non-silent reading (default before the first one).
    pub fn latest_reading(&mut self) -> FrameReading {
        *self.readings.read()
    }

    /// Recording position in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.pos_secs()
    }

    /// `true` while the sampling thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop sampling, join the thread and return the analyzer.
    ///
    /// # Errors
    /// The first sampling error, or [`AudioError::DriverPanicked`].
    pub fn stop(mut self) -> Result<SignalAnalyzer, AudioError> {
        self.join()
    }

    fn join(&mut self) -> Result<SignalAnalyzer, AudioError> {
        let _ = self.commands.send(DriverCommand::Stop);
        let handle = self.handle.take().ok_or(AudioError::DriverPanicked)?;
        handle.join().map_err(|_| AudioError::DriverPanicked)?
    }
}

impl Drop for SamplingDriver {
    fn drop(&mut self) {
        if self.handle.is_some()
            && let Err(e) = self.join()
        {
            log::error!("Arrêt du driver : {e}");
        }
    }
}

fn run_sampling_loop(
    mut analyzer: SignalAnalyzer,
    tick_rate: u32,
    cmd_rx: &flume::Receiver<DriverCommand>,
    buf_input: &mut triple_buffer::Input<FrameReading>,
) -> Result<SignalAnalyzer, AudioError> {
    let tick_period = Duration::from_secs_f64(1.0 / f64::from(tick_rate.max(1)));

    loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(DriverCommand::Reset) => analyzer.reset(),
                Ok(DriverCommand::Tag(tag)) => analyzer.set_tag(Some(tag)),
                Ok(DriverCommand::Stop) | Err(flume::TryRecvError::Disconnected) => {
                    analyzer.stop();
                    return Ok(analyzer);
                }
                Err(flume::TryRecvError::Empty) => break,
            }
        }

        if analyzer.is_recording()
            && let Some(reading) = analyzer.collect_sample()?
        {
            buf_input.write(reading);
        }

        thread::sleep(tick_period);
    }
}

#[cfg(test)]
mod tests {
    use vm_core::config::AnalyzerConfig;

    use super::*;
    use crate::stream::SampleStream;

    fn started(samples: Vec<f32>) -> SignalAnalyzer {
        let mut analyzer = SignalAnalyzer::new(AnalyzerConfig::default());
        analyzer.initialize();
        if let Err(e) = analyzer.connect_stream(SampleStream::new(samples, 16_000, 160)) {
            panic!("connect_stream: {e}");
        }
        if let Err(e) = analyzer.start() {
            panic!("start: {e}");
        }
        analyzer
    }

    fn tone() -> Vec<f32> {
        (0..16_000)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 200.0 * i as f32 / 16_000.0).sin())
            .collect()
    }

    #[test]
    fn stop_hands_the_analyzer_back() {
        let mut driver = match SamplingDriver::spawn(started(tone()), 200) {
            Ok(d) => d,
            Err(e) => panic!("spawn: {e}"),
        };
        driver.send(DriverCommand::Tag("solo".into()));
        thread::sleep(Duration::from_millis(150));
        assert!(driver.latest_reading().rms > 0.0);
        assert!(driver.elapsed_secs() > 0.0);

        let analyzer = match driver.stop() {
            Ok(a) => a,
            Err(e) => panic!("stop: {e}"),
        };
        assert!(!analyzer.is_recording());
        assert!(analyzer.samples().frame_count() > 0);
        assert!(analyzer.calculate_metrics_for_tag("solo").is_some());
    }

    #[test]
    fn idle_analyzer_is_held_untouched() {
        let mut analyzer = started(tone());
        analyzer.stop();
        let driver = match SamplingDriver::spawn(analyzer, 100) {
            Ok(d) => d,
            Err(e) => panic!("spawn: {e}"),
        };
        thread::sleep(Duration::from_millis(50));
        let analyzer = driver.stop().unwrap_or_else(|e| panic!("stop: {e}"));
        assert!(analyzer.samples().is_empty());
    }

    #[test]
    fn reset_command_clears_buffers() {
        let driver = match SamplingDriver::spawn(started(vec![0.0; 16_000]), 100) {
            Ok(d) => d,
            Err(e) => panic!("spawn: {e}"),
        };
        driver.send(DriverCommand::Tag("a".into()));
        driver.send(DriverCommand::Reset);
        let analyzer = driver.stop().unwrap_or_else(|e| panic!("stop: {e}"));
        assert_eq!(analyzer.current_tag(), None);
        assert!(analyzer.tagged_samples().is_empty());
    }
}
