use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};
use vm_core::traits::AudioStream;

use crate::error::AudioError;

/// Audio capture via cpal.
///
/// Writes mono f32 samples into a lock-free ring buffer. The cpal stream
/// lives on a dedicated thread for as long as this handle exists; dropping
/// the handle stops the stream and joins that thread, so the device is
/// released on every exit path.
///
/// # Example
/// ```no_run
/// use vm_audio::capture::AudioCapture;
/// let capture = AudioCapture::start_default().unwrap();
/// ```
pub struct AudioCapture {
    consumer: Consumer<f32>,
    sample_rate: u32,
    shutdown: Option<flume::Sender<()>>,
    host_thread: Option<JoinHandle<()>>,
}

type Opened = (cpal::Stream, Consumer<f32>, u32);

impl AudioCapture {
    /// Start capturing from the default input device.
    ///
    /// # Errors
    /// Returns an error if the audio device is unavailable.
    pub fn start_default() -> Result<Self> {
        let (ready_tx, ready_rx) = flume::bounded::<Result<(Consumer<f32>, u32)>>(1);
        let (shutdown_tx, shutdown_rx) = flume::bounded::<()>(1);

        let host_thread = thread::Builder::new()
            .name("vm-capture".to_string())
            .spawn(move || match open_default_input() {
                Ok((stream, consumer, sample_rate)) => {
                    if ready_tx.send(Ok((consumer, sample_rate))).is_err() {
                        return;
                    }
                    // Blocks until the handle is dropped.
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    log::info!("Capture micro libérée");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })?;

        let (consumer, sample_rate) = ready_rx
            .recv()
            .context("Le thread de capture s'est arrêté avant l'ouverture")??;

        log::info!("Capture micro démarrée @ {sample_rate}Hz");

        Ok(Self {
            consumer,
            sample_rate,
            shutdown: Some(shutdown_tx),
            host_thread: Some(host_thread),
        })
    }

    /// The sample rate of the capture stream.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn open_default_input() -> Result<Opened> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(AudioError::NoInputDevice)?;

    let config = device.default_input_config()?;
    let sample_rate = config.sample_rate().0;
    let channels = usize::from(config.channels());

    // Ring buffer: 2 seconds of audio @ sample_rate
    let buf_size = sample_rate as usize * 2;
    let (mut producer, consumer) = RingBuffer::new(buf_size);

    let stream = device.build_input_stream(
        &config.into(),
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // Downmix to mono and push into ring buffer
            for chunk in data.chunks(channels) {
                let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                let _ = producer.push(mono);
            }
        },
        |err| {
            log::error!("Audio stream error: {err}");
        },
        None,
    )?;

    stream.play()?;
    Ok((stream, consumer, sample_rate))
}

impl AudioStream for AudioCapture {
    fn read_samples(&mut self, out: &mut Vec<f32>) -> usize {
        let available = self.consumer.slots();
        out.clear();
        out.reserve(available);
        let mut count = 0;
        while let Ok(sample) = self.consumer.pop() {
            out.push(sample);
            count += 1;
        }
        count
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        // Closing the channel wakes the host thread, which drops the stream.
        self.shutdown.take();
        if let Some(handle) = self.host_thread.take()
            && handle.join().is_err()
        {
            log::error!("Le thread de capture a paniqué à la fermeture");
        }
    }
}
