//! Audio capture from microphone

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::{Error, Result};

/// Sample rate sent to the transcriber (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Source of fixed-length audio clips
pub trait Recorder {
    /// Record `duration` of audio, blocking until done
    ///
    /// # Errors
    ///
    /// Returns error if the input device cannot be opened or fails mid-capture
    fn record(&mut self, duration: Duration) -> Result<AudioClip>;
}

/// Mono audio captured for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    #[must_use]
    pub const fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the clip
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// RMS energy over the whole clip
    #[must_use]
    pub fn rms(&self) -> f32 {
        calculate_rms(&self.samples)
    }

    /// Encode as 16-bit mono PCM WAV
    ///
    /// # Errors
    ///
    /// Returns error if WAV encoding fails
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        samples_to_wav(&self.samples, self.sample_rate)
    }

    /// Write the clip to `path` as WAV, replacing any previous file
    ///
    /// # Errors
    ///
    /// Returns error if encoding or the write fails
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_wav()?)?;
        Ok(())
    }
}

/// Captures fixed-length clips from the default input device
///
/// The input stream is opened for each clip and dropped as soon as the
/// clip is complete, so the device is only held while recording.
pub struct AudioCapture {
    config: StreamConfig,
}

impl AudioCapture {
    /// Probe the default input device
    ///
    /// Prefers a mono 16kHz stream; otherwise records at the device's
    /// default config and converts afterwards.
    ///
    /// # Errors
    ///
    /// Returns error if no input device is available
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let native = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .map(|c| c.with_sample_rate(SampleRate(SAMPLE_RATE)).config());

        let config = match native {
            Some(config) => config,
            None => device
                .default_input_config()
                .map_err(|e| Error::Audio(format!("no suitable audio config found: {e}")))?
                .config(),
        };

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "audio capture initialized"
        );

        Ok(Self { config })
    }

    /// Rate the device records at before conversion
    #[must_use]
    pub const fn device_sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }
}

impl Recorder for AudioCapture {
    fn record(&mut self, duration: Duration) -> Result<AudioClip> {
        let buffer = Arc::new(Mutex::new(Vec::new()));

        {
            let host = cpal::default_host();
            let device = host
                .default_input_device()
                .ok_or_else(|| Error::Audio("no input device".to_string()))?;

            let sink = Arc::clone(&buffer);
            let stream = device
                .build_input_stream(
                    &self.config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if let Ok(mut buf) = sink.lock() {
                            buf.extend_from_slice(data);
                        }
                    },
                    |err| {
                        tracing::error!(error = %err, "audio capture error");
                    },
                    None,
                )
                .map_err(|e| Error::Audio(e.to_string()))?;

            stream.play().map_err(|e| Error::Audio(e.to_string()))?;
            tracing::debug!(secs = duration.as_secs_f32(), "audio capture started");

            std::thread::sleep(duration);

            // Dropping the stream releases the device
            drop(stream);
            tracing::debug!("audio capture stopped");
        }

        let raw = buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        let mono = downmix(&raw, usize::from(self.config.channels));
        let samples = if self.config.sample_rate.0 == SAMPLE_RATE {
            mono
        } else {
            resample(&mono, self.config.sample_rate.0, SAMPLE_RATE)?
        };

        Ok(AudioClip::new(samples, SAMPLE_RATE))
    }
}

/// Average interleaved frames down to one channel
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Resample mono audio using rubato
///
/// # Errors
///
/// Returns error if the resampler cannot be built or fails
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    use rubato::{FftFixedIn, Resampler};

    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f64>::new(from_rate as usize, to_rate as usize, 1024, 2, 1)
        .map_err(|e| Error::Audio(format!("resampler init failed: {e}")))?;

    let chunk_size = resampler.input_frames_next();
    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * f64::from(to_rate) / f64::from(from_rate)) as usize;

    let input: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
    let mut output = Vec::with_capacity(delay + expected + chunk_size);

    let mut process = |block: Vec<f64>, output: &mut Vec<f64>| -> Result<()> {
        let result = resampler
            .process(&[block], None)
            .map_err(|e| Error::Audio(format!("resample failed: {e}")))?;
        output.extend_from_slice(&result[0]);
        Ok(())
    };

    for chunk in input.chunks(chunk_size) {
        // Pad the tail so the last partial chunk is not dropped
        let mut block = chunk.to_vec();
        block.resize(chunk_size, 0.0);
        process(block, &mut output)?;
    }

    // Flush the filter delay
    while output.len() < delay + expected {
        process(vec![0.0; chunk_size], &mut output)?;
    }

    output.drain(..delay);
    output.truncate(expected);
    Ok(output.iter().map(|&s| s as f32).collect())
}

/// Calculate RMS energy
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer.write_sample(sample_i16)?;
        }

        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}
