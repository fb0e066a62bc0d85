//! Ambient audio capture via cpal.
//!
//! Captures a fixed-duration sample from an input device, downmixes to mono,
//! resamples to the recognition rate (16 kHz is plenty for fingerprinting)
//! and encodes it as an in-memory WAV for API submission.

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::time::{Duration, Instant};

/// Names of the available audio input devices.
pub fn list_input_devices() -> anyhow::Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;
    Ok(devices
        .filter_map(|d| d.name().ok())
        .collect())
}

/// Captures fixed-duration samples from one input device.
#[derive(Debug, Clone)]
pub struct Sampler {
    device: Option<String>,
    sample_rate: u32,
    record_secs: u32,
}

impl Sampler {
    pub fn new(device: Option<String>, sample_rate: u32, record_secs: u32) -> Self {
        Self {
            device,
            sample_rate,
            record_secs,
        }
    }

    /// Record one sample. Blocking; run under `spawn_blocking` from async
    /// code. Fails when the device is unavailable, which the caller treats
    /// as retry-next-poll.
    pub fn capture(&self) -> anyhow::Result<Vec<i16>> {
        let host = cpal::default_host();
        let device = match &self.device {
            Some(name) => host
                .input_devices()
                .context("enumerate input devices")?
                .find(|d| d.name().map(|n| n == *name).unwrap_or(false))
                .with_context(|| format!("input device not found: {name}"))?,
            None => host
                .default_input_device()
                .context("no default input device")?,
        };

        let config = device
            .default_input_config()
            .context("query input config")?;
        let channels = config.channels() as usize;
        let native_rate = config.sample_rate().0;

        let (tx, rx) = std::sync::mpsc::channel::<Vec<f32>>();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _| {
                    let _ = tx.send(data.to_vec());
                },
                |e| tracing::warn!("input stream error: {e}"),
                None,
            ),
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _| {
                    let _ = tx.send(data.iter().map(|&s| s as f32 / 32768.0).collect());
                },
                |e| tracing::warn!("input stream error: {e}"),
                None,
            ),
            other => anyhow::bail!("unsupported input sample format: {other:?}"),
        }
        .context("build input stream")?;

        stream.play().context("start input stream")?;

        let wanted_frames = (native_rate as u64 * self.record_secs as u64) as usize;
        let deadline = Instant::now() + Duration::from_secs(self.record_secs as u64 + 5);
        let mut interleaved: Vec<f32> = Vec::with_capacity(wanted_frames * channels);

        while interleaved.len() < wanted_frames * channels {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("audio capture timed out");
            }
            match rx.recv_timeout(remaining) {
                Ok(chunk) => interleaved.extend(chunk),
                Err(_) => anyhow::bail!("audio capture stream closed"),
            }
        }
        drop(stream);
        interleaved.truncate(wanted_frames * channels);

        let mono = downmix_mono(&interleaved, channels);
        let resampled = resample(&mono, native_rate, self.sample_rate);
        Ok(resampled
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect())
    }
}

fn downmix_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resampler. Good enough for fingerprinting input;
/// the vendor does its own filtering.
fn resample(mono: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || mono.is_empty() {
        return mono.to_vec();
    }
    let out_len = (mono.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    let step = from_rate as f64 / to_rate as f64;
    (0..out_len)
        .map(|i| {
            let src = i as f64 * step;
            let idx = src as usize;
            let frac = (src - idx as f64) as f32;
            let a = mono[idx.min(mono.len() - 1)];
            let b = mono[(idx + 1).min(mono.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}

/// Encode mono 16-bit PCM as an in-memory WAV file.
pub fn wav_bytes(samples: &[i16], sample_rate: u32) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("create wav writer")?;
        for &s in samples {
            writer.write_sample(s).context("write wav sample")?;
        }
        writer.finalize().context("finalize wav")?;
    }
    Ok(cursor.into_inner())
}

/// RMS level of a sample buffer, on the i16 scale. Used for silence
/// detection before bothering the recognition API.
pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_silence() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0, 0, 0]), 0.0);
    }

    #[test]
    fn test_rms_constant_signal() {
        let val = rms(&[1000, -1000, 1000, -1000]);
        assert!((val - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_downmix_stereo() {
        let mono = downmix_mono(&[1.0, 0.0, 0.5, 0.5], 2);
        assert_eq!(mono, vec![0.5, 0.5]);
    }

    #[test]
    fn test_resample_halves_length() {
        let mono: Vec<f32> = (0..32_000).map(|i| (i % 100) as f32 / 100.0).collect();
        let out = resample(&mono, 32_000, 16_000);
        assert_eq!(out.len(), 16_000);
    }

    #[test]
    fn test_wav_header() {
        let wav = wav_bytes(&[0i16; 160], 16_000).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 160 samples * 2 bytes of data somewhere past the 44-byte header.
        assert!(wav.len() >= 44 + 320);
    }
}
