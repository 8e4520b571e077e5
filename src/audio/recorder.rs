//! Microphone capture using cpal.
//!
//! The microphone is acquired when recording starts and released when the
//! handle is stopped or dropped; nothing else may hold the device while a
//! recording is live. Capture is a bounded producer: start, accumulate into
//! a shared buffer, finalize into exactly one audio attachment.

use std::fmt;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use tracing::{debug, error, info};

use crate::core::attachment::{Attachment, EncodingError};

/// Failure to acquire or run the input device.
#[derive(Debug)]
pub enum RecorderError {
    NoDevice,
    Device(String),
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderError::NoDevice => write!(f, "no default input device"),
            RecorderError::Device(detail) => write!(f, "audio input failed: {detail}"),
        }
    }
}

impl std::error::Error for RecorderError {}

/// Opens the default input device per recording. Uses the device's default
/// configuration for maximum compatibility and downmixes to mono on stop.
pub struct Recorder;

impl Recorder {
    /// Acquire the microphone and begin buffering.
    pub fn start() -> Result<RecordingHandle, RecorderError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(RecorderError::NoDevice)?;

        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!("using input device: {device_name}");

        let default_config = device
            .default_input_config()
            .map_err(|e| RecorderError::Device(format!("no default input config: {e}")))?;
        let sample_rate = default_config.sample_rate();
        let channels = default_config.channels();
        let stream_config = StreamConfig {
            channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
        let callback_buffer = Arc::clone(&buffer);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    if let Ok(mut samples) = callback_buffer.lock() {
                        samples.extend_from_slice(data);
                    }
                },
                move |err| {
                    error!("audio input stream error: {err}");
                },
                None,
            )
            .map_err(|e| RecorderError::Device(format!("failed to build input stream: {e}")))?;
        stream
            .play()
            .map_err(|e| RecorderError::Device(format!("failed to start input stream: {e}")))?;

        debug!("recording started at {}Hz, {} channels", sample_rate, channels);

        Ok(RecordingHandle {
            stream,
            buffer,
            sample_rate,
            channels,
        })
    }
}

/// A live recording. Dropping it releases the microphone without producing
/// an attachment; `stop` finalizes the buffered samples.
///
/// The cpal stream is not `Send`, so the handle must stay on the thread
/// that started it; the chat loop holds it across its own iterations only.
pub struct RecordingHandle {
    stream: cpal::Stream,
    buffer: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
    channels: u16,
}

impl RecordingHandle {
    /// Stop capture, release the microphone, and finalize the buffer into
    /// one audio attachment. An empty capture is finalized, not rejected.
    pub fn stop(self) -> Result<Attachment, EncodingError> {
        // Releasing the device before encoding keeps the mic free during the
        // Recording -> Processing transition.
        drop(self.stream);

        let samples = self
            .buffer
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        let mono = if self.channels > 1 {
            to_mono(&samples, self.channels)
        } else {
            samples
        };
        debug!("recording stopped with {} samples", mono.len());
        Attachment::from_audio(&mono, self.sample_rate)
    }
}

fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels as usize;
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_frames_average_to_mono() {
        let data = [0.2f32, 0.4, -1.0, 1.0];
        let mono = to_mono(&data, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
    }

    #[test]
    fn partial_trailing_frame_does_not_panic() {
        let data = [0.5f32, 0.5, 0.5];
        let mono = to_mono(&data, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[1] - 0.5).abs() < 1e-6);
    }
}
