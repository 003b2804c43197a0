use crate::{Result, VocalisError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info};

/// Mono samples waiting to be played, shared with the device callback
#[derive(Clone, Default)]
pub struct PlaybackQueue {
    samples: Arc<Mutex<VecDeque<f32>>>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, samples: &[f32]) {
        self.samples.lock().extend(samples.iter().copied());
    }

    /// Drop everything not yet played
    pub fn clear(&self) {
        self.samples.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// Fill an interleaved device buffer, padding with silence
    fn fill(&self, data: &mut [f32], channels: usize) {
        let mut queue = self.samples.lock();
        for frame in data.chunks_mut(channels) {
            let sample = queue.pop_front().unwrap_or(0.0);
            frame.fill(sample);
        }
    }
}

/// Speaker output that plays whatever is pushed into its [`PlaybackQueue`]
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    queue: PlaybackQueue,
}

impl AudioOutput {
    /// Open the default output device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| VocalisError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| {
                VocalisError::AudioDeviceError(format!("Failed to get output config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            queue: PlaybackQueue::new(),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn queue(&self) -> PlaybackQueue {
        self.queue.clone()
    }

    /// Start the device stream; it idles on silence until samples arrive
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let queue = self.queue.clone();

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| queue.fill(data, channels),
                |err| error!("Audio output stream error: {}", err),
                None,
            )
            .map_err(|e| {
                VocalisError::AudioDeviceError(format!("Failed to build output stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            VocalisError::AudioDeviceError(format!("Failed to start output stream: {}", e))
        })?;

        self.stream = Some(stream);
        info!("Audio playback started ({} Hz)", self.sample_rate());
        Ok(())
    }

    pub fn stop(&mut self) {
        self.queue.clear();
        if self.stream.take().is_some() {
            info!("Audio playback stopped");
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_duplicates_mono_and_pads() {
        let queue = PlaybackQueue::new();
        queue.enqueue(&[0.1, 0.2]);

        let mut data = [1.0f32; 6];
        queue.fill(&mut data, 2);

        assert_eq!(data, [0.1, 0.1, 0.2, 0.2, 0.0, 0.0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_drops_pending_audio() {
        let queue = PlaybackQueue::new();
        let shared = queue.clone();
        queue.enqueue(&[0.5; 100]);
        assert_eq!(shared.len(), 100);

        shared.clear();
        assert!(queue.is_empty());
    }
}
