use crate::audio::downmix_to_mono;
use crate::{Result, VocalisError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Microphone capture delivering mono chunks at the device rate
pub struct AudioInput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    capturing: Arc<Mutex<bool>>,
}

impl AudioInput {
    /// Open the default input device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| VocalisError::AudioDeviceError("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| {
                VocalisError::AudioDeviceError(format!("Failed to get input config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            capturing: Arc::new(Mutex::new(false)),
        })
    }

    /// True when the host reports a default input device
    pub fn device_present() -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start the stream; chunks that do not fit in `audio_tx` are dropped
    pub fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if *self.capturing.lock() {
            warn!("Capture already running");
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let capturing = Arc::clone(&self.capturing);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !*capturing.lock() {
                        return;
                    }

                    if let Err(e) = audio_tx.try_send(downmix_to_mono(data, channels)) {
                        debug!("Dropped capture chunk: {}", e);
                    }
                },
                |err| error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| {
                VocalisError::AudioDeviceError(format!("Failed to build input stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            VocalisError::AudioDeviceError(format!("Failed to start input stream: {}", e))
        })?;

        *self.capturing.lock() = true;
        self.stream = Some(stream);

        info!("Microphone capture started ({} Hz)", self.sample_rate());
        Ok(())
    }

    pub fn stop(&mut self) {
        *self.capturing.lock() = false;

        if self.stream.take().is_some() {
            info!("Microphone capture stopped");
        }
    }

    pub fn is_capturing(&self) -> bool {
        *self.capturing.lock()
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        self.stop();
    }
}
