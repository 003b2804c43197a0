use crate::{Result, VocalisError};
use tracing::info;
use voice_activity_detector::VoiceActivityDetector as SileroDetector;

/// Frame length Silero expects at 16 kHz (32 ms)
pub const VAD_FRAME: usize = 512;

/// Silero voice activity detector over 16 kHz mono frames
pub struct VoiceActivityDetector {
    detector: SileroDetector,
    threshold: f32,
}

impl VoiceActivityDetector {
    pub fn new(threshold: f32) -> Result<Self> {
        let detector = SileroDetector::builder()
            .sample_rate(16000)
            .chunk_size(VAD_FRAME)
            .build()
            .map_err(|e| {
                VocalisError::AudioProcessingError(format!("Failed to create VAD: {:?}", e))
            })?;

        info!("Voice activity detector ready (threshold {})", threshold);

        Ok(Self {
            detector,
            threshold: threshold.clamp(0.0, 1.0),
        })
    }

    pub fn is_speech(&mut self, frame: &[f32]) -> bool {
        self.detector.predict(frame.iter().copied()) >= self.threshold
    }

    pub fn reset(&mut self) {
        self.detector.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_not_speech() {
        if let Ok(mut vad) = VoiceActivityDetector::new(0.5) {
            assert!(!vad.is_speech(&[0.0; VAD_FRAME]));
        }
    }
}
