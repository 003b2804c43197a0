//! Audio plumbing shared by the speech engines
//!
//! Device access (cpal) is behind the `audio-io` feature; the sample-rate
//! conversion and phrase segmentation are plain functions over `f32` buffers.

#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod resampler;
pub mod segmenter;
#[cfg(feature = "whisper")]
pub mod vad;

#[cfg(feature = "audio-io")]
pub use input::AudioInput;
#[cfg(feature = "audio-io")]
pub use output::{AudioOutput, PlaybackQueue};
pub use resampler::{resample_audio, AudioResampler};
pub use segmenter::{SegmenterConfig, SpeechSegmenter};
#[cfg(feature = "whisper")]
pub use vad::VoiceActivityDetector;

/// Average interleaved frames down to a single channel
pub fn downmix_to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }

    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Scale a clip so its loudest sample reaches `target` (no-op on silence)
pub fn normalize_peak(samples: &mut [f32], target: f32) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > f32::EPSILON {
        let gain = target / peak;
        samples.iter_mut().for_each(|s| *s *= gain);
    }
}
