//! Splits a stream of classified audio frames into spoken phrases

use tracing::debug;

/// Timing thresholds for phrase detection
#[derive(Clone, Debug)]
pub struct SegmenterConfig {
    /// Sample rate of the incoming frames
    pub sample_rate: u32,

    /// Phrases shorter than this are dropped (seconds)
    pub min_segment_secs: f32,

    /// A phrase is cut once it grows this long (seconds)
    pub max_segment_secs: f32,

    /// Trailing silence that ends a phrase (seconds)
    pub silence_secs: f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            min_segment_secs: 0.5,
            max_segment_secs: 30.0,
            silence_secs: 0.8,
        }
    }
}

/// Accumulates speech frames and emits one buffer per phrase
///
/// The detector decision for each frame is made by the caller so the
/// segmentation logic stays independent of any particular VAD model.
pub struct SpeechSegmenter {
    config: SegmenterConfig,
    buffer: Vec<f32>,
    in_speech: bool,
    silence_secs: f32,
}

impl SpeechSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            in_speech: false,
            silence_secs: 0.0,
        }
    }

    /// Feed one frame; returns a finished phrase when one ends
    pub fn push(&mut self, frame: &[f32], is_speech: bool) -> Option<Vec<f32>> {
        let frame_secs = frame.len() as f32 / self.config.sample_rate as f32;

        if is_speech {
            if !self.in_speech {
                debug!("Speech started");
                self.in_speech = true;
                self.buffer.clear();
            }
            self.buffer.extend_from_slice(frame);
            self.silence_secs = 0.0;

            if self.buffered_secs() >= self.config.max_segment_secs {
                debug!("Maximum phrase length reached");
                return self.finish();
            }
            return None;
        }

        if !self.in_speech {
            return None;
        }

        self.buffer.extend_from_slice(frame);
        self.silence_secs += frame_secs;

        if self.silence_secs < self.config.silence_secs {
            return None;
        }

        if self.buffered_secs() >= self.config.min_segment_secs {
            self.finish()
        } else {
            debug!("Phrase too short ({:.2}s), discarding", self.buffered_secs());
            self.reset();
            None
        }
    }

    /// Whether a phrase is currently being collected
    pub fn in_speech(&self) -> bool {
        self.in_speech
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.in_speech = false;
        self.silence_secs = 0.0;
    }

    fn finish(&mut self) -> Option<Vec<f32>> {
        let phrase = std::mem::take(&mut self.buffer);
        self.reset();
        Some(phrase)
    }

    fn buffered_secs(&self) -> f32 {
        self.buffer.len() as f32 / self.config.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: usize = 512;

    fn segmenter() -> SpeechSegmenter {
        SpeechSegmenter::new(SegmenterConfig {
            sample_rate: 16000,
            min_segment_secs: 0.1,
            max_segment_secs: 1.0,
            silence_secs: 0.1,
        })
    }

    #[test]
    fn test_silence_only_yields_nothing() {
        let mut seg = segmenter();
        for _ in 0..50 {
            assert!(seg.push(&[0.0; FRAME], false).is_none());
        }
        assert!(!seg.in_speech());
    }

    #[test]
    fn test_phrase_ends_after_trailing_silence() {
        let mut seg = segmenter();
        for _ in 0..10 {
            assert!(seg.push(&[0.5; FRAME], true).is_none());
        }
        assert!(seg.in_speech());

        let mut phrase = None;
        for _ in 0..10 {
            if let Some(p) = seg.push(&[0.0; FRAME], false) {
                phrase = Some(p);
                break;
            }
        }

        let phrase = phrase.expect("phrase should end");
        assert!(phrase.len() >= 10 * FRAME);
        assert!(!seg.in_speech());
    }

    #[test]
    fn test_short_blip_is_discarded() {
        let mut seg = segmenter();
        seg.push(&[0.5; FRAME], true);
        for _ in 0..10 {
            assert!(seg.push(&[0.0; FRAME], false).is_none());
        }
        assert!(!seg.in_speech());
    }

    #[test]
    fn test_long_speech_is_cut() {
        let mut seg = segmenter();
        let mut cuts = 0;
        for _ in 0..70 {
            if seg.push(&[0.5; FRAME], true).is_some() {
                cuts += 1;
            }
        }
        assert_eq!(cuts, 2);
    }
}
