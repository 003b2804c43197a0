//! Text-to-speech with sherpa-rs VITS models
//!
//! Synthesis runs on a worker thread that writes into the speaker's
//! [`PlaybackQueue`]. Every request carries the generation it was issued in;
//! `cancel` bumps the generation and clears the queue, so audio from an older
//! request is dropped instead of played.

use crate::audio::{resample_audio, AudioOutput, PlaybackQueue};
use crate::speech::config::{SpeechOutputConfig, VoiceProfile};
use crate::speech::output::{SpeechSynthesizer, Utterance, Voice};
use crate::{Result, VocalisError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

enum SynthCommand {
    Speak {
        text: String,
        voice: usize,
        rate: f32,
        volume: f32,
        generation: u64,
    },
    Shutdown,
}

/// Speaks through installed VITS voices on the default output device
pub struct VitsSynthesizer {
    voices: Vec<VoiceProfile>,
    command_tx: Sender<SynthCommand>,
    generation: Arc<AtomicU64>,
    queue: PlaybackQueue,
    _output: AudioOutput,
}

impl VitsSynthesizer {
    pub fn new(config: &SpeechOutputConfig) -> Result<Self> {
        let voices: Vec<VoiceProfile> = config
            .voices
            .iter()
            .filter(|v| v.is_installed())
            .cloned()
            .collect();

        if voices.is_empty() {
            return Err(VocalisError::ModelLoadError("No VITS voices installed".into()));
        }

        let mut output = AudioOutput::new()?;
        output.start()?;

        let queue = output.queue();
        let generation = Arc::new(AtomicU64::new(0));
        let (command_tx, command_rx) = unbounded();

        let worker = SynthWorker {
            voices: voices.clone(),
            engines: HashMap::new(),
            output_rate: output.sample_rate(),
            queue: queue.clone(),
            generation: Arc::clone(&generation),
        };
        thread::Builder::new()
            .name("vits-synthesizer".into())
            .spawn(move || worker.run(command_rx))
            .map_err(|e| VocalisError::TTSError(format!("Failed to spawn synthesizer: {}", e)))?;

        info!("VITS synthesizer ready with {} voice(s)", voices.len());

        Ok(Self {
            voices,
            command_tx,
            generation,
            queue,
            _output: output,
        })
    }
}

impl SpeechSynthesizer for VitsSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices
            .iter()
            .map(|v| Voice {
                name: v.name.clone(),
                lang: v.lang.clone(),
            })
            .collect()
    }

    fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.queue.clear();
    }

    fn speak(&mut self, text: &str, utterance: &Utterance) -> Result<()> {
        let voice = utterance
            .voice
            .as_ref()
            .and_then(|wanted| self.voices.iter().position(|v| v.name == wanted.name))
            .unwrap_or(0);

        self.command_tx
            .send(SynthCommand::Speak {
                text: text.to_string(),
                voice,
                rate: utterance.rate,
                volume: utterance.volume,
                generation: self.generation.load(Ordering::SeqCst),
            })
            .map_err(|e| VocalisError::TTSError(format!("Synthesizer gone: {}", e)))
    }
}

impl Drop for VitsSynthesizer {
    fn drop(&mut self) {
        let _ = self.command_tx.send(SynthCommand::Shutdown);
    }
}

struct SynthWorker {
    voices: Vec<VoiceProfile>,
    engines: HashMap<usize, VitsTts>,
    output_rate: u32,
    queue: PlaybackQueue,
    generation: Arc<AtomicU64>,
}

impl SynthWorker {
    fn run(mut self, command_rx: Receiver<SynthCommand>) {
        while let Ok(command) = command_rx.recv() {
            match command {
                SynthCommand::Speak {
                    text,
                    voice,
                    rate,
                    volume,
                    generation,
                } => {
                    for sentence in split_sentences(&text) {
                        if self.is_stale(generation) {
                            debug!("Dropping cancelled utterance");
                            break;
                        }
                        if let Err(e) = self.speak_sentence(sentence, voice, rate, volume, generation) {
                            warn!("Synthesis failed: {}", e);
                            break;
                        }
                    }
                }
                SynthCommand::Shutdown => break,
            }
        }
        info!("VITS synthesizer stopped");
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn speak_sentence(
        &mut self,
        sentence: &str,
        voice: usize,
        rate: f32,
        volume: f32,
        generation: u64,
    ) -> Result<()> {
        let speaker = self.voices[voice].speaker_id;
        let engine = self.engine(voice);
        let audio = engine
            .create(sentence, speaker, rate)
            .map_err(|e| VocalisError::TTSError(format!("Synthesis failed: {}", e)))?;

        let mut samples =
            resample_audio(&audio.samples, audio.sample_rate as u32, self.output_rate, 1)?;
        if volume != 1.0 {
            samples.iter_mut().for_each(|s| *s *= volume);
        }

        // Re-check after synthesis; cancel may have landed meanwhile
        if !self.is_stale(generation) {
            self.queue.enqueue(&samples);
        }
        Ok(())
    }

    fn engine(&mut self, voice: usize) -> &mut VitsTts {
        let profile = &self.voices[voice];
        self.engines.entry(voice).or_insert_with(|| {
            info!("Loading VITS voice '{}' from {:?}", profile.name, profile.model_path);
            VitsTts::new(VitsTtsConfig {
                model: path_string(&profile.model_path),
                tokens: path_string(&profile.tokens_path),
                lexicon: profile.lexicon_path.as_deref().map(path_string).unwrap_or_default(),
                data_dir: profile.data_dir.as_deref().map(path_string).unwrap_or_default(),
                length_scale: 1.0,
                noise_scale: 0.667,
                noise_scale_w: 0.8,
                ..Default::default()
            })
        })
    }
}

fn path_string(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Break text at sentence punctuation so playback can start early
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?' | '\n') {
            let end = idx + ch.len_utf8();
            let sentence = text[start..end].trim();
            if sentence.chars().any(|c| c.is_alphanumeric()) {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let rest = text[start..].trim();
    if rest.chars().any(|c| c.is_alphanumeric()) {
        sentences.push(rest);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Hello there. How are you?\nFine"),
            vec!["Hello there.", "How are you?", "Fine"]
        );
    }

    #[test]
    fn test_split_sentences_skips_punctuation_runs() {
        assert_eq!(split_sentences("Wait... what?!"), vec!["Wait.", "what?"]);
    }

    #[test]
    fn test_no_installed_voices() {
        let config = SpeechOutputConfig::default().with_voices(vec![VoiceProfile::new(
            "Ghost",
            "en-US",
            "/nonexistent/model.onnx",
            "/nonexistent/tokens.txt",
        )]);
        assert!(VitsSynthesizer::new(&config).is_err());
    }
}
