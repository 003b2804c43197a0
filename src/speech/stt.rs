//! Whisper-backed speech recognition
//!
//! Capture runs on the cpal callback thread, segmentation on a dedicated
//! thread (resample to 16 kHz, Silero VAD, phrase detection) and decoding on
//! a long-lived transcription worker that owns the whisper context.

use crate::audio::vad::VAD_FRAME;
use crate::audio::{normalize_peak, AudioInput, AudioResampler, SpeechSegmenter, VoiceActivityDetector};
use crate::speech::config::SpeechInputConfig;
use crate::speech::input::{SpeechEvent, SpeechRecognizer};
use crate::{Result, VocalisError};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

const WHISPER_RATE: u32 = 16000;

/// Loaded whisper model
pub struct WhisperEngine {
    config: SpeechInputConfig,
    context: WhisperContext,
}

impl WhisperEngine {
    pub fn new(config: SpeechInputConfig) -> Result<Self> {
        info!("Loading Whisper model from: {:?}", config.model_path);

        if !config.model_path.exists() {
            return Err(VocalisError::ModelLoadError(format!(
                "Model file not found: {:?}",
                config.model_path
            )));
        }

        let path = config
            .model_path
            .to_str()
            .ok_or_else(|| VocalisError::ModelLoadError("Invalid model path".to_string()))?;

        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| {
                VocalisError::ModelLoadError(format!("Failed to load Whisper model: {:?}", e))
            })?;

        info!("Whisper model loaded");
        Ok(Self { config, context })
    }

    /// Decode 16 kHz mono samples to text
    pub fn transcribe(&self, samples: &[f32]) -> Result<String> {
        if samples.is_empty() {
            return Err(VocalisError::TranscriptionError("Empty audio segment".into()));
        }

        debug!(
            "Transcribing {:.2}s of audio",
            samples.len() as f32 / WHISPER_RATE as f32
        );

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.config.n_threads);
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        if let Some(ref lang) = self.config.language {
            params.set_language(Some(lang));
        }

        let mut state = self.context.create_state().map_err(|e| {
            VocalisError::TranscriptionError(format!("Failed to create state: {:?}", e))
        })?;

        state.full(params, samples).map_err(|e| {
            VocalisError::TranscriptionError(format!("Transcription failed: {:?}", e))
        })?;

        let segments = state.full_n_segments().map_err(|e| {
            VocalisError::TranscriptionError(format!("Failed to get segments: {:?}", e))
        })?;

        let mut text = String::new();
        for i in 0..segments {
            let segment = state.full_get_segment_text(i).map_err(|e| {
                VocalisError::TranscriptionError(format!("Failed to get segment text: {:?}", e))
            })?;
            text.push_str(&segment);
        }

        Ok(text.trim().to_string())
    }
}

/// Microphone recognizer built from cpal, Silero VAD and whisper
pub struct WhisperRecognizer {
    config: SpeechInputConfig,
    available: bool,
    event_tx: Sender<SpeechEvent>,
    event_rx: Receiver<SpeechEvent>,
    phrase_tx: Sender<Vec<f32>>,
    input: Option<AudioInput>,
    listening: Arc<AtomicBool>,
    generation: SessionGeneration,
}

/// Counter of segmenter sessions; only the newest may report `Stopped`
#[derive(Clone, Default)]
struct SessionGeneration {
    current: Arc<Mutex<u64>>,
}

impl SessionGeneration {
    /// Supersede every earlier session and return the new session's number
    fn advance(&self) -> u64 {
        let mut current = self.current.lock();
        *current += 1;
        *current
    }

    /// Send `Stopped` unless a newer session has started since `generation`
    fn finish(&self, generation: u64, event_tx: &Sender<SpeechEvent>) -> bool {
        // Held across the send so a newer `Started` cannot slip in between
        let current = self.current.lock();
        if *current != generation {
            debug!("Session {} superseded by {}, not reporting stop", generation, *current);
            return false;
        }
        let _ = event_tx.send(SpeechEvent::Stopped);
        true
    }
}

impl WhisperRecognizer {
    /// Probe the model and device and start the transcription worker
    pub fn new(config: SpeechInputConfig) -> Self {
        let (event_tx, event_rx) = unbounded();
        let (phrase_tx, phrase_rx) = unbounded();

        let available = config.model_path.exists() && AudioInput::device_present();
        if available {
            spawn_transcriber(config.clone(), phrase_rx, event_tx.clone());
        } else {
            warn!(
                "Speech recognition unavailable (model {:?}, input device present: {})",
                config.model_path,
                AudioInput::device_present()
            );
        }

        Self {
            config,
            available,
            event_tx,
            event_rx,
            phrase_tx,
            input: None,
            listening: Arc::new(AtomicBool::new(false)),
            generation: SessionGeneration::default(),
        }
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self, continuous: bool) -> Result<()> {
        if !self.available {
            return Err(VocalisError::AudioDeviceError(
                "Speech recognition is unavailable".into(),
            ));
        }

        self.stop();

        let mut input = AudioInput::new()?;
        let (audio_tx, audio_rx) = bounded(64);
        let device_rate = input.sample_rate();
        input.start(audio_tx)?;

        // A fresh flag per session so a lingering segmenter cannot be revived
        let listening = Arc::new(AtomicBool::new(true));
        self.listening = Arc::clone(&listening);
        let generation = self.generation.advance();

        let session = SegmenterSession {
            config: self.config.clone(),
            device_rate,
            continuous,
            listening,
            generation,
            sessions: self.generation.clone(),
            phrase_tx: self.phrase_tx.clone(),
            event_tx: self.event_tx.clone(),
        };

        thread::Builder::new()
            .name("speech-segmenter".into())
            .spawn(move || session.run(audio_rx))
            .map_err(|e| VocalisError::ChannelError(format!("Failed to spawn segmenter: {}", e)))?;

        self.input = Some(input);
        let _ = self.event_tx.send(SpeechEvent::Started);
        Ok(())
    }

    fn stop(&mut self) {
        self.listening.store(false, Ordering::SeqCst);
        if let Some(mut input) = self.input.take() {
            input.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn events(&self) -> Receiver<SpeechEvent> {
        self.event_rx.clone()
    }
}

impl Drop for WhisperRecognizer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SegmenterSession {
    config: SpeechInputConfig,
    device_rate: u32,
    continuous: bool,
    listening: Arc<AtomicBool>,
    generation: u64,
    sessions: SessionGeneration,
    phrase_tx: Sender<Vec<f32>>,
    event_tx: Sender<SpeechEvent>,
}

impl SegmenterSession {
    fn run(self, audio_rx: Receiver<Vec<f32>>) {
        if let Err(e) = self.segment(audio_rx) {
            error!("Speech segmentation failed: {}", e);
            let _ = self.event_tx.send(SpeechEvent::Error(e.to_string()));
        }
        self.listening.store(false, Ordering::SeqCst);
        self.sessions.finish(self.generation, &self.event_tx);
    }

    fn segment(&self, audio_rx: Receiver<Vec<f32>>) -> Result<()> {
        let mut resampler = if self.device_rate != WHISPER_RATE {
            Some(AudioResampler::new(self.device_rate, WHISPER_RATE, 1)?)
        } else {
            None
        };
        let mut vad = VoiceActivityDetector::new(self.config.vad_threshold)?;
        let mut segmenter = SpeechSegmenter::new(self.config.segmenter_config());
        let mut pending: Vec<f32> = Vec::new();

        while self.listening.load(Ordering::SeqCst) {
            let chunk = match audio_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            match resampler.as_mut() {
                Some(r) => pending.extend(r.push(&chunk)?),
                None => pending.extend(chunk),
            }

            while pending.len() >= VAD_FRAME {
                let frame: Vec<f32> = pending.drain(..VAD_FRAME).collect();
                let is_speech = vad.is_speech(&frame);

                if let Some(phrase) = segmenter.push(&frame, is_speech) {
                    self.phrase_tx.send(phrase).map_err(|e| {
                        VocalisError::ChannelError(format!("Transcriber gone: {}", e))
                    })?;

                    if !self.continuous {
                        debug!("Single phrase captured, stopping");
                        return Ok(());
                    }
                }
            }
        }

        Ok(())
    }
}

fn spawn_transcriber(config: SpeechInputConfig, phrase_rx: Receiver<Vec<f32>>, event_tx: Sender<SpeechEvent>) {
    let spawned = thread::Builder::new()
        .name("whisper-transcriber".into())
        .spawn(move || {
            let engine = match WhisperEngine::new(config) {
                Ok(engine) => engine,
                Err(e) => {
                    error!("Failed to initialize Whisper engine: {}", e);
                    let _ = event_tx.send(SpeechEvent::Error(e.to_string()));
                    return;
                }
            };

            while let Ok(mut phrase) = phrase_rx.recv() {
                normalize_peak(&mut phrase, 0.9);
                match engine.transcribe(&phrase) {
                    Ok(text) if !text.is_empty() => {
                        if event_tx.send(SpeechEvent::Phrase(text)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => debug!("Phrase decoded to nothing"),
                    Err(e) => {
                        warn!("Transcription error: {}", e);
                        let _ = event_tx.send(SpeechEvent::Error(e.to_string()));
                    }
                }
            }

            info!("Transcription worker stopped");
        });

    if let Err(e) = spawned {
        error!("Failed to spawn transcription worker: {}", e);
    }
}
