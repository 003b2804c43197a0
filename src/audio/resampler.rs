use crate::{Result, VocalisError};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Frames per channel handed to rubato in one call
const CHUNK_FRAMES: usize = 1024;

/// Sample rate converter for interleaved audio
///
/// `push` is for live capture: input is buffered and only whole chunks are
/// converted, so no padding is inserted mid-stream. `resample` converts a
/// complete clip and pads its final chunk.
pub struct AudioResampler {
    resampler: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
    channels: usize,
    pending: Vec<f32>,
}

impl AudioResampler {
    pub fn new(input_rate: u32, output_rate: u32, channels: u16) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(VocalisError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        if channels == 0 {
            return Err(VocalisError::ConfigError(
                "Number of channels must be greater than 0".into(),
            ));
        }

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let resampler = SincFixedIn::<f32>::new(
            output_rate as f64 / input_rate as f64,
            2.0,
            params,
            CHUNK_FRAMES,
            channels as usize,
        )
        .map_err(|e| {
            VocalisError::AudioProcessingError(format!("Failed to create resampler: {}", e))
        })?;

        debug!(
            "Created resampler: {} Hz -> {} Hz, {} channels",
            input_rate, output_rate, channels
        );

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            channels: channels as usize,
            pending: Vec::new(),
        })
    }

    /// Feed live audio; returns whatever whole chunks could be converted
    pub fn push(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        self.pending.extend_from_slice(input);

        let chunk_len = CHUNK_FRAMES * self.channels;
        let mut output = Vec::new();
        while self.pending.len() >= chunk_len {
            let chunk: Vec<f32> = self.pending.drain(..chunk_len).collect();
            output.extend(self.process_chunk(&chunk, CHUNK_FRAMES)?);
        }

        Ok(output)
    }

    /// Convert a complete clip
    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let total_frames = input.len() / self.channels;
        let mut output = Vec::with_capacity(
            (total_frames as f64 * self.ratio() * 1.1) as usize * self.channels,
        );

        for chunk in input.chunks(CHUNK_FRAMES * self.channels) {
            let frames = chunk.len() / self.channels;
            output.extend(self.process_chunk(chunk, frames)?);
        }

        debug!(
            "Resampled {} frames -> {} frames",
            total_frames,
            output.len() / self.channels
        );

        Ok(output)
    }

    /// Run one rubato call; `frames` real frames, the rest zero padding
    fn process_chunk(&mut self, interleaved: &[f32], frames: usize) -> Result<Vec<f32>> {
        let mut planar = vec![vec![0.0f32; CHUNK_FRAMES]; self.channels];
        for (frame_idx, frame) in interleaved.chunks(self.channels).take(frames).enumerate() {
            for (ch_idx, sample) in frame.iter().enumerate() {
                planar[ch_idx][frame_idx] = *sample;
            }
        }

        let converted = self
            .resampler
            .process(&planar, None)
            .map_err(|e| VocalisError::AudioProcessingError(format!("Resampling failed: {}", e)))?;

        let produced = converted[0].len();
        let keep = if frames < CHUNK_FRAMES {
            ((frames as f64) * self.ratio()).ceil() as usize
        } else {
            produced
        };

        let mut output = Vec::with_capacity(keep.min(produced) * self.channels);
        for frame_idx in 0..keep.min(produced) {
            for channel in &converted {
                output.push(channel[frame_idx]);
            }
        }
        Ok(output)
    }

    fn ratio(&self) -> f64 {
        self.output_rate as f64 / self.input_rate as f64
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Drop buffered input and filter state
    pub fn reset(&mut self) {
        self.pending.clear();
        self.resampler.reset();
    }
}

/// Resample a complete clip in one step
pub fn resample_audio(
    input: &[f32],
    input_rate: u32,
    output_rate: u32,
    channels: u16,
) -> Result<Vec<f32>> {
    if input_rate == output_rate || input.is_empty() {
        return Ok(input.to_vec());
    }

    let mut resampler = AudioResampler::new(input_rate, output_rate, channels)?;
    resampler.resample(input)
}
