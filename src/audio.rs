use std::fs;
use std::path::Path;

use crate::error::PipelineError;

/// Sample rate produced by the synthesis backends.
pub const SAMPLE_RATE: u32 = 24000;

/// Mono f32 audio at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio (24000 for the bundled voice families)
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Append `other` to this buffer. Fails if the sample rates differ.
    pub fn append(&mut self, other: &AudioBuffer) -> Result<(), u32> {
        if other.sample_rate != self.sample_rate {
            return Err(other.sample_rate);
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Concatenate buffers in order into one buffer at `sample_rate`.
    ///
    /// On a sample-rate mismatch, returns the position and rate of the first
    /// offending buffer.
    pub fn concat<'a, I>(sample_rate: u32, buffers: I) -> Result<AudioBuffer, (usize, u32)>
    where
        I: IntoIterator<Item = &'a AudioBuffer>,
    {
        let mut combined = AudioBuffer::empty(sample_rate);
        for (i, buffer) in buffers.into_iter().enumerate() {
            combined.append(buffer).map_err(|rate| (i, rate))?;
        }
        Ok(combined)
    }

    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

/// Final destination for a run's audio. Called once, only on success.
pub trait AudioSink: Send + Sync {
    /// Persist `audio` at `destination`.
    ///
    /// `scratch` is a run-owned directory on the same filesystem as the
    /// destination that is removed after the run, whatever the outcome.
    fn write(&self, audio: &AudioBuffer, destination: &Path, scratch: &Path)
        -> Result<(), PipelineError>;
}

/// Writes a WAV file into the scratch directory and renames it into place,
/// so the destination never holds a partial file.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavFileSink;

impl AudioSink for WavFileSink {
    fn write(
        &self,
        audio: &AudioBuffer,
        destination: &Path,
        scratch: &Path,
    ) -> Result<(), PipelineError> {
        let staged = scratch.join("output.wav");
        audio.write_wav(&staged)?;
        fs::rename(&staged, destination)?;
        log::info!(
            "Wrote {:.2}s of audio to {}",
            audio.duration_secs(),
            destination.display()
        );
        Ok(())
    }
}
