//! The generation pipeline: chunk, detect, resolve, synthesize, reassemble.
//!
//! A run walks its segments strictly in order. Before each segment the
//! cancellation token is polled; once a synthesis call has started it runs to
//! completion. Any segment failure aborts the whole run, so a partially
//! synthesized file is never written. Progress and the terminal status are
//! published on an [`mpsc`](std::sync::mpsc) channel.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tempfile::TempDir;

use crate::audio::{AudioBuffer, AudioSink, WavFileSink, SAMPLE_RATE};
use crate::backend::{BackendPool, SynthesisRequest};
use crate::cancel::CancellationToken;
use crate::chunker::{self, TextSegment};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::language::{self, LanguageCode};
use crate::request::{output_dir, validate_preview, GenerationRequest};
use crate::voices;

/// Prefix of the per-run scratch directory created next to the output file.
pub const SCRATCH_PREFIX: &str = ".tts_temp";

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Cancelled,
    Failed,
}

/// Progress after a segment has been synthesized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub segment_index: usize,
    pub total_segments: usize,
    pub percent_complete: f64,
    pub elapsed_secs: f64,
    pub estimated_remaining_secs: f64,
    pub language: LanguageCode,
    pub voice: String,
}

impl ProgressUpdate {
    fn after_segment(
        segment_index: usize,
        total_segments: usize,
        elapsed: Duration,
        language: LanguageCode,
        voice: &str,
    ) -> Self {
        let processed = segment_index + 1;
        let elapsed_secs = elapsed.as_secs_f64();
        Self {
            segment_index,
            total_segments,
            percent_complete: processed as f64 / total_segments as f64 * 100.0,
            elapsed_secs,
            estimated_remaining_secs: estimate_remaining(
                elapsed_secs,
                processed,
                total_segments.saturating_sub(processed),
            ),
            language,
            voice: voice.to_string(),
        }
    }
}

/// Average time per processed segment times the segments left.
///
/// The pipeline only reports progress after a segment finishes, so it never
/// passes `processed == 0`. Callers estimating before the first segment get
/// one second per remaining segment.
pub fn estimate_remaining(elapsed_secs: f64, processed: usize, remaining: usize) -> f64 {
    let per_segment = if processed == 0 {
        1.0
    } else {
        elapsed_secs / processed as f64
    };
    per_segment * remaining as f64
}

/// Summary of a finished run, as shown to the observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub message: String,
    pub segments: usize,
    pub samples: usize,
    pub output: Option<PathBuf>,
}

impl RunReport {
    pub fn from_outcome(outcome: &Result<GeneratedAudio, PipelineError>) -> Self {
        match outcome {
            Ok(generated) => Self {
                status: RunStatus::Completed,
                message: "Audio saved successfully!".to_string(),
                segments: generated.segments,
                samples: generated.samples,
                output: Some(generated.output.clone()),
            },
            Err(err) => Self::from_error(err),
        }
    }

    pub(crate) fn from_error(err: &PipelineError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
            segments: 0,
            samples: 0,
            output: None,
        }
    }
}

/// Events published while a run is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    Started { total_segments: usize },
    Progress(ProgressUpdate),
    Finished(RunReport),
}

/// A successfully written output.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAudio {
    pub output: PathBuf,
    /// Number of segments the text was split into.
    pub segments: usize,
    pub samples: usize,
    pub sample_rate: u32,
}

impl GeneratedAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples as f64 / self.sample_rate as f64
    }
}

/// State of one run. Dropping it discards all audio and removes the scratch directory.
struct GenerationRun {
    segments: Vec<TextSegment>,
    started: Instant,
    buffers: Vec<AudioBuffer>,
    scratch: Option<TempDir>,
}

impl GenerationRun {
    fn new(segments: Vec<TextSegment>, scratch: Option<TempDir>) -> Self {
        Self {
            buffers: Vec::with_capacity(segments.len()),
            segments,
            started: Instant::now(),
            scratch,
        }
    }
}

/// Drives segments through language detection, voice resolution and the backend pool.
pub struct Pipeline {
    pool: Arc<BackendPool>,
    sink: Box<dyn AudioSink>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline writing WAV files through [`WavFileSink`].
    pub fn new(pool: Arc<BackendPool>) -> Self {
        Self {
            pool,
            sink: Box::new(WavFileSink),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_sink(mut self, sink: impl AudioSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Synthesize `request.text` and write it to the request's destination.
    ///
    /// Validation failures are returned before any event is sent. Every other
    /// outcome, including cancellation, ends with a [`PipelineEvent::Finished`].
    pub fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
        events: &Sender<PipelineEvent>,
    ) -> Result<GeneratedAudio, PipelineError> {
        let destination = request.validate()?;
        let outcome = self.generate_validated(request, &destination, cancel, events);
        emit(events, PipelineEvent::Finished(RunReport::from_outcome(&outcome)));
        outcome
    }

    fn generate_validated(
        &self,
        request: &GenerationRequest,
        destination: &Path,
        cancel: &CancellationToken,
        events: &Sender<PipelineEvent>,
    ) -> Result<GeneratedAudio, PipelineError> {
        let voice = voices::lookup_voice(&request.voice);
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(output_dir(destination))?;
        let segments = chunker::chunk(&request.text, request.max_words);
        let mut run = GenerationRun::new(segments, Some(scratch));

        log::info!(
            "Starting generation: {} segment(s), voice '{}', speed {}",
            run.segments.len(),
            voice,
            request.speed
        );
        let result = self.drive(&mut run, &voice, request.speed, cancel, events);
        if let Err(err) = &result {
            log_abort(err);
        }
        result?;

        let segments = run.segments.len();
        let audio = concat_run(&run)?;
        let scratch = run.scratch.as_ref().map(TempDir::path).unwrap_or(Path::new("."));
        self.sink.write(&audio, destination, scratch)?;

        Ok(GeneratedAudio {
            output: destination.to_path_buf(),
            segments,
            samples: audio.len(),
            sample_rate: audio.sample_rate,
        })
    }

    /// Synthesize the start of `text` without writing anything.
    ///
    /// Only the first `preview_chars` characters of the configured
    /// [`PipelineConfig`] are used. This blocks the calling thread; use
    /// [`GenerationWorker::start_preview`](crate::GenerationWorker::start_preview)
    /// to run it in the worker slot instead.
    pub fn preview(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        cancel: &CancellationToken,
        events: &Sender<PipelineEvent>,
    ) -> Result<AudioBuffer, PipelineError> {
        self.preview_reported(text, voice, speed, cancel, events).1
    }

    /// [`preview`](Self::preview), also returning the report sent as `Finished`.
    pub(crate) fn preview_reported(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
        cancel: &CancellationToken,
        events: &Sender<PipelineEvent>,
    ) -> (RunReport, Result<AudioBuffer, PipelineError>) {
        if let Err(err) = validate_preview(text, speed) {
            let err = PipelineError::from(err);
            return (RunReport::from_error(&err), Err(err));
        }

        let excerpt = truncate_chars(text, self.config.preview_chars);
        let voice = voices::lookup_voice(voice);
        let mut run = GenerationRun::new(chunker::chunk(excerpt, self.config.max_words), None);

        let outcome = self
            .drive(&mut run, &voice, speed, cancel, events)
            .and_then(|()| concat_run(&run));
        let report = match &outcome {
            Ok(audio) => RunReport {
                status: RunStatus::Completed,
                message: "Preview complete".to_string(),
                segments: run.segments.len(),
                samples: audio.len(),
                output: None,
            },
            Err(err) => {
                log_abort(err);
                RunReport::from_error(err)
            }
        };
        emit(events, PipelineEvent::Finished(report.clone()));
        (report, outcome)
    }

    /// Synthesize every segment of `run` in order, appending one buffer per segment.
    fn drive(
        &self,
        run: &mut GenerationRun,
        voice: &str,
        speed: f32,
        cancel: &CancellationToken,
        events: &Sender<PipelineEvent>,
    ) -> Result<(), PipelineError> {
        let total = run.segments.len();
        emit(events, PipelineEvent::Started { total_segments: total });

        for segment in &run.segments {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let detected = language::detect(&segment.text);
            let assignment = voices::resolve(voice, detected);
            log::debug!(
                "Chunk {}/{}: detected '{}', voice '{}' on '{}' backend",
                segment.index + 1,
                total,
                detected,
                assignment.voice,
                assignment.backend_language
            );

            let backend = self
                .pool
                .get(assignment.backend_language)
                .map_err(|source| PipelineError::BackendInit {
                    language: assignment.backend_language,
                    source,
                })?;
            let request = SynthesisRequest {
                text: &segment.text,
                voice: &assignment.voice,
                language: assignment.backend_language,
                speed,
            };
            let parts = backend
                .synthesize(&request)
                .map_err(|source| PipelineError::Synthesis {
                    segment: segment.index,
                    source,
                })?;
            let audio = AudioBuffer::concat(SAMPLE_RATE, &parts).map_err(|(_, found)| {
                PipelineError::SampleRateMismatch {
                    segment: segment.index,
                    expected: SAMPLE_RATE,
                    found,
                }
            })?;
            if audio.is_empty() {
                log::warn!("Chunk {} produced no audio", segment.index + 1);
            } else {
                run.buffers.push(audio);
            }

            emit(
                events,
                PipelineEvent::Progress(ProgressUpdate::after_segment(
                    segment.index,
                    total,
                    run.started.elapsed(),
                    assignment.backend_language,
                    &assignment.voice,
                )),
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish()
    }
}

fn concat_run(run: &GenerationRun) -> Result<AudioBuffer, PipelineError> {
    if run.buffers.is_empty() {
        return Err(PipelineError::EmptyResult);
    }
    // Per-segment buffers were already checked against SAMPLE_RATE.
    let audio = AudioBuffer::concat(SAMPLE_RATE, &run.buffers).map_err(|(segment, found)| {
        PipelineError::SampleRateMismatch {
            segment,
            expected: SAMPLE_RATE,
            found,
        }
    })?;
    log::info!(
        "Generated {:.2}s of audio in {:.2?}",
        audio.duration_secs(),
        run.started.elapsed()
    );
    Ok(audio)
}

fn log_abort(err: &PipelineError) {
    match err {
        PipelineError::Cancelled => log::info!("Generation cancelled"),
        PipelineError::EmptyResult => log::warn!("No audio generated"),
        err => log::error!("Generation failed: {err}"),
    }
}

/// The observer may have gone away; that never fails a run.
fn emit(events: &Sender<PipelineEvent>, event: PipelineEvent) {
    if events.send(event).is_err() {
        log::trace!("Progress receiver dropped");
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
