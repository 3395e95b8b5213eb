use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::audio::AudioBuffer;
use crate::cancel::CancellationToken;
use crate::error::ValidationError;
use crate::pipeline::{Pipeline, PipelineEvent, RunReport, RunStatus};
use crate::request::{validate_preview, GenerationRequest};

/// What a finished job leaves behind: its report and, for previews, the audio.
type JobResult = (RunReport, Option<AudioBuffer>);

#[derive(thiserror::Error, Debug)]
pub enum StartError {
    #[error("Please wait for the current generation to complete.")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Failed to spawn generation thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A single worker slot running at most one generation or preview at a time
/// on a background thread.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use polyglot_tts::{BackendPool, GenerationRequest, GenerationWorker, Pipeline, PipelineEvent};
/// # fn demo(pool: BackendPool, request: GenerationRequest) -> Result<(), Box<dyn std::error::Error>> {
/// let mut worker = GenerationWorker::new(Arc::new(Pipeline::new(Arc::new(pool))));
/// let events = worker.start(request)?;
/// for event in events {
///     if let PipelineEvent::Progress(p) = event {
///         println!("{:.0}% ({:.0}s left)", p.percent_complete, p.estimated_remaining_secs);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct GenerationWorker {
    pipeline: Arc<Pipeline>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<JobResult>>,
    last_report: Option<RunReport>,
    preview: Option<AudioBuffer>,
}

impl GenerationWorker {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self::with_token(pipeline, CancellationToken::new())
    }

    /// Use an existing token, e.g. one shared with a signal handler.
    pub fn with_token(pipeline: Arc<Pipeline>, cancel: CancellationToken) -> Self {
        Self {
            pipeline,
            cancel,
            handle: None,
            last_report: None,
            preview: None,
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Validate `request` and start it on a background thread.
    ///
    /// The returned receiver yields progress events and ends with
    /// [`PipelineEvent::Finished`]. Fails with [`StartError::Busy`] while a
    /// previous run is still going.
    pub fn start(
        &mut self,
        request: GenerationRequest,
    ) -> Result<Receiver<PipelineEvent>, StartError> {
        self.claim()?;
        request.validate()?;

        self.spawn(move |pipeline, cancel, events| {
            let outcome = pipeline.generate(&request, cancel, events);
            (RunReport::from_outcome(&outcome), None)
        })
    }

    /// Synthesize a preview of `text` on the background thread.
    ///
    /// Shares the slot with [`start`](Self::start): it is rejected with
    /// [`StartError::Busy`] while a generation runs and vice versa. Once the
    /// receiver reports [`PipelineEvent::Finished`], the audio is available
    /// from [`take_preview`](Self::take_preview).
    pub fn start_preview(
        &mut self,
        text: impl Into<String>,
        voice: impl Into<String>,
        speed: f32,
    ) -> Result<Receiver<PipelineEvent>, StartError> {
        let (text, voice) = (text.into(), voice.into());
        self.claim()?;
        validate_preview(&text, speed)?;
        self.preview = None;

        self.spawn(move |pipeline, cancel, events| {
            let (report, outcome) =
                pipeline.preview_reported(&text, &voice, speed, cancel, events);
            (report, outcome.ok())
        })
    }

    /// Wait for the slot and hand over the audio of the last finished preview.
    pub fn take_preview(&mut self) -> Option<AudioBuffer> {
        self.reap();
        self.preview.take()
    }

    /// Fail with `Busy` while a job runs; otherwise collect the previous one.
    fn claim(&mut self) -> Result<(), StartError> {
        if self.is_running() {
            return Err(StartError::Busy);
        }
        self.reap();
        Ok(())
    }

    fn spawn<F>(&mut self, job: F) -> Result<Receiver<PipelineEvent>, StartError>
    where
        F: FnOnce(&Pipeline, &CancellationToken, &Sender<PipelineEvent>) -> JobResult
            + Send
            + 'static,
    {
        self.cancel.reset();
        let (tx, rx) = mpsc::channel();
        let pipeline = self.pipeline.clone();
        let cancel = self.cancel.clone();
        let handle = thread::Builder::new()
            .name("tts-generation".to_string())
            .spawn(move || job(&pipeline, &cancel, &tx))?;
        self.handle = Some(handle);
        Ok(rx)
    }

    /// Request cancellation of the active run. Returns `false` when idle.
    pub fn cancel(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        log::info!("Cancelling generation");
        self.cancel.cancel();
        true
    }

    /// Wait for the active run, if any, and return the most recent report.
    pub fn join(&mut self) -> Option<RunReport> {
        self.reap();
        self.last_report.clone()
    }

    fn reap(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let (report, preview) = handle.join().unwrap_or_else(|_| {
            log::error!("Generation thread panicked");
            let report = RunReport {
                status: RunStatus::Failed,
                message: "Generation thread panicked".to_string(),
                segments: 0,
                samples: 0,
                output: None,
            };
            (report, None)
        });
        if preview.is_some() {
            self.preview = preview;
        }
        self.last_report = Some(report);
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        if self.is_running() {
            self.cancel.cancel();
        }
        self.reap();
    }
}
