//! # polyglot-tts
//!
//! A language-aware, chunked, cancellable text-to-speech generation pipeline.
//!
//! ## Features
//!
//! - **Chunking**: text is split into word-bounded segments (50 words by default)
//! - **Language detection**: each segment is classified by script and keyword rules
//! - **Voice reconciliation**: the requested voice is swapped for a compatible
//!   one when it cannot speak the detected language
//! - **Backend pool**: one backend per language, created lazily and shared across runs
//! - **Cancellation and progress**: polled between segments, reported over a channel
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! polyglot-tts = "2026.10"
//! ```
//!
//! ```ignore
//! use std::sync::{mpsc, Arc};
//! use polyglot_tts::{BackendPool, CancellationToken, GenerationRequestBuilder, Pipeline};
//!
//! // `load_backend` builds your synthesis engine for a language.
//! let pool = Arc::new(BackendPool::new(load_backend));
//! let pipeline = Pipeline::new(pool);
//!
//! let request = GenerationRequestBuilder::default()
//!     .text("Hello, world! नमस्ते दुनिया")
//!     .voice("af_heart")
//!     .output("hello.wav")
//!     .build()?;
//!
//! let (tx, rx) = mpsc::channel();
//! let generated = pipeline.generate(&request, &CancellationToken::new(), &tx)?;
//! println!("Wrote {:.1}s to {}", generated.duration_secs(), generated.output.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod backend;
pub mod cancel;
pub mod chunker;
pub mod config;
pub mod error;
pub mod language;
pub mod pipeline;
pub mod request;
pub mod voices;
pub mod worker;

pub use audio::{AudioBuffer, AudioSink, WavFileSink, SAMPLE_RATE};
pub use backend::{BackendFactory, BackendHandle, BackendPool, SynthesisBackend, SynthesisRequest};
pub use cancel::CancellationToken;
pub use chunker::{chunk, TextSegment, DEFAULT_MAX_WORDS};
pub use config::{ConfigError, PipelineConfig};
pub use error::{BackendError, PipelineError, ValidationError};
pub use language::{detect, LanguageCode};
pub use pipeline::{
    GeneratedAudio, Pipeline, PipelineEvent, ProgressUpdate, RunReport, RunStatus,
};
pub use request::{GenerationRequest, GenerationRequestBuilder};
pub use voices::{lookup_voice, resolve, ResolvedAssignment, Voice};
pub use worker::{GenerationWorker, StartError};
