//! Synthesis backends.
//!
//! A backend turns one segment of text into audio for a single backend
//! language. Backends are built by a [`BackendFactory`] and cached per
//! language in a [`BackendPool`].

mod pool;
#[cfg(test)]
pub(crate) mod testing;

pub use pool::BackendPool;

use std::sync::Arc;

use crate::audio::AudioBuffer;
use crate::error::BackendError;
use crate::language::LanguageCode;

/// Parameters for one synthesis call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    /// Effective voice id (e.g. `"af_heart"`, `"hm_omega"`).
    pub voice: &'a str,
    pub language: LanguageCode,
    /// Speech speed multiplier. Range: 0.5–2.0, default 1.0.
    pub speed: f32,
}

/// A loaded synthesis backend configured for one language.
///
/// Implementations may return several buffers per call (for instance one per
/// line or sentence); the pipeline concatenates them in order.
pub trait SynthesisBackend: Send + Sync {
    fn synthesize(
        &self,
        request: &SynthesisRequest<'_>,
    ) -> Result<Vec<AudioBuffer>, BackendError>;
}

/// Shared handle to a cached backend.
pub type BackendHandle = Arc<dyn SynthesisBackend>;

/// Builds a backend for a language. Construction may be slow (model loading).
pub trait BackendFactory: Send + Sync {
    fn create(&self, language: LanguageCode) -> Result<BackendHandle, BackendError>;
}

impl<F> BackendFactory for F
where
    F: Fn(LanguageCode) -> Result<BackendHandle, BackendError> + Send + Sync,
{
    fn create(&self, language: LanguageCode) -> Result<BackendHandle, BackendError> {
        self(language)
    }
}
