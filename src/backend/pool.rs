use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{BackendFactory, BackendHandle};
use crate::error::BackendError;
use crate::language::LanguageCode;

/// Lazily built backends, one per backend language, never evicted.
///
/// A single lock covers lookup and construction, so concurrent first
/// requests for a language build exactly one instance.
pub struct BackendPool {
    factory: Box<dyn BackendFactory>,
    backends: Mutex<HashMap<LanguageCode, BackendHandle>>,
}

impl BackendPool {
    pub fn new(factory: impl BackendFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            backends: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached backend for `language`, creating it on first use.
    pub fn get(&self, language: LanguageCode) -> Result<BackendHandle, BackendError> {
        let mut backends = self.lock();
        if let Some(backend) = backends.get(&language) {
            return Ok(backend.clone());
        }

        log::info!("Creating synthesis backend for language '{language}'");
        let backend = self.factory.create(language)?;
        backends.insert(language, backend.clone());
        Ok(backend)
    }

    pub fn contains(&self, language: LanguageCode) -> bool {
        self.lock().contains_key(&language)
    }

    /// Languages with a live backend, sorted.
    pub fn languages(&self) -> Vec<LanguageCode> {
        let mut languages: Vec<LanguageCode> = self.lock().keys().copied().collect();
        languages.sort_unstable();
        languages
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The map only ever holds fully built handles, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, HashMap<LanguageCode, BackendHandle>> {
        self.backends
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for BackendPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendPool")
            .field("languages", &self.languages())
            .finish()
    }
}
