//! Scripted in-memory backend for tests.

use std::sync::{Arc, Mutex};

use super::{BackendFactory, BackendHandle, SynthesisBackend, SynthesisRequest};
use crate::audio::{AudioBuffer, SAMPLE_RATE};
use crate::error::BackendError;
use crate::language::LanguageCode;

/// Samples emitted per word of input.
pub(crate) const SAMPLES_PER_WORD: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub text: String,
    pub voice: String,
    pub language: LanguageCode,
    pub speed: f32,
}

type Hook = Box<dyn Fn(usize) + Send + Sync>;

/// Shared behaviour and call log for every backend a [`FakeFactory`] builds.
#[derive(Default)]
pub(crate) struct Script {
    calls: Mutex<Vec<RecordedCall>>,
    created: Mutex<Vec<LanguageCode>>,
    fail_at: Option<usize>,
    fail_load: Option<LanguageCode>,
    buffers_per_call: usize,
    sample_rate: Option<u32>,
    after_call: Option<Hook>,
}

impl Script {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<LanguageCode> {
        self.created.lock().unwrap().clone()
    }
}

pub(crate) struct FakeFactory {
    script: Arc<Script>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Script {
                buffers_per_call: 1,
                ..Default::default()
            }),
        }
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::get_mut(&mut self.script).expect("configure before sharing the script")
    }

    /// Fail the synthesis call with this zero-based index.
    pub fn failing_at(mut self, call: usize) -> Self {
        self.script_mut().fail_at = Some(call);
        self
    }

    pub fn failing_load(mut self, language: LanguageCode) -> Self {
        self.script_mut().fail_load = Some(language);
        self
    }

    /// Split each call's audio into `n` buffers.
    pub fn buffers_per_call(mut self, n: usize) -> Self {
        self.script_mut().buffers_per_call = n.max(1);
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.script_mut().sample_rate = Some(rate);
        self
    }

    /// Run `hook` with the call index after each successful synthesis call.
    pub fn after_call(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.script_mut().after_call = Some(Box::new(hook));
        self
    }

    pub fn script(&self) -> Arc<Script> {
        self.script.clone()
    }
}

impl BackendFactory for FakeFactory {
    fn create(&self, language: LanguageCode) -> Result<BackendHandle, BackendError> {
        if self.script.fail_load == Some(language) {
            return Err(BackendError::Load(format!("no model for {language}")));
        }
        self.script.created.lock().unwrap().push(language);
        Ok(Arc::new(FakeBackend {
            script: self.script.clone(),
        }))
    }
}

/// Emits `SAMPLES_PER_WORD` samples per word, each valued at the call index.
pub(crate) struct FakeBackend {
    script: Arc<Script>,
}

impl FakeBackend {
    pub fn new() -> Self {
        FakeFactory::new().into_backend()
    }
}

impl FakeFactory {
    fn into_backend(self) -> FakeBackend {
        FakeBackend {
            script: self.script,
        }
    }
}

impl SynthesisBackend for FakeBackend {
    fn synthesize(
        &self,
        request: &SynthesisRequest<'_>,
    ) -> Result<Vec<AudioBuffer>, BackendError> {
        let index = {
            let mut calls = self.script.calls.lock().unwrap();
            calls.push(RecordedCall {
                text: request.text.to_string(),
                voice: request.voice.to_string(),
                language: request.language,
                speed: request.speed,
            });
            calls.len() - 1
        };

        if self.script.fail_at == Some(index) {
            return Err(BackendError::Synthesis(format!("synthetic failure on call {index}")));
        }

        let words = request.text.split_whitespace().count();
        let total = words * SAMPLES_PER_WORD;
        let rate = self.script.sample_rate.unwrap_or(SAMPLE_RATE);
        let parts = self.script.buffers_per_call;
        let buffers = (0..parts)
            .map(|part| {
                let start = total * part / parts;
                let end = total * (part + 1) / parts;
                AudioBuffer::new(vec![index as f32; end - start], rate)
            })
            .filter(|buffer| !buffer.is_empty())
            .collect();

        if let Some(hook) = &self.script.after_call {
            hook(index);
        }
        Ok(buffers)
    }
}
