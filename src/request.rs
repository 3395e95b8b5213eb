use std::path::{Path, PathBuf};

use derive_builder::Builder;

use crate::chunker::DEFAULT_MAX_WORDS;
use crate::error::ValidationError;
use crate::voices::DEFAULT_ENGLISH_VOICE;

/// Supported speed multipliers.
pub const SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.5..=2.0;

/// Parameters for one generation run.
///
/// ```
/// use polyglot_tts::GenerationRequestBuilder;
///
/// let request = GenerationRequestBuilder::default()
///     .text("Hello, world!")
///     .voice("bf_emma")
///     .speed(0.9)
///     .output("out/hello.wav")
///     .build()?;
/// assert_eq!(request.max_words, 50);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct GenerationRequest {
    #[builder(setter(into))]
    pub text: String,
    /// Catalog voice id or display name (e.g. `"af_heart"`, `"Emma (British Female)"`).
    #[builder(setter(into), default = "DEFAULT_ENGLISH_VOICE.to_string()")]
    pub voice: String,
    /// Speech speed multiplier. Range: 0.5–2.0, default 1.0.
    #[builder(default = "1.0")]
    pub speed: f32,
    #[builder(default = "DEFAULT_MAX_WORDS")]
    pub max_words: usize,
    /// Destination file. `.wav` is appended when missing.
    #[builder(setter(into))]
    pub output: PathBuf,
}

impl GenerationRequest {
    /// Check the request and return the final destination path.
    pub fn validate(&self) -> Result<PathBuf, ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let file_name = self
            .output
            .file_name()
            .map(|name| name.to_string_lossy().trim().to_string())
            .unwrap_or_default();
        if file_name.is_empty() {
            return Err(ValidationError::EmptyFileName);
        }

        let dir = output_dir(&self.output);
        if !dir.is_dir() {
            return Err(ValidationError::InvalidDirectory(dir.to_path_buf()));
        }

        if !SPEED_RANGE.contains(&self.speed) {
            return Err(ValidationError::SpeedOutOfRange(self.speed));
        }
        if self.max_words == 0 {
            return Err(ValidationError::InvalidMaxWords);
        }

        let file_name = if file_name.to_lowercase().ends_with(".wav") {
            file_name
        } else {
            format!("{file_name}.wav")
        };
        Ok(dir.join(file_name))
    }
}

/// Checks shared by previews: non-blank text and a supported speed.
pub(crate) fn validate_preview(text: &str, speed: f32) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if !SPEED_RANGE.contains(&speed) {
        return Err(ValidationError::SpeedOutOfRange(speed));
    }
    Ok(())
}

/// Directory holding `path`; the current directory for bare file names.
pub(crate) fn output_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(dir: &Path, name: &str) -> GenerationRequest {
        GenerationRequestBuilder::default()
            .text("Hello there")
            .output(dir.join(name))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_applies_defaults() {
        let request = GenerationRequestBuilder::default()
            .text("hi")
            .output("hi.wav")
            .build()
            .unwrap();
        assert_eq!(request.voice, DEFAULT_ENGLISH_VOICE);
        assert_eq!(request.speed, 1.0);
        assert_eq!(request.max_words, DEFAULT_MAX_WORDS);
    }

    #[test]
    fn builder_requires_text_and_output() {
        assert!(GenerationRequestBuilder::default().text("hi").build().is_err());
        assert!(GenerationRequestBuilder::default().output("a.wav").build().is_err());
    }

    #[test]
    fn appends_wav_extension_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            request(dir.path(), "speech").validate(),
            Ok(dir.path().join("speech.wav"))
        );
        assert_eq!(
            request(dir.path(), "Speech.WAV").validate(),
            Ok(dir.path().join("Speech.WAV"))
        );
        assert_eq!(
            request(dir.path(), "speech.mp3").validate(),
            Ok(dir.path().join("speech.mp3.wav"))
        );
    }

    #[test]
    fn bare_file_name_resolves_against_current_dir() {
        let mut req = request(Path::new("."), "x");
        req.output = PathBuf::from("speech");
        assert_eq!(req.validate(), Ok(Path::new(".").join("speech.wav")));
    }

    #[test]
    fn rejects_invalid_input_in_order() {
        let dir = tempfile::tempdir().unwrap();

        let mut req = request(dir.path(), "out.wav");
        req.text = "  \n ".to_string();
        assert_eq!(req.validate(), Err(ValidationError::EmptyText));

        let mut req = request(dir.path(), "out.wav");
        req.output = PathBuf::new();
        assert_eq!(req.validate(), Err(ValidationError::EmptyFileName));

        let missing = dir.path().join("missing");
        let req = request(&missing, "out.wav");
        assert_eq!(req.validate(), Err(ValidationError::InvalidDirectory(missing)));

        let mut req = request(dir.path(), "out.wav");
        req.speed = 2.5;
        assert_eq!(req.validate(), Err(ValidationError::SpeedOutOfRange(2.5)));

        let mut req = request(dir.path(), "out.wav");
        req.max_words = 0;
        assert_eq!(req.validate(), Err(ValidationError::InvalidMaxWords));
    }
}
