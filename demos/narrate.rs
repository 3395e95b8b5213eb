use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use polyglot_tts::{
    AudioBuffer, BackendError, BackendHandle, BackendPool, GenerationWorker, LanguageCode,
    Pipeline, PipelineConfig, PipelineEvent, SynthesisBackend, SynthesisRequest, SAMPLE_RATE,
};

/// Stand-in engine: one short tone per word, pitched by language.
struct ToneBackend {
    pitch_hz: f32,
}

impl ToneBackend {
    fn load(language: LanguageCode) -> Result<BackendHandle, BackendError> {
        let pitch_hz = match language {
            LanguageCode::GenericEnglish | LanguageCode::English => 440.0,
            LanguageCode::Hindi | LanguageCode::Bengali => 494.0,
            LanguageCode::Japanese => 523.0,
            LanguageCode::Chinese => 587.0,
            LanguageCode::Indonesian => 659.0,
            LanguageCode::Portuguese => 698.0,
            LanguageCode::Finnish => 784.0,
        };
        Ok(Arc::new(ToneBackend { pitch_hz }))
    }
}

impl SynthesisBackend for ToneBackend {
    fn synthesize(
        &self,
        request: &SynthesisRequest<'_>,
    ) -> Result<Vec<AudioBuffer>, BackendError> {
        let word_len = (SAMPLE_RATE as f32 * 0.18 / request.speed) as usize;
        let gap = vec![0.0; word_len / 3];
        let buffers = request
            .text
            .split_whitespace()
            .map(|_| {
                let mut samples: Vec<f32> = (0..word_len)
                    .map(|i| (TAU * self.pitch_hz * i as f32 / SAMPLE_RATE as f32).sin() * 0.3)
                    .collect();
                samples.extend_from_slice(&gap);
                AudioBuffer::new(samples, SAMPLE_RATE)
            })
            .collect();
        Ok(buffers)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "narration.wav".to_string()));
    let config = match args.next() {
        Some(path) => PipelineConfig::load(&PathBuf::from(path))?,
        // Each script below takes a multiple of four words, so no chunk mixes them.
        None => PipelineConfig {
            max_words: 4,
            ..Default::default()
        },
    };

    let text = "Hidden at the edge of our solar system lies a mysterious world. \
                नमस्ते, यह परीक्षण है। \
                こんにちは、 世界の 皆さん、 元気ですか。 \
                Olá, tudo bem, amigo?";

    let pool = Arc::new(BackendPool::new(ToneBackend::load));
    let pipeline = Arc::new(Pipeline::new(pool.clone()).with_config(config.clone()));
    let mut worker = GenerationWorker::new(pipeline);

    let request = config.request_builder().text(text).output(output).build()?;

    let start = Instant::now();
    for event in worker.start(request)? {
        match event {
            PipelineEvent::Started { total_segments } => {
                println!("Generating {total_segments} chunk(s)");
            }
            PipelineEvent::Progress(p) => println!(
                "Chunk {}/{} [{}:{}] {:.0}% elapsed {:.1}s, ~{:.1}s left",
                p.segment_index + 1,
                p.total_segments,
                p.language,
                p.voice,
                p.percent_complete,
                p.elapsed_secs,
                p.estimated_remaining_secs
            ),
            PipelineEvent::Finished(report) => println!("{}", serde_json::to_string(&report)?),
        }
    }

    worker.join();
    println!(
        "Finished in {:.2?} using backends for {:?}",
        start.elapsed(),
        pool.languages()
    );
    Ok(())
}
