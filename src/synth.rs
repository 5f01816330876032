//! The synthesis pipeline: request in, WAV file out.

use std::path::{Path, PathBuf};
use std::sync::PoisonError;

use derive_builder::Builder;

use crate::error::TtsError;
use crate::language::Language;
use crate::registry::ModelRegistry;
use crate::SynthesisResult;

/// Where synthesized audio lands unless the caller picks another path.
pub const DEFAULT_OUTPUT_PATH: &str = "output/audio.wav";

/// One synthesis request.
///
/// `voice` should come from the language's closed voice list
/// ([`Language::voices`]) and `speed` from the advertised 0.5–2.0 range, but
/// neither is validated here: both are passed through and the engine is the
/// validator of record.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct SynthesisRequest {
    pub text: String,
    pub language: Language,
    pub voice: String,
    /// Speech speed multiplier; 1.0 is the model's natural pace.
    #[builder(default = "1.0")]
    pub speed: f32,
}

/// A completed synthesis: where the audio went, plus playback metadata.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub duration_secs: f64,
}

/// Turns requests into audio files.
///
/// Each call resolves the language's model pair from the registry, converts
/// the text to phonemes, synthesizes in phoneme mode, and writes the result
/// to this instance's fixed output path. The file is fully written and
/// finalized before the call returns.
///
/// The output path is shared by every call on the instance and overwritten
/// each time; two overlapping calls can clobber each other's file. Give each
/// concurrent user its own `Synthesizer` (or at least its own output path)
/// if that matters.
pub struct Synthesizer {
    registry: ModelRegistry,
    output_path: PathBuf,
}

impl Synthesizer {
    /// Synthesizer over models in `models_dir`, writing to
    /// [`DEFAULT_OUTPUT_PATH`].
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self::with_output_path(models_dir, DEFAULT_OUTPUT_PATH)
    }

    /// Synthesizer with an explicit output path.
    pub fn with_output_path(
        models_dir: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self::with_registry(ModelRegistry::new(models_dir), output_path)
    }

    pub(crate) fn with_registry(registry: ModelRegistry, output_path: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            output_path: output_path.into(),
        }
    }

    /// The fixed path this instance writes to.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// The registry backing this synthesizer.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Synthesize from raw request parts, parsing the language code.
    ///
    /// An unsupported code fails with [`TtsError::UnsupportedLanguage`]
    /// before any model is touched or any file written.
    pub fn synthesize_text(
        &self,
        text: &str,
        language: &str,
        voice: &str,
        speed: f32,
    ) -> Result<SynthesisOutput, TtsError> {
        let request = SynthesisRequest {
            text: text.to_string(),
            language: Language::from_code(language)?,
            voice: voice.to_string(),
            speed,
        };
        self.synthesize(&request)
    }

    /// Run one request through G2P, synthesis, and the file write.
    ///
    /// Single-shot and best-effort: every failure propagates unmodified and
    /// nothing is retried.
    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisOutput, TtsError> {
        log::info!(
            "synthesizing text={:?} lang={} voice={} speed={}",
            request.text,
            request.language,
            request.voice,
            request.speed
        );

        let entry = self.registry.entry(request.language)?;

        let phonemes = entry
            .converter
            .convert(&request.text)
            .map_err(TtsError::G2p)?;

        let result = {
            let mut engine = entry.engine.lock().unwrap_or_else(PoisonError::into_inner);
            engine
                .synthesize(&phonemes, &request.voice, request.speed)
                .map_err(TtsError::Synthesis)?
        };

        self.persist(&result)?;

        Ok(SynthesisOutput {
            path: self.output_path.clone(),
            sample_rate: result.sample_rate,
            duration_secs: result.duration_secs(),
        })
    }

    fn persist(&self, result: &SynthesisResult) -> Result<(), TtsError> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TtsError::Persistence(Box::new(e)))?;
            }
        }

        result
            .write_wav(&self.output_path)
            .map_err(|e| TtsError::Persistence(Box::new(e)))?;

        log::info!(
            "wrote {} ({:.2}s @ {}Hz)",
            self.output_path.display(),
            result.duration_secs(),
            result.sample_rate
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::g2p::{G2pError, PhonemeConverter};
    use crate::registry::ModelEntry;
    use crate::{SynthesisEngine, SynthesisResult};

    /// One recorded engine call: phonemes, voice, speed.
    type EngineCall = (String, String, f32);

    struct StubEngine {
        samples: Vec<f32>,
        fail: bool,
        calls: Arc<Mutex<Vec<EngineCall>>>,
    }

    impl SynthesisEngine for StubEngine {
        fn synthesize(
            &mut self,
            phonemes: &str,
            voice: &str,
            speed: f32,
        ) -> Result<SynthesisResult, Box<dyn std::error::Error + Send + Sync>> {
            self.calls
                .lock()
                .unwrap()
                .push((phonemes.to_string(), voice.to_string(), speed));
            if self.fail {
                return Err("engine rejected request".into());
            }
            Ok(SynthesisResult {
                samples: self.samples.clone(),
                sample_rate: 24000,
            })
        }
    }

    struct StubConverter {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl PhonemeConverter for StubConverter {
        fn convert(&self, text: &str) -> Result<String, G2pError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(G2pError::Phonemizer("no phonemes".to_string()));
            }
            Ok(format!("ipa:{text}"))
        }
    }

    struct Harness {
        engine_calls: Arc<Mutex<Vec<EngineCall>>>,
        converter_calls: Arc<AtomicUsize>,
        constructions: Arc<AtomicUsize>,
        synth: Synthesizer,
        _dir: tempfile::TempDir,
    }

    fn harness(engine_fails: bool, converter_fails: bool) -> Harness {
        let engine_calls: Arc<Mutex<Vec<EngineCall>>> = Arc::default();
        let converter_calls: Arc<AtomicUsize> = Arc::default();
        let constructions: Arc<AtomicUsize> = Arc::default();

        let loader = {
            let engine_calls = Arc::clone(&engine_calls);
            let converter_calls = Arc::clone(&converter_calls);
            let constructions = Arc::clone(&constructions);
            move |_dir: &Path, _lang: Language| -> Result<ModelEntry, TtsError> {
                constructions.fetch_add(1, Ordering::SeqCst);
                Ok(ModelEntry {
                    engine: Mutex::new(Box::new(StubEngine {
                        samples: vec![0.1; 4800],
                        fail: engine_fails,
                        calls: Arc::clone(&engine_calls),
                    })),
                    converter: Box::new(StubConverter {
                        fail: converter_fails,
                        calls: Arc::clone(&converter_calls),
                    }),
                })
            }
        };

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("audio.wav");
        let registry = ModelRegistry::with_loader("models", Box::new(loader));

        Harness {
            engine_calls,
            converter_calls,
            constructions,
            synth: Synthesizer::with_registry(registry, output),
            _dir: dir,
        }
    }

    fn read_wav(path: &Path) -> (u32, usize) {
        let reader = hound::WavReader::open(path).unwrap();
        let spec = reader.spec();
        (spec.sample_rate, reader.len() as usize)
    }

    #[test]
    fn english_request_runs_converter_and_engine_once_and_writes_wav() {
        let h = harness(false, false);
        let out = h
            .synth
            .synthesize_text("Hello world", "en", "af_bella", 1.0)
            .unwrap();

        assert_eq!(h.converter_calls.load(Ordering::SeqCst), 1);
        let calls = h.engine_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("ipa:Hello world".to_string(), "af_bella".to_string(), 1.0));

        assert_eq!(out.path, h.synth.output_path());
        assert_eq!(out.sample_rate, 24000);
        let (rate, frames) = read_wav(&out.path);
        assert_eq!(rate, 24000);
        assert_eq!(frames, 4800);
    }

    #[test]
    fn mandarin_request_writes_wav() {
        let h = harness(false, false);
        let out = h.synth.synthesize_text("你好", "zh", "zf_001", 1.2).unwrap();

        let calls = h.engine_calls.lock().unwrap();
        assert_eq!(calls[0].1, "zf_001");
        assert_eq!(calls[0].2, 1.2);
        assert!(out.path.exists());
    }

    #[test]
    fn repeated_requests_reuse_the_registry_entry() {
        let h = harness(false, false);
        h.synth
            .synthesize_text("first", "en", "af_bella", 1.0)
            .unwrap();
        h.synth
            .synthesize_text("second", "en", "af_sarah", 1.0)
            .unwrap();

        assert_eq!(h.constructions.load(Ordering::SeqCst), 1);
        assert_eq!(h.engine_calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn unsupported_language_fails_before_models_or_files() {
        let h = harness(false, false);
        let err = h
            .synth
            .synthesize_text("Bonjour", "fr", "ff_siwis", 1.0)
            .unwrap_err();

        assert!(matches!(err, TtsError::UnsupportedLanguage(code) if code == "fr"));
        assert_eq!(h.constructions.load(Ordering::SeqCst), 0);
        assert!(!h.synth.output_path().exists());
    }

    #[test]
    fn speed_extremes_and_outliers_pass_through_unchanged() {
        let h = harness(false, false);
        for speed in [0.5, 2.0, 3.7] {
            h.synth
                .synthesize_text("text", "en", "af_bella", speed)
                .unwrap();
        }

        let speeds: Vec<f32> = h.engine_calls.lock().unwrap().iter().map(|c| c.2).collect();
        assert_eq!(speeds, vec![0.5, 2.0, 3.7]);
    }

    #[test]
    fn identical_requests_produce_identical_wavs() {
        let h = harness(false, false);
        h.synth
            .synthesize_text("same text", "en", "af_bella", 1.0)
            .unwrap();
        let first = read_wav(h.synth.output_path());

        h.synth
            .synthesize_text("same text", "en", "af_bella", 1.0)
            .unwrap();
        let second = read_wav(h.synth.output_path());

        assert_eq!(first, second);
    }

    #[test]
    fn g2p_failure_propagates_and_writes_nothing() {
        let h = harness(false, true);
        let err = h
            .synth
            .synthesize_text("text", "en", "af_bella", 1.0)
            .unwrap_err();

        assert!(matches!(err, TtsError::G2p(_)));
        assert!(h.engine_calls.lock().unwrap().is_empty());
        assert!(!h.synth.output_path().exists());
    }

    #[test]
    fn engine_failure_leaves_previous_output_untouched() {
        let good = harness(false, false);
        good.synth
            .synthesize_text("text", "en", "af_bella", 1.0)
            .unwrap();
        let before = std::fs::read(good.synth.output_path()).unwrap();

        // Same output file, now behind a failing engine.
        let failing = harness(true, false);
        let failing =
            Synthesizer::with_registry(failing.synth.registry, good.synth.output_path());

        let err = failing
            .synthesize_text("text", "en", "af_bella", 1.0)
            .unwrap_err();
        assert!(matches!(err, TtsError::Synthesis(_)));

        let after = std::fs::read(good.synth.output_path()).unwrap();
        assert_eq!(before, after, "failed synthesis must not touch the file");
    }

    #[test]
    fn request_builder_defaults_speed() {
        let request = SynthesisRequestBuilder::default()
            .text("Hello")
            .language(Language::English)
            .voice("af_bella")
            .build()
            .unwrap();

        assert_eq!(request.speed, 1.0);
        assert_eq!(request.language, Language::English);
    }

    #[test]
    fn output_parent_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out/deep/audio.wav");
        let registry = ModelRegistry::with_loader(
            "models",
            Box::new(|_dir: &Path, _lang: Language| -> Result<ModelEntry, TtsError> {
                Ok(ModelEntry {
                    engine: Mutex::new(Box::new(StubEngine {
                        samples: vec![0.0; 10],
                        fail: false,
                        calls: Arc::default(),
                    })),
                    converter: Box::new(StubConverter {
                        fail: false,
                        calls: Arc::default(),
                    }),
                })
            }),
        );
        let synth = Synthesizer::with_registry(registry, &nested);

        synth.synthesize_text("text", "en", "af_bella", 1.0).unwrap();
        assert!(nested.exists());
    }
}
