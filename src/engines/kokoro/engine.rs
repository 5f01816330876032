use std::path::{Path, PathBuf};

use crate::{SynthesisEngine, SynthesisResult};

use super::model::{KokoroError, KokoroModel, SAMPLE_RATE};

/// Parameters for configuring Kokoro model loading.
#[derive(Debug, Clone, Default)]
pub struct KokoroModelParams {
    /// Number of CPU threads to use for inference.
    /// `None` uses the ORT default (typically all available cores).
    pub num_threads: Option<usize>,
    /// Path for caching the Level3-optimized ONNX graph.
    ///
    /// - First load: ORT runs Level3 optimization and serialises the result here.
    /// - Subsequent loads: the pre-built graph is loaded at `Disable` optimization,
    ///   skipping the expensive 5–10 s re-optimization step entirely.
    ///
    /// Always write to a writable location (e.g. app data dir); bundled resource
    /// directories may be read-only.
    pub optimized_model_cache_path: Option<PathBuf>,
}

/// Kokoro text-to-speech engine over one loaded model/voice-bank pair.
///
/// The engine is constructed loaded and stays loaded for its whole lifetime;
/// the [`ModelRegistry`](crate::ModelRegistry) builds one per language and
/// never releases it. Input is an IPA phoneme string — run a
/// [`PhonemeConverter`](crate::PhonemeConverter) first.
///
/// ```rust,no_run
/// use std::path::Path;
/// use kokoro_tts::engines::kokoro::KokoroEngine;
/// use kokoro_tts::SynthesisEngine;
///
/// let mut engine = KokoroEngine::load(
///     Path::new("models/kokoro-v1.0.onnx"),
///     Path::new("models/voices-v1.0.bin"),
///     None,
/// )?;
/// let result = engine.synthesize("həlˈoʊ wˈɜːld", "af_bella", 1.0)?;
/// # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
/// ```
pub struct KokoroEngine {
    model: KokoroModel,
}

impl KokoroEngine {
    /// Load an engine from its asset files with default parameters.
    ///
    /// `vocab_config` points at the model's `config.json` when it ships one;
    /// without it the hardcoded vocabulary is used.
    pub fn load(
        model_path: &Path,
        voices_path: &Path,
        vocab_config: Option<&Path>,
    ) -> Result<Self, KokoroError> {
        Self::load_with_params(
            model_path,
            voices_path,
            vocab_config,
            KokoroModelParams::default(),
        )
    }

    /// Load an engine from its asset files with custom parameters.
    pub fn load_with_params(
        model_path: &Path,
        voices_path: &Path,
        vocab_config: Option<&Path>,
        params: KokoroModelParams,
    ) -> Result<Self, KokoroError> {
        let model = KokoroModel::load(
            model_path,
            voices_path,
            vocab_config,
            params.num_threads,
            params.optimized_model_cache_path.as_deref(),
        )?;
        Ok(Self { model })
    }

    /// List all voice names in the loaded voice bank.
    pub fn list_voices(&self) -> Vec<&str> {
        self.model.list_voices()
    }
}

impl SynthesisEngine for KokoroEngine {
    fn synthesize(
        &mut self,
        phonemes: &str,
        voice: &str,
        speed: f32,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error + Send + Sync>> {
        let samples = self.model.synthesize_phonemes(phonemes, voice, speed)?;
        Ok(SynthesisResult {
            samples,
            sample_rate: SAMPLE_RATE,
        })
    }
}
