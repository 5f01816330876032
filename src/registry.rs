//! Process-lifetime cache of per-language model instances.
//!
//! Loading a Kokoro model means deserializing ONNX weights and a voice bank
//! from disk, which takes seconds. The registry pays that cost at most once
//! per language: the first request for a language builds its engine and
//! phoneme converter, every later request gets the same pair back. Entries
//! are never evicted, refreshed, or replaced.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::engines::kokoro::KokoroEngine;
use crate::error::TtsError;
use crate::g2p::{self, PhonemeConverter};
use crate::language::Language;
use crate::SynthesisEngine;

/// One language's loaded model pair: the synthesis engine and the phoneme
/// converter that feeds it.
///
/// The engine sits behind a `Mutex` because ONNX inference needs `&mut`;
/// the converter is stateless per call and shared directly.
pub struct ModelEntry {
    pub engine: Mutex<Box<dyn SynthesisEngine + Send>>,
    pub converter: Box<dyn PhonemeConverter>,
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry").finish_non_exhaustive()
    }
}

type EntryLoader = Box<dyn Fn(&Path, Language) -> Result<ModelEntry, TtsError> + Send + Sync>;

/// Lazily-populated map from [`Language`] to its [`ModelEntry`].
///
/// The map lock is held across construction, so concurrent first requests
/// for a language build its entry exactly once (the second caller blocks,
/// then receives the first caller's entry). A failed construction stores
/// nothing; the next request retries from scratch.
pub struct ModelRegistry {
    models_dir: PathBuf,
    entries: Mutex<HashMap<Language, Arc<ModelEntry>>>,
    loader: EntryLoader,
}

impl ModelRegistry {
    /// Registry that loads Kokoro engines from asset files under
    /// `models_dir`, named per each language's profile.
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self::with_loader(models_dir, Box::new(load_kokoro_entry))
    }

    /// Registry with a custom entry loader. Tests use this to count
    /// constructions without touching model files.
    pub(crate) fn with_loader(models_dir: impl Into<PathBuf>, loader: EntryLoader) -> Self {
        Self {
            models_dir: models_dir.into(),
            entries: Mutex::new(HashMap::new()),
            loader,
        }
    }

    /// The engine/converter pair for `language`, building it on first use.
    pub fn entry(&self, language: Language) -> Result<Arc<ModelEntry>, TtsError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(&language) {
            return Ok(Arc::clone(entry));
        }

        log::info!("First request for {language}: loading models");
        let entry = Arc::new((self.loader)(&self.models_dir, language)?);
        entries.insert(language, Arc::clone(&entry));
        Ok(entry)
    }

    /// Whether `language`'s entry has already been constructed.
    pub fn is_loaded(&self, language: Language) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&language)
    }
}

/// Default entry loader: Kokoro engine from the language's asset files plus
/// the converter its profile describes.
fn load_kokoro_entry(models_dir: &Path, language: Language) -> Result<ModelEntry, TtsError> {
    let profile = language.profile();
    let vocab_config = profile.vocab_config.map(|name| models_dir.join(name));

    let engine = KokoroEngine::load(
        &models_dir.join(profile.model_file),
        &models_dir.join(profile.voices_file),
        vocab_config.as_deref(),
    )?;

    Ok(ModelEntry {
        engine: Mutex::new(Box::new(engine)),
        converter: g2p::build_converter(&profile.converter),
    })
}
