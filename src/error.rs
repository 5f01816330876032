//! Pipeline-level error taxonomy.
//!
//! Lower layers keep their own error types ([`KokoroError`], [`G2pError`]);
//! everything that crosses the [`Synthesizer`](crate::Synthesizer) boundary
//! is folded into [`TtsError`]. No failure is retried or recovered: each one
//! surfaces unmodified to the caller.
//!
//! [`KokoroError`]: crate::engines::kokoro::KokoroError
//! [`G2pError`]: crate::g2p::G2pError

use crate::engines::kokoro::KokoroError;
use crate::g2p::G2pError;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum TtsError {
    /// The requested language code is not in the supported set.
    #[error("unsupported language {0:?} (supported: en, zh)")]
    UnsupportedLanguage(String),

    /// Constructing a registry entry failed (missing or corrupt model assets).
    #[error("failed to load models: {0}")]
    ModelLoad(#[from] KokoroError),

    /// The text could not be converted to phonemes.
    #[error("grapheme-to-phoneme conversion failed: {0}")]
    G2p(#[source] G2pError),

    /// The synthesis engine rejected the phonemes/voice/speed combination
    /// or failed internally.
    #[error("synthesis failed: {0}")]
    Synthesis(#[source] BoxedError),

    /// The synthesized audio could not be written to the output path.
    #[error("failed to write output audio: {0}")]
    Persistence(#[source] BoxedError),
}
