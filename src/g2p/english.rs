//! English grapheme-to-phoneme conversion.

use super::espeak::EspeakBackend;
use super::{phonemize_parts, G2pError, PhonemeConverter};

/// English G2P over espeak-ng.
///
/// The dialect flag picks the espeak voice: `en-gb` for British English,
/// `en-us` otherwise. Punctuation is split out before phonemization and
/// re-inserted literally, so the synthesis vocab sees it unchanged.
pub struct EnglishG2p {
    backend: EspeakBackend,
}

impl EnglishG2p {
    pub fn new(british: bool) -> Self {
        let voice = if british { "en-gb" } else { "en-us" };
        Self {
            backend: EspeakBackend::new(voice),
        }
    }

    /// Use a caller-provided backend (bundled espeak-ng, tests).
    pub fn with_backend(backend: EspeakBackend) -> Self {
        Self { backend }
    }
}

impl PhonemeConverter for EnglishG2p {
    fn convert(&self, text: &str) -> Result<String, G2pError> {
        phonemize_parts(&self.backend, text)
    }
}
