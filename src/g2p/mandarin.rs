//! Mandarin grapheme-to-phoneme conversion.

use std::borrow::Cow;

use super::espeak::EspeakBackend;
use super::{phonemize_parts, G2pError, PhonemeConverter};

/// Mandarin G2P over espeak-ng's `cmn` voice.
///
/// Fullwidth CJK punctuation is folded to the ASCII forms present in the
/// synthesis vocab before segmentation; everything else follows the shared
/// segment-then-phonemize pipeline.
pub struct MandarinG2p {
    backend: EspeakBackend,
    /// Vocab revision the paired voice bank was trained against. Recorded
    /// for diagnostics; the engine loads the matching `config.json`.
    lexicon: &'static str,
}

impl MandarinG2p {
    pub fn new(lexicon: &'static str) -> Self {
        log::debug!("Mandarin G2P using lexicon revision {lexicon}");
        Self {
            backend: EspeakBackend::new("cmn"),
            lexicon,
        }
    }

    /// Use a caller-provided backend (bundled espeak-ng, tests).
    pub fn with_backend(backend: EspeakBackend, lexicon: &'static str) -> Self {
        Self { backend, lexicon }
    }

    pub fn lexicon(&self) -> &'static str {
        self.lexicon
    }
}

impl PhonemeConverter for MandarinG2p {
    fn convert(&self, text: &str) -> Result<String, G2pError> {
        let normalized = fold_fullwidth_punct(text);
        phonemize_parts(&self.backend, &normalized)
    }
}

/// Map fullwidth CJK punctuation to ASCII equivalents the vocab knows.
/// Returns the input untouched when nothing needs folding.
fn fold_fullwidth_punct(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| fold_char(ch).is_some()) {
        return Cow::Borrowed(text);
    }

    Cow::Owned(
        text.chars()
            .map(|ch| fold_char(ch).unwrap_or(ch))
            .collect(),
    )
}

fn fold_char(ch: char) -> Option<char> {
    match ch {
        '，' | '、' => Some(','),
        '。' => Some('.'),
        '！' => Some('!'),
        '？' => Some('?'),
        '；' => Some(';'),
        '：' => Some(':'),
        '（' => Some('('),
        '）' => Some(')'),
        '「' | '『' | '《' => Some('\u{201c}'),
        '」' | '』' | '》' => Some('\u{201d}'),
        _ => None,
    }
}
