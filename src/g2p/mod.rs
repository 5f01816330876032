//! Grapheme-to-phoneme conversion.
//!
//! Each supported language gets its own converter, constructed from the
//! options in its [`LanguageProfile`](crate::language::LanguageProfile):
//!
//! - [`EnglishG2p`] — espeak-ng `en-us`/`en-gb`, selected by the dialect flag
//! - [`MandarinG2p`] — espeak-ng `cmn`, with fullwidth punctuation folded to
//!   the ASCII forms the synthesis vocab knows
//!
//! Converters emit an IPA phoneme string. Mapping IPA characters to model
//! token IDs is the engine's job; the converter output stays a plain string
//! so the two collaborators remain independent.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>

pub mod english;
pub mod espeak;
pub mod mandarin;

pub use english::EnglishG2p;
pub use espeak::EspeakBackend;
pub use mandarin::MandarinG2p;

use crate::language::ConverterSpec;

#[derive(thiserror::Error, Debug)]
pub enum G2pError {
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Phonemization failed: {0}")]
    Phonemizer(String),
}

/// Converts raw text to an IPA phoneme string.
pub trait PhonemeConverter: Send + Sync {
    /// Convert `text` to phonemes. Punctuation known to the synthesis vocab
    /// survives as literal characters in the output.
    fn convert(&self, text: &str) -> Result<String, G2pError>;
}

/// Build the converter described by a language profile's [`ConverterSpec`].
pub fn build_converter(spec: &ConverterSpec) -> Box<dyn PhonemeConverter> {
    match *spec {
        ConverterSpec::English { british } => Box::new(EnglishG2p::new(british)),
        ConverterSpec::Mandarin { lexicon } => Box::new(MandarinG2p::new(lexicon)),
    }
}

/// A run of phonemizable text or a literal punctuation mark.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TextPart {
    Text(String),
    Punct(char),
}

/// Split text into phonemizable segments and boundary punctuation.
///
/// Whitespace collapses to single spaces inside a segment; newlines act as
/// sentence breaks. A `.` or `,` between two digits stays inside its segment
/// so decimals and thousands separators are spoken, not split.
fn split_text_parts(text: &str) -> Vec<TextPart> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for (idx, ch) in text.char_indices() {
        if let Some(punct) = boundary_punct(ch) {
            if !joins_digits(text, idx, ch) {
                flush(&mut parts, &mut current);
                parts.push(TextPart::Punct(punct));
                continue;
            }
        }

        if ch.is_whitespace() {
            if !current.is_empty() && !current.ends_with(' ') {
                current.push(' ');
            }
            continue;
        }

        current.push(ch);
    }

    flush(&mut parts, &mut current);
    parts
}

fn flush(parts: &mut Vec<TextPart>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        parts.push(TextPart::Text(trimmed.to_string()));
    }
    current.clear();
}

fn boundary_punct(ch: char) -> Option<char> {
    match ch {
        '.' | '!' | '?' | ',' | ';' | ':' | '—' | '…' | '"' | '(' | ')' | '\u{201c}'
        | '\u{201d}' => Some(ch),
        '\n' | '\r' => Some('.'),
        _ => None,
    }
}

fn joins_digits(text: &str, idx: usize, ch: char) -> bool {
    if !matches!(ch, '.' | ',') {
        return false;
    }
    let prev = text[..idx].chars().next_back();
    let next = text[idx + ch.len_utf8()..].chars().next();
    matches!(
        (prev, next),
        (Some(left), Some(right)) if left.is_ascii_digit() && right.is_ascii_digit()
    )
}

/// Phonemize pre-split text with the given backend, keeping punctuation as
/// literal characters between the phonemized segments.
fn phonemize_parts(backend: &EspeakBackend, text: &str) -> Result<String, G2pError> {
    let parts = split_text_parts(text);
    if parts.is_empty() {
        return Ok(String::new());
    }

    let segments: Vec<&str> = parts
        .iter()
        .filter_map(|part| match part {
            TextPart::Text(segment) => Some(segment.as_str()),
            TextPart::Punct(_) => None,
        })
        .collect();

    let segment_ipa = if segments.is_empty() {
        Vec::new()
    } else {
        backend.ipa_segments(&segments)?
    };

    let mut phonemes = String::new();
    let mut seg = 0usize;
    for part in parts {
        match part {
            TextPart::Text(_) => {
                if let Some(ipa) = segment_ipa.get(seg) {
                    phonemes.push_str(ipa);
                }
                seg += 1;
            }
            TextPart::Punct(ch) => phonemes.push(ch),
        }
    }

    Ok(phonemes)
}

#[cfg(test)]
mod tests {
    use super::{split_text_parts, TextPart};

    #[test]
    fn splits_text_and_punctuation_parts() {
        let parts = split_text_parts("Hello, world. Testing!");
        assert_eq!(
            parts,
            vec![
                TextPart::Text("Hello".to_string()),
                TextPart::Punct(','),
                TextPart::Text("world".to_string()),
                TextPart::Punct('.'),
                TextPart::Text("Testing".to_string()),
                TextPart::Punct('!'),
            ]
        );
    }

    #[test]
    fn keeps_decimal_and_thousands_separators_inside_text() {
        let parts = split_text_parts("Version 2.0 reached 1,000 users.");
        assert_eq!(
            parts,
            vec![
                TextPart::Text("Version 2.0 reached 1,000 users".to_string()),
                TextPart::Punct('.'),
            ]
        );
    }

    #[test]
    fn still_splits_comma_when_not_between_digits() {
        let parts = split_text_parts("Value 2, next");
        assert_eq!(
            parts,
            vec![
                TextPart::Text("Value 2".to_string()),
                TextPart::Punct(','),
                TextPart::Text("next".to_string()),
            ]
        );
    }

    #[test]
    fn newlines_become_sentence_breaks() {
        let parts = split_text_parts("line one\nline two");
        assert_eq!(
            parts,
            vec![
                TextPart::Text("line one".to_string()),
                TextPart::Punct('.'),
                TextPart::Text("line two".to_string()),
            ]
        );
    }
}
