use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::model::KokoroError;

/// The slice of `config.json` the engine cares about: the phoneme vocabulary.
#[derive(Debug, Deserialize)]
struct ModelConfig {
    vocab: HashMap<String, i64>,
}

/// Load the Kokoro vocabulary from a model `config.json`.
///
/// The `"vocab"` field maps single-character strings to integer token IDs.
pub fn load_vocab(config_path: &Path) -> Result<HashMap<char, i64>, KokoroError> {
    let content = std::fs::read_to_string(config_path)?;
    let config: ModelConfig = serde_json::from_str(&content)
        .map_err(|e| KokoroError::Config(format!("Failed to parse JSON: {e}")))?;

    let mut map = HashMap::with_capacity(config.vocab.len());
    for (key, id) in config.vocab {
        let mut chars = key.chars();
        let ch = chars
            .next()
            .ok_or_else(|| KokoroError::Config("Empty key in vocab".to_string()))?;
        if chars.next().is_some() {
            return Err(KokoroError::Config(format!(
                "Multi-character vocab key {key:?}"
            )));
        }
        map.insert(ch, id);
    }

    Ok(map)
}

/// Map an IPA phoneme string to token IDs.
///
/// Characters not in the vocab are silently dropped, matching the reference
/// implementation.
pub fn tokens_from_ipa(ipa: &str, vocab: &HashMap<char, i64>) -> Vec<i64> {
    ipa.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| line.chars())
        .filter_map(|ch| vocab.get(&ch).copied())
        .collect()
}

/// Hardcoded Kokoro vocabulary (from config.json, model-version-agnostic).
///
/// Only used as a fallback when the language profile names no config.json.
pub fn hardcoded_vocab() -> HashMap<char, i64> {
    let entries: &[(char, i64)] = &[
        (';', 1),
        (':', 2),
        (',', 3),
        ('.', 4),
        ('!', 5),
        ('?', 6),
        ('—', 9),
        ('…', 10),
        ('"', 11),
        ('(', 12),
        (')', 13),
        ('\u{201c}', 14),
        ('\u{201d}', 15),
        (' ', 16),
        ('\u{0303}', 17),
        ('ʣ', 18),
        ('ʥ', 19),
        ('ʦ', 20),
        ('ʨ', 21),
        ('ᵝ', 22),
        ('ꭧ', 23),
        ('A', 24),
        ('I', 25),
        ('O', 31),
        ('Q', 33),
        ('S', 35),
        ('T', 36),
        ('W', 39),
        ('Y', 41),
        ('ᵊ', 42),
        ('a', 43),
        ('b', 44),
        ('c', 45),
        ('d', 46),
        ('e', 47),
        ('f', 48),
        ('h', 50),
        ('i', 51),
        ('j', 52),
        ('k', 53),
        ('l', 54),
        ('m', 55),
        ('n', 56),
        ('o', 57),
        ('p', 58),
        ('q', 59),
        ('r', 60),
        ('s', 61),
        ('t', 62),
        ('u', 63),
        ('v', 64),
        ('w', 65),
        ('x', 66),
        ('y', 67),
        ('z', 68),
        ('ɑ', 69),
        ('ɐ', 70),
        ('ɒ', 71),
        ('æ', 72),
        ('β', 75),
        ('ɔ', 76),
        ('ɕ', 77),
        ('ç', 78),
        ('ɖ', 80),
        ('ð', 81),
        ('ʤ', 82),
        ('ə', 83),
        ('ɚ', 85),
        ('ɛ', 86),
        ('ɜ', 87),
        ('ɟ', 90),
        ('ɡ', 92),
        ('ɥ', 99),
        ('ɨ', 101),
        ('ɪ', 102),
        ('ʝ', 103),
        ('ɯ', 110),
        ('ɰ', 111),
        ('ŋ', 112),
        ('ɳ', 113),
        ('ɲ', 114),
        ('ɴ', 115),
        ('ø', 116),
        ('ɸ', 118),
        ('θ', 119),
        ('œ', 120),
        ('ɹ', 123),
        ('ɾ', 125),
        ('ɻ', 126),
        ('ʁ', 128),
        ('ɽ', 129),
        ('ʂ', 130),
        ('ʃ', 131),
        ('ʈ', 132),
        ('ʧ', 133),
        ('ʊ', 135),
        ('ʋ', 136),
        ('ʌ', 138),
        ('ɣ', 139),
        ('ɤ', 140),
        ('χ', 142),
        ('ʎ', 143),
        ('ʒ', 147),
        ('ʔ', 148),
        ('ˈ', 156),
        ('ˌ', 157),
        ('ː', 158),
        ('ʰ', 162),
        ('ʲ', 164),
        ('↓', 169),
        ('→', 171),
        ('↗', 172),
        ('↘', 173),
        ('ᵻ', 177),
    ];
    entries.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{hardcoded_vocab, load_vocab, tokens_from_ipa};

    #[test]
    fn hardcoded_vocab_covers_boundary_punctuation() {
        let vocab = hardcoded_vocab();
        for (ch, id) in [(';', 1), (':', 2), (',', 3), ('.', 4), ('!', 5), ('?', 6)] {
            assert_eq!(vocab.get(&ch), Some(&id));
        }
    }

    #[test]
    fn tokens_skip_characters_outside_the_vocab() {
        let vocab = hardcoded_vocab();
        // '_' and '5' are not vocab entries; 'a' and '.' are.
        let ids = tokens_from_ipa("a_5.", &vocab);
        assert_eq!(ids, vec![43, 4]);
    }

    #[test]
    fn tokens_ignore_blank_lines() {
        let vocab = hardcoded_vocab();
        assert_eq!(tokens_from_ipa("\n  \n a \n", &vocab), vec![43]);
    }

    #[test]
    fn loads_vocab_from_config_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"vocab": {{"a": 43, ".": 4}}, "other": 1}}"#).unwrap();

        let vocab = load_vocab(file.path()).unwrap();
        assert_eq!(vocab.get(&'a'), Some(&43));
        assert_eq!(vocab.get(&'.'), Some(&4));
    }

    #[test]
    fn rejects_multi_character_vocab_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"vocab": {{"ab": 1}}}}"#).unwrap();
        assert!(load_vocab(file.path()).is_err());
    }
}
