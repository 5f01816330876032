//! Supported languages and their model/converter bindings.
//!
//! Each language binds to a distinct pair of model asset files, an optional
//! vocabulary config, converter options, and a closed voice list. Adding a
//! language means adding an enum variant and a [`LanguageProfile`] row, not
//! a new conditional branch in the pipeline.

use std::fmt;

use crate::error::TtsError;

/// A language supported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// American English (Kokoro v1.0 model).
    English,
    /// Mandarin Chinese (Kokoro v1.1-zh model).
    Mandarin,
}

/// Everything the registry needs to build one language's engine/converter
/// pair: asset file names (relative to the models directory) and converter
/// options.
#[derive(Debug, Clone, Copy)]
pub struct LanguageProfile {
    /// ONNX model file name.
    pub model_file: &'static str,
    /// Voice bank archive file name.
    pub voices_file: &'static str,
    /// Vocabulary config file name, if the model ships one. Without it the
    /// engine falls back to the hardcoded vocab.
    pub vocab_config: Option<&'static str>,
    /// Options for the language's phoneme converter.
    pub converter: ConverterSpec,
    /// The closed voice list for this language.
    pub voices: &'static [&'static str],
}

/// Construction options for a language's phoneme converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterSpec {
    /// espeak-ng based English G2P; `british` selects en-gb over en-us.
    English { british: bool },
    /// espeak-ng based Mandarin G2P; `lexicon` names the vocab revision the
    /// voice bank was trained against.
    Mandarin { lexicon: &'static str },
}

const ENGLISH_PROFILE: LanguageProfile = LanguageProfile {
    model_file: "kokoro-v1.0.onnx",
    voices_file: "voices-v1.0.bin",
    vocab_config: None,
    converter: ConverterSpec::English { british: false },
    voices: EN_VOICES,
};

const MANDARIN_PROFILE: LanguageProfile = LanguageProfile {
    model_file: "kokoro-v1.1-zh.onnx",
    voices_file: "voices-v1.1-zh.bin",
    vocab_config: Some("config.json"),
    converter: ConverterSpec::Mandarin { lexicon: "1.1" },
    voices: ZH_VOICES,
};

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 2] = [Language::English, Language::Mandarin];

    /// Parse a language code. Unknown codes fail with
    /// [`TtsError::UnsupportedLanguage`].
    pub fn from_code(code: &str) -> Result<Self, TtsError> {
        match code {
            "en" => Ok(Language::English),
            "zh" => Ok(Language::Mandarin),
            other => Err(TtsError::UnsupportedLanguage(other.to_string())),
        }
    }

    /// The language code (`"en"`, `"zh"`).
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Mandarin => "zh",
        }
    }

    /// The model/converter bindings for this language.
    pub fn profile(&self) -> &'static LanguageProfile {
        match self {
            Language::English => &ENGLISH_PROFILE,
            Language::Mandarin => &MANDARIN_PROFILE,
        }
    }

    /// The closed voice list for this language.
    pub fn voices(&self) -> &'static [&'static str] {
        self.profile().voices
    }

    /// The default voice (first entry of the voice list).
    pub fn default_voice(&self) -> &'static str {
        self.profile().voices[0]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// English voices shipped in `voices-v1.0.bin`.
pub const EN_VOICES: &[&str] = &[
    "af", "af_bella", "af_nicole", "af_sarah", "af_sky", "am_adam", "am_michael", "bf_emma",
    "bf_isabella", "bm_george", "bm_lewis",
];

/// Mandarin voices shipped in `voices-v1.1-zh.bin`. The `af_`/`bf_` entries
/// are the English-accent voices bundled with the zh voice bank.
pub const ZH_VOICES: &[&str] = &[
    "af_maple", "af_sol", "bf_vale", "zf_001", "zf_002", "zf_003", "zf_004", "zf_005", "zf_006",
    "zf_007", "zf_008", "zf_017", "zf_018", "zf_019", "zf_021", "zf_022", "zf_023", "zf_024",
    "zf_026", "zf_027", "zf_028", "zf_032", "zf_036", "zf_038", "zf_039", "zf_040", "zf_042",
    "zf_043", "zf_044", "zf_046", "zf_047", "zf_048", "zf_049", "zf_051", "zf_059", "zf_060",
    "zf_067", "zf_070", "zf_071", "zf_072", "zf_073", "zf_074", "zf_075", "zf_076", "zf_077",
    "zf_078", "zf_079", "zf_083", "zf_084", "zf_085", "zf_086", "zf_087", "zf_088", "zf_090",
    "zf_092", "zf_093", "zf_094", "zf_099", "zm_009", "zm_010", "zm_011", "zm_012", "zm_013",
    "zm_014", "zm_015", "zm_016", "zm_020", "zm_025", "zm_029", "zm_030", "zm_031", "zm_033",
    "zm_034", "zm_035", "zm_037", "zm_041", "zm_045", "zm_050", "zm_052", "zm_053", "zm_054",
    "zm_055", "zm_056", "zm_057", "zm_058", "zm_061", "zm_062", "zm_063", "zm_064", "zm_065",
    "zm_066", "zm_068", "zm_069", "zm_080", "zm_081", "zm_082", "zm_089", "zm_091", "zm_095",
    "zm_096", "zm_097", "zm_098", "zm_100",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_codes() {
        assert_eq!(Language::from_code("en").unwrap(), Language::English);
        assert_eq!(Language::from_code("zh").unwrap(), Language::Mandarin);
    }

    #[test]
    fn rejects_unknown_code() {
        let err = Language::from_code("fr").unwrap_err();
        assert!(matches!(err, TtsError::UnsupportedLanguage(code) if code == "fr"));
    }

    #[test]
    fn profiles_bind_distinct_assets() {
        let en = Language::English.profile();
        let zh = Language::Mandarin.profile();
        assert_ne!(en.model_file, zh.model_file);
        assert_ne!(en.voices_file, zh.voices_file);
        assert!(en.vocab_config.is_none());
        assert_eq!(zh.vocab_config, Some("config.json"));
    }

    #[test]
    fn every_language_has_voices_and_a_default() {
        for lang in Language::ALL {
            assert!(!lang.voices().is_empty(), "{lang} has no voices");
            assert!(lang.voices().contains(&lang.default_voice()));
            assert!(lang.voices().iter().all(|v| !v.is_empty()));
        }
    }

    #[test]
    fn display_matches_code_roundtrip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(&lang.to_string()).unwrap(), lang);
        }
    }
}
