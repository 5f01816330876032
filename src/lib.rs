//! # kokoro-tts
//!
//! A text-to-speech pipeline built on the Kokoro-82M ONNX models.
//!
//! The crate wires three pieces together:
//!
//! - **Grapheme-to-phoneme conversion** via espeak-ng, with a converter per
//!   supported language ([`g2p`])
//! - **Phoneme-mode synthesis** with the Kokoro ONNX engine ([`engines::kokoro`])
//! - A **model registry** that loads the engine/converter pair for each
//!   language once per process and reuses it for every later request
//!   ([`registry`])
//!
//! ## Quick Start
//!
//! ```ignore
//! use kokoro_tts::Synthesizer;
//!
//! let synth = Synthesizer::new("models");
//! let out = synth.synthesize_text("Hello, world!", "en", "af_bella", 1.0)?;
//! println!("wrote {} ({:.2}s)", out.path.display(), out.duration_secs);
//! # Ok::<(), kokoro_tts::TtsError>(())
//! ```
//!
//! espeak-ng must be installed and on `PATH` for phonemization.

pub mod engines;
pub mod error;
pub mod g2p;
pub mod language;
pub mod registry;
pub mod synth;

use std::path::Path;

pub use error::TtsError;
pub use g2p::PhonemeConverter;
pub use language::Language;
pub use registry::{ModelEntry, ModelRegistry};
pub use synth::{SynthesisOutput, SynthesisRequest, SynthesisRequestBuilder, Synthesizer};

/// The result of a synthesis operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio (24000 for Kokoro)
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// A synthesis engine that accepts pre-phonemized input.
///
/// The engine never derives phonemes from raw text itself; callers run a
/// [`PhonemeConverter`] first and hand over the IPA string. Voice and speed
/// are forwarded as-is — an unknown voice or out-of-range speed is the
/// engine's to reject.
pub trait SynthesisEngine {
    /// Synthesize audio from an IPA phoneme string.
    fn synthesize(
        &mut self,
        phonemes: &str,
        voice: &str,
        speed: f32,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error + Send + Sync>>;
}
