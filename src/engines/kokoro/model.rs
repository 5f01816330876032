use std::collections::HashMap;
use std::path::Path;

use ndarray::Array2;
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::vocab;
use super::voices::VoiceBank;

/// Maximum number of phoneme tokens per chunk (before padding).
pub const MAX_PHONEME_LEN: usize = 510;

/// Style vector dimension for Kokoro.
pub const STYLE_DIM: usize = 256;

/// Output sample rate from the Kokoro model.
pub const SAMPLE_RATE: u32 = 24000;

/// Crossfade (in samples) used when concatenating chunk audio.
const CHUNK_CROSSFADE_SAMPLES: usize = 240; // 10ms @ 24kHz

#[derive(thiserror::Error, Debug)]
pub enum KokoroError {
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("Voice '{0}' not found. Call list_voices() to see available voices.")]
    VoiceNotFound(String),
    #[error("Invalid config.json: {0}")]
    Config(String),
    #[error("Failed to parse voice file: {0}")]
    VoiceParse(String),
}

/// Internal Kokoro ONNX model state.
pub struct KokoroModel {
    session: Session,
    voice_bank: VoiceBank,
    vocab: HashMap<char, i64>,
    /// Detected input name: "input_ids" or "tokens"
    tokens_input_name: String,
    /// True if the speed input expects int32, false for float32
    speed_is_int32: bool,
}

impl KokoroModel {
    /// Load a Kokoro model from its asset files.
    ///
    /// `model_path` is the `.onnx` file, `voices_path` the voice bank
    /// archive. `vocab_config` points at the model's `config.json` when it
    /// ships one; without it the hardcoded vocabulary is used.
    pub fn load(
        model_path: &Path,
        voices_path: &Path,
        vocab_config: Option<&Path>,
        num_threads: Option<usize>,
        optimized_cache_path: Option<&Path>,
    ) -> Result<Self, KokoroError> {
        log::info!("Loading Kokoro model from {}", model_path.display());
        let session = init_session(model_path, num_threads, optimized_cache_path)?;

        // Detect input names at load time
        let tokens_input_name = detect_tokens_input(&session);
        let speed_is_int32 = detect_speed_type(&session);

        log::info!(
            "Detected: tokens_input='{}', speed_is_int32={}",
            tokens_input_name,
            speed_is_int32
        );

        if !voices_path.exists() {
            return Err(KokoroError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "Voice bank not found at {}. Download it from the Kokoro model repository.",
                    voices_path.display()
                ),
            )));
        }
        let voice_bank = VoiceBank::load(voices_path)?;

        let vocab = match vocab_config {
            Some(config_path) => {
                log::info!("Loading vocab from {}", config_path.display());
                vocab::load_vocab(config_path)?
            }
            None => vocab::hardcoded_vocab(),
        };

        Ok(Self {
            session,
            voice_bank,
            vocab,
            tokens_input_name,
            speed_is_int32,
        })
    }

    /// Synthesize audio from an IPA phoneme string.
    ///
    /// Phonemes map through the vocab to token IDs (unknown characters are
    /// silently dropped). Sequences over [`MAX_PHONEME_LEN`] tokens are split
    /// at punctuation and the chunk audio is crossfaded back together.
    pub fn synthesize_phonemes(
        &mut self,
        phonemes: &str,
        voice_name: &str,
        speed: f32,
    ) -> Result<Vec<f32>, KokoroError> {
        let ids = vocab::tokens_from_ipa(phonemes, &self.vocab);

        if ids.is_empty() {
            log::warn!("No phoneme tokens produced for input: {phonemes:?}");
            return Ok(vec![]);
        }

        // Keep a stable style index so adjacent chunks don't change
        // style/prosody based on chunk length.
        let style_idx = ids.len();
        let estimated_samples = ids.len() * 300;
        let chunks = if ids.len() > MAX_PHONEME_LEN {
            log::debug!(
                "Kokoro phoneme sequence exceeded limit ({} > {}), chunking",
                ids.len(),
                MAX_PHONEME_LEN
            );
            split_chunks(&ids)
        } else {
            vec![ids]
        };

        let mut combined = Vec::with_capacity(estimated_samples);

        for chunk_ids in chunks.iter() {
            let style = self.voice_bank.style(voice_name, style_idx)?;
            let audio = self.synthesize_chunk(chunk_ids, &style, speed)?;
            if audio.is_empty() {
                continue;
            }

            if combined.is_empty() {
                combined.extend_from_slice(&audio);
            } else {
                append_with_crossfade(&mut combined, &audio, CHUNK_CROSSFADE_SAMPLES);
            }
        }

        Ok(combined)
    }

    /// Run ONNX inference on a single chunk of phoneme token IDs.
    fn synthesize_chunk(
        &mut self,
        tokens: &[i64],
        style: &[f32; STYLE_DIM],
        speed: f32,
    ) -> Result<Vec<f32>, KokoroError> {
        let seq_len = tokens.len() + 2; // +2 for padding tokens

        // Build tokens tensor: [[0, t1..tN, 0]]
        let mut padded = vec![0i64; seq_len];
        padded[1..seq_len - 1].copy_from_slice(tokens);
        let tokens_arr = Array2::from_shape_vec((1, seq_len), padded)?;

        // Build style tensor: [[s0..s255]] — use a view to avoid copying the 256-float array
        let style_view = ndarray::ArrayView2::from_shape((1, STYLE_DIM), style.as_slice())?;

        // Run session
        let output = if self.speed_is_int32 {
            let speed_arr = ndarray::arr1(&[speed as i32]);
            let inputs = inputs![
                self.tokens_input_name.as_str() => TensorRef::from_array_view(tokens_arr.view())?,
                "style" => TensorRef::from_array_view(style_view)?,
                "speed" => TensorRef::from_array_view(speed_arr.view())?,
            ];
            self.session.run(inputs)?
        } else {
            let speed_arr = ndarray::arr1(&[speed]);
            let inputs = inputs![
                self.tokens_input_name.as_str() => TensorRef::from_array_view(tokens_arr.view())?,
                "style" => TensorRef::from_array_view(style_view)?,
                "speed" => TensorRef::from_array_view(speed_arr.view())?,
            ];
            self.session.run(inputs)?
        };

        // Extract first output as waveform
        let first_output = output
            .iter()
            .next()
            .ok_or_else(|| KokoroError::Ort(ort::Error::new("No output from model")))?;
        let waveform = first_output.1.try_extract_array::<f32>()?;

        Ok(waveform.as_slice().unwrap_or(&[]).to_vec())
    }

    /// List all available voice names.
    pub fn list_voices(&self) -> Vec<&str> {
        self.voice_bank.names()
    }
}

/// Initialize an ONNX session with optional on-disk graph caching.
///
/// The first time a model is loaded, ORT runs Level3 graph optimization (5–10 s)
/// and serialises the result to `optimized_cache_path`.  Every subsequent load
/// reads the pre-optimized file directly at `Disable` optimization level, cutting
/// cold-start time to under one second.
///
/// If `optimized_cache_path` is `None` the original behaviour (always Level3) is
/// preserved, which is useful for unit-testing or read-only deployments.
fn init_session(
    onnx_path: &Path,
    num_threads: Option<usize>,
    optimized_cache_path: Option<&Path>,
) -> Result<Session, KokoroError> {
    let providers = vec![CPUExecutionProvider::default().build()];

    // Choose load path and optimization level depending on cache state.
    let (load_path, opt_level, write_cache) = match optimized_cache_path {
        // Pre-optimized graph already on disk → load it directly, skip optimization.
        Some(cache) if cache.exists() => {
            log::info!(
                "Loading pre-optimized Kokoro graph ({:.1} MB) from {:?} — skipping Level3",
                cache
                    .metadata()
                    .map(|m| m.len() as f64 / 1_048_576.0)
                    .unwrap_or(0.0),
                cache
            );
            (cache, GraphOptimizationLevel::Disable, false)
        }
        // Cache path given but file does not exist yet → build + persist.
        Some(cache) => {
            log::info!(
                "First load: running Level3 optimization; saving graph to {:?}",
                cache
            );
            (onnx_path, GraphOptimizationLevel::Level3, true)
        }
        // No cache path → original behaviour.
        None => (onnx_path, GraphOptimizationLevel::Level3, false),
    };

    let mut builder = Session::builder()?
        .with_optimization_level(opt_level)?
        .with_execution_providers(providers)?
        .with_parallel_execution(true)?;

    if write_cache {
        // Serialise the optimized graph so the next launch can skip optimization.
        let cache = optimized_cache_path.unwrap();
        builder = builder.with_optimized_model_path(cache)?;
    }

    if let Some(threads) = num_threads {
        builder = builder
            .with_intra_threads(threads)?
            .with_inter_threads(threads)?;
    }

    Ok(builder.commit_from_file(load_path)?)
}

/// Detect the token input name ("input_ids" or "tokens") from session inputs.
fn detect_tokens_input(session: &Session) -> String {
    for input in session.inputs() {
        if input.name() == "input_ids" || input.name() == "tokens" {
            return input.name().to_string();
        }
    }
    // Default to "input_ids" if neither is found
    "input_ids".to_string()
}

/// Detect whether the speed input expects int32 (true) or float32 (false).
fn detect_speed_type(session: &Session) -> bool {
    for input in session.inputs() {
        if input.name() == "speed" {
            // Check the type description
            let type_str = format!("{:?}", input.dtype());
            return type_str.contains("Int32") || type_str.contains("int32");
        }
    }
    // Default: modern Kokoro models use int32
    true
}

/// Split phoneme IDs into chunks of at most `MAX_PHONEME_LEN`, preferring punctuation.
fn split_chunks(ids: &[i64]) -> Vec<Vec<i64>> {
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < ids.len() {
        let end = (start + MAX_PHONEME_LEN).min(ids.len());
        if end == ids.len() {
            chunks.push(ids[start..end].to_vec());
            break;
        }

        // Try to find a good split point (last punctuation before `end`).
        // Punctuation IDs (hardcoded vocab): ';':1 ':':2 ',':3 '.':4 '!':5 '?':6
        const PUNCT_IDS: &[i64] = &[1, 2, 3, 4, 5, 6];
        let split = ids[start..end]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, &id)| PUNCT_IDS.contains(&id))
            .map(|(i, _)| start + i + 1)
            .unwrap_or(end);

        chunks.push(ids[start..split].to_vec());
        start = split;
    }

    chunks
}

fn append_with_crossfade(dst: &mut Vec<f32>, src: &[f32], crossfade_samples: usize) {
    let overlap = crossfade_samples.min(dst.len()).min(src.len());
    if overlap == 0 {
        dst.extend_from_slice(src);
        return;
    }

    let dst_start = dst.len() - overlap;
    for i in 0..overlap {
        let t = (i + 1) as f32 / (overlap as f32 + 1.0);
        let left = dst[dst_start + i] * (1.0 - t);
        let right = src[i] * t;
        dst[dst_start + i] = left + right;
    }

    dst.extend_from_slice(&src[overlap..]);
}

#[cfg(test)]
mod tests {
    use super::{append_with_crossfade, split_chunks, MAX_PHONEME_LEN};

    #[test]
    fn short_sequences_stay_whole() {
        let ids: Vec<i64> = (0..100).map(|i| 40 + i % 30).collect();
        assert_eq!(split_chunks(&ids), vec![ids]);
    }

    #[test]
    fn long_sequences_split_at_punctuation() {
        // 600 tokens with a period id (4) at position 500.
        let mut ids: Vec<i64> = vec![43; 600];
        ids[500] = 4;
        let chunks = split_chunks(&ids);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 501, "split lands just after the period");
        assert_eq!(*chunks[0].last().unwrap(), 4);
        assert_eq!(chunks[1].len(), 99);
    }

    #[test]
    fn long_sequences_without_punctuation_split_at_limit() {
        let ids: Vec<i64> = vec![43; MAX_PHONEME_LEN + 10];
        let chunks = split_chunks(&ids);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), MAX_PHONEME_LEN);
        assert_eq!(chunks[1].len(), 10);
    }

    #[test]
    fn crossfade_blends_overlap_and_keeps_length() {
        let mut dst = vec![1.0f32; 10];
        let src = vec![0.0f32; 10];
        append_with_crossfade(&mut dst, &src, 4);
        assert_eq!(dst.len(), 16);
        // Blended region ramps down from dst toward src.
        assert!(dst[6] > dst[7] && dst[7] > dst[8] && dst[8] > dst[9]);
        assert_eq!(dst[10..], [0.0; 6]);
    }

    #[test]
    fn crossfade_with_empty_dst_is_plain_append() {
        let mut dst = Vec::new();
        append_with_crossfade(&mut dst, &[0.5, 0.25], 240);
        assert_eq!(dst, vec![0.5, 0.25]);
    }
}
