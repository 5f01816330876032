use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::{KokoroError, STYLE_DIM};

/// All style vectors from one voice bank archive.
///
/// Each voice is a list of 256-float style vectors; the list index
/// corresponds to the phoneme token count, which keeps prosody consistent
/// for inputs of similar length.
pub struct VoiceBank {
    voices: HashMap<String, Vec<[f32; STYLE_DIM]>>,
}

impl VoiceBank {
    /// Load a voice bank from a `.npz` (numpy zip) archive where each entry
    /// is a `.npy` file named after the voice (e.g. `af_bella.npy`).
    pub fn load(path: &Path) -> Result<Self, KokoroError> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| KokoroError::VoiceParse(format!("Failed to open zip archive: {e}")))?;

        let mut voices = HashMap::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| {
                KokoroError::VoiceParse(format!("Failed to read zip entry {i}: {e}"))
            })?;

            let entry_name = entry.name().to_string();
            if entry_name.ends_with('/') {
                continue;
            }
            let voice_name = entry_name.trim_end_matches(".npy");
            if voice_name.is_empty() {
                continue;
            }

            let mut raw = Vec::new();
            entry.read_to_end(&mut raw).map_err(|e| {
                KokoroError::VoiceParse(format!("Failed to read {entry_name}: {e}"))
            })?;

            let styles = parse_npy_styles(&raw, &entry_name)?;
            voices.insert(voice_name.to_string(), styles);
        }

        log::info!("Loaded {} voices", voices.len());
        Ok(Self { voices })
    }

    /// The style vector for a voice at the given index.
    ///
    /// The index is clamped to the valid range, so any index is safe.
    pub fn style(&self, voice: &str, idx: usize) -> Result<[f32; STYLE_DIM], KokoroError> {
        let styles = self
            .voices
            .get(voice)
            .ok_or_else(|| KokoroError::VoiceNotFound(voice.to_string()))?;

        let clamped = idx.min(styles.len().saturating_sub(1));
        Ok(styles[clamped])
    }

    /// All voice names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.voices.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Parse a numpy `.npy` payload into style vectors.
///
/// Expects a little-endian float32 array of shape `[N, 256]`.
fn parse_npy_styles(data: &[u8], name: &str) -> Result<Vec<[f32; STYLE_DIM]>, KokoroError> {
    // Header: \x93NUMPY, major, minor, header_len (little-endian u16).
    const MAGIC: &[u8] = b"\x93NUMPY";
    if data.len() < MAGIC.len() + 4 {
        return Err(KokoroError::VoiceParse(format!(
            "{name}: file too short ({} bytes)",
            data.len()
        )));
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(KokoroError::VoiceParse(format!(
            "{name}: invalid numpy magic bytes"
        )));
    }

    let header_len = u16::from_le_bytes([data[8], data[9]]) as usize;
    let payload = data
        .get(10 + header_len..)
        .ok_or_else(|| KokoroError::VoiceParse(format!("{name}: header truncated")))?;

    if payload.len() % (STYLE_DIM * 4) != 0 {
        return Err(KokoroError::VoiceParse(format!(
            "{name}: payload of {} bytes is not a whole number of {STYLE_DIM}-float style vectors",
            payload.len()
        )));
    }

    let styles = payload
        .chunks_exact(STYLE_DIM * 4)
        .map(|row| {
            let mut style = [0f32; STYLE_DIM];
            for (value, bytes) in style.iter_mut().zip(row.chunks_exact(4)) {
                *value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
            style
        })
        .collect();

    Ok(styles)
}
