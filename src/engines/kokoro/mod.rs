//! Kokoro-82M text-to-speech engine.
//!
//! ONNX-based synthesis over a loaded model/voice-bank pair. The engine
//! takes pre-phonemized IPA input; text handling lives in [`crate::g2p`].
//!
//! # Model Assets
//!
//! Each language binds to its own asset files (see
//! [`LanguageProfile`](crate::language::LanguageProfile)):
//!
//! ```text
//! models/
//! ├── kokoro-v1.0.onnx      # English model weights
//! ├── voices-v1.0.bin       # English voice bank (.npz)
//! ├── kokoro-v1.1-zh.onnx   # Mandarin model weights
//! ├── voices-v1.1-zh.bin    # Mandarin voice bank (.npz)
//! └── config.json           # Mandarin vocab config
//! ```
//!
//! Download: <https://github.com/thewh1teagle/kokoro-onnx/releases> and
//! <https://huggingface.co/onnx-community/Kokoro-82M-v1.1-zh-ONNX>.

pub mod engine;
pub mod model;
pub mod vocab;
pub mod voices;

pub use engine::{KokoroEngine, KokoroModelParams};
pub use model::KokoroError;
