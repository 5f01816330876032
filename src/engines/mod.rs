//! Speech synthesis engines.
//!
//! One engine is implemented: Kokoro-82M over ONNX. The
//! [`SynthesisEngine`](crate::SynthesisEngine) trait is the seam the
//! registry stores, so further engines can slot in without touching the
//! pipeline.

pub mod kokoro;
