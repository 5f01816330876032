use std::time::Instant;

use kokoro_tts::{Language, Synthesizer, TtsError};

fn main() -> Result<(), TtsError> {
    env_logger::init();

    let models_dir = std::env::args().nth(1).unwrap_or_else(|| "models".into());
    let synth = Synthesizer::new(models_dir);

    for lang in Language::ALL {
        println!(
            "{lang}: {} voices, default {:?}",
            lang.voices().len(),
            lang.default_voice()
        );
    }

    let load_start = Instant::now();
    let out = synth.synthesize_text("Hello world", "en", "af_bella", 1.0)?;
    println!(
        "en first call (includes model load): {:.2?} -> {} ({:.2}s @ {}Hz)",
        load_start.elapsed(),
        out.path.display(),
        out.duration_secs,
        out.sample_rate
    );

    // Second English call reuses the cached engine/converter pair.
    assert!(synth.registry().is_loaded(Language::English));
    let reuse_start = Instant::now();
    let out = synth.synthesize_text(
        "The English models are already loaded, so this call is much faster.",
        "en",
        "af_sarah",
        1.2,
    )?;
    let speedup = out.duration_secs / reuse_start.elapsed().as_secs_f64();
    println!(
        "en second call: {:.2?} ({:.1}x real-time), overwrote {}",
        reuse_start.elapsed(),
        speedup,
        out.path.display()
    );

    // Mandarin loads its own model pair on first use.
    let zh_start = Instant::now();
    let out = synth.synthesize_text("你好，世界。", "zh", "zf_001", 1.0)?;
    println!(
        "zh first call (includes model load): {:.2?} -> {} ({:.2}s)",
        zh_start.elapsed(),
        out.path.display(),
        out.duration_secs
    );

    Ok(())
}
