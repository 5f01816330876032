//! espeak-ng subprocess backend shared by the language converters.

use std::borrow::Cow;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::G2pError;

/// Runs `espeak-ng --ipa` for a fixed voice.
///
/// By default the binary is resolved from `PATH`; applications that bundle
/// espeak-ng can point at an explicit binary and data directory instead.
#[derive(Debug, Clone)]
pub struct EspeakBackend {
    voice: String,
    bin_path: Option<PathBuf>,
    data_path: Option<PathBuf>,
}

impl EspeakBackend {
    /// Backend for the given espeak-ng voice (e.g. `"en-us"`, `"cmn"`),
    /// using the system espeak-ng from `PATH`.
    pub fn new(voice: &str) -> Self {
        Self {
            voice: voice.to_string(),
            bin_path: None,
            data_path: None,
        }
    }

    /// Backend with explicit espeak-ng binary and data paths. Either can be
    /// `None` to fall back to the system default.
    pub fn with_paths(voice: &str, bin_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Self {
        Self {
            voice: voice.to_string(),
            bin_path,
            data_path,
        }
    }

    /// The espeak-ng voice this backend phonemizes with.
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Phonemize one piece of text to IPA.
    pub fn ipa(&self, text: &str) -> Result<String, G2pError> {
        Ok(clean_ipa(&self.run(text)?))
    }

    /// Phonemize several segments in one espeak-ng invocation.
    ///
    /// Segments are batched as one line each on stdin; espeak-ng emits one
    /// output line per input line. If that assumption breaks (some voices
    /// fold lines), falls back to one invocation per segment.
    pub fn ipa_segments(&self, segments: &[&str]) -> Result<Vec<String>, G2pError> {
        let batched = segments.join("\n");
        let output = self.run(&batched)?;
        let lines: Vec<&str> = output.lines().collect();

        if lines.len() != segments.len() {
            return segments
                .iter()
                .map(|segment| Ok(clean_ipa(&self.run(segment)?)))
                .collect();
        }

        Ok(lines.iter().map(|line| clean_ipa(line)).collect())
    }

    fn run(&self, input: &str) -> Result<String, G2pError> {
        let bin: &std::ffi::OsStr = self
            .bin_path
            .as_ref()
            .map(|p| p.as_os_str())
            .unwrap_or_else(|| "espeak-ng".as_ref());

        let mut command = Command::new(bin);
        command.args(["--ipa", "--stdin", "-q", "-v", &self.voice]);
        if let Some(data) = &self.data_path {
            command.arg("--path").arg(data);
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    G2pError::EspeakNotFound
                } else {
                    G2pError::Io(e)
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // espeak-ng treats stdin as line-oriented input. Without a final
            // line terminator the last token can be under-processed, so the
            // payload is always newline-terminated.
            let payload = terminated(input);
            stdin.write_all(payload.as_bytes()).map_err(G2pError::Io)?;
        }

        let output = child.wait_with_output().map_err(G2pError::Io)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(G2pError::Phonemizer(format!(
                "espeak-ng exited with code {:?}: {stderr}",
                output.status.code()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn terminated(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

/// Normalize one espeak output line: trim, drop the `_` word separators
/// espeak sometimes emits.
fn clean_ipa(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|&ch| ch != '_')
        .collect()
}

/// True when espeak-ng is runnable in this environment. Used by tests to
/// skip when the binary is absent.
#[cfg(test)]
pub(crate) fn espeak_available() -> bool {
    Command::new("espeak-ng").arg("--version").output().is_ok()
}

#[cfg(test)]
mod tests {
    use super::{clean_ipa, espeak_available, terminated, EspeakBackend};

    #[test]
    fn appends_trailing_newline_for_espeak_stdin() {
        assert_eq!(terminated("America"), "America\n");
    }

    #[test]
    fn keeps_single_trailing_newline_for_espeak_stdin() {
        assert_eq!(terminated("America\n"), "America\n");
    }

    #[test]
    fn clean_ipa_strips_separators_and_blank_lines() {
        assert_eq!(clean_ipa("  həlˈoʊ_wˈɜːld  \n\n"), "həlˈoʊwˈɜːld");
    }

    #[test]
    fn espeak_output_is_stable_with_or_without_trailing_newline() {
        if !espeak_available() {
            return;
        }

        let backend = EspeakBackend::new("en-us");
        let without_newline = backend.ipa("America").expect("espeak should succeed");
        let with_newline = backend.ipa("America\n").expect("espeak should succeed");
        assert_eq!(
            without_newline.trim(),
            with_newline.trim(),
            "stdin termination must prevent final-token truncation"
        );
    }

    #[test]
    fn batched_segments_line_up_with_inputs() {
        if !espeak_available() {
            return;
        }

        let backend = EspeakBackend::new("en-us");
        let ipa = backend
            .ipa_segments(&["first segment", "second segment"])
            .expect("espeak should succeed");
        assert_eq!(ipa.len(), 2);
        assert!(ipa.iter().all(|line| !line.is_empty()));
    }
}
