use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::model::PiperError;

/// Beginning-of-sentence phoneme.
pub const BOS: char = '^';
/// End-of-sentence phoneme.
pub const EOS: char = '$';
/// Padding phoneme interspersed after every phoneme.
pub const PAD: char = '_';

/// Location of the espeak-ng binary and its data directory.
///
/// `None` for either path falls back to the system default (`espeak-ng` from
/// PATH, built-in data directory).
#[derive(Debug, Clone, Default)]
pub struct EspeakConfig {
    pub bin_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
}

impl EspeakConfig {
    fn command(&self) -> Command {
        let bin = self
            .bin_path
            .as_deref()
            .map(|p| p.as_os_str().to_owned())
            .unwrap_or_else(|| "espeak-ng".into());
        let mut cmd = Command::new(bin);
        if let Some(data) = &self.data_path {
            cmd.arg(format!("--path={}", data.display()));
        }
        cmd
    }
}

/// Convert text to IPA phonemes via espeak-ng.
///
/// Boundary punctuation is taken from the input text rather than from
/// espeak-ng (which drops it in `--ipa` mode), so the returned phonemes keep
/// clause and sentence markers that the voice was trained with.
pub fn phonemize(text: &str, voice: &str, espeak: &EspeakConfig) -> Result<Vec<char>, PiperError> {
    let parts = split_text_parts(text);
    if parts.is_empty() {
        return Ok(Vec::new());
    }

    let text_segments: Vec<&str> = parts
        .iter()
        .filter_map(|part| match part {
            TextPart::Text(segment) => Some(segment.as_str()),
            TextPart::Punct(_) => None,
        })
        .collect();

    let segment_phonemes = if text_segments.is_empty() {
        Vec::new()
    } else {
        phonemize_segments_batch(&text_segments, voice, espeak)?
    };

    let mut phonemes = Vec::new();
    let mut segment_index = 0usize;
    let mut iter = parts.iter().peekable();
    while let Some(part) = iter.next() {
        match part {
            TextPart::Text(_) => {
                if let Some(chunk) = segment_phonemes.get(segment_index) {
                    phonemes.extend(chunk.chars());
                }
                segment_index += 1;
            }
            TextPart::Punct(ch) => {
                phonemes.push(*ch);
                if matches!(iter.peek(), Some(TextPart::Text(_))) {
                    phonemes.push(' ');
                }
            }
        }
    }

    Ok(phonemes)
}

/// Map phonemes to model input ids: `^ _ (p _)* $`.
///
/// Phonemes missing from the voice's map are dropped.
pub fn phonemes_to_ids(phonemes: &[char], id_map: &HashMap<char, Vec<i64>>) -> Vec<i64> {
    let mut ids = Vec::with_capacity(phonemes.len() * 2 + 3);
    let pad = id_map.get(&PAD);

    if let Some(bos) = id_map.get(&BOS) {
        ids.extend_from_slice(bos);
    }
    if let Some(pad) = pad {
        ids.extend_from_slice(pad);
    }

    for ph in phonemes {
        match id_map.get(ph) {
            Some(ph_ids) => {
                ids.extend_from_slice(ph_ids);
                if let Some(pad) = pad {
                    ids.extend_from_slice(pad);
                }
            }
            None => log::debug!("Dropping phoneme {ph:?} missing from phoneme_id_map"),
        }
    }

    if let Some(eos) = id_map.get(&EOS) {
        ids.extend_from_slice(eos);
    }
    ids
}

/// Split a phoneme stream into sentences, keeping the terminator with its sentence.
pub fn split_sentences(phonemes: &[char]) -> Vec<Vec<char>> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();

    for &ph in phonemes {
        if current.is_empty() && ph == ' ' {
            continue;
        }
        current.push(ph);
        if matches!(ph, '.' | '!' | '?') {
            sentences.push(std::mem::take(&mut current));
        }
    }

    if current.iter().any(|c| !c.is_whitespace()) {
        sentences.push(current);
    }
    sentences
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TextPart {
    Text(String),
    Punct(char),
}

fn split_text_parts(text: &str) -> Vec<TextPart> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for (idx, ch) in text.char_indices() {
        let ch_len = ch.len_utf8();
        if let Some(punct) = map_boundary_punctuation(ch) {
            if !is_numeric_connector_between_digits(text, idx, ch_len, ch) {
                flush_text_part(&mut parts, &mut current);
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

    flush_text_part(&mut parts, &mut current);
    parts
}

fn flush_text_part(parts: &mut Vec<TextPart>, current: &mut String) {
    let trimmed = current.trim();
    if trimmed.is_empty() {
        current.clear();
        return;
    }
    parts.push(TextPart::Text(trimmed.to_string()));
    current.clear();
}

fn map_boundary_punctuation(ch: char) -> Option<char> {
    match ch {
        '.' | '!' | '?' | ',' | ';' | ':' => Some(ch),
        // Devanagari danda and double danda end a sentence.
        '\u{0964}' | '\u{0965}' => Some('.'),
        '\n' | '\r' => Some('.'),
        _ => None,
    }
}

fn is_numeric_connector_between_digits(text: &str, idx: usize, ch_len: usize, ch: char) -> bool {
    if !matches!(ch, '.' | ',') {
        return false;
    }

    let prev = text[..idx].chars().next_back();
    let next = text[idx + ch_len..].chars().next();

    matches!(
        (prev, next),
        (Some(left), Some(right)) if left.is_numeric() && right.is_numeric()
    )
}

fn phonemize_segments_batch(
    segments: &[&str],
    voice: &str,
    espeak: &EspeakConfig,
) -> Result<Vec<String>, PiperError> {
    let batched_input = segments.join("\n");
    let output = run_espeak(&batched_input, voice, espeak)?;
    let lines: Vec<&str> = output.lines().collect();

    // espeak-ng should emit one line per input line for stdin mode.
    // If this assumption breaks, fall back to per-segment invocation.
    if lines.len() != segments.len() {
        return segments
            .iter()
            .map(|segment| {
                let output = run_espeak(segment, voice, espeak)?;
                Ok(clean_ipa(&output))
            })
            .collect();
    }

    Ok(lines.iter().map(|line| clean_ipa(line)).collect())
}

fn run_espeak(input: &str, voice: &str, espeak: &EspeakConfig) -> Result<String, PiperError> {
    let mut child = espeak
        .command()
        .args(["--ipa", "--stdin", "-q", "-v", voice])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PiperError::EspeakNotFound
            } else {
                PiperError::Io(e)
            }
        })?;

    // Feed stdin on its own thread: espeak-ng writes as it reads, and a full
    // stdout pipe would otherwise block both processes.
    let writer = child.stdin.take().map(|mut stdin| {
        // espeak-ng reads stdin line by line; an unterminated last line can lose its final token.
        let stdin_payload = canonicalize_espeak_stdin_payload(input).into_owned();
        std::thread::spawn(move || stdin.write_all(stdin_payload.as_bytes()))
    });

    let output = child.wait_with_output().map_err(PiperError::Io)?;
    let written = match writer {
        Some(handle) => handle.join().map_err(|_| {
            PiperError::PhonemizerFailed("espeak-ng stdin writer panicked".to_string())
        })?,
        None => Ok(()),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PiperError::PhonemizerFailed(format!(
            "espeak-ng exited with code {:?}: {stderr}",
            output.status.code()
        )));
    }
    written.map_err(PiperError::Io)?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn canonicalize_espeak_stdin_payload(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

/// Join espeak-ng output lines and strip its `_` tie markers.
fn clean_ipa(ipa: &str) -> String {
    ipa.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.replace('_', ""))
        .collect::<Vec<_>>()
        .join(" ")
}
