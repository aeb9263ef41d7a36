//! Trivial tokenizer for Indic scripts and Urdu.
//!
//! Punctuation is split off into its own token, runs of spaces collapse,
//! and number sequences like `12,000` or `3/4/2024` are kept whole.

use std::sync::LazyLock;

use regex::Regex;

#[derive(thiserror::Error, Debug)]
pub enum NormalizationError {
    #[error("Tokenizer pattern failed to compile: {0}")]
    Pattern(String),
}

/// Languages the Indic rules are written for.
const INDIC_LANGUAGES: &[&str] = &[
    "hi", "mr", "ne", "sa", "kok", "bn", "as", "or", "pa", "gu", "ta", "te", "kn", "ml", "sd",
    "si", "mni", "sat",
];

const ASCII_PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Danda, double danda, Meetei Mayek and Ol Chiki marks.
const INDIC_PUNCTUATION: &str =
    "\u{0964}\u{0965}\u{AAF1}\u{AAF0}\u{ABEB}\u{ABEC}\u{ABED}\u{ABEE}\u{ABEF}\u{1C7E}\u{1C7F}";

/// Arabic-script marks used in Urdu.
const URDU_PUNCTUATION: &str =
    "\u{0609}\u{060A}\u{060C}\u{061E}\u{066A}\u{066B}\u{066C}\u{066D}\u{06D4}";

static INDIC_PUNCT_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| punctuation_regex(INDIC_PUNCTUATION));

static URDU_PUNCT_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| punctuation_regex(URDU_PUNCTUATION));

static SPACES_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"[ ]+"));

static NUMBER_SEQ_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"([0-9]+ [,.:/] )+[0-9]+"));

fn punctuation_regex(script_marks: &str) -> Result<Regex, regex::Error> {
    let class: String = ASCII_PUNCTUATION
        .chars()
        .chain(script_marks.chars())
        .map(|c| regex::escape(c.encode_utf8(&mut [0u8; 4])))
        .collect();
    Regex::new(&format!("([{class}])"))
}

fn compiled(
    re: &'static LazyLock<Result<Regex, regex::Error>>,
) -> Result<&'static Regex, NormalizationError> {
    LazyLock::force(re)
        .as_ref()
        .map_err(|e| NormalizationError::Pattern(e.to_string()))
}

/// Whether `language` is one the tokenizer has dedicated rules for.
pub fn is_supported_language(language: &str) -> bool {
    language == "ur" || INDIC_LANGUAGES.contains(&language)
}

/// Split `text` into tokens using the rules for `language`.
///
/// Urdu gets its own punctuation set; every other tag, listed or not, uses
/// the Indic rules. Empty or whitespace-only input yields a single empty token.
pub fn trivial_tokenize(text: &str, language: &str) -> Result<Vec<String>, NormalizationError> {
    let punct = match language {
        "ur" => compiled(&URDU_PUNCT_RE)?,
        _ => compiled(&INDIC_PUNCT_RE)?,
    };

    let spaced = punct.replace_all(&text.replace('\t', " "), " $1 ").into_owned();
    let collapsed = compiled(&SPACES_RE)?
        .replace_all(&spaced, " ")
        .trim_matches(' ')
        .to_string();
    let joined = compiled(&NUMBER_SEQ_RE)?
        .replace_all(&collapsed, |caps: &regex::Captures<'_>| caps[0].replace(' ', ""))
        .into_owned();

    Ok(joined.split(' ').map(str::to_string).collect())
}
