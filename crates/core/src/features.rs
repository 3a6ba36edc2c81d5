//! Text statistics: word and sentence counts, Flesch Reading Ease, thinness.
//!
//! Everything here is a pure function of the input text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Pages below this many words are flagged as thin content.
pub const THIN_CONTENT_WORDS: usize = 500;

/// A terminator run, optional closing quotes/brackets, then whitespace or end of text.
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[.!?]+["'”’)\]]*(?:\s+|$)"#).unwrap());

/// Lowercase tokens that end with a period without ending a sentence.
const ABBREVIATIONS: [&str; 15] =
    ["mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd", "corp"];

/// Abbreviations that are also ordinary words; only treated as such before a number.
const NUMBERED_ABBREVIATIONS: [&str; 14] =
    ["no", "fig", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec"];

const VOWELS: [char; 6] = ['a', 'e', 'i', 'o', 'u', 'y'];

/// Numeric features of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub word_count: usize,
    pub sentence_count: usize,
    /// Flesch Reading Ease, unclamped; may be negative or above 100.
    pub flesch_reading_ease: f64,
    /// Always equal to `word_count < THIN_CONTENT_WORDS`.
    pub is_thin: bool,
}

impl FeatureVector {
    /// Model input in fixed order: word count, sentence count, readability.
    pub fn as_model_input(&self) -> [f64; 3] {
        [self.word_count as f64, self.sentence_count as f64, self.flesch_reading_ease]
    }

    pub fn reading_level(&self) -> ReadingLevel {
        ReadingLevel::from_score(self.flesch_reading_ease)
    }
}

/// Computes word count, sentence count, readability and the thin-content flag.
///
/// # Example
///
/// ```rust
/// use seoscope_core::extract_features;
///
/// let features = extract_features("The cat sat. The dog ran.");
/// assert_eq!(features.word_count, 6);
/// assert_eq!(features.sentence_count, 2);
/// assert!(features.is_thin);
/// ```
pub fn extract_features(text: &str) -> FeatureVector {
    let word_count = text.split_whitespace().count();
    let sentence_count = split_sentences(text).len();
    let flesch_reading_ease = flesch_reading_ease(text);

    FeatureVector { word_count, sentence_count, flesch_reading_ease, is_thin: is_thin(word_count) }
}

pub fn is_thin(word_count: usize) -> bool {
    word_count < THIN_CONTENT_WORDS
}

/// Splits text into sentences.
///
/// A boundary is a run of `.`, `!` or `?` followed by whitespace or the end
/// of the text. A lone period does not end a sentence when the next word
/// starts lowercase, or when the word before it is a known abbreviation or a
/// single-letter initial.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        let terminator = m.as_str().trim_end();
        let next = text[m.end()..].chars().next();

        if is_boundary(&text[start..m.start()], terminator, next) {
            let sentence = text[start..m.end()].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = m.end();
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

fn is_boundary(before: &str, terminator: &str, next: Option<char>) -> bool {
    if terminator.contains(['!', '?']) {
        return true;
    }

    let Some(next) = next else {
        return true;
    };
    if next.is_lowercase() {
        return false;
    }

    let last_word = before
        .split_whitespace()
        .last()
        .map(|w| w.trim_start_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .unwrap_or_default();

    let is_initial = last_word.chars().count() == 1 && last_word.chars().all(char::is_alphabetic);
    let is_numbered = next.is_ascii_digit() && NUMBERED_ABBREVIATIONS.contains(&last_word.as_str());
    !(is_initial || is_numbered || ABBREVIATIONS.contains(&last_word.as_str()))
}

/// Estimates the syllables in one word by counting vowel groups.
///
/// A trailing silent `e` is dropped unless the word ends in consonant + `le`.
/// Tokens without letters count as one syllable.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();

    if letters.is_empty() {
        return 1;
    }

    let mut count = 0;
    let mut prev_was_vowel = false;
    for ch in &letters {
        let is_vowel = VOWELS.contains(ch);
        if is_vowel && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = is_vowel;
    }

    let n = letters.len();
    if count > 1 && letters[n - 1] == 'e' {
        let consonant_le = n >= 3 && letters[n - 2] == 'l' && !VOWELS.contains(&letters[n - 3]);
        if !consonant_le {
            count -= 1;
        }
    }

    count.max(1)
}

/// Flesch Reading Ease: `206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)`.
///
/// Words are whitespace tokens containing at least one alphanumeric
/// character. A zero denominator makes its term zero, so empty text scores
/// 206.835. The result is not clamped.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect();
    let sentences = split_sentences(text).len();
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = if sentences == 0 { 0.0 } else { words.len() as f64 / sentences as f64 };
    let syllables_per_word = if words.is_empty() { 0.0 } else { syllables as f64 / words.len() as f64 };

    206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word
}

/// Human interpretation of a Flesch Reading Ease score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadingLevel {
    VeryEasy,
    Easy,
    FairlyEasy,
    Standard,
    FairlyDifficult,
    Difficult,
    VeryDifficult,
}

impl ReadingLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::VeryEasy,
            s if s >= 80.0 => Self::Easy,
            s if s >= 70.0 => Self::FairlyEasy,
            s if s >= 60.0 => Self::Standard,
            s if s >= 50.0 => Self::FairlyDifficult,
            s if s >= 30.0 => Self::Difficult,
            _ => Self::VeryDifficult,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryEasy => "Very Easy",
            Self::Easy => "Easy",
            Self::FairlyEasy => "Fairly Easy",
            Self::Standard => "Standard",
            Self::FairlyDifficult => "Fairly Difficult",
            Self::Difficult => "Difficult",
            Self::VeryDifficult => "Very Difficult",
        }
    }

    /// Approximate US school grade for the band.
    pub fn grade(&self) -> &'static str {
        match self {
            Self::VeryEasy => "5th grade",
            Self::Easy => "6th grade",
            Self::FairlyEasy => "7th grade",
            Self::Standard => "8th-9th grade",
            Self::FairlyDifficult => "10th-12th grade",
            Self::Difficult => "College",
            Self::VeryDifficult => "Professional",
        }
    }
}

impl std::fmt::Display for ReadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} level)", self.label(), self.grade())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// 20 words, 30 syllables, one sentence: Flesch = 59.635.
    const STANDARD_SENTENCE: &str = "The big cat sat on the red mat by the garden window paper river yellow basket silver morning button pencil.";

    #[rstest]
    #[case(0, true)]
    #[case(1, true)]
    #[case(499, true)]
    #[case(500, false)]
    #[case(501, false)]
    #[case(10_000, false)]
    fn test_thin_boundary(#[case] words: usize, #[case] thin: bool) {
        assert_eq!(is_thin(words), thin);

        let text = vec!["word"; words].join(" ");
        let features = extract_features(&text);
        assert_eq!(features.word_count, words);
        assert_eq!(features.is_thin, thin);
    }

    #[rstest]
    #[case("the", 1)]
    #[case("cat", 1)]
    #[case("by", 1)]
    #[case("garden", 2)]
    #[case("yellow", 2)]
    #[case("table", 2)]
    #[case("make", 1)]
    #[case("reading", 2)]
    #[case("Pencil.", 2)]
    #[case("2024", 1)]
    #[case("beautiful", 3)]
    fn test_count_syllables(#[case] word: &str, #[case] expected: usize) {
        assert_eq!(count_syllables(word), expected);
    }

    #[test]
    fn test_split_sentences_basic() {
        let sentences = split_sentences("First one. Second one! Third one? Fourth");
        assert_eq!(sentences, vec!["First one.", "Second one!", "Third one?", "Fourth"]);
    }

    #[test]
    fn test_split_sentences_abbreviations() {
        let sentences = split_sentences("Mr. Smith met Dr. Jones at 5 p.m. on Main Street. Then they left.");
        assert_eq!(sentences.len(), 2);

        let sentences = split_sentences("Tools, e.g. Hammers, work. J. R. Tolkien wrote books.");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_split_sentences_numbered_abbreviations() {
        assert_eq!(split_sentences("The answer is no. We left early.").len(), 2);
        assert_eq!(split_sentences("It rained in Mar. Then it stopped.").len(), 2);
        assert_eq!(split_sentences("See Fig. 3 for details. It helps.").len(), 2);
        assert_eq!(split_sentences("Item No. 42 shipped. Done.").len(), 2);
    }

    #[test]
    fn test_split_sentences_lowercase_continuation() {
        assert_eq!(split_sentences("Version 2. the rest follows.").len(), 1);
    }

    #[test]
    fn test_split_sentences_quotes() {
        let sentences = split_sentences(r#"He said "stop." She left."#);
        assert_eq!(sentences, vec![r#"He said "stop.""#, "She left."]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_flesch_known_value() {
        let score = flesch_reading_ease(STANDARD_SENTENCE);
        assert!((score - 59.635).abs() < 1e-9);
    }

    #[test]
    fn test_flesch_is_not_clamped() {
        let hard = "Internationalization responsibilities notwithstanding, organizational \
                    institutionalization characteristically necessitates extraordinarily \
                    comprehensive interdepartmental communication methodologies.";
        assert!(flesch_reading_ease(hard) < 0.0);

        assert!(flesch_reading_ease("Go. Run. Sit. Eat.") > 100.0);
    }

    #[test]
    fn test_empty_text_does_not_panic() {
        let features = extract_features("");
        assert_eq!(features.word_count, 0);
        assert_eq!(features.sentence_count, 0);
        assert!((features.flesch_reading_ease - 206.835).abs() < 1e-9);
        assert!(features.is_thin);
    }

    #[test]
    fn test_extract_features_is_pure() {
        let text = STANDARD_SENTENCE.repeat(3);
        assert_eq!(extract_features(&text), extract_features(&text));
    }

    #[test]
    fn test_model_input_order() {
        let features = FeatureVector { word_count: 900, sentence_count: 40, flesch_reading_ease: 45.5, is_thin: false };
        assert_eq!(features.as_model_input(), [900.0, 40.0, 45.5]);
    }

    #[rstest]
    #[case(95.0, ReadingLevel::VeryEasy)]
    #[case(90.0, ReadingLevel::VeryEasy)]
    #[case(85.0, ReadingLevel::Easy)]
    #[case(70.0, ReadingLevel::FairlyEasy)]
    #[case(65.0, ReadingLevel::Standard)]
    #[case(50.0, ReadingLevel::FairlyDifficult)]
    #[case(30.0, ReadingLevel::Difficult)]
    #[case(29.99, ReadingLevel::VeryDifficult)]
    #[case(-12.0, ReadingLevel::VeryDifficult)]
    fn test_reading_level_bands(#[case] score: f64, #[case] level: ReadingLevel) {
        assert_eq!(ReadingLevel::from_score(score), level);
    }

    #[test]
    fn test_reading_level_display() {
        assert_eq!(ReadingLevel::Standard.to_string(), "Standard (8th-9th grade level)");
    }
}
