//! Recipe extraction from a timed video caption transcript.
//!
//! Captions are joined and cut into sentences. Spoken measurements ("two cups
//! of flour") become ingredient lines, imperative sentences become steps and
//! channel chatter is dropped. Everything here is a guess from speech, so no
//! field is scored above [`TRANSCRIPT_CONFIDENCE_CAP`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier::{self, ClassifierRules, ClassifyInput};
use crate::classify_line::{self, LineKind};
use crate::ingredient_parser;
use crate::quantity;
use crate::sections::{self, ListOptions};
use crate::text;
use crate::types::{RecipeImportResult, SourceKind};

/// Ceiling for every field read from a transcript.
pub const TRANSCRIPT_CONFIDENCE_CAP: f32 = 0.5;
const LINE_CONFIDENCE: f32 = 0.4;

/// One caption cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start_secs: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptStep {
    /// Start of the caption the step began in
    pub start_secs: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentedTranscript {
    pub ingredients: Vec<String>,
    pub steps: Vec<TranscriptStep>,
    /// Sentences dropped as chatter
    pub dropped: usize,
}

/// Sentence ends, and spoken sequencing words that start a new step.
static SENTENCE_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[.!?]+(?:\s+|$)|\s+(?:and\s+then|then|after\s+that|once\s+that's\s+done)\s+")
        .expect("Invalid sentence break regex")
});

/// Spoken lead-ins in front of the actual instruction.
static LEAD_FILLER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:so|um+|uh+|okay|ok|alright|well|now|and|then|next|first|firstly|finally|basically|just)\b[,\s]*)*(?:(?:i'm|i am|we're|we are|you're|you are)\s+(?:going\s+to|gonna)\s+|(?:you\s+)?(?:want\s+to|wanna|need\s+to|have\s+to)\s+|go\s+ahead\s+and\s+|let's\s+)?(?:just\s+)?",
    )
    .expect("Invalid lead filler regex")
});

static CHATTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:subscribe|thanks for watching|thank you for watching|welcome back|hey guys|hi guys|hey everyone|hi everyone|what's up|link in the description|links? below|comment below|smash that|hit the bell|notifications?|sponsor(?:ed)?|my channel|see you next time)\b",
    )
    .expect("Invalid chatter regex")
});

/// Clause separators inside one sentence.
static CLAUSE_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:[,;]|\band\b|\bplus\b)\s*").expect("Invalid clause split regex")
});

/// A spoken or written quantity followed by whitespace.
static QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:^|\s)(?P<qty>a\s+dozen|half\s+an?|a\s+quarter|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|an?|\d+(?:[./]\d+)?|[½¼¾⅓⅔⅛])\s+",
    )
    .expect("Invalid quantity regex")
});

/// Words that end an ingredient name in speech: "salt in a bowl"
const NAME_STOPS: &[&str] = &[
    " in ", " into ", " to ", " with ", " until ", " for ", " on ", " over ",
];

/// Counted things that are not ingredients: "three minutes"
const NOT_INGREDIENTS: &[&str] = &[
    "minute", "minutes", "second", "seconds", "hour", "hours", "times", "degrees", "days", "ways",
    "steps", "things", "people", "servings",
];

/// Split a transcript into ingredient lines and steps.
pub fn segment(segments: &[TranscriptSegment]) -> SegmentedTranscript {
    let mut out = SegmentedTranscript::default();

    for (start_secs, sentence) in sentences(segments) {
        if CHATTER_REGEX.is_match(&sentence)
            || classify_line::classify_line(&sentence) == LineKind::Garbage
        {
            tracing::trace!(sentence, "dropping transcript chatter");
            out.dropped += 1;
            continue;
        }
        let instruction = LEAD_FILLER_REGEX.replace(&sentence, "").trim().to_string();
        if instruction.is_empty() {
            continue;
        }

        for line in spoken_measurements(&instruction) {
            if !out.ingredients.iter().any(|l| l.eq_ignore_ascii_case(&line)) {
                out.ingredients.push(line);
            }
        }

        if is_instruction(&instruction) {
            out.steps.push(TranscriptStep {
                start_secs,
                text: as_step(&instruction),
            });
        }
    }

    tracing::debug!(
        ingredients = out.ingredients.len(),
        steps = out.steps.len(),
        dropped = out.dropped,
        "segmented transcript"
    );
    out
}

/// Build a transcript-sourced record.
pub fn import_transcript(
    url: &str,
    title: Option<&str>,
    segments: &[TranscriptSegment],
    rules: &ClassifierRules,
) -> RecipeImportResult {
    let segmented = segment(segments);
    let list = sections::process_ingredient_lines(&segmented.ingredients, &ListOptions::default());
    let steps: Vec<String> = segmented.steps.into_iter().map(|s| s.text).collect();

    let names: Vec<String> = list
        .ingredients
        .iter()
        .filter(|i| !i.is_section_marker())
        .map(|i| i.name.clone())
        .collect();
    let context = steps.join(" ");
    let classification = classifier::classify(
        &ClassifyInput {
            title: title.unwrap_or_default(),
            url,
            ingredients: &names,
            category_hint: None,
            context: &context,
        },
        rules,
    );
    let course = classification.course;
    let course_confidence = course.confidence.min(TRANSCRIPT_CONFIDENCE_CAP);

    RecipeImportResult::builder(url, SourceKind::Transcript)
        .name(title.map(str::to_string), TRANSCRIPT_CONFIDENCE_CAP)
        .ingredients(list.ingredients, LINE_CONFIDENCE)
        .raw_ingredients(list.raw)
        .equipment(list.equipment, LINE_CONFIDENCE)
        .directions(steps.clone(), LINE_CONFIDENCE)
        .raw_directions(steps)
        .course(Some(course.label.to_string()), course_confidence)
        .subcategory(course.subcategory.map(str::to_string), course_confidence)
        .cuisine(
            classification.cuisine.map(|c| c.label.to_string()),
            LINE_CONFIDENCE,
        )
        .detected_courses(classification.detected_courses)
        .detected_cuisines(classification.detected_cuisines)
        .build()
}

/// Joined caption text cut into sentences, each with the start time of the
/// caption it began in.
fn sentences(segments: &[TranscriptSegment]) -> Vec<(f64, String)> {
    let mut joined = String::new();
    let mut offsets: Vec<(usize, f64)> = Vec::new();
    for segment in segments {
        let cleaned = text::clean_text(&segment.text);
        if cleaned.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        offsets.push((joined.len(), segment.start_secs));
        joined.push_str(&cleaned);
    }

    let mut spans = Vec::new();
    let mut begin = 0;
    for m in SENTENCE_BREAK_REGEX.find_iter(&joined) {
        spans.push((begin, m.start()));
        begin = m.end();
    }
    spans.push((begin, joined.len()));

    spans
        .into_iter()
        .filter_map(|(start, end)| {
            let sentence = joined[start..end].trim();
            if sentence.is_empty() {
                return None;
            }
            let secs = offsets
                .iter()
                .rev()
                .find(|(offset, _)| *offset <= start)
                .map(|(_, secs)| *secs)
                .unwrap_or(0.0);
            Some((secs, sentence.to_string()))
        })
        .collect()
}

/// Every "quantity unit [of] name" phrase in the sentence, as ingredient lines
/// with digits in place of number words.
fn spoken_measurements(sentence: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for clause in CLAUSE_SPLIT_REGEX.split(sentence) {
        for caps in QUANTITY_REGEX.captures_iter(clause) {
            let (Some(qty), Some(whole)) = (caps.name("qty"), caps.get(0)) else {
                continue;
            };
            if let Some(line) = measurement_at(qty.as_str(), &clause[whole.end()..]) {
                lines.push(line);
                break;
            }
        }
    }
    lines
}

fn measurement_at(qty: &str, rest: &str) -> Option<String> {
    let qty = text::collapse_whitespace(qty);
    let (unit, after_unit) = match quantity::match_unit_prefix(rest) {
        Some((_, consumed)) => (rest[..consumed].trim(), &rest[consumed..]),
        None => ("", rest),
    };
    let is_article = matches!(qty.to_lowercase().as_str(), "a" | "an");
    if unit.is_empty() && is_article {
        return None;
    }

    let mut name = after_unit.trim_start();
    name = name.strip_prefix("of ").unwrap_or(name);
    let lower = name.to_lowercase();
    let cut = NAME_STOPS
        .iter()
        .filter_map(|stop| lower.find(stop))
        .min()
        .unwrap_or(name.len());
    let name = text::trim_name_punctuation(&name[..cut]);

    let words: Vec<&str> = name.split_whitespace().collect();
    if words.is_empty() || words.len() > 4 {
        return None;
    }
    if unit.is_empty() && NOT_INGREDIENTS.contains(&words[0].to_lowercase().as_str()) {
        return None;
    }

    let line = if unit.is_empty() {
        format!("{qty} {name}")
    } else {
        format!("{qty} {unit} {name}")
    };
    Some(ingredient_parser::normalize_number_words(&line).unwrap_or(line))
}

fn is_instruction(sentence: &str) -> bool {
    let mut words = sentence.split_whitespace();
    let first = words.next().unwrap_or_default();
    let long_enough = words.count() >= 2;
    long_enough
        && (classify_line::is_direction_verb(first)
            || classify_line::looks_like_direction(sentence))
}

/// Capitalized, with closing punctuation.
fn as_step(sentence: &str) -> String {
    let mut chars = sentence.chars();
    let mut step: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    if !step.ends_with(['.', '!', '?']) {
        step.push('.');
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start_secs: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_secs,
            text: text.to_string(),
        }
    }

    fn pancake_video() -> Vec<TranscriptSegment> {
        vec![
            cue(0.0, "Hey guys, welcome back to my channel!"),
            cue(3.5, "Today we're making pancakes."),
            cue(6.0, "First you want to whisk two cups of flour and one teaspoon of salt"),
            cue(10.0, "in a big bowl. Then add a pinch of sugar."),
            cue(14.0, "Cook for three minutes on each side."),
            cue(20.0, "Don't forget to subscribe!"),
        ]
    }

    #[test]
    fn test_segment_pancakes() {
        let segmented = segment(&pancake_video());
        assert_eq!(segmented.ingredients, vec!["2 cups flour", "1 teaspoon salt", "1 pinch sugar"]);
        let steps: Vec<&str> = segmented.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            steps,
            vec![
                "Whisk two cups of flour and one teaspoon of salt in a big bowl.",
                "Add a pinch of sugar.",
                "Cook for three minutes on each side.",
            ]
        );
        assert_eq!(segmented.steps[0].start_secs, 6.0);
        assert_eq!(segmented.dropped, 2);
    }

    #[test]
    fn test_counted_ingredients_without_units() {
        assert_eq!(spoken_measurements("crack in three eggs"), vec!["3 eggs"]);
        assert!(spoken_measurements("bake for twenty minutes").is_empty());
        assert!(spoken_measurements("cook for three minutes").is_empty());
        assert!(spoken_measurements("grab a bowl").is_empty());
    }

    #[test]
    fn test_import_transcript_caps_confidence() {
        let result = import_transcript(
            "https://video.example.com/watch?v=abc",
            Some("Fluffy Pancakes"),
            &pancake_video(),
            ClassifierRules::builtin(),
        );
        assert_eq!(result.source_kind(), SourceKind::Transcript);
        assert_eq!(result.real_ingredients().count(), 3);
        assert_eq!(result.directions().len(), 3);
        let c = result.confidence();
        for value in [c.name, c.course, c.ingredients, c.directions] {
            assert!(value > 0.0 && value <= TRANSCRIPT_CONFIDENCE_CAP);
        }
        assert_eq!(result.course(), Some("Brunch"));
    }

    #[test]
    fn test_empty_transcript() {
        let segmented = segment(&[]);
        assert!(segmented.ingredients.is_empty());
        assert!(segmented.steps.is_empty());
    }
}
