//! Text normalization shared by every extractor.
//!
//! Everything here is a pure string transform: entity decoding, whitespace
//! cleanup, fraction and unit canonicalization, and name casing. The
//! combined [`normalize_ingredient_text`] is a fixed point: running it on its
//! own output changes nothing.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::quantity::{self, FRACTION_CHARS};

/// Regex to find HTML entities (named, decimal and hex)
static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});")
        .expect("Invalid entity regex")
});

/// Regex to strip HTML tags from fragments
pub(crate) static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));

/// Space left before punctuation after a closing tag was removed
static SPACE_BEFORE_PUNCT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?)])").expect("Invalid punctuation regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Whole number followed by a fraction: "1 1/2", "1-1/2"
static MIXED_FRACTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)(?:\s+|-)(\d+)/(\d+)").expect("Invalid mixed fraction regex")
});

static FRACTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)/(\d+)").expect("Invalid fraction regex"));

/// A number (digit or fraction glyph) followed by a unit spelling.
static UNIT_AFTER_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = quantity::normalizable_aliases()
        .iter()
        .map(|alias| regex::escape(alias))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?i)([0-9{FRACTION_CHARS}])\s*({alternation})\b\.?"
    ))
    .expect("Invalid unit regex")
});

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{00a0}"),
    ("deg", "\u{00b0}"),
    ("reg", "\u{00ae}"),
    ("copy", "\u{00a9}"),
    ("trade", "\u{2122}"),
    ("frac12", "½"),
    ("frac14", "¼"),
    ("frac34", "¾"),
    ("frac13", "⅓"),
    ("frac23", "⅔"),
    ("frac18", "⅛"),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("hellip", "\u{2026}"),
    ("times", "\u{00d7}"),
    ("bull", "\u{2022}"),
    ("middot", "\u{00b7}"),
    ("eacute", "é"),
    ("egrave", "è"),
    ("agrave", "à"),
    ("ntilde", "ñ"),
    ("uuml", "ü"),
    ("ouml", "ö"),
    ("auml", "ä"),
    ("ccedil", "ç"),
];

/// Words kept lower-case inside Title-Cased names.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "de", "del", "for", "from", "in", "into", "la",
    "of", "on", "or", "the", "to", "with",
];

/// Decode HTML entities (named, decimal and hex). Unknown entities are left as-is.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    ENTITY_REGEX
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
            } else {
                NAMED_ENTITIES
                    .iter()
                    .find(|(name, _)| *name == body)
                    .map(|(_, value)| (*value).to_string())
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Collapse all whitespace runs (including non-breaking spaces) and trim.
/// Zero-width characters are removed.
pub fn collapse_whitespace(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
        .collect();
    WHITESPACE_REGEX
        .replace_all(cleaned.trim(), " ")
        .trim()
        .to_string()
}

/// Replace ASCII fractions with unicode glyphs: "1 1/2" → "1½", "1/4" → "¼".
/// Fractions without a glyph ("5/16") are left alone.
pub fn canonicalize_fractions(s: &str) -> String {
    let mixed = replace_unglued(s, &MIXED_FRACTION_REGEX, |caps| {
        quantity::fraction_glyph(&caps[2], &caps[3]).map(|glyph| format!("{}{}", &caps[1], glyph))
    });
    replace_unglued(&mixed, &FRACTION_REGEX, |caps| {
        quantity::fraction_glyph(&caps[1], &caps[2]).map(String::from)
    })
}

/// Replace regex matches that aren't glued to neighbouring digits, slashes or
/// decimal points (so "1/2/3" or "2.1/2" stay untouched).
fn replace_unglued(s: &str, re: &Regex, f: impl Fn(&Captures) -> Option<String>) -> String {
    let glued = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit() || c == '/' || c == '.');
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in re.captures_iter(s) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        if glued(s[..m.start()].chars().next_back()) || glued(s[m.end()..].chars().next()) {
            continue;
        }
        if let Some(replacement) = f(&caps) {
            out.push_str(&s[last..m.start()]);
            out.push_str(&replacement);
            last = m.end();
        }
    }
    out.push_str(&s[last..]);
    out
}

/// Rewrite unit spellings that follow a number to their canonical token:
/// "2 tablespoons" → "2 Tbsp", "200grams" → "200 g".
pub fn canonicalize_units(s: &str) -> String {
    UNIT_AFTER_NUMBER_REGEX
        .replace_all(s, |caps: &Captures| match quantity::lookup_unit(&caps[2]) {
            Some(def) => format!("{} {}", &caps[1], def.canonical),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Full ingredient-line normalization: entities, whitespace, fractions, units.
pub fn normalize_ingredient_text(s: &str) -> String {
    let decoded = decode_entities(s);
    let collapsed = collapse_whitespace(&decoded);
    let fractions = canonicalize_fractions(&collapsed);
    canonicalize_units(&fractions)
}

/// Clean a free-text line pulled out of HTML or JSON: entities + whitespace.
pub fn clean_text(s: &str) -> String {
    collapse_whitespace(&decode_entities(s))
}

/// Strip tags from an HTML fragment and clean the remaining text.
pub fn strip_tags(html: &str) -> String {
    let cleaned = clean_text(&HTML_TAG_REGEX.replace_all(html, " "));
    SPACE_BEFORE_PUNCT_REGEX.replace_all(&cleaned, "$1").into_owned()
}

/// Title-Case a name, keeping stop words lower-case (except the first word).
/// Letters after the first of each word are left as written, so acronyms survive.
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .filter(|w| !w.is_empty())
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && STOP_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize_parts(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalize each hyphen-separated part: "all-purpose" → "All-Purpose".
fn capitalize_parts(word: &str) -> String {
    word.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Trim punctuation and stray separators from both ends of a name.
pub fn trim_name_punctuation(s: &str) -> String {
    s.trim_matches(|c: char| {
        c.is_whitespace()
            || matches!(
                c,
                ',' | ';' | ':' | '.' | '-' | '–' | '—' | '*' | '•' | '(' | ')' | '[' | ']'
            )
    })
    .to_string()
}

/// Lower-case and collapse whitespace, for comparisons and dedup keys.
pub fn normalize_key(s: &str) -> String {
    collapse_whitespace(&s.to_lowercase())
}
