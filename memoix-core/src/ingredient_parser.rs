//! Ingredient parsing module.
//!
//! Parses one raw ingredient line (e.g., "2 cups flour, sifted") into an
//! [`Ingredient`]. Parsing is an ordered cascade of named rules; the first
//! rule that recognizes the line wins and the generic amount rule always
//! matches. Every rule hands its pieces to the same post-processing, which
//! pulls modifiers, comma tails and parentheticals into the preparation and
//! splits "X or Y" alternatives.

use std::sync::LazyLock;

use regex::Regex;

use crate::classify_line::{self, LineKind};
use crate::quantity::{self, UnitDef, FRACTION_CHARS};
use crate::text;
use crate::types::{Ingredient, RawIngredientData};

/// A single quantity: mixed glyph ("1½", "1 ½"), mixed fraction ("1 5/16"),
/// bare fraction, glyph, or plain/decimal number.
static QTY_PATTERN: LazyLock<String> = LazyLock::new(|| {
    format!(
        r"(?:\d+\s?[{FRACTION_CHARS}]|\d+\s+\d+/\d+|\d+/\d+|[{FRACTION_CHARS}]|\d+(?:\.\d+)?)"
    )
});

/// Leading quantity with an optional dash or "to" range.
static AMOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let q = QTY_PATTERN.as_str();
    Regex::new(&format!(
        r"(?i)^(?P<low>{q})(?:\s*[-–—]\s*(?P<high>{q})|\s+to\s+(?P<high_to>{q}))?"
    ))
    .expect("Invalid amount regex")
});

static GLYPH_GAP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(\d)\s+([{FRACTION_CHARS}])")).expect("Invalid glyph gap regex")
});

static BULLET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•·▪▸►▢☐□✓✔*\-–—]+\s*").expect("Invalid bullet regex"));

/// Leading "Optional:" label, matched without the rest of the line.
static OPTIONAL_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^optional\s*[:\-–—]\s*").expect("Invalid optional label regex")
});

static TOP_UP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^top(?:\s+(?:it\s+)?up)?\s+with\s+(?P<rest>.+?)\.?$")
        .expect("Invalid top up regex")
});

static COCKTAIL_COLON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z][^:\d]{0,40}?)\s*:\s*(?P<rest>.+)$")
        .expect("Invalid cocktail colon regex")
});

static BAKER_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[^,\d%]+?),\s*(?P<pct>\d+(?:\.\d+)?)\s*%\s*(?:[-–—:]\s*)?(?P<rest>.*)$",
    )
    .expect("Invalid baker's percentage regex")
});

static LEADING_PERCENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<pct>\d+(?:\.\d+)?)\s*%\s+(?P<rest>.+)$")
        .expect("Invalid leading percent regex")
});

static RATIO_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<lead>.+?)\s+(?P<ratio>per\s+[0-9{FRACTION_CHARS}].*)$"
    ))
    .expect("Invalid ratio regex")
});

static NAME_AMOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<name>[A-Za-z][^,\d(]*?),\s*(?P<amount>[0-9{FRACTION_CHARS}].*)$"
    ))
    .expect("Invalid name-amount regex")
});

static AS_NEEDED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<name>[a-z][^,]*?),?\s+(?P<note>as needed|to taste|as required|for garnish|for serving|for dusting|for greasing|for frying)\.?$",
    )
    .expect("Invalid as-needed regex")
});

static INLINE_BRACKET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<section>[^\]]{1,60})\]\s*(?P<rest>.+)$")
        .expect("Invalid inline bracket regex")
});

static INLINE_PAREN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\((?P<section>for\s+[^)]{1,50})\)\s*(?P<rest>.+)$")
        .expect("Invalid inline paren regex")
});

static INLINE_FOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<section>for\s+the\s+[^:]{1,40}):\s*(?P<rest>.+)$")
        .expect("Invalid inline for-the regex")
});

static NUMBER_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<word>a\s+dozen|dozen|half\s+an?|half|a\s+quarter|quarter|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|an?)\s+(?P<rest>.+)$",
    )
    .expect("Invalid number word regex")
});

static BAKER_PAREN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<pct>\d+(?:\.\d+)?)\s*%$").expect("Invalid baker paren regex")
});

static RATIO_NOTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:\.\d+)?\s*:\s*\d+(?:\.\d+)?").expect("Invalid ratio note regex")
});

/// Descriptive words pulled off the front of a name into the preparation.
const LEADING_MODIFIERS: &[&str] = &[
    "beaten", "boneless", "chopped", "cooked", "crumbled", "crushed", "cubed", "diced", "drained",
    "grated", "halved", "julienned", "melted", "minced", "packed", "peeled", "pitted", "quartered",
    "rinsed", "seeded", "shredded", "sifted", "skinless", "sliced", "softened", "toasted",
    "trimmed", "uncooked", "zested",
];

/// Adverbs that attach to a following modifier ("finely chopped").
const MODIFIER_ADVERBS: &[&str] = &[
    "coarsely", "finely", "firmly", "freshly", "lightly", "loosely", "roughly", "thinly", "very",
];

/// Notes that sometimes trail a name without a comma.
const TRAILING_NOTES: &[&str] = &[
    "plus more for serving",
    "plus more to taste",
    "or more to taste",
    "for garnish",
    "for serving",
    "to taste",
    "as needed",
    "optional",
    "divided",
];

/// Adjectives that make "X or Y" one name ("red or green bell pepper").
const BARE_ADJECTIVES: &[&str] = &[
    "big", "black", "brown", "dark", "dried", "dry", "fresh", "golden", "green", "hot", "large",
    "light", "medium", "mild", "orange", "purple", "raw", "red", "ripe", "small", "sweet", "white",
    "whole", "yellow",
];

/// Labels that look like "Name: amount" but describe the recipe, not an ingredient.
const RECIPE_META_LABELS: &[&str] = &[
    "yield", "yields", "serves", "servings", "makes", "prep time", "cook time", "total time",
];

/// A named parsing rule. Returns `None` when the line isn't its shape.
struct Rule {
    name: &'static str,
    /// Takes the line and how many prefix rules already wrap it.
    apply: fn(&str, usize) -> Option<Ingredient>,
}

/// Prefix rules ("Optional:", "[Section]", "two ...") re-enter the cascade on
/// the remainder. Past this depth the remainder is rejected.
const MAX_NESTING: usize = 4;

/// Parsing rules in priority order. The last rule always matches.
static RULES: &[Rule] = &[
    Rule {
        name: "optional_prefix",
        apply: optional_prefix,
    },
    Rule {
        name: "top_up",
        apply: top_up,
    },
    Rule {
        name: "cocktail_colon",
        apply: cocktail_colon,
    },
    Rule {
        name: "bakers_percentage",
        apply: bakers_percentage,
    },
    Rule {
        name: "ratio",
        apply: ratio,
    },
    Rule {
        name: "name_then_amount",
        apply: name_then_amount,
    },
    Rule {
        name: "as_needed",
        apply: as_needed,
    },
    Rule {
        name: "inline_section",
        apply: inline_section,
    },
    Rule {
        name: "number_words",
        apply: number_words,
    },
    Rule {
        name: "dual_quantity",
        apply: dual_quantity,
    },
    Rule {
        name: "dual_unit",
        apply: dual_unit,
    },
    Rule {
        name: "generic_amount",
        apply: generic_amount,
    },
];

/// Parse a single ingredient line.
///
/// Best-effort: a line with no recognizable amount becomes a bare name, and a
/// line that is only a section header becomes a section marker.
pub fn parse_ingredient(raw: &str) -> Ingredient {
    parse_nested(raw, 0)
}

fn parse_nested(raw: &str, depth: usize) -> Ingredient {
    let line = prepare_line(raw);
    if line.is_empty() {
        return Ingredient::default();
    }
    if let Some(section) = classify_line::section_header_name(&line) {
        return Ingredient::section_marker(section);
    }
    if depth > MAX_NESTING {
        tracing::debug!(depth, "ingredient prefixes nested too deep");
        return Ingredient::default();
    }
    for rule in RULES {
        if let Some(ingredient) = (rule.apply)(&line, depth) {
            tracing::trace!(rule = rule.name, line = %line, "ingredient rule matched");
            return ingredient;
        }
    }
    Ingredient::default()
}

/// Name of the rule that recognizes this line, for debugging parse results.
pub fn matching_rule(raw: &str) -> Option<&'static str> {
    let line = prepare_line(raw);
    if line.is_empty() {
        return None;
    }
    if classify_line::section_header_name(&line).is_some() {
        return Some("section_header");
    }
    RULES
        .iter()
        .find(|rule| (rule.apply)(&line, 0).is_some())
        .map(|rule| rule.name)
}

/// Build the pre-parse audit record for one raw ingredient string.
///
/// Garbage lines are recorded as-is without running the parser.
pub fn build_raw_ingredient(raw: &str) -> RawIngredientData {
    let original = text::collapse_whitespace(raw);
    let kind = classify_line::classify_line(&original);
    let parsed = if kind == LineKind::Garbage {
        Ingredient::default()
    } else {
        parse_ingredient(&original)
    };
    let is_section = kind == LineKind::SectionHeader || parsed.is_section_marker();
    RawIngredientData {
        looks_like_ingredient: kind == LineKind::Ingredient && !parsed.name.is_empty(),
        is_section,
        section_name: parsed.section.clone(),
        amount: parsed.amount,
        unit: parsed.unit,
        preparation: parsed.preparation,
        name: parsed.name,
        baker_percent: parsed.baker_percent,
        original,
    }
}

/// Rewrite a leading number word to digits: "two cups" → "2 cups",
/// "half a cup" → "½ cup", "a dozen eggs" → "12 eggs".
///
/// "a"/"an" only count as one when a unit follows ("a pinch of salt").
pub fn normalize_number_words(line: &str) -> Option<String> {
    let caps = NUMBER_WORD_REGEX.captures(line.trim())?;
    let word = text::collapse_whitespace(&caps["word"].to_lowercase());
    let rest = &caps["rest"];
    let value = match word.as_str() {
        "a dozen" | "dozen" => "12",
        "half a" | "half an" | "half" => "½",
        "a quarter" | "quarter" => "¼",
        "one" => "1",
        "two" => "2",
        "three" => "3",
        "four" => "4",
        "five" => "5",
        "six" => "6",
        "seven" => "7",
        "eight" => "8",
        "nine" => "9",
        "ten" => "10",
        "eleven" => "11",
        "twelve" => "12",
        "a" | "an" => {
            quantity::match_unit_prefix(rest)?;
            "1"
        }
        _ => return None,
    };
    Some(format!("{value} {rest}"))
}

fn prepare_line(raw: &str) -> String {
    let normalized = text::normalize_ingredient_text(raw);
    BULLET_REGEX.replace(&normalized, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn optional_prefix(line: &str, depth: usize) -> Option<Ingredient> {
    let mut rest = line;
    while let Some(label) = OPTIONAL_LABEL_REGEX.find(rest) {
        rest = &rest[label.end()..];
    }
    if rest.len() == line.len() || rest.is_empty() {
        return None;
    }
    let mut ingredient = parse_nested(rest, depth + 1);
    ingredient.is_optional = true;
    Some(ingredient)
}

fn top_up(line: &str, _depth: usize) -> Option<Ingredient> {
    let caps = TOP_UP_REGEX.captures(line)?;
    Some(finish(Draft {
        amount: "Top".to_string(),
        rest: caps["rest"].to_string(),
        ..Draft::default()
    }))
}

fn cocktail_colon(line: &str, _depth: usize) -> Option<Ingredient> {
    let caps = COCKTAIL_COLON_REGEX.captures(line)?;
    let name = caps["name"].trim();
    let lower = name.to_lowercase();
    if lower.starts_with("for ") || RECIPE_META_LABELS.contains(&lower.as_str()) {
        return None;
    }
    let rest = caps["rest"].trim();

    let rest_lower = rest.to_lowercase();
    if rest_lower == "top" || rest_lower.starts_with("top ") {
        let prefix_len = if rest_lower.starts_with("top up") { 6 } else { 3 };
        let mut draft = Draft {
            amount: "Top".to_string(),
            rest: name.to_string(),
            ..Draft::default()
        };
        draft.absorb_notes(rest.get(prefix_len..).unwrap_or_default());
        return Some(finish(draft));
    }

    let amount = extract_amount(rest)?;
    let mut draft = Draft::with_amount(&amount, name.to_string());
    let mut leftover = amount.rest.clone();
    if let Some(metric) = amount.rest.strip_prefix('/') {
        if let Some(second) = extract_amount(metric) {
            draft.preparation.push(second.display());
            leftover = second.rest;
        }
    }
    draft.absorb_notes(&leftover);
    Some(finish(draft))
}

fn bakers_percentage(line: &str, _depth: usize) -> Option<Ingredient> {
    if let Some(caps) = BAKER_LINE_REGEX.captures(line) {
        let name = caps["name"].trim().to_string();
        let rest = caps["rest"].trim();
        let mut draft = match extract_amount(rest) {
            Some(amount) => {
                let mut draft = Draft::with_amount(&amount, name);
                draft.absorb_notes(&amount.rest);
                draft
            }
            None => {
                let mut draft = Draft {
                    rest: name,
                    ..Draft::default()
                };
                draft.absorb_notes(rest);
                draft
            }
        };
        draft.baker_percent = Some(format!("{}%", &caps["pct"]));
        return Some(finish(draft));
    }

    let caps = LEADING_PERCENT_REGEX.captures(line)?;
    let rest = caps["rest"].trim();
    let mut draft = match extract_amount(rest) {
        Some(amount) => Draft::with_amount(&amount, amount.rest.clone()),
        None => Draft {
            rest: rest.to_string(),
            ..Draft::default()
        },
    };
    draft.baker_percent = Some(format!("{}%", &caps["pct"]));
    Some(finish(draft))
}

fn ratio(line: &str, _depth: usize) -> Option<Ingredient> {
    let caps = RATIO_REGEX.captures(line)?;
    let amount = extract_amount(&caps["lead"])?;
    let mut draft = Draft::with_amount(&amount, amount.rest.clone());
    draft.trailing.push(caps["ratio"].trim().to_string());
    Some(finish(draft))
}

fn name_then_amount(line: &str, _depth: usize) -> Option<Ingredient> {
    let caps = NAME_AMOUNT_REGEX.captures(line)?;
    let amount = extract_amount(&caps["amount"])?;
    let mut draft = Draft::with_amount(&amount, caps["name"].to_string());
    draft.absorb_notes(&amount.rest);
    Some(finish(draft))
}

fn as_needed(line: &str, _depth: usize) -> Option<Ingredient> {
    let caps = AS_NEEDED_REGEX.captures(line)?;
    let mut draft = Draft {
        rest: caps["name"].to_string(),
        ..Draft::default()
    };
    draft.trailing.push(caps["note"].to_lowercase());
    Some(finish(draft))
}

fn inline_section(line: &str, depth: usize) -> Option<Ingredient> {
    let caps = INLINE_BRACKET_REGEX
        .captures(line)
        .or_else(|| INLINE_PAREN_REGEX.captures(line))
        .or_else(|| INLINE_FOR_REGEX.captures(line))?;
    let section = classify_line::clean_section_name(&caps["section"]);
    let mut ingredient = parse_nested(&caps["rest"], depth + 1);
    if ingredient.name.is_empty() {
        return Some(Ingredient::section_marker(section));
    }
    ingredient.section = Some(section);
    Some(ingredient)
}

fn number_words(line: &str, depth: usize) -> Option<Ingredient> {
    normalize_number_words(line).map(|rewritten| parse_nested(&rewritten, depth + 1))
}

fn dual_quantity(line: &str, _depth: usize) -> Option<Ingredient> {
    let first = extract_amount(line)?;
    first.unit?;
    let after = first.rest.trim_start();
    let plus = after
        .get(..5)
        .filter(|head| head.eq_ignore_ascii_case("plus "))
        .map(|_| &after[5..])?;
    let second = extract_amount(plus)?;
    second.unit?;

    let mut draft = Draft::with_amount(&first, second.rest.clone());
    draft.amount = format!("{} plus {}", first.display(), second.display());
    draft.preparation.extend(second.notes.iter().cloned());
    Some(finish(draft))
}

fn dual_unit(line: &str, _depth: usize) -> Option<Ingredient> {
    let first = extract_amount(line)?;
    first.unit?;
    let metric = first.rest.trim_start().strip_prefix('/')?;
    let second = extract_amount(metric)?;
    second.unit?;

    let mut draft = Draft::with_amount(&first, second.rest.clone());
    draft.preparation.push(second.display());
    Some(finish(draft))
}

fn generic_amount(line: &str, _depth: usize) -> Option<Ingredient> {
    if let Some(amount) = extract_amount(line) {
        return Some(finish(Draft::with_amount(&amount, amount.rest.clone())));
    }
    if let Some((unit, rest)) = leading_unit_of(line) {
        return Some(finish(Draft {
            amount: unit.canonical.to_string(),
            unit: unit.canonical.to_string(),
            rest: rest.to_string(),
            ..Draft::default()
        }));
    }
    Some(finish(Draft {
        rest: line.to_string(),
        ..Draft::default()
    }))
}

// ---------------------------------------------------------------------------
// Amount extraction
// ---------------------------------------------------------------------------

/// A quantity, its unit, and whatever text follows.
#[derive(Debug)]
struct Amount {
    quantity: String,
    unit: Option<&'static UnitDef>,
    rest: String,
    /// Parenthetical peeled from between quantity and unit: "1 (15 oz) can"
    notes: Vec<String>,
}

impl Amount {
    fn display(&self) -> String {
        match self.unit {
            Some(unit) => format!("{} {}", self.quantity, unit.canonical),
            None => self.quantity.clone(),
        }
    }
}

fn extract_amount(s: &str) -> Option<Amount> {
    let s = s.trim();
    let caps = AMOUNT_REGEX.captures(s)?;
    let whole = caps.get(0)?;
    let low = compact_quantity(caps.name("low")?.as_str());
    let high = caps
        .name("high")
        .or_else(|| caps.name("high_to"))
        .map(|m| compact_quantity(m.as_str()));
    let quantity = match high {
        Some(high) => format!("{low}-{high}"),
        None => low,
    };

    let mut after = &s[whole.end()..];
    // "2nd", "7up": digits glued to a word that isn't a unit
    if after.starts_with(char::is_alphabetic) && quantity::match_unit_prefix(after).is_none() {
        return None;
    }
    after = after.trim_start();

    let mut notes = Vec::new();
    if let Some(inner) = after.strip_prefix('(') {
        if let Some(close) = inner.find(')') {
            notes.push(inner[..close].trim().to_string());
            after = inner[close + 1..].trim_start();
        }
    }

    let unit = match quantity::match_unit_prefix(after) {
        Some((def, len)) => {
            after = after[len..].trim_start();
            Some(def)
        }
        None => None,
    };

    Some(Amount {
        quantity,
        unit,
        rest: after.to_string(),
        notes,
    })
}

/// "1 ½" → "1½"
fn compact_quantity(q: &str) -> String {
    GLYPH_GAP_REGEX
        .replace_all(&text::collapse_whitespace(q), "$1$2")
        .into_owned()
}

/// "Pinch of salt": a spelled-out unit with no number, followed by "of".
fn leading_unit_of(line: &str) -> Option<(&'static UnitDef, &str)> {
    let (unit, len) = quantity::match_unit_prefix(line)?;
    if len < 3 {
        return None;
    }
    let rest = line[len..].trim_start();
    let head = rest.get(..3)?;
    head.eq_ignore_ascii_case("of ").then(|| (unit, &rest[3..]))
}

// ---------------------------------------------------------------------------
// Post-processing
// ---------------------------------------------------------------------------

/// Pieces gathered by a rule before the shared cleanup.
#[derive(Debug, Default)]
struct Draft {
    amount: String,
    unit: String,
    /// Text still holding the name (and its notes)
    rest: String,
    /// Notes found before the name was processed
    preparation: Vec<String>,
    /// Notes appended after the name's own notes
    trailing: Vec<String>,
    is_optional: bool,
    baker_percent: Option<String>,
}

impl Draft {
    fn with_amount(amount: &Amount, rest: String) -> Self {
        let mut draft = Draft {
            amount: amount.display(),
            unit: amount
                .unit
                .map(|u| u.canonical.to_string())
                .unwrap_or_default(),
            rest,
            ..Draft::default()
        };
        for note in &amount.notes {
            draft.absorb_parenthetical(note);
        }
        draft
    }

    /// Route loose text after an amount: parentheticals by content, the remainder
    /// as a plain note.
    fn absorb_notes(&mut self, leftover: &str) {
        let (plain, groups) = split_parentheticals(leftover);
        for group in groups {
            self.absorb_parenthetical(&group);
        }
        let plain = text::trim_name_punctuation(&plain);
        if !plain.is_empty() {
            self.trailing.push(plain);
        }
    }

    fn absorb_parenthetical(&mut self, content: &str) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }
        if let Some(caps) = BAKER_PAREN_REGEX.captures(content) {
            if self.baker_percent.is_none() {
                self.baker_percent = Some(format!("{}%", &caps["pct"]));
                return;
            }
        }
        if content.eq_ignore_ascii_case("optional") {
            self.is_optional = true;
        }
        self.preparation.push(content.to_string());
    }
}

fn finish(mut draft: Draft) -> Ingredient {
    let rest = text::collapse_whitespace(&draft.rest);
    let rest = strip_leading_of(&rest);

    // Parentheticals: ratio/Brix notes stay in the name, everything else is a note.
    let (without_parens, groups) = split_parentheticals(rest);
    let mut kept_in_name = Vec::new();
    for group in groups {
        if is_ratio_note(&group) {
            kept_in_name.push(group);
        } else {
            draft.absorb_parenthetical(&group);
        }
    }

    let (name_part, comma_tail) = split_top_level_comma(&without_parens);
    let mut alternative = None;
    if let Some(tail) = comma_tail {
        let tail = text::trim_name_punctuation(tail);
        match tail.get(..3) {
            Some(head) if head.eq_ignore_ascii_case("or ") => {
                alternative = Some(clean_name(&tail[3..]));
            }
            _ if !tail.is_empty() => draft.trailing.insert(0, tail),
            _ => {}
        }
    }

    let (modifiers, name_part) = take_leading_modifiers(name_part.trim());
    if !modifiers.is_empty() {
        draft.preparation.insert(0, modifiers);
    }
    let (name_part, trailing_note) = take_trailing_note(&name_part);
    if let Some(note) = trailing_note {
        draft.trailing.push(note);
    }

    let mut name = name_part;
    if alternative.is_none() {
        if let Some((first, second)) = split_alternative(&name) {
            name = first;
            alternative = Some(clean_name(&second));
        }
    }

    let mut name = clean_name(&name);
    for kept in kept_in_name {
        if name.is_empty() {
            name = format!("({kept})");
        } else {
            name = format!("{name} ({kept})");
        }
    }

    let mut notes: Vec<String> = Vec::new();
    for note in draft.preparation.into_iter().chain(draft.trailing) {
        let note = text::trim_name_punctuation(&text::collapse_whitespace(&note));
        if !note.is_empty() && !notes.iter().any(|n| n.eq_ignore_ascii_case(&note)) {
            notes.push(note);
        }
    }
    let is_optional = draft.is_optional
        || notes
            .iter()
            .any(|n| n.to_lowercase().split(|c: char| !c.is_alphabetic()).any(|w| w == "optional"));

    Ingredient {
        name,
        amount: draft.amount,
        unit: draft.unit,
        preparation: notes.join(", "),
        alternative: alternative.filter(|a| !a.is_empty()),
        is_optional,
        section: None,
        baker_percent: draft.baker_percent,
    }
}

fn strip_leading_of(s: &str) -> &str {
    match s.get(..3) {
        Some(head) if head.eq_ignore_ascii_case("of ") => s[3..].trim_start(),
        _ => s,
    }
}

/// Remove every top-level parenthetical group, returning the remaining text and
/// the group contents in order. An unclosed group runs to the end of the text.
fn split_parentheticals(s: &str) -> (String, Vec<String>) {
    let mut plain = String::with_capacity(s.len());
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' => {
                if depth > 0 {
                    current.push(c);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    groups.push(std::mem::take(&mut current));
                    plain.push(' ');
                } else {
                    current.push(c);
                }
            }
            _ if depth > 0 => current.push(c),
            _ => plain.push(c),
        }
    }
    if !current.trim().is_empty() {
        groups.push(current);
    }
    let groups = groups
        .into_iter()
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .collect();
    (text::collapse_whitespace(&plain), groups)
}

/// Split on the first comma outside parentheses and brackets.
fn split_top_level_comma(s: &str) -> (String, Option<&str>) {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth <= 0 => return (s[..i].to_string(), Some(&s[i + 1..])),
            _ => {}
        }
    }
    (s.to_string(), None)
}

fn take_leading_modifiers(name: &str) -> (String, String) {
    let words: Vec<&str> = name.split_whitespace().collect();
    let is_modifier = |w: &str| {
        let w = w.trim_end_matches(',').to_lowercase();
        LEADING_MODIFIERS.contains(&w.as_str())
    };
    let mut taken = 0;
    loop {
        let remaining = words.len() - taken;
        if remaining <= 1 {
            break;
        }
        let first = words[taken].to_lowercase();
        if is_modifier(words[taken]) {
            taken += 1;
        } else if MODIFIER_ADVERBS.contains(&first.as_str())
            && remaining > 2
            && (is_modifier(words[taken + 1]) || words[taken + 1].eq_ignore_ascii_case("ground"))
        {
            taken += 2;
        } else if taken > 0 && first == "and" && remaining > 2 && is_modifier(words[taken + 1]) {
            taken += 2;
        } else {
            break;
        }
    }
    let modifiers = words[..taken]
        .iter()
        .map(|w| w.trim_end_matches(','))
        .collect::<Vec<_>>()
        .join(" ");
    (modifiers, words[taken..].join(" "))
}

fn take_trailing_note(name: &str) -> (String, Option<String>) {
    let lower = name.to_lowercase();
    for note in TRAILING_NOTES {
        if let Some(head) = lower.strip_suffix(note) {
            if head.ends_with(' ') && !head.trim().is_empty() {
                if let Some(kept) = name.get(..head.len()) {
                    return (kept.trim().to_string(), Some((*note).to_string()));
                }
            }
        }
    }
    (name.to_string(), None)
}

/// "butter or margarine" → ("butter", "margarine"). A bare adjective before
/// "or" keeps the phrase whole.
fn split_alternative(name: &str) -> Option<(String, String)> {
    let lower = name.to_lowercase();
    let idx = lower.find(" or ")?;
    let first = name.get(..idx)?.trim();
    let second = name.get(idx + 4..)?.trim();
    if first.is_empty() || second.is_empty() {
        return None;
    }
    let first_lower = first.to_lowercase();
    if !first.contains(' ') && BARE_ADJECTIVES.contains(&first_lower.as_str()) {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}

fn is_ratio_note(content: &str) -> bool {
    let lower = content.to_lowercase();
    lower.contains("brix") || lower.contains("ratio") || RATIO_NOTE_REGEX.is_match(&lower)
}

fn clean_name(name: &str) -> String {
    let cleaned = text::trim_name_punctuation(&text::collapse_whitespace(name));
    text::title_case(&cleaned)
}
