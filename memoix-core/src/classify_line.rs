//! Shared line classifier.
//!
//! Decides what a single scraped line is before anything tries to parse it.
//! The ingredient-list filter, the raw-ingredient audit builder and the final
//! parsed-ingredient safety net all call [`classify_line`], so they can never
//! disagree about a line.
//!
//! Checks run in a fixed order and the first hit wins: blank or
//! punctuation-only, bare step label, section header, direction, garbage
//! patterns, equipment, and finally ingredient.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::quantity::FRACTION_CHARS;
use crate::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Ingredient,
    Direction,
    Equipment,
    SectionHeader,
    Garbage,
}

/// Whole-line bracketed marker: "[Crust]"
static BRACKET_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\[\]]{1,60})\]$").expect("Invalid bracket header regex"));

/// Whole-line parenthesized "For the ..." marker: "(For the glaze)"
static PAREN_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\(\s*(for\s+.{1,50}?)\s*:?\s*\)$").expect("Invalid paren header regex")
});

/// Numbered step prefix: "1.", "2)", "Step 3:"
static NUMBERED_STEP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:step\s*)?\d{1,2}\s*[.):]\s*(\S+)").expect("Invalid numbered step regex")
});

/// Bare step labels left behind by numbered-list markup: "Step 3", "4.", "Step 1:"
static STEP_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:step\s*)?\d{1,2}\s*[.:)]?$").expect("Invalid step label regex")
});

/// A number immediately followed by a unit-looking word or a gram suffix.
static MEASUREMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)[0-9{FRACTION_CHARS}]\s*(?:g|kg|mg|ml|cl|l|oz|lb|lbs|cups?|tsp|tbsp|Tbsp|teaspoons?|tablespoons?|grams?|ounces?|pounds?|pinch|dash(?:es)?)\b"
    ))
    .expect("Invalid measurement regex")
});

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:https?://|www\.)\S+$").expect("Invalid URL regex"));

/// Nutrition-label rows such as "Calories: 250" or "Sodium 120mg".
static NUTRITION_ROW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:calories|total fat|saturated fat|trans fat|cholesterol|sodium|carbohydrates?|total carbohydrates?|dietary fiber|fiber|sugars?|protein|serving size)\s*:?\s*[0-9]",
    )
    .expect("Invalid nutrition row regex")
});

/// Imperative verbs that open a direction sentence.
const DIRECTION_VERBS: &[&str] = &[
    "add", "allow", "arrange", "bake", "baste", "beat", "blend", "boil", "braise", "bring",
    "broil", "brush", "chill", "combine", "cook", "cool", "cover", "cream", "cut", "deglaze",
    "discard", "dissolve", "divide", "drain", "drizzle", "dry", "fill", "finish", "flip", "fold",
    "fry", "garnish", "grate", "grease", "grill", "heat", "knead", "ladle", "layer", "let",
    "line", "marinate", "mash", "melt", "mix", "pat", "place", "pour", "preheat", "prepare",
    "press", "puree", "purée", "reduce", "refrigerate", "remove", "repeat", "rest", "return",
    "rinse", "roast", "roll", "rub", "saute", "sauté", "scoop", "sear", "season", "serve", "set",
    "shake", "shape", "simmer", "slice", "smoke", "soak", "spoon", "spread", "sprinkle", "squeeze",
    "stir", "strain", "stuff", "taste", "tie", "toast", "top", "toss", "transfer", "turn",
    "whisk", "wrap",
];

/// Verbs that double as the first word of an ingredient name ("cream cheese",
/// "top sirloin"). These only open a direction when a function word follows.
const AMBIGUOUS_VERBS: &[&str] = &[
    "cream", "cut", "dry", "layer", "line", "mash", "puree", "purée", "rest", "roast", "roll",
    "rub", "season", "set", "smoke", "spread", "taste", "toast", "top",
];

/// Articles, prepositions, pronouns and adverbs that follow a verb in an instruction.
const VERB_FOLLOWERS: &[&str] = &[
    "a", "about", "all", "an", "and", "any", "around", "aside", "at", "both", "down", "each",
    "evenly", "everything", "for", "gently", "generously", "half", "in", "inside", "into", "it",
    "lightly", "off", "on", "onto", "out", "over", "remaining", "some", "that", "the", "them",
    "these", "this", "those", "through", "to", "together", "under", "until", "well", "with",
    "your",
];

/// Openers that introduce a direction sentence without a verb up front.
const DIRECTION_OPENERS: &[&str] = &[
    "in a ", "in the ", "in another ", "once ", "when ", "while ", "meanwhile", "after ",
    "using ", "to make ", "to serve", "to assemble", "for best results",
];

/// Phrases that only ever appear in page chrome, never in a recipe line.
const GARBAGE_PHRASES: &[&str] = &[
    "subscribe",
    "newsletter",
    "sign up",
    "log in",
    "follow us",
    "follow me",
    "share on",
    "share this",
    "pin it",
    "pin this",
    "pinterest",
    "facebook",
    "instagram",
    "twitter",
    "tiktok",
    "youtube",
    "print recipe",
    "print this",
    "jump to recipe",
    "skip to",
    "rate this recipe",
    "leave a comment",
    "leave a review",
    "did you make this",
    "tag us",
    "click here",
    "read more",
    "watch the video",
    "advertisement",
    "sponsored",
    "affiliate",
    "privacy policy",
    "cookie policy",
    "all rights reserved",
    "add to cart",
    "shop now",
    "as an amazon associate",
    "©",
];

/// Heading words that label a list but are not sections of it.
const GENERIC_LABELS: &[&str] = &[
    "ingredients",
    "ingredient",
    "ingredient list",
    "what you'll need",
    "what you will need",
    "you will need",
    "you'll need",
    "directions",
    "instructions",
    "method",
    "preparation",
    "steps",
    "notes",
    "recipe notes",
    "equipment",
    "nutrition",
];

/// Words that make an ALL-CAPS line read as a section title.
const SECTION_WORDS: &[&str] = &[
    "assembly", "base", "batter", "brine", "crust", "dough", "dressing", "filling", "frosting",
    "garnish", "glaze", "icing", "marinade", "rub", "sauce", "syrup", "topping", "toppings",
];

/// Tools and vessels; a short line ending in one of these is equipment.
const EQUIPMENT_TERMS: &[&str] = &[
    "baking dish",
    "baking pan",
    "baking sheet",
    "bar spoon",
    "blender",
    "bundt pan",
    "cake pan",
    "casserole dish",
    "cast iron skillet",
    "cocktail shaker",
    "cutting board",
    "dutch oven",
    "food processor",
    "hand mixer",
    "immersion blender",
    "instant pot",
    "jigger",
    "loaf pan",
    "mandoline",
    "mixing bowl",
    "mixing glass",
    "muddler",
    "muffin tin",
    "parchment paper",
    "pie dish",
    "pie plate",
    "pressure cooker",
    "probe thermometer",
    "rolling pin",
    "saucepan",
    "sheet pan",
    "shaker",
    "skillet",
    "slow cooker",
    "smoker",
    "spatula",
    "springform pan",
    "stand mixer",
    "stockpot",
    "strainer",
    "thermometer",
    "tongs",
    "whisk",
    "wok",
];

/// Classify a single scraped line.
pub fn classify_line(line: &str) -> LineKind {
    let line = text::collapse_whitespace(line);
    if !line.chars().any(char::is_alphanumeric) || is_step_label(&line) {
        return LineKind::Garbage;
    }
    if section_header_name(&line).is_some() {
        return LineKind::SectionHeader;
    }
    if looks_like_direction(&line) {
        return LineKind::Direction;
    }
    if is_garbage(&line) {
        return LineKind::Garbage;
    }
    if is_equipment(&line) {
        return LineKind::Equipment;
    }
    LineKind::Ingredient
}

/// If the line is a section header, return the cleaned section name.
///
/// Accepts "[Name]", "(For the name)", short lines ending in a colon or dash,
/// "For the ..." lines, and short ALL-CAPS titles built around a section word.
pub fn section_header_name(line: &str) -> Option<String> {
    let line = line.trim();
    if is_step_label(line) {
        return None;
    }
    if let Some(caps) = BRACKET_HEADER_REGEX.captures(line) {
        return non_generic(clean_section_name(&caps[1]));
    }
    if let Some(caps) = PAREN_HEADER_REGEX.captures(line) {
        return non_generic(clean_section_name(&caps[1]));
    }

    let starts_with_quantity = line
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || FRACTION_CHARS.contains(c));
    if starts_with_quantity || line.contains(',') || MEASUREMENT_REGEX.is_match(line) {
        return None;
    }

    let body = line.trim_end_matches([':', '-', '–', '—']).trim();
    let word_count = body.split_whitespace().count();
    if body.is_empty() || body.chars().count() > 40 || word_count > 6 {
        return None;
    }

    let ends_with_marker = line.ends_with([':', '-', '–', '—']);
    let lower = body.to_lowercase();
    let for_prefix = lower.starts_with("for the ") || lower.starts_with("for ");
    let caps_title = is_all_caps(body)
        && lower
            .split_whitespace()
            .any(|w| SECTION_WORDS.contains(&w));

    if ends_with_marker || (for_prefix && word_count >= 2) || caps_title {
        return non_generic(clean_section_name(body));
    }
    None
}

/// Normalize a section title: drop brackets, trailing colons and a "For the" prefix,
/// then Title-Case it.
pub fn clean_section_name(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_matches(['[', ']', '(', ')'])
        .trim()
        .trim_end_matches([':', '-', '–', '—'])
        .trim();
    let lower = trimmed.to_lowercase();
    let stripped = ["ingredients for the ", "ingredients for ", "for the ", "for "]
        .iter()
        .find_map(|prefix| lower.starts_with(prefix).then(|| &trimmed[prefix.len()..]))
        .unwrap_or(trimmed);
    let cased = if is_all_caps(stripped) {
        stripped.to_lowercase()
    } else {
        stripped.to_string()
    };
    text::title_case(&text::collapse_whitespace(&cased))
}

fn non_generic(name: String) -> Option<String> {
    let key = text::normalize_key(&name);
    if key.is_empty() || GENERIC_LABELS.contains(&key.as_str()) {
        None
    } else {
        Some(name)
    }
}

fn is_all_caps(s: &str) -> bool {
    let mut letters = s.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

/// True when the line reads like a cooking step rather than an ingredient.
pub fn looks_like_direction(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    if let Some(caps) = NUMBERED_STEP_REGEX.captures(&lower) {
        let next = caps[1].trim_matches(|c: char| !c.is_alphanumeric());
        if DIRECTION_VERBS.contains(&next) || words.len() >= 8 {
            return true;
        }
    }

    if words.len() < 4 {
        return false;
    }
    let first = words[0].trim_matches(|c: char| !c.is_alphanumeric());
    if DIRECTION_VERBS.contains(&first) {
        let second = words[1].trim_matches(|c: char| !c.is_alphanumeric());
        // "Mix of fresh herbs" is a noun phrase
        let noun_phrase = second == "of";
        let needs_follower = AMBIGUOUS_VERBS.contains(&first);
        if !noun_phrase && (!needs_follower || VERB_FOLLOWERS.contains(&second)) {
            return true;
        }
    }
    if DIRECTION_OPENERS.iter().any(|opener| lower.starts_with(opener)) {
        return true;
    }

    // Long sentences that don't open with a quantity
    let starts_with_quantity = lower
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || FRACTION_CHARS.contains(c));
    !starts_with_quantity && words.len() >= 12 && lower.ends_with('.')
}

/// True if `word` is an imperative cooking verb ("stir", "bake").
pub fn is_direction_verb(word: &str) -> bool {
    let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
    DIRECTION_VERBS.contains(&word.as_str())
}

/// True for a line that is only a step number, with or without "Step".
pub fn is_step_label(line: &str) -> bool {
    STEP_LABEL_REGEX.is_match(line.trim())
}

/// True for page chrome: social prompts, navigation, ads, nutrition rows, bare URLs.
pub fn is_garbage(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    if is_step_label(&lower) {
        return true;
    }
    if URL_REGEX.is_match(&lower) || NUTRITION_ROW_REGEX.is_match(&lower) {
        return true;
    }
    let label = lower.trim_end_matches([':', '.']).trim();
    if GENERIC_LABELS.contains(&label) {
        return true;
    }
    if lower.starts_with('#') || lower.starts_with('@') {
        return true;
    }
    lower.chars().count() > 300 || GARBAGE_PHRASES.iter().any(|p| lower.contains(p))
}

/// True for a short, comma-free line naming a tool or vessel.
pub fn is_equipment(line: &str) -> bool {
    let without_parens = text::collapse_whitespace(&strip_parentheticals(line));
    let lower = without_parens
        .to_lowercase()
        .trim_end_matches(['.', ':'])
        .to_string();
    if lower.contains(',') || lower.split_whitespace().count() > 6 {
        return false;
    }
    EQUIPMENT_TERMS.iter().any(|term| {
        lower == *term
            || lower
                .strip_suffix(term)
                .is_some_and(|head| head.ends_with(' ') || head.ends_with('-'))
    })
}

/// True if the text contains a number followed by a measurement unit.
pub fn contains_measurement(s: &str) -> bool {
    MEASUREMENT_REGEX.is_match(s)
}

fn strip_parentheticals(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_punctuation_are_garbage() {
        assert_eq!(classify_line(""), LineKind::Garbage);
        assert_eq!(classify_line(" -- "), LineKind::Garbage);
        assert_eq!(classify_line("•"), LineKind::Garbage);
    }

    #[test]
    fn test_section_headers() {
        assert_eq!(section_header_name("[Crust]"), Some("Crust".to_string()));
        assert_eq!(section_header_name("For the Filling:"), Some("Filling".to_string()));
        assert_eq!(section_header_name("(For the glaze)"), Some("Glaze".to_string()));
        assert_eq!(section_header_name("Sauce -"), Some("Sauce".to_string()));
        assert_eq!(section_header_name("FOR THE TOPPING"), Some("Topping".to_string()));
        assert_eq!(section_header_name("CHOCOLATE SAUCE"), Some("Chocolate Sauce".to_string()));
    }

    #[test]
    fn test_not_section_headers() {
        assert_eq!(section_header_name("2 cups flour:"), None);
        assert_eq!(section_header_name("Salt, to taste:"), None);
        assert_eq!(section_header_name("Ingredients:"), None);
        assert_eq!(section_header_name("SALT"), None);
        assert_eq!(
            section_header_name("This is a much longer line that keeps going on:"),
            None
        );
    }

    #[test]
    fn test_directions() {
        assert_eq!(
            classify_line("Preheat the oven to 350°F."),
            LineKind::Direction
        );
        assert_eq!(
            classify_line("In a large bowl, whisk the eggs and sugar."),
            LineKind::Direction
        );
        assert_eq!(classify_line("Step 2: Fold in the flour"), LineKind::Direction);
    }

    #[test]
    fn test_numbered_step_with_measurement_is_direction() {
        // Overlaps with the ingredient grammar; the direction check runs first.
        assert_eq!(
            classify_line("1. Add 2 cups flour and stir well"),
            LineKind::Direction
        );
    }

    #[test]
    fn test_garbage() {
        assert_eq!(classify_line("Subscribe to our newsletter"), LineKind::Garbage);
        assert_eq!(classify_line("Pin it for later"), LineKind::Garbage);
        assert_eq!(classify_line("https://example.com/recipe"), LineKind::Garbage);
        assert_eq!(classify_line("Calories: 250"), LineKind::Garbage);
        assert_eq!(classify_line("Ingredients"), LineKind::Garbage);
    }

    #[test]
    fn test_equipment() {
        assert_eq!(classify_line("Cocktail shaker"), LineKind::Equipment);
        assert_eq!(classify_line("1 large cast iron skillet"), LineKind::Equipment);
        assert_eq!(classify_line("9-inch pie plate"), LineKind::Equipment);
        assert_eq!(
            classify_line("Butter, for greasing the baking dish"),
            LineKind::Ingredient
        );
    }

    #[test]
    fn test_ingredients() {
        assert_eq!(classify_line("2 cups flour"), LineKind::Ingredient);
        assert_eq!(classify_line("Salt to taste"), LineKind::Ingredient);
        assert_eq!(classify_line("Mix of fresh herbs"), LineKind::Ingredient);
        assert_eq!(classify_line("Gin: 2 oz"), LineKind::Ingredient);
    }

    #[test]
    fn test_verb_led_ingredient_names() {
        assert_eq!(classify_line("Cream cheese, 16 oz, softened"), LineKind::Ingredient);
        assert_eq!(classify_line("Dry red wine, 1 cup"), LineKind::Ingredient);
        assert_eq!(classify_line("Top sirloin steak, 2 lb"), LineKind::Ingredient);
        assert_eq!(classify_line("Top up with soda water"), LineKind::Ingredient);
        assert_eq!(classify_line("Toast points for serving"), LineKind::Ingredient);
    }

    #[test]
    fn test_verb_led_directions_still_detected() {
        assert_eq!(
            classify_line("Cream the butter and sugar together."),
            LineKind::Direction
        );
        assert_eq!(classify_line("Top with whipped cream and serve"), LineKind::Direction);
        assert_eq!(classify_line("Line a baking sheet with parchment"), LineKind::Direction);
        assert_eq!(classify_line("Taste and adjust the seasoning"), LineKind::Direction);
        assert_eq!(classify_line("Stir flour into the butter"), LineKind::Direction);
    }

    #[test]
    fn test_step_labels_are_garbage() {
        assert_eq!(classify_line("Step 3"), LineKind::Garbage);
        assert_eq!(classify_line("STEP 2"), LineKind::Garbage);
        assert_eq!(classify_line("Step 4."), LineKind::Garbage);
        assert_eq!(classify_line("Step 1:"), LineKind::Garbage);
        assert_eq!(classify_line("5)"), LineKind::Garbage);
        assert_eq!(section_header_name("Step 1:"), None);
        assert!(is_step_label(" step 12 "));
        assert!(!is_step_label("Step 1: Preheat the oven"));
        assert!(!is_step_label("3 eggs"));
    }

    #[test]
    fn test_contains_measurement() {
        assert!(contains_measurement("200g flour"));
        assert!(contains_measurement("1½ cups milk"));
        assert!(!contains_measurement("3 eggs"));
    }
}
