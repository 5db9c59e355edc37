//! Flatten ingredient and instruction JSON into ordered raw lines.
//!
//! Sites encode these fields every possible way: plain strings, arrays,
//! HowToStep/HowToSection objects, grouped objects. Everything is flattened into
//! strings, with section names emitted as `[Name]` marker lines.

use serde_json::Value;

use crate::text;

/// Common preparation notes. A fragment consisting only of one of these is a
/// note split off the previous ingredient.
const PREP_NOTES: &[&str] = &[
    "at room temperature",
    "room temperature",
    "loosely packed",
    "firmly packed",
    "lightly beaten",
    "roughly chopped",
    "coarsely chopped",
    "finely chopped",
    "thinly sliced",
    "plus more for",
    "for garnish",
    "for serving",
    "approximately",
    "julienned",
    "quartered",
    "shredded",
    "blanched",
    "crumbled",
    "softened",
    "uncooked",
    "or more",
    "or less",
    "optional",
    "to taste",
    "as needed",
    "chopped",
    "crushed",
    "divided",
    "drained",
    "toasted",
    "trimmed",
    "minced",
    "sliced",
    "grated",
    "melted",
    "beaten",
    "thawed",
    "peeled",
    "rinsed",
    "sifted",
    "halved",
    "diced",
    "cubed",
];

/// Flatten an ingredient field into raw lines, rejoining split fragments.
pub fn ingredient_lines(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    let mut last_group = None;
    collect_ingredients(value, &mut lines, &mut last_group);
    rejoin_fragments(lines)
}

/// Flatten an instruction field into raw step lines.
pub fn direction_lines(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    collect_directions(value, &mut lines);
    lines
}

fn marker(name: &str) -> Option<String> {
    let name = text::clean_text(name);
    (!name.is_empty()).then(|| format!("[{name}]"))
}

fn push_text(lines: &mut Vec<String>, raw: &str) {
    for line in raw.split(['\n', '\r']) {
        let line = text::strip_tags(line);
        if !line.is_empty() {
            lines.push(line);
        }
    }
}

fn collect_ingredients(value: &Value, lines: &mut Vec<String>, last_group: &mut Option<String>) {
    match value {
        Value::String(s) => push_text(lines, s),
        Value::Number(n) => lines.push(n.to_string()),
        Value::Array(items) => {
            for item in items {
                collect_ingredients(item, lines, last_group);
            }
        }
        Value::Object(obj) => {
            // {"groupName": "Dough", "unstructuredTextMetric": "2 cups flour"}
            if let Some(group) = obj.get("groupName").and_then(Value::as_str) {
                if last_group.as_deref() != Some(group) {
                    lines.extend(marker(group));
                    *last_group = Some(group.to_string());
                }
            }
            // {"name": "Dough", "ingredients": [...]} and HowToSection-style groups
            let nested = ["ingredients", "items", "itemListElement", "recipeIngredient"]
                .iter()
                .find_map(|key| obj.get(*key).filter(|v| v.is_array()));
            if let Some(nested) = nested {
                let title = ["name", "title", "heading"]
                    .iter()
                    .find_map(|key| obj.get(*key).and_then(Value::as_str));
                if let Some(title) = title {
                    lines.extend(marker(title));
                }
                collect_ingredients(nested, lines, last_group);
                return;
            }
            let text = ["unstructuredTextMetric", "text", "originalText", "raw", "name"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_str));
            if let Some(text) = text {
                push_text(lines, text);
            }
        }
        _ => {}
    }
}

fn collect_directions(value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::String(s) => push_text(lines, s),
        Value::Array(items) => {
            for item in items {
                collect_directions(item, lines);
            }
        }
        Value::Object(obj) => {
            let is_section = obj
                .get("@type")
                .and_then(Value::as_str)
                .is_some_and(|t| t == "HowToSection");
            let nested = ["itemListElement", "steps", "instructions"]
                .iter()
                .find_map(|key| obj.get(*key).filter(|v| v.is_array()));
            if is_section || nested.is_some() {
                if let Some(name) = obj.get("name").and_then(Value::as_str) {
                    lines.extend(marker(name));
                }
                if let Some(nested) = nested {
                    collect_directions(nested, lines);
                }
                return;
            }
            let text = ["text", "description", "name"]
                .iter()
                .find_map(|key| obj.get(*key).and_then(Value::as_str));
            if let Some(text) = text {
                push_text(lines, text);
            }
        }
        _ => {}
    }
}

/// Rejoin fragments that a site split off the previous ingredient.
fn rejoin_fragments(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let previous = out
            .last_mut()
            .filter(|prev| !prev.starts_with('[') || !prev.ends_with(']'));
        let Some(previous) = previous else {
            out.push(line);
            continue;
        };
        if line.starts_with('[') {
            out.push(line);
        } else if has_unclosed_paren(previous) {
            previous.push(' ');
            previous.push_str(&line);
        } else if is_bare_punctuation(&line) {
            previous.push_str(line.trim());
        } else if line.chars().count() <= 2 || is_prep_fragment(&line) {
            previous.push_str(", ");
            previous.push_str(&line);
        } else {
            out.push(line);
        }
    }
    out
}

fn has_unclosed_paren(s: &str) -> bool {
    s.matches('(').count() > s.matches(')').count()
}

fn is_bare_punctuation(s: &str) -> bool {
    !s.chars().any(char::is_alphanumeric)
}

fn is_prep_fragment(s: &str) -> bool {
    let trimmed = text::trim_name_punctuation(s);
    let Some(first) = trimmed.chars().next() else {
        return false;
    };
    if !first.is_lowercase() || trimmed.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    PREP_NOTES.iter().any(|note| trimmed.starts_with(note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_array() {
        let value = json!(["200g flour", " 1 egg ", ""]);
        assert_eq!(ingredient_lines(&value), vec!["200g flour", "1 egg"]);
    }

    #[test]
    fn test_newline_separated_string() {
        let value = json!("1 cup flour\n2 eggs\r\n");
        assert_eq!(ingredient_lines(&value), vec!["1 cup flour", "2 eggs"]);
    }

    #[test]
    fn test_group_name_objects_emit_markers_once() {
        let value = json!([
            {"groupName": "Dough", "unstructuredTextMetric": "2 cups flour"},
            {"groupName": "Dough", "unstructuredTextMetric": "1 tsp yeast"},
            {"groupName": "Topping", "unstructuredTextMetric": "1 cup cheese"}
        ]);
        assert_eq!(
            ingredient_lines(&value),
            vec!["[Dough]", "2 cups flour", "1 tsp yeast", "[Topping]", "1 cup cheese"]
        );
    }

    #[test]
    fn test_named_groups() {
        let value = json!([
            {"name": "For the crust", "ingredients": ["1 cup flour", {"text": "1 stick butter"}]},
            {"name": "Filling", "ingredients": ["3 apples"]}
        ]);
        assert_eq!(
            ingredient_lines(&value),
            vec!["[For the crust]", "1 cup flour", "1 stick butter", "[Filling]", "3 apples"]
        );
    }

    #[test]
    fn test_fragments_are_rejoined() {
        let value = json!([
            "2 cloves garlic",
            "finely chopped",
            "1 cup flour (about",
            "120 g)",
            "1 onion",
            "."
        ]);
        assert_eq!(
            ingredient_lines(&value),
            vec![
                "2 cloves garlic, finely chopped",
                "1 cup flour (about 120 g)",
                "1 onion."
            ]
        );
    }

    #[test]
    fn test_markers_are_never_joined() {
        let value = json!(["[Sauce]", "divided", "1 cup cream"]);
        assert_eq!(
            ingredient_lines(&value),
            vec!["[Sauce]", "divided", "1 cup cream"]
        );
    }

    #[test]
    fn test_how_to_sections_and_steps() {
        let value = json!([
            {"@type": "HowToSection", "name": "Make the dough", "itemListElement": [
                {"@type": "HowToStep", "text": "Mix the flour and water."},
                {"@type": "HowToStep", "text": "Knead for <b>10 minutes</b>."}
            ]},
            {"@type": "HowToStep", "text": "Bake until golden."}
        ]);
        assert_eq!(
            direction_lines(&value),
            vec![
                "[Make the dough]",
                "Mix the flour and water.",
                "Knead for 10 minutes.",
                "Bake until golden."
            ]
        );
    }

    #[test]
    fn test_direction_string() {
        let value = json!("Mix everything.\nBake at 350°F.");
        assert_eq!(direction_lines(&value), vec!["Mix everything.", "Bake at 350°F."]);
    }
}
