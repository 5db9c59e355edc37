//! Recipes pasted or served as plain text.
//!
//! The text is read line by line. Explicit "Ingredients" / "Directions"
//! headings split it when present; otherwise each line goes through the
//! shared line classifier.

use std::sync::LazyLock;

use regex::Regex;

use crate::classify_line::{self, LineKind};
use crate::config::ImportConfig;
use crate::error::{Diagnostics, ExtractError};
use crate::sections::{self, ListOptions};
use crate::text;
use crate::types::{ImportOutcome, RecipeImportResult, SourceKind};

const NAME_CONFIDENCE: f32 = 0.4;
const INGREDIENT_CONFIDENCE: f32 = 0.5;
const DIRECTION_CONFIDENCE: f32 = 0.45;

static INGREDIENTS_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:the\s+)?ingredients?\s*:?\s*$")
        .expect("Invalid ingredients heading regex")
});

static DIRECTIONS_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:the\s+)?(?:instructions?|directions?|method|preparation|steps)\s*:?\s*$")
        .expect("Invalid directions heading regex")
});

static STEP_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:step\s*)?\d{1,2}[.):]\s+").expect("Invalid step number regex")
});

/// True if the body has no markup worth parsing as HTML.
pub fn looks_like_plain_text(body: &str) -> bool {
    let trimmed = body.trim_start();
    !(trimmed.starts_with('<') || text::HTML_TAG_REGEX.find_iter(body).take(3).count() >= 3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Preamble,
    Ingredients,
    Directions,
}

/// Import a plain-text recipe.
pub fn import_plain_text(
    body: &str,
    url: &str,
    config: &ImportConfig,
) -> Result<ImportOutcome, ExtractError> {
    let lines: Vec<String> = body
        .lines()
        .map(text::clean_text)
        .filter(|l| !l.is_empty())
        .collect();
    let has_headings = lines.iter().any(|l| INGREDIENTS_HEADING_REGEX.is_match(l));

    let mut title = None;
    let mut ingredient_lines = Vec::new();
    let mut directions = Vec::new();
    let mut part = Part::Preamble;

    for line in &lines {
        if INGREDIENTS_HEADING_REGEX.is_match(line) {
            part = Part::Ingredients;
            continue;
        }
        if DIRECTIONS_HEADING_REGEX.is_match(line) {
            part = Part::Directions;
            continue;
        }
        let kind = classify_line::classify_line(line);
        if kind == LineKind::Garbage {
            continue;
        }
        // Without headings, every line sorts itself
        let effective = match (has_headings, part, kind) {
            (true, Part::Preamble, _) => Part::Preamble,
            (true, part, _) => part,
            (false, _, LineKind::Direction) => Part::Directions,
            (false, Part::Directions, _) if STEP_NUMBER_REGEX.is_match(line) => Part::Directions,
            (false, _, LineKind::Ingredient | LineKind::SectionHeader | LineKind::Equipment)
                if classify_line::contains_measurement(line) || !ingredient_lines.is_empty() =>
            {
                Part::Ingredients
            }
            _ => Part::Preamble,
        };
        match effective {
            Part::Preamble if title.is_none() => title = Some(text::trim_name_punctuation(line)),
            Part::Preamble => {}
            Part::Ingredients => ingredient_lines.push(line.clone()),
            Part::Directions => {
                part = Part::Directions;
                directions.push(STEP_NUMBER_REGEX.replace(line, "").to_string());
            }
        }
    }

    let list = sections::process_ingredient_lines(
        &ingredient_lines,
        &ListOptions {
            sort_by_quantity: config.sort_ingredients,
        },
    );
    let result = RecipeImportResult::builder(url, SourceKind::PlainText)
        .name(title, NAME_CONFIDENCE)
        .ingredients(list.ingredients, INGREDIENT_CONFIDENCE)
        .raw_ingredients(list.raw)
        .equipment(list.equipment, INGREDIENT_CONFIDENCE)
        .directions(directions.clone(), DIRECTION_CONFIDENCE)
        .raw_directions(directions)
        .build();

    if result.is_empty() {
        return Err(ExtractError::NoRecipe(Diagnostics {
            has_measurements: lines.iter().any(|l| classify_line::contains_measurement(l)),
            ..Diagnostics::default()
        }));
    }
    tracing::info!(
        url,
        ingredients = result.real_ingredients().count(),
        directions = result.directions().len(),
        "plain text recipe imported"
    );
    Ok(ImportOutcome {
        result,
        attempts: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_plain_text() {
        assert!(looks_like_plain_text("Pancakes\n\n2 cups flour"));
        assert!(!looks_like_plain_text("<!DOCTYPE html><html></html>"));
        assert!(!looks_like_plain_text("Title <p>a</p><p>b</p>"));
    }

    #[test]
    fn test_with_headings() {
        let body = "Weeknight Chili\n\nIngredients:\n1 lb ground beef\n1 onion, diced\n\n\
                    Directions:\n1. Brown the beef in a large pot.\n\
                    2. Add the onion and cook until soft.\n";
        let outcome =
            import_plain_text(body, "https://example.com/chili.txt", &ImportConfig::default())
                .expect("recipe");
        let result = outcome.result;
        assert_eq!(result.source_kind(), SourceKind::PlainText);
        assert_eq!(result.name(), Some("Weeknight Chili"));
        assert_eq!(result.real_ingredients().count(), 2);
        assert_eq!(
            result.directions(),
            ["Brown the beef in a large pot.", "Add the onion and cook until soft."]
        );
        assert_eq!(result.confidence().ingredients, INGREDIENT_CONFIDENCE);
    }

    #[test]
    fn test_without_headings() {
        let body = "Lemonade\n1 cup lemon juice\n1 cup sugar\n6 cups water\n\
                    Stir the juice and sugar together until dissolved.\n\
                    Add the water and chill before serving.";
        let outcome = import_plain_text(body, "", &ImportConfig::default()).expect("recipe");
        assert_eq!(outcome.result.name(), Some("Lemonade"));
        assert_eq!(outcome.result.real_ingredients().count(), 3);
        assert_eq!(outcome.result.directions().len(), 2);
    }

    #[test]
    fn test_nothing_to_cook() {
        let err = import_plain_text("Just a note to self.", "", &ImportConfig::default())
            .expect_err("empty");
        assert!(matches!(err, ExtractError::NoRecipe(_)));
    }
}
