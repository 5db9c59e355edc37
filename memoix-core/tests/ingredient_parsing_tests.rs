//! Golden file tests for ingredient parsing.
//!
//! Test cases are individual JSON files in `fixtures/ingredient_parsing/`.
//! `memoix ingredient-tests --update` rewrites them after an intended change.
//!
//! Test format:
//! ```json
//! {
//!   "raw": "2 cups flour",
//!   "expected": { "name": "Flour", "amount": "2 cups", "unit": "cups", ... }
//! }
//! ```

use glob::glob;
use memoix_core::ingredient_parser::{normalize_number_words, parse_ingredient};
use memoix_core::text::{clean_text, normalize_ingredient_text};
use memoix_core::{process_ingredient_lines, Ingredient, ListOptions};
use proptest::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// A test case loaded from a JSON fixture file
#[derive(Debug, Deserialize)]
struct TestCase {
    /// Raw ingredient string to parse
    raw: String,
    /// Expected output from parsing
    expected: Ingredient,
}

fn load_test_cases() -> Vec<(String, TestCase)> {
    let pattern = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/ingredient_parsing")
        .join("*.json");
    let pattern_str = pattern.to_string_lossy();

    let mut cases = Vec::new();
    for entry in glob(&pattern_str).expect("Failed to read glob pattern") {
        let path = entry.expect("Failed to read directory entry");
        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        let case: TestCase = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
        cases.push((name, case));
    }

    // Sort by name for deterministic ordering
    cases.sort_by(|a, b| a.0.cmp(&b.0));
    cases
}

#[test]
fn test_ingredient_parsing_golden_files() {
    let cases = load_test_cases();
    assert!(!cases.is_empty(), "No ingredient parsing fixtures found");

    let mut failures = Vec::new();
    for (name, case) in &cases {
        let actual = parse_ingredient(&case.raw);
        if actual != case.expected {
            failures.push((name.clone(), case.raw.clone(), case.expected.clone(), actual));
        }
    }

    if !failures.is_empty() {
        let mut msg = format!(
            "\n{} failures across {} tests:\n",
            failures.len(),
            cases.len()
        );

        for (name, raw, expected, actual) in &failures {
            msg.push_str(&format!("\n=== {} ===\n", name));
            msg.push_str(&format!("Input: {:?}\n", raw));
            msg.push_str(&format!("Expected: {:#?}\n", expected));
            msg.push_str(&format!("Actual:   {:#?}\n", actual));
        }

        panic!("{}", msg);
    }
}

#[test]
fn test_section_markers_keep_order_when_sorting() {
    let lines = [
        "[Cake]",
        "1 tsp vanilla",
        "3 cups flour",
        "[Frosting]",
        "1 pinch salt",
        "2 lb carrots",
    ];
    let list = process_ingredient_lines(
        &lines,
        &ListOptions {
            sort_by_quantity: true,
        },
    );
    let names: Vec<&str> = list.ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["", "Vanilla", "Flour", "", "Salt", "Carrots"]);
}

#[test]
fn test_same_ingredient_in_two_sections_is_kept() {
    let list = process_ingredient_lines(
        &["[Cake]", "2 eggs", "[Custard]", "2 eggs"],
        &ListOptions::default(),
    );
    assert_eq!(list.real_count(), 2);
    let sections: Vec<Option<&str>> = list
        .ingredients
        .iter()
        .filter(|i| !i.is_section_marker())
        .map(|i| i.section.as_deref())
        .collect();
    assert_eq!(sections, [Some("Cake"), Some("Custard")]);
}

proptest! {
    #[test]
    fn clean_text_is_idempotent(line in "[ -%'-~½¼¾\t\n]{0,60}") {
        let once = clean_text(&line);
        prop_assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn normalizing_twice_changes_nothing(
        quantity in prop::sample::select(vec![
            "1", "2", "1 1/2", "1-1/2", "1/4", "3/4", "5/16", "2-3", "½", "1 ½",
        ]),
        unit in prop::sample::select(vec![
            "tablespoons", "tsp", "cups", "grams", "oz", "pinch", "fl oz", "",
        ]),
        name in "[a-z]{3,12}( [a-z]{3,8})?",
    ) {
        let line = format!("{} {} {}", quantity, unit, name);
        let once = normalize_ingredient_text(&line);
        prop_assert_eq!(normalize_ingredient_text(&once), once);
    }

    #[test]
    fn number_words_settle_after_one_pass(
        word in prop::sample::select(vec!["one", "two", "three", "half a", "a dozen"]),
        unit in prop::sample::select(vec!["cup", "cups", "tsp", "pinch"]),
        name in "[a-z]{3,10}",
    ) {
        let line = format!("{} {} {}", word, unit, name);
        let normalized = normalize_number_words(&line).unwrap_or(line);
        prop_assert_eq!(normalize_number_words(&normalized), None);
    }
}
