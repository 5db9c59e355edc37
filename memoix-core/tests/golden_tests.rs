//! Golden file tests for recipe extraction.
//!
//! Each JSON file in `fixtures/pages/` names a saved page next to it, the URL
//! it came from, and what the importer should make of it.

use glob::glob;
use memoix_core::{ImportStage, RecipeImporter, SourceKind, StageStatus};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A test case loaded from a JSON fixture file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestCase {
    /// HTML file name, relative to the fixture
    html_fixture: String,
    /// Source URL to use for extraction
    source_url: String,
    expected: ExpectedRecipe,
}

/// Expected recipe extraction results
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpectedRecipe {
    name: String,
    source_kind: SourceKind,
    /// Real ingredient names in order, section placeholders excluded
    ingredient_names: Vec<String>,
    /// Section names in order of appearance
    #[serde(default)]
    sections: Vec<String>,
    directions: usize,
    #[serde(default)]
    course: Option<String>,
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pages")
}

/// Load all test cases from the fixtures directory
fn load_test_cases() -> Vec<(String, TestCase)> {
    let pattern = fixtures_dir().join("*.json");
    let mut cases = Vec::new();

    for entry in glob(&pattern.to_string_lossy()).expect("Failed to read glob pattern") {
        let path = entry.expect("Failed to read directory entry");
        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        let case: TestCase = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
        cases.push((name, case));
    }

    assert!(!cases.is_empty(), "No page fixtures found in {:?}", fixtures_dir());
    cases.sort_by(|a, b| a.0.cmp(&b.0));
    cases
}

#[test]
fn test_extraction_golden_files() {
    let importer = RecipeImporter::default();

    for (name, case) in load_test_cases() {
        println!("Testing: {}", name);

        let html_path = fixtures_dir().join(&case.html_fixture);
        let html = fs::read_to_string(&html_path).unwrap_or_else(|e| {
            panic!("Failed to read HTML fixture {}: {}", html_path.display(), e)
        });

        let outcome = importer
            .import_html(&html, &case.source_url)
            .unwrap_or_else(|e| panic!("Extraction failed for {}: {}", name, e));
        let result = &outcome.result;
        let expected = &case.expected;

        assert_eq!(result.name(), Some(expected.name.as_str()), "Name mismatch for {}", name);
        assert_eq!(result.source_kind(), expected.source_kind, "Source mismatch for {}", name);

        let names: Vec<&str> = result.real_ingredients().map(|i| i.name.as_str()).collect();
        assert_eq!(names, expected.ingredient_names, "Ingredients mismatch for {}", name);

        let mut sections: Vec<&str> = Vec::new();
        for section in result.ingredients().iter().filter_map(|i| i.section.as_deref()) {
            if sections.last() != Some(&section) {
                sections.push(section);
            }
        }
        assert_eq!(sections, expected.sections, "Sections mismatch for {}", name);

        assert_eq!(
            result.directions().len(),
            expected.directions,
            "Direction count mismatch for {}",
            name
        );
        if let Some(course) = &expected.course {
            assert_eq!(result.course(), Some(course.as_str()), "Course mismatch for {}", name);
        }

        // Every stage leaves a record, and every produced field has a confidence
        assert_eq!(outcome.attempts.len(), ImportStage::ALL.len(), "Attempts for {}", name);
        assert!(result.confidence().ingredients > 0.0, "Ingredient confidence for {}", name);
        assert!(result.confidence().name > 0.0, "Name confidence for {}", name);
    }
}

#[test]
fn test_supplement_stage_always_evaluated_after_structured_data() {
    let importer = RecipeImporter::default();
    for (name, case) in load_test_cases() {
        if !matches!(case.expected.source_kind, SourceKind::JsonLd | SourceKind::Microdata) {
            continue;
        }
        let html = fs::read_to_string(fixtures_dir().join(&case.html_fixture)).unwrap();
        let outcome = importer.import_html(&html, &case.source_url).unwrap();
        let supplement = outcome
            .attempts
            .iter()
            .find(|a| a.stage == ImportStage::HtmlSupplement)
            .unwrap_or_else(|| panic!("No supplement attempt for {}", name));
        assert_ne!(supplement.status, StageStatus::Skipped, "Supplement skipped for {}", name);
    }
}

#[test]
fn test_cocktail_site_wins_over_title_keywords() {
    let html = r#"<html><head><script type="application/ld+json">
        {"@type":"Recipe","name":"Chocolate Cake Martini",
         "recipeIngredient":["2 oz vodka","1 oz chocolate liqueur"]}
        </script></head><body></body></html>"#;
    let outcome = RecipeImporter::default()
        .import_html(html, "https://www.diffordsguide.com/cocktails/recipe/chocolate-cake-martini")
        .unwrap();
    assert_eq!(outcome.result.course(), Some("Drinks"));
    assert_eq!(outcome.result.confidence().course, 0.95);
}
