//! CLI commands for ingredient parsing test management.
//!
//! Diffs the parsing fixtures against the current parser, and optionally
//! rewrites the expected output of the ones that changed.

use anyhow::{Context, Result};
use memoix_core::{parse_ingredient, Ingredient};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A test case for ingredient parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TestCase {
    raw: String,
    expected: Ingredient,
}

/// Default path to the fixtures directory
pub fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("memoix-core/tests/fixtures/ingredient_parsing")
}

/// Run the parser on each fixture's `raw` input and report every fixture
/// whose `expected` no longer matches. With `update`, rewrite those fixtures.
pub fn check_fixtures(fixtures_dir: Option<&Path>, update: bool) -> Result<()> {
    let fixtures_dir = fixtures_dir
        .map(PathBuf::from)
        .unwrap_or_else(default_fixtures_dir);

    let mut changed = 0;
    let mut unchanged = 0;

    let mut paths: Vec<PathBuf> = fs::read_dir(&fixtures_dir)
        .with_context(|| format!("Failed to read fixtures dir: {}", fixtures_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let content = fs::read_to_string(&path)?;
        let mut test_case: TestCase = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture: {}", path.display()))?;

        let actual = parse_ingredient(&test_case.raw);
        if actual == test_case.expected {
            unchanged += 1;
            continue;
        }

        changed += 1;
        print_diff(&path, &test_case.expected, &actual);
        if update {
            test_case.expected = actual;
            let json = serde_json::to_string_pretty(&test_case)?;
            fs::write(&path, json + "\n")?;
            println!("Updated: {}", path.display());
        }
    }

    println!("\nSummary: {} changed, {} unchanged", changed, unchanged);

    if changed > 0 && !update {
        anyhow::bail!("{} fixtures differ from parser output", changed);
    }
    Ok(())
}

fn print_diff(path: &Path, expected: &Ingredient, actual: &Ingredient) {
    println!("--- {}", path.display());
    let fields: [(&str, String, String); 6] = [
        ("name", expected.name.clone(), actual.name.clone()),
        ("amount", expected.amount.clone(), actual.amount.clone()),
        ("unit", expected.unit.clone(), actual.unit.clone()),
        ("preparation", expected.preparation.clone(), actual.preparation.clone()),
        (
            "alternative",
            format!("{:?}", expected.alternative),
            format!("{:?}", actual.alternative),
        ),
        (
            "isOptional",
            expected.is_optional.to_string(),
            actual.is_optional.to_string(),
        ),
    ];
    for (field, want, got) in fields {
        if want != got {
            println!("  {}: {:?} -> {:?}", field, want, got);
        }
    }
    if expected.section != actual.section || expected.baker_percent != actual.baker_percent {
        println!(
            "  section/bakerPercent: {:?}/{:?} -> {:?}/{:?}",
            expected.section, expected.baker_percent, actual.section, actual.baker_percent
        );
    }
}
