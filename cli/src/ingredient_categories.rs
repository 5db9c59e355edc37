//! Generate an ingredient categories audit file from the parsing fixtures.

use anyhow::{Context, Result};
use memoix_core::ingredient_categorizer;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::ingredient_tests::default_fixtures_dir;

#[derive(Deserialize)]
struct FixtureFile {
    expected: ExpectedParsing,
}

#[derive(Deserialize)]
struct ExpectedParsing {
    name: String,
}

/// Generate a CSV file mapping all unique fixture ingredients to their categories.
pub fn generate(fixtures_dir: Option<&Path>, output: &Path) -> Result<()> {
    let fixtures_dir = fixtures_dir
        .map(PathBuf::from)
        .unwrap_or_else(default_fixtures_dir);

    let mut ingredients: BTreeMap<String, String> = BTreeMap::new();
    for entry in fs::read_dir(&fixtures_dir)
        .with_context(|| format!("Failed to read fixtures dir: {}", fixtures_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Err(e) = process_file(&path, &mut ingredients) {
                tracing::warn!(path = %path.display(), error = %e, "skipping fixture");
            }
        }
    }

    let mut output_file = fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    writeln!(
        output_file,
        "# rules version {}",
        ingredient_categorizer::rules_version()
    )?;
    writeln!(output_file, "ingredient,category")?;

    for (ingredient, category) in &ingredients {
        // Escape CSV fields that contain commas or quotes
        let escaped_ingredient = if ingredient.contains(',') || ingredient.contains('"') {
            format!("\"{}\"", ingredient.replace('"', "\"\""))
        } else {
            ingredient.clone()
        };
        writeln!(output_file, "{},{}", escaped_ingredient, category)?;
    }

    println!(
        "Generated {} ingredient categories to {}",
        ingredients.len(),
        output.display()
    );

    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    for category in ingredients.values() {
        *by_category.entry(category.as_str()).or_default() += 1;
    }
    println!("\nCategories:");
    for (category, count) in by_category {
        println!("  {}: {}", category, count);
    }

    Ok(())
}

fn process_file(path: &Path, ingredients: &mut BTreeMap<String, String>) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let fixture: FixtureFile = serde_json::from_str(&content)?;

    let item = fixture.expected.name.trim().to_string();
    if !item.is_empty() && !ingredients.contains_key(&item) {
        let category = ingredient_categorizer::categorize(&item).to_string();
        ingredients.insert(item, category);
    }

    Ok(())
}
