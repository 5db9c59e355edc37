//! Small commands that run one engine component and print its output as JSON.

use anyhow::{Context, Result};
use memoix_core::ingredient_categorizer;
use memoix_core::{
    process_ingredient_lines, ClassifyInput, ListOptions, RecipeImporter, TranscriptSegment,
};
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

pub fn parse_ingredients(lines: &[String], sort: bool) -> Result<()> {
    let lines = if lines.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("Failed to read ingredient lines from stdin")?
    } else {
        lines.to_vec()
    };

    let list = process_ingredient_lines(
        &lines,
        &ListOptions {
            sort_by_quantity: sort,
        },
    );
    let json = serde_json::json!({
        "ingredients": list.ingredients,
        "equipment": list.equipment,
        "raw": list.raw,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

pub fn classify(
    importer: &RecipeImporter,
    title: &str,
    url: &str,
    ingredients: &[String],
    category: Option<&str>,
) -> Result<()> {
    let classification = importer.classify(&ClassifyInput {
        title,
        url,
        ingredients,
        category_hint: category,
        ..ClassifyInput::default()
    });
    let course = &classification.course;
    let json = serde_json::json!({
        "course": course.label,
        "courseConfidence": course.confidence,
        "subcategory": course.subcategory,
        "rule": course.rule,
        "cuisine": classification.cuisine.as_ref().map(|c| c.label),
        "cuisineConfidence": classification.cuisine.as_ref().map(|c| c.confidence),
        "detectedCourses": classification.detected_courses,
        "detectedCuisines": classification.detected_cuisines,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

pub fn categorize(names: &[String]) {
    for name in names {
        println!("{}\t{}", ingredient_categorizer::categorize(name), name);
    }
}

pub fn transcript(
    importer: &RecipeImporter,
    file: &Path,
    url: &str,
    title: Option<&str>,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read transcript file: {}", file.display()))?;
    let segments: Vec<TranscriptSegment> =
        serde_json::from_str(&content).context("Failed to parse transcript segments")?;

    let result = importer.import_transcript(url, title, &segments);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
