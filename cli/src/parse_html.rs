use anyhow::{Context, Result};
use memoix_core::{FetchedDocument, RecipeImporter};
use std::fs;
use std::path::Path;

/// Extract a recipe from a saved page.
/// Outputs JSON to stdout (the recipe on success, an error object with diagnostics on failure).
pub fn parse_html(
    importer: &RecipeImporter,
    file: &Path,
    source_url: &str,
    attempts: bool,
) -> Result<()> {
    let body = fs::read_to_string(file)
        .with_context(|| format!("Failed to read page file: {}", file.display()))?;

    match importer.import_document(&FetchedDocument::new(source_url, body)) {
        Ok(outcome) => {
            let json = if attempts {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string_pretty(&outcome.result)?
            };
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            let error_json = serde_json::json!({
                "error": e.to_string()
            });
            println!("{}", serde_json::to_string_pretty(&error_json)?);
            // Return error so exit code is non-zero
            Err(anyhow::anyhow!("Failed to extract recipe: {}", e))
        }
    }
}
