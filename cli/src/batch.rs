//! Import a directory of saved pages concurrently.
//!
//! Extraction is synchronous, so each file runs on the blocking pool. The
//! importer is shared read-only.

use anyhow::{Context, Result};
use memoix_core::{FetchedDocument, ImportOutcome, RecipeImporter, SourceKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct FileOutcome {
    path: PathBuf,
    result: Result<ImportOutcome, String>,
}

pub async fn run(
    importer: RecipeImporter,
    dir: &Path,
    pattern: &str,
    output: Option<&Path>,
) -> Result<()> {
    let full_pattern = dir.join(pattern);
    let full_pattern = full_pattern
        .to_str()
        .context("Batch directory is not valid UTF-8")?;
    let files: Vec<PathBuf> = glob::glob(full_pattern)
        .context("Invalid batch glob pattern")?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No files matching {}", full_pattern);
    }
    if let Some(output) = output {
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output directory: {}", output.display()))?;
    }
    tracing::info!(files = files.len(), "starting batch import");

    let importer = Arc::new(importer);
    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let importer = Arc::clone(&importer);
        handles.push(tokio::task::spawn_blocking(move || import_file(&importer, path)));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.context("Import task panicked")?);
    }
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));

    let mut by_source: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(imported) => {
                *by_source.entry(source_label(imported.result.source_kind())).or_default() += 1;
                if let Some(output) = output {
                    write_result(output, &outcome.path, imported)?;
                }
            }
            Err(e) => {
                failed += 1;
                println!("FAIL {}: {}", outcome.path.display(), e);
            }
        }
    }

    println!(
        "\nSummary: {} imported, {} failed",
        outcomes.len() - failed,
        failed
    );
    for (source, count) in by_source {
        println!("  {}: {}", source, count);
    }

    Ok(())
}

fn import_file(importer: &RecipeImporter, path: PathBuf) -> FileOutcome {
    let result = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|body| {
            // Saved pages carry their source URL in the file name at best
            let url = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            importer
                .import_document(&FetchedDocument::new(url, body))
                .map_err(|e| e.to_string())
        });
    FileOutcome { path, result }
}

fn write_result(output: &Path, source: &Path, outcome: &ImportOutcome) -> Result<()> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recipe".to_string());
    let target = output.join(format!("{}.json", stem));
    let json = serde_json::to_string_pretty(outcome)?;
    fs::write(&target, json).with_context(|| format!("Failed to write {}", target.display()))
}

fn source_label(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::JsonLd => "json-ld",
        SourceKind::Microdata => "microdata",
        SourceKind::EmbeddedJson => "embedded json",
        SourceKind::Html => "html",
        SourceKind::PlainText => "plain text",
        SourceKind::Transcript => "transcript",
    }
}
