//! JSON-LD `<script type="application/ld+json">` blocks.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::visitor::{self, Search};
use super::{candidate_from_object, is_recipe_type, RecipeCandidate};

/// Regex to find JSON-LD script tags (case-insensitive for type attribute)
static JSONLD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("Invalid JSON-LD regex")
});

/// What a pass over the page's JSON-LD blocks found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonLdScan {
    /// Number of JSON-LD script blocks on the page
    pub blocks: usize,
    /// Blocks that failed to parse even after sanitizing
    pub parse_failures: usize,
    pub recipe: Option<RecipeCandidate>,
    /// Where in its block the recipe object sat, e.g. `@graph.2`
    pub path: Option<String>,
}

/// Scan every JSON-LD block for the first Recipe object.
///
/// Uses a regex to find the blocks rather than a full DOM parse. Malformed
/// blocks are counted and skipped.
pub fn scan(html: &str, max_depth: usize) -> JsonLdScan {
    let mut scan = JsonLdScan::default();

    for cap in JSONLD_REGEX.captures_iter(html) {
        let Some(body) = cap.get(1) else {
            continue;
        };
        scan.blocks += 1;
        if scan.recipe.is_some() {
            continue;
        }

        let json: Value = match serde_json::from_str(&sanitize_json(body.as_str())) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed JSON-LD block");
                scan.parse_failures += 1;
                continue;
            }
        };

        if let Search::Found { value, path } = visitor::search(&json, max_depth, &is_recipe_type) {
            tracing::debug!(path = %path.join("."), "found JSON-LD recipe");
            scan.recipe = Some(candidate_from_object(value));
            scan.path = Some(path.join("."));
        }
    }

    scan
}

/// Sanitize JSON-LD content to handle common malformed patterns.
/// Some sites include literal newlines/tabs inside JSON strings instead of escaped versions.
pub(crate) fn sanitize_json(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in json.trim().chars() {
        if in_string {
            if escaped {
                escaped = false;
                result.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    result.push(c);
                }
                '"' => {
                    in_string = false;
                    result.push(c);
                }
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                // Other control characters are dropped
                c if c.is_control() => {}
                _ => result.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            result.push(c);
        }
    }

    // Some CMSes wrap the block in an HTML comment or CDATA
    strip_wrappers(&result).to_string()
}

fn strip_wrappers(s: &str) -> &str {
    let s = s.trim();
    let s = s
        .strip_prefix("<!--")
        .and_then(|rest| rest.strip_suffix("-->"))
        .unwrap_or(s)
        .trim();
    s.strip_prefix("//<![CDATA[")
        .and_then(|rest| rest.strip_suffix("//]]>"))
        .unwrap_or(s)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(blocks: &[&str]) -> String {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{b}</script>"#))
            .collect();
        format!("<html><head>{scripts}</head><body></body></html>")
    }

    #[test]
    fn test_minimal_recipe() {
        let html = page(&[
            r#"{"@context": "https://schema.org", "@type": "Recipe", "name": "Bread", "recipeIngredient": ["200g flour", "1 egg"]}"#,
        ]);
        let scan = scan(&html, 10);
        assert_eq!(scan.blocks, 1);
        let recipe = scan.recipe.expect("recipe");
        assert_eq!(recipe.name.as_deref(), Some("Bread"));
        assert_eq!(recipe.ingredients, vec!["200g flour", "1 egg"]);
    }

    #[test]
    fn test_graph_and_malformed_blocks() {
        let html = page(&[
            r#"{"@type": "Recipe", "name": broken"#,
            r#"{"@context": "https://schema.org", "@graph": [{"@type": "WebPage"}, {"@type": ["Recipe"], "name": "Soup"}]}"#,
        ]);
        let scan = scan(&html, 10);
        assert_eq!(scan.blocks, 2);
        assert_eq!(scan.parse_failures, 1);
        assert_eq!(scan.path.as_deref(), Some("@graph.1"));
        assert_eq!(scan.recipe.and_then(|r| r.name).as_deref(), Some("Soup"));
    }

    #[test]
    fn test_non_recipe_block() {
        let html = page(&[r#"{"@type": "Article", "name": "News"}"#]);
        let scan = scan(&html, 10);
        assert_eq!(scan.blocks, 1);
        assert!(scan.recipe.is_none());
    }

    #[test]
    fn test_sanitize_raw_newlines() {
        let raw = "{\"name\": \"Line one\nLine two\", \"a\": \"tab\there\"}";
        let value: Value = serde_json::from_str(&sanitize_json(raw)).expect("valid json");
        assert_eq!(value["name"], "Line one\nLine two");
    }

    #[test]
    fn test_sanitize_keeps_escaped_quotes() {
        let raw = r#"{"name": "12\" pizza", "b": "x"}"#;
        let value: Value = serde_json::from_str(&sanitize_json(raw)).expect("valid json");
        assert_eq!(value["name"], "12\" pizza");
    }

    #[test]
    fn test_sanitize_comment_wrapper() {
        let raw = "<!-- {\"@type\": \"Recipe\"} -->";
        let value: Value = serde_json::from_str(&sanitize_json(raw)).expect("valid json");
        assert!(is_recipe_type(&value));
    }
}
