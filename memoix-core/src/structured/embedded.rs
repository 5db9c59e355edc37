//! Framework hydration JSON: Next.js, Nuxt, Redux-style initial state, Apollo
//! caches and plain `application/json` script blocks.
//!
//! Known object paths are tried first; otherwise the whole blob is searched,
//! depth-bounded, for an object that looks like a recipe.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::visitor::{self, Search};
use super::{
    candidate_from_object, is_recipe_type, RecipeCandidate, DIRECTION_KEYS, INGREDIENT_KEYS,
};

static SCRIPT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script>").expect("Invalid script regex")
});

static WINDOW_ASSIGN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.(__NUXT__|__INITIAL_STATE__|__APOLLO_STATE__)\s*=\s*")
        .expect("Invalid window assignment regex")
});

/// JSON pointers where frameworks commonly keep the page's recipe.
const KNOWN_PATHS: &[&str] = &[
    "/props/pageProps/recipe",
    "/props/pageProps/data/recipe",
    "/props/pageProps/content/recipe",
    "/props/pageProps/initialState/recipe",
    "/props/pageProps/recipeData",
    "/data/recipe",
    "/state/recipe",
    "/recipe",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedSource {
    NextData,
    NuxtData,
    Nuxt,
    InitialState,
    ApolloState,
    ApplicationJson,
}

impl EmbeddedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddedSource::NextData => "__NEXT_DATA__",
            EmbeddedSource::NuxtData => "__NUXT_DATA__",
            EmbeddedSource::Nuxt => "window.__NUXT__",
            EmbeddedSource::InitialState => "window.__INITIAL_STATE__",
            EmbeddedSource::ApolloState => "window.__APOLLO_STATE__",
            EmbeddedSource::ApplicationJson => "application/json",
        }
    }
}

impl fmt::Display for EmbeddedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedRecipe {
    pub candidate: RecipeCandidate,
    pub source: EmbeddedSource,
    /// Dotted path of the recipe object inside the blob
    pub path: String,
}

/// A hydration blob pulled out of the page, parsed.
#[derive(Debug)]
struct Blob {
    source: EmbeddedSource,
    json: Value,
}

/// True if the page carries any hydration JSON we know how to read.
pub fn has_embedded_json(html: &str) -> bool {
    !blobs(html).is_empty()
}

/// Find the first recipe in the page's hydration JSON.
pub fn find_recipe(html: &str, max_depth: usize) -> Option<EmbeddedRecipe> {
    for blob in blobs(html) {
        if let Some(found) = recipe_in_blob(&blob, max_depth) {
            tracing::debug!(source = %found.source, path = %found.path, "found embedded recipe");
            return Some(found);
        }
    }
    None
}

fn recipe_in_blob(blob: &Blob, max_depth: usize) -> Option<EmbeddedRecipe> {
    for pointer in KNOWN_PATHS {
        if let Some(value) = blob.json.pointer(pointer).filter(|v| v.is_object()) {
            let candidate = candidate_from_object(value);
            if candidate.has_content() {
                return Some(EmbeddedRecipe {
                    candidate,
                    source: blob.source,
                    path: pointer.trim_start_matches('/').replace('/', "."),
                });
            }
        }
    }

    match visitor::search(&blob.json, max_depth, &looks_like_recipe) {
        Search::Found { value, path } => {
            let candidate = candidate_from_object(value);
            candidate.has_content().then(|| EmbeddedRecipe {
                candidate,
                source: blob.source,
                path: path.join("."),
            })
        }
        Search::NotFound => None,
    }
}

/// A name-like key plus a non-empty ingredients or instructions key.
fn looks_like_recipe(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if is_recipe_type(value) {
        return true;
    }
    let has_name = ["name", "title", "headline"]
        .iter()
        .any(|key| obj.get(*key).and_then(Value::as_str).is_some_and(|s| !s.trim().is_empty()));
    let non_empty = |v: &Value| match v {
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        _ => false,
    };
    has_name
        && INGREDIENT_KEYS
            .iter()
            .chain(DIRECTION_KEYS)
            .any(|key| obj.get(*key).is_some_and(non_empty))
}

fn blobs(html: &str) -> Vec<Blob> {
    let mut found = Vec::new();
    for cap in SCRIPT_REGEX.captures_iter(html) {
        let attrs = cap.get(1).map_or("", |m| m.as_str());
        let body = cap.get(2).map_or("", |m| m.as_str()).trim();
        if body.is_empty() || attrs.contains("ld+json") {
            continue;
        }

        let tagged = if attrs.contains("__NEXT_DATA__") {
            Some(EmbeddedSource::NextData)
        } else if attrs.contains("__NUXT_DATA__") {
            Some(EmbeddedSource::NuxtData)
        } else if attrs.contains("application/json") {
            Some(EmbeddedSource::ApplicationJson)
        } else {
            None
        };
        if let Some(source) = tagged {
            match serde_json::from_str(body) {
                Ok(json) => found.push(Blob { source, json }),
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "skipping malformed embedded JSON")
                }
            }
            continue;
        }

        for assign in WINDOW_ASSIGN_REGEX.captures_iter(body) {
            let (Some(whole), Some(name)) = (assign.get(0), assign.get(1)) else {
                continue;
            };
            let source = match name.as_str() {
                "__NUXT__" => EmbeddedSource::Nuxt,
                "__INITIAL_STATE__" => EmbeddedSource::InitialState,
                _ => EmbeddedSource::ApolloState,
            };
            let Some(literal) = balanced_object(&body[whole.end()..]) else {
                continue;
            };
            match serde_json::from_str(literal) {
                Ok(json) => found.push(Blob { source, json }),
                Err(e) => tracing::warn!(
                    source = %source,
                    error = %e,
                    "skipping non-JSON window assignment"
                ),
            }
        }
    }
    found
}

/// The balanced `{...}` literal at the start of `s`, respecting strings.
fn balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return s.get(..=i);
                }
            }
            _ => {}
        }
    }
    None
}
