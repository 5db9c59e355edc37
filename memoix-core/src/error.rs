use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Blocked by bot detection (status {0})")]
    BotDetected(u16),

    #[error("Invalid response encoding: {0}")]
    InvalidEncoding(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No recipe found after all extraction stages ({0})")]
    NoRecipe(Diagnostics),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Observable page signals gathered when every stage came up empty.
/// Purely informational: nothing reads these to recover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub jsonld_blocks: usize,
    pub jsonld_parse_failures: usize,
    pub has_microdata: bool,
    pub has_embedded_json: bool,
    pub heading_count: usize,
    pub ingredient_headings: usize,
    pub list_items: usize,
    pub has_bullets: bool,
    pub has_measurements: bool,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "json-ld blocks: {} ({} unparseable), microdata: {}, embedded json: {}, headings: {} ({} mention ingredients), list items: {}, bullets: {}, measurements: {}",
            self.jsonld_blocks,
            self.jsonld_parse_failures,
            self.has_microdata,
            self.has_embedded_json,
            self.heading_count,
            self.ingredient_headings,
            self.list_items,
            self.has_bullets,
            self.has_measurements,
        )
    }
}

/// Failure of a fetch-then-extract import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}
