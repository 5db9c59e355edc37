//! Import configuration from environment variables.

use std::env;

/// Default and maximum depth for recursive JSON searches.
pub const DEFAULT_MAX_JSON_DEPTH: usize = 10;

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportConfig {
    /// Reorder unsectioned ingredient lists by quantity.
    pub sort_ingredients: bool,
    /// Depth bound for JSON-LD and hydration JSON searches, 1..=10.
    pub max_json_depth: usize,
    /// Keep image paths on documents served from an archive mirror.
    pub keep_archive_images: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sort_ingredients: false,
            max_json_depth: DEFAULT_MAX_JSON_DEPTH,
            keep_archive_images: false,
        }
    }
}

impl ImportConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `MEMOIX_SORT_INGREDIENTS`: Sort unsectioned lists by quantity (default: false)
    /// - `MEMOIX_MAX_JSON_DEPTH`: JSON search depth, clamped to 1..=10 (default: 10)
    /// - `MEMOIX_KEEP_ARCHIVE_IMAGES`: Keep images from archived pages (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_json_depth = lookup("MEMOIX_MAX_JSON_DEPTH")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(|d| d.clamp(1, DEFAULT_MAX_JSON_DEPTH))
            .unwrap_or(DEFAULT_MAX_JSON_DEPTH);

        Self {
            sort_ingredients: lookup("MEMOIX_SORT_INGREDIENTS").is_some_and(|v| is_truthy(&v)),
            max_json_depth,
            keep_archive_images: lookup("MEMOIX_KEEP_ARCHIVE_IMAGES")
                .is_some_and(|v| is_truthy(&v)),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ImportConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ImportConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(from_pairs(&[]), ImportConfig::default());
    }

    #[test]
    fn test_flags() {
        let config = from_pairs(&[
            ("MEMOIX_SORT_INGREDIENTS", "TRUE"),
            ("MEMOIX_KEEP_ARCHIVE_IMAGES", "1"),
        ]);
        assert!(config.sort_ingredients);
        assert!(config.keep_archive_images);

        let config = from_pairs(&[("MEMOIX_SORT_INGREDIENTS", "yes")]);
        assert!(!config.sort_ingredients);
    }

    #[test]
    fn test_depth_is_clamped() {
        assert_eq!(from_pairs(&[("MEMOIX_MAX_JSON_DEPTH", "50")]).max_json_depth, 10);
        assert_eq!(from_pairs(&[("MEMOIX_MAX_JSON_DEPTH", "0")]).max_json_depth, 1);
        assert_eq!(from_pairs(&[("MEMOIX_MAX_JSON_DEPTH", "4")]).max_json_depth, 4);
        assert_eq!(from_pairs(&[("MEMOIX_MAX_JSON_DEPTH", "deep")]).max_json_depth, 10);
    }
}
