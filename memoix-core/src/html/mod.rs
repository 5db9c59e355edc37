//! Recipe data read straight from the page's HTML.
//!
//! Ingredients come from the per-site [`SiteRegistry`] first, then from the
//! generic strategy chain. Directions, title, glass, garnish, equipment,
//! servings and the og:image are read independently.

pub mod directions;
pub mod fields;
pub mod generic;
pub mod site_config;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::classify_line;
use crate::text;

pub use directions::HtmlDirections;
pub use site_config::{ExtractionMode, SiteConfig, SiteRegistry};

/// Confidence for ingredients read through a site config.
pub const SITE_CONFIG_CONFIDENCE: f32 = 0.7;

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("Invalid selector"));

static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("Invalid selector"));

static LIST_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("Invalid selector"));

/// Script, style and noscript blocks never hold recipe text
static NON_CONTENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<!--.*?-->")
        .expect("Invalid non-content regex")
});

/// Tags that start or end a visual line
static BLOCK_BREAK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<br\s*/?>|</?(?:p|div|li|ul|ol|h[1-6]|tr|td|th|dd|dt|dl|table|section|article|blockquote|header|footer|figure)\b[^>]*>",
    )
    .expect("Invalid block break regex")
});

static BULLET_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•·▪◦●‣\*]\s*\S").expect("Invalid bullet regex"));

/// Ingredient lines found in the HTML, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlIngredients {
    /// `site:<id>` or `generic:<strategy>`
    pub source: String,
    pub confidence: f32,
    /// Raw lines with `[Section]` markers
    pub lines: Vec<String>,
}

impl HtmlIngredients {
    pub fn has_sections(&self) -> bool {
        self.lines.iter().any(|l| l.starts_with('[') && l.ends_with(']'))
    }
}

/// Everything the HTML extractor could read from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlRecipe {
    pub title: Option<String>,
    pub ingredients: Option<HtmlIngredients>,
    pub directions: Option<HtmlDirections>,
    pub glass: Option<String>,
    pub garnish: Vec<String>,
    pub equipment: Vec<String>,
    pub serves: Option<String>,
    pub image: Option<String>,
}

/// Ingredient lines: site configs in registry order, then the generic chain.
pub fn extract_ingredients(
    document: &Html,
    registry: &SiteRegistry,
    host: Option<&str>,
) -> Option<HtmlIngredients> {
    if let Some(found) = site_config::extract_with_registry(document, registry, host) {
        return Some(HtmlIngredients {
            source: format!("site:{}", found.site),
            confidence: SITE_CONFIG_CONFIDENCE,
            lines: found.lines,
        });
    }
    generic::extract(document).map(|found| HtmlIngredients {
        source: format!("generic:{}", found.strategy),
        confidence: found.confidence,
        lines: found.lines,
    })
}

/// Read every HTML-sourced field from the page.
pub fn extract_page(
    document: &Html,
    raw_html: &str,
    registry: &SiteRegistry,
    host: Option<&str>,
) -> HtmlRecipe {
    let lines = body_lines(document);
    HtmlRecipe {
        title: fields::title(document),
        ingredients: extract_ingredients(document, registry, host),
        directions: directions::extract(document, raw_html),
        glass: fields::glass(document, &lines),
        garnish: fields::garnish(&lines),
        equipment: fields::equipment(document),
        serves: fields::serves(document, &lines),
        image: fields::og_image(raw_html),
    }
}

/// Visible text of an element, tags replaced by spaces, entities decoded.
pub fn element_text(el: ElementRef) -> String {
    text::strip_tags(&el.inner_html())
}

/// Split an HTML fragment into visual lines of clean text.
pub fn text_lines(fragment: &str) -> Vec<String> {
    let without_scripts = NON_CONTENT_REGEX.replace_all(fragment, " ");
    let broken = BLOCK_BREAK_REGEX.replace_all(&without_scripts, "\n");
    broken
        .lines()
        .map(text::strip_tags)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Visual text lines of the page body.
pub fn body_lines(document: &Html) -> Vec<String> {
    document
        .select(&BODY_SELECTOR)
        .next()
        .map(|body| text_lines(&body.inner_html()))
        .unwrap_or_default()
}

pub(crate) fn heading_level(el: &ElementRef) -> Option<u8> {
    let name = el.value().name();
    let digit = name.strip_prefix('h').or_else(|| name.strip_prefix('H'))?;
    match digit.parse::<u8>() {
        Ok(level @ 1..=6) => Some(level),
        _ => None,
    }
}

pub(crate) fn is_bullet_line(line: &str) -> bool {
    BULLET_LINE_REGEX.is_match(line)
}

/// Coarse page shape, reported when nothing could be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSignals {
    pub heading_count: usize,
    pub ingredient_headings: usize,
    pub list_items: usize,
    pub has_bullets: bool,
    pub has_measurements: bool,
}

pub fn page_signals(document: &Html) -> PageSignals {
    let headings: Vec<String> = document.select(&HEADING_SELECTOR).map(element_text).collect();
    let lines = body_lines(document);
    PageSignals {
        heading_count: headings.len(),
        ingredient_headings: headings
            .iter()
            .filter(|h| h.to_lowercase().contains("ingredient"))
            .count(),
        list_items: document.select(&LIST_ITEM_SELECTOR).count(),
        has_bullets: lines.iter().any(|l| is_bullet_line(l)),
        has_measurements: lines.iter().any(|l| classify_line::contains_measurement(l)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lines() {
        let fragment = concat!(
            "<p>One &amp; two<br>three</p>",
            "<script>var x = '<p>no</p>';</script>",
            "<div><b>four</b>,</div>",
        );
        assert_eq!(text_lines(fragment), vec!["One & two", "three", "four,"]);
    }

    #[test]
    fn test_element_text_spacing() {
        let doc = Html::parse_fragment(
            r#"<li><span class="amount">1 ½</span> <span class="unit">cups</span> <a href="/x">flour</a>, sifted</li>"#,
        );
        let li = doc.select(&LIST_ITEM_SELECTOR).next().expect("li");
        assert_eq!(element_text(li), "1 ½ cups flour, sifted");
    }

    #[test]
    fn test_page_signals() {
        let doc = Html::parse_document(
            "<html><body><h2>Ingredients</h2><ul><li>2 cups flour</li><li>salt</li></ul><p>• pepper</p><h2>Method</h2></body></html>",
        );
        let signals = page_signals(&doc);
        assert_eq!(signals.heading_count, 2);
        assert_eq!(signals.ingredient_headings, 1);
        assert_eq!(signals.list_items, 2);
        assert!(signals.has_bullets);
        assert!(signals.has_measurements);
    }

    #[test]
    fn test_site_config_beats_generic() {
        let doc = Html::parse_document(
            r#"<html><body>
            <h2>Ingredients</h2><ul><li>1 cup decoy</li><li>2 cups decoy</li></ul>
            <div class="wprm-recipe-ingredients-container"><div class="wprm-recipe-ingredient-group">
              <ul><li class="wprm-recipe-ingredient">1 cup rice</li><li class="wprm-recipe-ingredient">2 cups water</li></ul>
            </div></div></body></html>"#,
        );
        let found = extract_ingredients(&doc, SiteRegistry::builtin(), None).expect("ingredients");
        assert_eq!(found.source, "site:wprm");
        assert_eq!(found.confidence, SITE_CONFIG_CONFIDENCE);
        assert_eq!(found.lines, vec!["1 cup rice", "2 cups water"]);
    }
}
