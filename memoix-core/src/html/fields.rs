//! Single fields read from HTML: title, glass, garnish, equipment, servings, image.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{element_text, heading_level};
use crate::text;

/// Regex to find og:image meta tag
static OG_IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*property\s*=\s*["']og:image["'][^>]*content\s*=\s*["']([^"']+)["'][^>]*/?\s*>"#)
        .expect("Invalid og:image regex")
});

/// Alternative og:image regex (content before property)
static OG_IMAGE_REGEX_ALT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*content\s*=\s*["']([^"']+)["'][^>]*property\s*=\s*["']og:image["'][^>]*/?\s*>"#)
        .expect("Invalid og:image alt regex")
});

static GLASS_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:glass|glassware|serve in)\s*[:\-–]\s*(.{2,60})$")
        .expect("Invalid glass regex")
});

static GARNISH_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*garnish(?:es)?\s*(?:with)?\s*[:\-–]?\s*(.{2,80})$")
        .expect("Invalid garnish regex")
});

static SERVES_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:serves|servings|yield|yields|makes)\s*:?\s*(\d.{0,40})$")
        .expect("Invalid serves regex")
});

static EQUIPMENT_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:equipment|tools|special equipment|you(?:'|’)?ll need)\s*:?\s*$")
        .expect("Invalid equipment heading regex")
});

/// Separators inside a garnish list: "lime wheel, mint sprig and a cherry"
static LIST_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:,|;|\band\b|\bor\b)\s*").expect("Invalid list split regex")
});

const TITLE_SELECTORS: &[&str] = &[
    ".jetpack-recipe-title",
    ".wprm-recipe-name",
    ".tasty-recipes-title",
    ".mv-create-title",
    "h1.entry-title",
    "h2.entry-title",
    "h1",
];

const GLASS_SELECTORS: &[&str] = &[".cocktail-glass", ".glass-type", r#"[itemprop="glass"]"#];

const SERVES_SELECTORS: &[&str] = &[
    r#"[itemprop="recipeYield"]"#,
    ".wprm-recipe-servings",
    ".tasty-recipes-yield",
    ".mv-create-yield",
];

const EQUIPMENT_ITEM_SELECTORS: &[&str] = &[
    ".wprm-recipe-equipment-name",
    ".tasty-recipes-equipment li",
    ".mv-create-equipment li",
];

static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("Invalid selector"));

static LIST_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("Invalid selector"));

static OG_TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("Invalid selector"));

static TITLE_TAG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("Invalid selector"));

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .map(|el| {
                el.value()
                    .attr("content")
                    .map(text::clean_text)
                    .unwrap_or_else(|| element_text(el))
            })
            .find(|s| !s.is_empty())
    })
}

/// Strip " - Site Name" / " | Site Name" suffixes.
fn strip_site_suffix(title: &str) -> String {
    let title = [" | ", " - ", " – ", " — "]
        .iter()
        .filter_map(|sep| title.split_once(sep).map(|(head, _)| head))
        .min_by_key(|head| head.len())
        .unwrap_or(title);
    title.trim().to_string()
}

/// Recipe title from plugin markup, then og:title, then the `<title>` tag.
pub fn title(document: &Html) -> Option<String> {
    if let Some(title) = first_text(document, TITLE_SELECTORS) {
        return Some(title);
    }
    let og_title = document
        .select(&OG_TITLE_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(text::clean_text);
    let tag_title = || {
        document
            .select(&TITLE_TAG_SELECTOR)
            .next()
            .map(element_text)
    };
    og_title
        .filter(|t| !t.is_empty())
        .or_else(tag_title)
        .map(|t| strip_site_suffix(&t))
        .filter(|t| !t.is_empty())
}

/// Serving glass, from cocktail-site markup or a "Glass:" line.
pub fn glass(document: &Html, lines: &[String]) -> Option<String> {
    first_text(document, GLASS_SELECTORS)
        .map(|g| label_value(&g))
        .or_else(|| {
            lines
                .iter()
                .find_map(|line| GLASS_LINE_REGEX.captures(line).map(|c| c[1].to_string()))
        })
        .map(|g| text::trim_name_punctuation(&g))
        .filter(|g| !g.is_empty())
}

/// Garnish items from a "Garnish:" line.
pub fn garnish(lines: &[String]) -> Vec<String> {
    let Some(raw) = lines
        .iter()
        .find_map(|line| GARNISH_LINE_REGEX.captures(line).map(|c| c[1].to_string()))
    else {
        return Vec::new();
    };
    LIST_SPLIT_REGEX
        .split(&raw)
        .map(text::trim_name_punctuation)
        .map(|item| {
            item.strip_prefix("a ")
                .or_else(|| item.strip_prefix("an "))
                .unwrap_or(item.as_str())
                .to_string()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// Equipment from plugin markup or an "Equipment" heading followed by a list.
pub fn equipment(document: &Html) -> Vec<String> {
    for selector in EQUIPMENT_ITEM_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        let items = dedup(document.select(&selector).map(element_text));
        if !items.is_empty() {
            return items;
        }
    }

    for heading in document.select(&HEADING_SELECTOR) {
        if !EQUIPMENT_HEADING_REGEX.is_match(&element_text(heading)) {
            continue;
        }
        let list = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|sib| heading_level(sib).is_none())
            .find(|sib| matches!(sib.value().name(), "ul" | "ol"));
        if let Some(list) = list {
            return dedup(list.select(&LIST_ITEM_SELECTOR).map(element_text));
        }
    }
    Vec::new()
}

/// Servings from yield markup or a "Serves 4" line.
pub fn serves(document: &Html, lines: &[String]) -> Option<String> {
    first_text(document, SERVES_SELECTORS)
        .map(|s| label_value(&s))
        .or_else(|| {
            lines
                .iter()
                .find_map(|line| SERVES_LINE_REGEX.captures(line).map(|c| c[1].trim().to_string()))
        })
        .filter(|s| !s.is_empty())
}

/// Fast og:image extraction using regex.
pub fn og_image(html: &str) -> Option<String> {
    OG_IMAGE_REGEX
        .captures(html)
        .or_else(|| OG_IMAGE_REGEX_ALT.captures(html))
        .and_then(|cap| cap.get(1))
        .map(|m| text::decode_entities(m.as_str().trim()))
}

/// "Glass: Coupe" → "Coupe"
fn label_value(s: &str) -> String {
    match s.split_once(':') {
        Some((label, value)) if label.split_whitespace().count() <= 2 => value.trim().to_string(),
        _ => s.trim().to_string(),
    }
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::body_lines;

    #[test]
    fn test_title_fallbacks() {
        let doc = Html::parse_document(
            r#"<html><head><title>Best Brownies | My Food Blog</title></head><body><p>hi</p></body></html>"#,
        );
        assert_eq!(title(&doc).as_deref(), Some("Best Brownies"));

        let doc = Html::parse_document(
            r#"<html><head><meta property="og:title" content="Lemon Tart - Bakery"><title>x</title></head><body></body></html>"#,
        );
        assert_eq!(title(&doc).as_deref(), Some("Lemon Tart"));

        let doc = Html::parse_document(
            r#"<html><body><h2 class="wprm-recipe-name">Chili</h2><h1>Site</h1></body></html>"#,
        );
        assert_eq!(title(&doc).as_deref(), Some("Chili"));
    }

    #[test]
    fn test_glass_and_garnish_lines() {
        let doc = Html::parse_document(
            "<html><body><p>Glass: Coupe</p><p>Garnish: lime wheel, mint sprig and a cherry</p></body></html>",
        );
        let lines = body_lines(&doc);
        assert_eq!(glass(&doc, &lines).as_deref(), Some("Coupe"));
        assert_eq!(garnish(&lines), vec!["lime wheel", "mint sprig", "cherry"]);
    }

    #[test]
    fn test_glass_markup() {
        let doc = Html::parse_document(
            r#"<html><body><span class="cocktail-glass">Rocks glass</span></body></html>"#,
        );
        assert_eq!(glass(&doc, &[]).as_deref(), Some("Rocks glass"));
    }

    #[test]
    fn test_equipment_heading() {
        let doc = Html::parse_document(
            "<html><body><h3>Equipment</h3><ul><li>Dutch oven</li><li>Wooden spoon</li><li>Dutch oven</li></ul></body></html>",
        );
        assert_eq!(equipment(&doc), vec!["Dutch oven", "Wooden spoon"]);
    }

    #[test]
    fn test_serves() {
        let doc = Html::parse_document(
            r#"<html><body><span class="wprm-recipe-servings">6</span></body></html>"#,
        );
        assert_eq!(serves(&doc, &[]).as_deref(), Some("6"));

        let doc = Html::parse_document("<html><body><p>Serves: 4 to 6</p></body></html>");
        let lines = body_lines(&doc);
        assert_eq!(serves(&doc, &lines).as_deref(), Some("4 to 6"));
    }

    #[test]
    fn test_og_image() {
        let html = r#"<meta content="https://example.com/a.jpg?w=1&amp;h=2" property="og:image" />"#;
        assert_eq!(og_image(html).as_deref(), Some("https://example.com/a.jpg?w=1&h=2"));
        assert_eq!(
            og_image(r#"<meta property="og:image" content="https://example.com/b.jpg">"#)
                .as_deref(),
            Some("https://example.com/b.jpg")
        );
        assert_eq!(og_image("<p>none</p>"), None);
    }
}
