//! Direction steps read from HTML.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{element_text, heading_level, text_lines};

/// Recipe-plugin instruction containers, most specific first.
const PLUGIN_SELECTORS: &[&str] = &[
    ".wprm-recipe-instruction-text",
    ".tasty-recipes-instructions",
    ".mv-create-instructions",
    ".jetpack-recipe-directions",
    "div.instructions",
    ".recipe-instructions",
    ".e-instructions",
    ".recipe-directions",
];

static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, .wp-block-heading").expect("Invalid selector")
});

static STEP_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("Invalid selector"));

static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("Invalid selector"));

static ITEMPROP_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[itemprop="recipeInstructions"], [itemprop="instructions"]"#)
        .expect("Invalid selector")
});

static DIRECTION_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:the\s+)?(?:instructions?|directions?|method|preparation|steps|how to make\b.*)\s*:?\s*$")
        .expect("Invalid direction heading regex")
});

static END_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:notes?|nutrition|tips|faqs?|reviews?|comments?|video)\b")
        .expect("Invalid end heading regex")
});

/// Regex-based extraction of instructions from raw HTML.
/// Handles malformed HTML where DOM parsing collapses the instruction container
/// (Jetpack recipes where `<p><div class="...">` closes the div immediately,
/// leaving the instruction paragraphs as siblings).
///
/// In the raw HTML, the pattern is:
///   `<div class="jetpack-recipe-directions e-instructions"></p>`
///   `<p></div><br />`
///   [ACTUAL INSTRUCTIONS IN `<p>` TAGS]
///   `</div></div>`
static JETPACK_DIRECTIONS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<div[^>]*class="[^"]*jetpack-recipe-directions[^"]*"[^>]*>.*?</div>\s*(?:<br\s*/?>)?\s*(.*?)</div>\s*</div>"#,
    )
    .expect("Invalid Jetpack directions regex")
});

static PARAGRAPH_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</p>\s*<p[^>]*>|<br\s*/?\s*>\s*<br\s*/?\s*>")
        .expect("Invalid paragraph split regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlDirections {
    pub strategy: &'static str,
    pub confidence: f32,
    pub steps: Vec<String>,
}

type Strategy = fn(&Html, &str) -> Vec<String>;

const STRATEGIES: &[(&str, f32, Strategy)] = &[
    ("plugin_classes", 0.7, plugin_classes),
    ("heading_list", 0.6, heading_list),
    ("itemprop", 0.6, itemprop_unscoped),
    ("jetpack_raw", 0.55, jetpack_raw),
];

/// First strategy that yields steps.
pub fn extract(document: &Html, raw_html: &str) -> Option<HtmlDirections> {
    STRATEGIES.iter().find_map(|&(strategy, confidence, run)| {
        let steps = run(document, raw_html);
        (!steps.is_empty()).then(|| {
            tracing::debug!(strategy, steps = steps.len(), "html directions found");
            HtmlDirections {
                strategy,
                confidence,
                steps,
            }
        })
    })
}

/// List items if the container has any, else paragraphs, else its text.
fn container_steps(el: ElementRef) -> Vec<String> {
    let items: Vec<String> = el
        .select(&STEP_ITEM_SELECTOR)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect();
    if !items.is_empty() {
        return items;
    }
    let paragraphs: Vec<String> = el
        .select(&PARAGRAPH_SELECTOR)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect();
    if !paragraphs.is_empty() {
        return paragraphs;
    }
    text_lines(&el.inner_html())
}

fn plugin_classes(document: &Html, _raw: &str) -> Vec<String> {
    for selector in PLUGIN_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        let steps: Vec<String> = document.select(&selector).flat_map(container_steps).collect();
        if !steps.is_empty() {
            return steps;
        }
    }
    Vec::new()
}

/// An "Instructions"/"Method" heading followed by lists and paragraphs.
fn heading_list(document: &Html, _raw: &str) -> Vec<String> {
    for heading in document.select(&HEADING_SELECTOR) {
        if !DIRECTION_HEADING_REGEX.is_match(&element_text(heading)) {
            continue;
        }
        let level = heading_level(&heading).unwrap_or(2);
        let mut steps = Vec::new();
        for sib in heading.next_siblings().filter_map(ElementRef::wrap) {
            if let Some(sub_level) = heading_level(&sib) {
                let text = element_text(sib);
                if sub_level <= level || END_HEADING_REGEX.is_match(&text) {
                    break;
                }
                steps.push(format!("[{}]", crate::text::trim_name_punctuation(&text)));
                continue;
            }
            match sib.value().name() {
                "ol" | "ul" | "div" | "section" => steps.extend(container_steps(sib)),
                "p" => steps.extend(text_lines(&sib.inner_html())),
                _ => {}
            }
        }
        while steps.last().is_some_and(|s| s.starts_with('[')) {
            steps.pop();
        }
        if steps.iter().any(|s| !s.starts_with('[')) {
            return steps;
        }
    }
    Vec::new()
}

/// Instruction elements via itemprop, ignoring any itemscope container.
fn itemprop_unscoped(document: &Html, _raw: &str) -> Vec<String> {
    document
        .select(&ITEMPROP_SELECTOR)
        .flat_map(container_steps)
        .collect()
}

fn jetpack_raw(_document: &Html, raw: &str) -> Vec<String> {
    JETPACK_DIRECTIONS_REGEX
        .captures(raw)
        .and_then(|cap| cap.get(1))
        .map(|content| html_to_paragraphs(content.as_str()))
        .unwrap_or_default()
}

/// Split an HTML fragment on paragraph boundaries into clean text.
fn html_to_paragraphs(html: &str) -> Vec<String> {
    PARAGRAPH_SPLIT_REGEX
        .split(html)
        .map(crate::text::strip_tags)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Option<HtmlDirections> {
        extract(&Html::parse_document(html), html)
    }

    #[test]
    fn test_wprm_instruction_text() {
        let found = run(r#"<ul class="wprm-recipe-instructions">
            <li><div class="wprm-recipe-instruction-text">Preheat the oven.</div></li>
            <li><div class="wprm-recipe-instruction-text">Bake for <b>20</b> minutes.</div></li>
        </ul>"#)
        .expect("steps");
        assert_eq!(found.strategy, "plugin_classes");
        assert_eq!(found.steps, vec!["Preheat the oven.", "Bake for 20 minutes."]);
    }

    #[test]
    fn test_heading_then_list() {
        let found = run(r#"<html><body>
            <h2>Ingredients</h2><ul><li>1 egg</li></ul>
            <h2>Method</h2>
            <ol><li>Crack the egg.</li><li>Fry it.</li></ol>
            <p>Serve hot.</p>
            <h3>Notes</h3><p>Use fresh eggs.</p>
        </body></html>"#)
        .expect("steps");
        assert_eq!(found.strategy, "heading_list");
        assert_eq!(found.steps, vec!["Crack the egg.", "Fry it.", "Serve hot."]);
    }

    #[test]
    fn test_itemprop_without_scope() {
        let found = run(r#"<div itemprop="recipeInstructions"><p>Stir.</p><p>Serve.</p></div>"#)
            .expect("steps");
        assert_eq!(found.strategy, "itemprop");
        assert_eq!(found.steps, vec!["Stir.", "Serve."]);
    }

    #[test]
    fn test_jetpack_raw_html() {
        let raw = r#"<div class="jetpack-recipe"><div class="jetpack-recipe-content"><p><div class="jetpack-recipe-directions e-instructions"></p>
<p></div><br />
<p>Heat the pan.</p>
<p>Add the onions &amp; cook.</p></div></div>"#;
        let steps = jetpack_raw(&Html::parse_document(""), raw);
        assert_eq!(steps, vec!["Heat the pan.", "Add the onions & cook."]);
    }

    #[test]
    fn test_no_directions() {
        assert!(run("<html><body><p>Nothing here.</p></body></html>").is_none());
    }
}
