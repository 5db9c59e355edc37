//! Generic ingredient strategies for pages no site config recognizes.
//!
//! Tried in order of decreasing confidence; the first strategy that finds
//! enough lines wins and strategies are never combined.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{body_lines, element_text, heading_level, is_bullet_line, text_lines};
use crate::classify_line::{self, LineKind};
use crate::text;

static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, .wp-block-heading").expect("Invalid selector")
});

static BOLD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong, b").expect("Invalid selector"));

static LIST_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("Invalid selector"));

static INGREDIENTS_DIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.ingredients").expect("Invalid selector"));

static DL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("dl").expect("Invalid selector"));

static TABLE_ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table tr").expect("Invalid selector"));

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("Invalid selector"));

/// Plugin classes and unscoped microdata, in the order they are trusted.
const PLUGIN_ITEM_SELECTORS: &[&str] = &[
    ".jetpack-recipe-ingredient",
    ".wprm-recipe-ingredient",
    ".tasty-recipe-ingredients li",
    ".tasty-recipes-ingredients li",
    ".mv-create-ingredients li",
    ".recipe-ingredients li",
    ".ingredients-list li",
    "ul.ingredients li",
    r#"[itemprop="recipeIngredient"], [itemprop="ingredients"]"#,
];

static INGREDIENT_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:the\s+)?ingredients?\b.{0,30}$")
        .expect("Invalid ingredient heading regex")
});

static INGREDIENT_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*ingredients?\s*:?\s*$").expect("Invalid ingredient label regex")
});

/// Headings that end an ingredient block
static STOP_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:instructions?|directions?|method|preparation|steps|how to make|notes?|nutrition|equipment|tips)\b",
    )
    .expect("Invalid stop heading regex")
});

/// `<br>` and paragraph boundaries inside an old-style ingredients div
static BR_SPLIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>\s*<p>|</?p>").expect("Invalid regex"));

static INLINE_HEADING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h[1-6][^>]*>(.*?)</h[1-6]>").expect("Invalid inline heading regex")
});

static GRAM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+(?:[.,]\d+)?\s?(?:g|kg|grams?)\b").expect("Invalid gram regex")
});

type Strategy = fn(&Html) -> Option<Vec<String>>;

/// `(name, confidence, minimum real lines, strategy)`
const STRATEGIES: &[(&str, f32, usize, Strategy)] = &[
    ("heading_list", 0.65, 2, heading_list),
    ("bold_label", 0.6, 2, bold_label),
    ("plugin_classes", 0.6, 2, plugin_classes),
    ("br_separated_div", 0.55, 2, br_separated_div),
    ("structured_markup", 0.5, 2, structured_markup),
    ("bullet_text", 0.4, 3, bullet_text),
    ("gram_anchored", 0.35, 3, gram_anchored),
];

#[derive(Debug, Clone, PartialEq)]
pub struct GenericMatch {
    pub strategy: &'static str,
    pub confidence: f32,
    pub lines: Vec<String>,
}

/// Run the chain; first strategy with enough real lines wins.
pub fn extract(document: &Html) -> Option<GenericMatch> {
    for &(strategy, confidence, minimum, run) in STRATEGIES {
        let Some(lines) = run(document) else {
            continue;
        };
        let real = lines.iter().filter(|l| !is_marker(l)).count();
        if real >= minimum {
            tracing::debug!(strategy, lines = lines.len(), "generic ingredient strategy matched");
            return Some(GenericMatch {
                strategy,
                confidence,
                lines,
            });
        }
        tracing::trace!(strategy, real, "generic strategy found too few lines");
    }
    None
}

fn is_marker(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']')
}

fn marker(header: &str) -> Option<String> {
    let name = classify_line::clean_section_name(header);
    (!name.is_empty()).then(|| format!("[{name}]"))
}

/// Block-level collector shared by the heading and bold-label strategies.
#[derive(Default)]
struct Block {
    lines: Vec<String>,
    stopped: bool,
}

impl Block {
    fn push_items(&mut self, list: ElementRef) {
        self.lines.extend(
            list.select(&LIST_ITEM_SELECTOR)
                .map(element_text)
                .filter(|s| !s.is_empty()),
        );
    }

    /// A paragraph: short bold or colon-terminated text is a section header,
    /// measured text is an ingredient, the rest is prose.
    fn push_paragraph(&mut self, el: ElementRef) {
        for line in text_lines(&el.inner_html()) {
            if let Some(name) = classify_line::section_header_name(&line) {
                self.lines.extend(marker(&name));
            } else if classify_line::contains_measurement(&line)
                && classify_line::classify_line(&line) == LineKind::Ingredient
            {
                self.lines.push(line);
            }
        }
    }

    /// Walk an element's following siblings until a heading at `level` or
    /// above, or one that starts the next part of the recipe.
    fn walk_siblings(&mut self, start: ElementRef, level: u8) {
        for sib in start.next_siblings().filter_map(ElementRef::wrap) {
            self.visit(sib, level);
            if self.stopped {
                return;
            }
        }
    }

    fn visit(&mut self, el: ElementRef, level: u8) {
        if let Some(sub_level) = heading_level(&el) {
            let heading = element_text(el);
            if sub_level <= level || STOP_HEADING_REGEX.is_match(&heading) {
                self.stopped = true;
            } else {
                self.lines.extend(marker(&heading));
            }
            return;
        }
        match el.value().name() {
            "ul" | "ol" => self.push_items(el),
            "p" => {
                let text = element_text(el);
                if STOP_HEADING_REGEX.is_match(&text) && text.split_whitespace().count() <= 4 {
                    self.stopped = true;
                } else {
                    self.push_paragraph(el);
                }
            }
            "div" | "section" | "figure" => {
                for child in el.children().filter_map(ElementRef::wrap) {
                    self.visit(child, level);
                    if self.stopped {
                        return;
                    }
                }
            }
            _ => {}
        }
    }
}

/// A heading reading "Ingredients" followed by lists, with sub-headings as sections.
fn heading_list(document: &Html) -> Option<Vec<String>> {
    for heading in document.select(&HEADING_SELECTOR) {
        if !INGREDIENT_HEADING_REGEX.is_match(&element_text(heading)) {
            continue;
        }
        let level = heading_level(&heading).unwrap_or(2);
        let mut block = Block::default();
        block.walk_siblings(heading, level);
        // Headings wrapped in their own block: continue after the wrapper
        if block.lines.is_empty() && !block.stopped {
            if let Some(parent) = heading.parent().and_then(ElementRef::wrap) {
                block.walk_siblings(parent, level);
            }
        }
        if !block.lines.is_empty() {
            return Some(block.lines);
        }
    }
    None
}

/// A bold "Ingredients:" label followed by a list or by lines in the same paragraph.
fn bold_label(document: &Html) -> Option<Vec<String>> {
    for bold in document.select(&BOLD_SELECTOR) {
        if !INGREDIENT_LABEL_REGEX.is_match(&element_text(bold)) {
            continue;
        }
        let mut block = Block::default();
        let anchor = bold
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|p| p.value().name() == "p")
            .unwrap_or(bold);
        if anchor.value().name() == "p" {
            // "<p><b>Ingredients:</b><br>1 cup flour<br>...</p>"
            block.lines.extend(
                text_lines(&anchor.inner_html())
                    .into_iter()
                    .filter(|line| !INGREDIENT_LABEL_REGEX.is_match(line))
                    .filter(|line| classify_line::classify_line(line) == LineKind::Ingredient),
            );
        }
        block.walk_siblings(anchor, 1);
        if !block.lines.is_empty() {
            return Some(block.lines);
        }
    }
    None
}

/// Recipe-plugin classes, then `itemprop` regardless of scope.
fn plugin_classes(document: &Html) -> Option<Vec<String>> {
    PLUGIN_ITEM_SELECTORS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        let items: Vec<String> = document
            .select(&selector)
            .map(element_text)
            .filter(|s| !s.is_empty())
            .collect();
        (items.len() >= 2).then_some(items)
    })
}

/// Old WordPress format: `<div class="ingredients">` with `<br>`-separated
/// lines and optional heading tags as section headers.
fn br_separated_div(document: &Html) -> Option<Vec<String>> {
    let div = document.select(&INGREDIENTS_DIV_SELECTOR).next()?;
    let inner = div.inner_html();
    let mut lines = Vec::new();
    for chunk in BR_SPLIT_REGEX.split(&inner) {
        let mut rest = chunk.to_string();
        if let Some(caps) = INLINE_HEADING_REGEX.captures(chunk) {
            lines.extend(marker(&text::strip_tags(&caps[1])));
            rest = INLINE_HEADING_REGEX.replace(chunk, " ").into_owned();
        }
        let line = text::strip_tags(&rest);
        if !line.is_empty() {
            lines.push(line);
        }
    }
    (!lines.is_empty()).then_some(lines)
}

/// Definition lists, tables, then bracketed categories in body text.
fn structured_markup(document: &Html) -> Option<Vec<String>> {
    definition_list(document)
        .or_else(|| table_rows(document))
        .or_else(|| bracket_scan(document))
}

fn definition_list(document: &Html) -> Option<Vec<String>> {
    for dl in document.select(&DL_SELECTOR) {
        let mut lines = Vec::new();
        let mut measured = 0;
        for child in dl.children().filter_map(ElementRef::wrap) {
            let text = element_text(child);
            match child.value().name() {
                "dt" => lines.extend(marker(&text)),
                "dd" if !text.is_empty() => {
                    measured += usize::from(classify_line::contains_measurement(&text));
                    lines.push(text);
                }
                _ => {}
            }
        }
        if measured >= 2 {
            return Some(lines);
        }
    }
    None
}

fn table_rows(document: &Html) -> Option<Vec<String>> {
    let mut lines = Vec::new();
    let mut rows = 0;
    let mut measured = 0;
    for row in document.select(&TABLE_ROW_SELECTOR) {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        let texts: Vec<String> = cells
            .iter()
            .map(|c| element_text(*c))
            .filter(|s| !s.is_empty())
            .collect();
        if texts.is_empty() {
            continue;
        }
        // A lone header cell names a section
        if cells.len() == 1 && cells[0].value().name() == "th" {
            lines.extend(marker(&texts[0]));
            continue;
        }
        let line = texts.join(" ");
        rows += 1;
        if classify_line::contains_measurement(&line) {
            measured += 1;
            lines.push(line);
        }
    }
    (measured >= 2 && measured * 2 >= rows).then_some(lines)
}

/// `[Category]` lines followed by measured lines.
fn bracket_scan(document: &Html) -> Option<Vec<String>> {
    let lines = body_lines(document);
    let start = lines
        .iter()
        .position(|l| l.starts_with('[') && classify_line::section_header_name(l).is_some())?;
    let mut found = Vec::new();
    for line in &lines[start..] {
        if line.starts_with('[') {
            match classify_line::section_header_name(line) {
                Some(name) => found.extend(marker(&name)),
                None => break,
            }
        } else if classify_line::contains_measurement(line) {
            found.push(line.clone());
        } else if found.iter().any(|l| !is_marker(l)) {
            break;
        }
    }
    Some(found)
}

/// Runs of bullet-character lines in the body text.
fn bullet_text(document: &Html) -> Option<Vec<String>> {
    let lines = body_lines(document);
    let mut runs: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in lines {
        if is_bullet_line(&line) {
            let stripped = line
                .trim_start_matches(['•', '·', '▪', '◦', '●', '‣', '*'])
                .trim()
                .to_string();
            if classify_line::classify_line(&stripped) == LineKind::Ingredient {
                current.push(stripped);
                continue;
            }
        } else if let Some(name) = classify_line::section_header_name(&line) {
            if !current.is_empty() {
                current.extend(marker(&name));
                continue;
            }
        }
        if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    runs.push(current);
    runs.into_iter()
        .map(trim_trailing_markers)
        .find(|run| run.iter().filter(|l| !is_marker(l)).count() >= 3)
}

/// Consecutive lines carrying a gram weight.
fn gram_anchored(document: &Html) -> Option<Vec<String>> {
    let lines = body_lines(document);
    let mut current: Vec<String> = Vec::new();
    for line in lines {
        if GRAM_REGEX.is_match(&line) && line.chars().count() <= 100 {
            current.push(line);
            continue;
        }
        if current.len() >= 3 {
            return Some(current);
        }
        current.clear();
    }
    (current.len() >= 3).then_some(current)
}

fn trim_trailing_markers(mut run: Vec<String>) -> Vec<String> {
    while run.last().is_some_and(|l| is_marker(l)) {
        run.pop();
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Option<GenericMatch> {
        extract(&Html::parse_document(html))
    }

    #[test]
    fn test_heading_list_with_sub_headings() {
        let found = run(r#"<html><body>
            <h2 class="wp-block-heading">Ingredients</h2>
            <h3>For the dough</h3>
            <ul><li>2 cups flour</li><li>1 tsp salt</li></ul>
            <h3>For the topping</h3>
            <ul><li>1 cup cheese</li></ul>
            <h2>Instructions</h2>
            <ol><li>Mix everything together well.</li></ol>
        </body></html>"#)
        .expect("match");
        assert_eq!(found.strategy, "heading_list");
        assert_eq!(
            found.lines,
            vec!["[Dough]", "2 cups flour", "1 tsp salt", "[Topping]", "1 cup cheese"]
        );
    }

    #[test]
    fn test_heading_stops_at_method() {
        let found = run(r#"<html><body>
            <h3>Ingredients</h3>
            <ul><li>3 eggs</li><li>1 cup milk</li></ul>
            <h4>Method</h4>
            <ul><li>Whisk the eggs</li></ul>
        </body></html>"#)
        .expect("match");
        assert_eq!(found.lines, vec!["3 eggs", "1 cup milk"]);
    }

    #[test]
    fn test_bold_label_paragraph() {
        let found = run(r#"<html><body>
            <p><strong>Ingredients:</strong><br>2 oz gin<br>1 oz lemon juice<br>Shake with ice and strain into a glass.</p>
        </body></html>"#)
        .expect("match");
        assert_eq!(found.strategy, "bold_label");
        assert_eq!(found.lines, vec!["2 oz gin", "1 oz lemon juice"]);
    }

    #[test]
    fn test_br_separated_div() {
        let found = run(r#"<html><body><div class="ingredients">
            <h4>Cake</h4><p>1 cup sugar<br>2 eggs<br /></p>
        </div></body></html>"#)
        .expect("match");
        assert_eq!(found.strategy, "br_separated_div");
        assert_eq!(found.lines, vec!["[Cake]", "1 cup sugar", "2 eggs"]);
    }

    #[test]
    fn test_definition_list() {
        let found = run(r#"<html><body><dl>
            <dt>Sauce</dt><dd>2 Tbsp soy sauce</dd><dd>1 tsp sugar</dd>
        </dl></body></html>"#)
        .expect("match");
        assert_eq!(found.strategy, "structured_markup");
        assert_eq!(found.lines, vec!["[Sauce]", "2 Tbsp soy sauce", "1 tsp sugar"]);
    }

    #[test]
    fn test_bullet_text() {
        let found = run(r#"<html><body><p>My favourite pie.</p>
            <p>• 2 cups flour<br>• 1 cup butter<br>• 1 pinch salt</p>
            <p>Bake it well and serve it with cream afterwards.</p>
        </body></html>"#)
        .expect("match");
        assert_eq!(found.strategy, "bullet_text");
        assert_eq!(found.lines, vec!["2 cups flour", "1 cup butter", "1 pinch salt"]);
    }

    #[test]
    fn test_gram_anchored() {
        let found = run(r#"<html><body><div>
            <p>Story time.</p><p>500 g strong flour</p><p>10 g salt</p><p>7g yeast</p><p>Knead.</p>
        </div></body></html>"#)
        .expect("match");
        assert_eq!(found.strategy, "gram_anchored");
        assert_eq!(found.lines, vec!["500 g strong flour", "10 g salt", "7g yeast"]);
    }

    #[test]
    fn test_nothing_found() {
        assert!(run("<html><body><p>Just a story about soup.</p></body></html>").is_none());
    }
}
