//! Per-site ingredient extraction configs.
//!
//! Each config names a container and says how sections are laid out inside
//! it. The registry is read-only and iterated in priority order; configs with
//! `hosts` only apply to those sites, the rest apply wherever their container
//! is found (recipe plugins shared by many blogs).

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::element_text;

/// How sections are laid out inside a site's ingredient container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Container → repeated section blocks, each an optional header then items
    ContainerWithSections,
    /// Header elements followed by sibling lists, up to the next header
    SiblingHeaderList,
    /// One list whose items are either category headers or ingredients
    MixedList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Hosts this config is limited to; empty means any site
    pub hosts: &'static [&'static str],
    pub container_selector: &'static str,
    pub section_selector: &'static str,
    pub header_selector: &'static str,
    pub ingredient_selector: &'static str,
    pub mode: ExtractionMode,
    /// Only a direct child of the section (with `header_child_tag`) is its header
    pub header_is_direct_child: bool,
    pub header_child_tag: Option<&'static str>,
}

impl SiteConfig {
    pub fn applies_to(&self, host: Option<&str>) -> bool {
        self.hosts.is_empty()
            || host.is_some_and(|host| {
                self.hosts
                    .iter()
                    .any(|h| host == *h || host.ends_with(&format!(".{h}")))
            })
    }
}

/// Versioned, ordered collection of site configs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRegistry {
    pub version: u32,
    sites: Vec<(&'static str, SiteConfig)>,
}

static BUILTIN: LazyLock<SiteRegistry> = LazyLock::new(|| SiteRegistry {
    version: 3,
    sites: vec![
        (
            "wprm",
            SiteConfig {
                hosts: &[],
                container_selector: ".wprm-recipe-ingredients-container",
                section_selector: ".wprm-recipe-ingredient-group",
                header_selector: ".wprm-recipe-group-name",
                ingredient_selector: ".wprm-recipe-ingredient",
                mode: ExtractionMode::ContainerWithSections,
                header_is_direct_child: false,
                header_child_tag: None,
            },
        ),
        (
            "seriouseats",
            SiteConfig {
                hosts: &["seriouseats.com", "simplyrecipes.com"],
                container_selector: ".structured-ingredients",
                section_selector: ".structured-ingredients__list",
                header_selector: ".structured-ingredients__list-heading",
                ingredient_selector: ".structured-ingredients__list-item",
                mode: ExtractionMode::SiblingHeaderList,
                header_is_direct_child: false,
                header_child_tag: None,
            },
        ),
        (
            "tasty",
            SiteConfig {
                hosts: &[],
                container_selector: ".tasty-recipes-ingredients",
                section_selector: "ul",
                header_selector: "h4, h3, p > strong",
                ingredient_selector: "li",
                mode: ExtractionMode::SiblingHeaderList,
                header_is_direct_child: false,
                header_child_tag: None,
            },
        ),
        (
            "mediavine",
            SiteConfig {
                hosts: &[],
                container_selector: ".mv-create-ingredients",
                section_selector: "ul",
                header_selector: "h4, h3",
                ingredient_selector: "li",
                mode: ExtractionMode::SiblingHeaderList,
                header_is_direct_child: false,
                header_child_tag: None,
            },
        ),
        (
            "food52",
            SiteConfig {
                hosts: &["food52.com"],
                container_selector: ".recipe__list--ingredients",
                section_selector: "ul",
                header_selector: "li.recipe__list-subheading",
                ingredient_selector: "li",
                mode: ExtractionMode::MixedList,
                header_is_direct_child: false,
                header_child_tag: None,
            },
        ),
        (
            "easyrecipe",
            SiteConfig {
                hosts: &[],
                container_selector: ".ERSIngredients",
                section_selector: "ul",
                header_selector: "li.ERSSectionHead",
                ingredient_selector: "li.ingredient",
                mode: ExtractionMode::MixedList,
                header_is_direct_child: false,
                header_child_tag: None,
            },
        ),
        (
            "jetpack",
            SiteConfig {
                hosts: &[],
                container_selector: ".jetpack-recipe-ingredients",
                section_selector: ".jetpack-recipe-ingredients",
                header_selector: "h5",
                ingredient_selector: ".jetpack-recipe-ingredient",
                mode: ExtractionMode::ContainerWithSections,
                header_is_direct_child: true,
                header_child_tag: Some("h5"),
            },
        ),
    ],
});

impl SiteRegistry {
    /// The built-in registry.
    pub fn builtin() -> &'static SiteRegistry {
        &BUILTIN
    }

    pub fn new(version: u32, sites: Vec<(&'static str, SiteConfig)>) -> Self {
        SiteRegistry { version, sites }
    }

    /// Configs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SiteConfig)> {
        self.sites.iter().map(|(id, config)| (*id, config))
    }

    pub fn get(&self, id: &str) -> Option<&SiteConfig> {
        self.iter().find(|(site, _)| *site == id).map(|(_, config)| config)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

/// Lines found by one site config.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMatch {
    pub site: &'static str,
    /// Raw ingredient lines with `[Section]` markers
    pub lines: Vec<String>,
}

/// Try every applicable config in order; the first that yields lines wins.
pub fn extract_with_registry(
    document: &Html,
    registry: &SiteRegistry,
    host: Option<&str>,
) -> Option<SiteMatch> {
    for (site, config) in registry.iter() {
        if !config.applies_to(host) {
            continue;
        }
        let Some(lines) = extract_with_config(document, config) else {
            continue;
        };
        if lines.iter().any(|l| !is_marker(l)) {
            tracing::debug!(site, lines = lines.len(), "site config matched");
            return Some(SiteMatch { site, lines });
        }
    }
    None
}

fn is_marker(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']')
}

fn parse(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(selector, error = ?e, "invalid site config selector");
            None
        }
    }
}

/// Apply one config; `None` when its container isn't on the page.
pub fn extract_with_config(document: &Html, config: &SiteConfig) -> Option<Vec<String>> {
    let container_sel = parse(config.container_selector)?;
    let containers: Vec<ElementRef> = document.select(&container_sel).collect();
    if containers.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    for container in containers {
        match config.mode {
            ExtractionMode::ContainerWithSections => {
                container_with_sections(container, config, &mut lines)?
            }
            ExtractionMode::SiblingHeaderList => {
                sibling_header_list(container, config, &mut lines)?
            }
            ExtractionMode::MixedList => mixed_list(container, config, &mut lines)?,
        }
    }
    Some(lines)
}

fn push_marker(lines: &mut Vec<String>, header: &str) {
    let header = crate::text::trim_name_punctuation(header);
    if !header.is_empty() {
        lines.push(format!("[{header}]"));
    }
}

fn push_line(lines: &mut Vec<String>, line: String) {
    if !line.is_empty() {
        lines.push(line);
    }
}

fn container_with_sections(
    container: ElementRef,
    config: &SiteConfig,
    lines: &mut Vec<String>,
) -> Option<()> {
    let section_sel = parse(config.section_selector)?;
    let header_sel = parse(config.header_selector)?;
    let item_sel = parse(config.ingredient_selector)?;

    let mut sections: Vec<ElementRef> = container.select(&section_sel).collect();
    if sections.is_empty() || section_sel.matches(&container) {
        sections = vec![container];
    }

    for section in sections {
        let header = if config.header_is_direct_child {
            section
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| {
                    config
                        .header_child_tag
                        .is_none_or(|tag| child.value().name().eq_ignore_ascii_case(tag))
                        && header_sel.matches(child)
                })
        } else {
            section.select(&header_sel).next()
        };
        if let Some(header) = header {
            push_marker(lines, &element_text(header));
        }
        for item in section.select(&item_sel) {
            push_line(lines, element_text(item));
        }
    }
    Some(())
}

fn sibling_header_list(
    container: ElementRef,
    config: &SiteConfig,
    lines: &mut Vec<String>,
) -> Option<()> {
    let header_sel = parse(config.header_selector)?;
    let section_sel = parse(config.section_selector)?;
    let item_sel = parse(config.ingredient_selector)?;

    let push_items = |list: ElementRef, lines: &mut Vec<String>| {
        for item in list.select(&item_sel) {
            push_line(lines, element_text(item));
        }
    };

    for child in container.children().filter_map(ElementRef::wrap) {
        if header_sel.matches(&child) {
            push_marker(lines, &element_text(child));
        } else if section_sel.matches(&child) {
            push_items(child, lines);
        } else {
            // A wrapper holding headers and lists of its own
            for el in child.descendants().filter_map(ElementRef::wrap) {
                if header_sel.matches(&el) {
                    push_marker(lines, &element_text(el));
                } else if section_sel.matches(&el) {
                    push_items(el, lines);
                }
            }
        }
    }
    Some(())
}

fn mixed_list(container: ElementRef, config: &SiteConfig, lines: &mut Vec<String>) -> Option<()> {
    let header_sel = parse(config.header_selector)?;
    let item_sel = parse(config.ingredient_selector)?;

    for el in container.descendants().filter_map(ElementRef::wrap) {
        if header_sel.matches(&el) {
            push_marker(lines, &element_text(el));
        } else if item_sel.matches(&el) {
            push_line(lines, element_text(el));
        }
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str, host: Option<&str>) -> Option<SiteMatch> {
        extract_with_registry(&Html::parse_document(html), SiteRegistry::builtin(), host)
    }

    #[test]
    fn test_wprm_groups() {
        let html = r#"
        <div class="wprm-recipe-ingredients-container">
          <div class="wprm-recipe-ingredient-group">
            <h4 class="wprm-recipe-group-name">For the Crust</h4>
            <ul><li class="wprm-recipe-ingredient">1 ½ cups flour</li>
                <li class="wprm-recipe-ingredient">½ cup butter</li></ul>
          </div>
          <div class="wprm-recipe-ingredient-group">
            <h4 class="wprm-recipe-group-name">Filling:</h4>
            <ul><li class="wprm-recipe-ingredient">3 apples</li></ul>
          </div>
        </div>"#;
        let found = extract(html, Some("example.com")).expect("wprm match");
        assert_eq!(found.site, "wprm");
        assert_eq!(
            found.lines,
            vec!["[For the Crust]", "1 ½ cups flour", "½ cup butter", "[Filling]", "3 apples"]
        );
    }

    #[test]
    fn test_sibling_headers() {
        let html = r#"
        <div class="tasty-recipes-ingredients">
          <h4>Dough</h4>
          <ul><li>2 cups flour</li><li>1 tsp yeast</li></ul>
          <h4>Sauce</h4>
          <ul><li>1 can tomatoes</li></ul>
        </div>"#;
        let found = extract(html, None).expect("tasty match");
        assert_eq!(found.site, "tasty");
        assert_eq!(
            found.lines,
            vec!["[Dough]", "2 cups flour", "1 tsp yeast", "[Sauce]", "1 can tomatoes"]
        );
    }

    #[test]
    fn test_mixed_list() {
        let html = r#"
        <div class="ERSIngredients"><ul>
          <li class="ERSSectionHead">Marinade</li>
          <li class="ingredient">2 Tbsp soy sauce</li>
          <li class="ERSSectionHead">Stir fry</li>
          <li class="ingredient">1 lb chicken</li>
        </ul></div>"#;
        let found = extract(html, None).expect("easyrecipe match");
        assert_eq!(
            found.lines,
            vec!["[Marinade]", "2 Tbsp soy sauce", "[Stir fry]", "1 lb chicken"]
        );
    }

    #[test]
    fn test_host_limited_config() {
        let html = r#"
        <div class="structured-ingredients">
          <p class="structured-ingredients__list-heading">For the brine</p>
          <ul class="structured-ingredients__list"><li class="structured-ingredients__list-item">1 cup salt</li></ul>
        </div>"#;
        assert!(extract(html, Some("example.com")).is_none());
        let found = extract(html, Some("www.seriouseats.com")).expect("host match");
        assert_eq!(found.lines, vec!["[For the brine]", "1 cup salt"]);
    }

    #[test]
    fn test_registry_order_and_lookup() {
        let registry = SiteRegistry::builtin();
        assert_eq!(registry.iter().next().map(|(id, _)| id), Some("wprm"));
        assert_eq!(
            registry.get("jetpack").map(|c| c.mode),
            Some(ExtractionMode::ContainerWithSections)
        );
        assert!(registry.get("nope").is_none());
    }
}
