//! Section-aware ingredient list processing.
//!
//! Turns an ordered list of raw strings (ingredient lines mixed with section
//! headers) into ordered [`Ingredient`]s. The running section is threaded
//! through an explicit fold; each step consumes the previous state and returns
//! the next one.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::classify_line::{self, LineKind};
use crate::ingredient_parser::{self, build_raw_ingredient};
use crate::quantity;
use crate::text;
use crate::types::{Ingredient, RawIngredientData};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Reorder by descending quantity score when the list has no sections.
    pub sort_by_quantity: bool,
}

/// Output of [`process_ingredient_lines`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedList {
    pub ingredients: Vec<Ingredient>,
    /// Lines classified as tools or vessels
    pub equipment: Vec<String>,
    /// Audit record for every non-blank input line
    pub raw: Vec<RawIngredientData>,
}

impl ProcessedList {
    pub fn real_count(&self) -> usize {
        self.ingredients
            .iter()
            .filter(|i| !i.is_section_marker())
            .count()
    }

    pub fn has_sections(&self) -> bool {
        self.ingredients.iter().any(Ingredient::is_section_marker)
    }
}

/// State carried between lines.
#[derive(Debug, Default)]
struct FoldState {
    section: Option<String>,
    /// Normalized names already emitted in the current section
    seen: HashSet<String>,
    ingredients: Vec<Ingredient>,
    equipment: Vec<String>,
}

impl FoldState {
    fn step(self, line: &str) -> Self {
        match classify_line::classify_line(line) {
            LineKind::SectionHeader => match classify_line::section_header_name(line) {
                Some(name) => self.enter_section(name),
                None => self,
            },
            LineKind::Direction | LineKind::Garbage => {
                tracing::trace!(line, "dropping non-ingredient line");
                self
            }
            LineKind::Equipment => self.with_equipment(text::clean_text(line)),
            LineKind::Ingredient => {
                let parsed = ingredient_parser::parse_ingredient(line);
                if parsed.is_section_marker() {
                    let name = parsed.section.unwrap_or_default();
                    return self.enter_section(name);
                }
                match parsed.section.clone() {
                    Some(inline) if self.section.as_deref() != Some(inline.as_str()) => {
                        self.enter_section(inline).with_ingredient(parsed)
                    }
                    _ => self.with_ingredient(parsed),
                }
            }
        }
    }

    /// Every marker emits a placeholder and starts a fresh seen-set.
    fn enter_section(self, name: String) -> Self {
        let mut ingredients = self.ingredients;
        ingredients.push(Ingredient::section_marker(name.clone()));
        FoldState {
            section: Some(name),
            seen: HashSet::new(),
            ingredients,
            equipment: self.equipment,
        }
    }

    fn with_ingredient(self, mut ingredient: Ingredient) -> Self {
        if ingredient.name.is_empty()
            || classify_line::classify_line(&ingredient.name) == LineKind::Garbage
        {
            return self;
        }
        let key = text::normalize_key(&ingredient.name);
        if self.seen.contains(&key) {
            tracing::trace!(name = %ingredient.name, "duplicate ingredient in section");
            return self;
        }
        ingredient.section = self.section.clone();

        let mut seen = self.seen;
        seen.insert(key);
        let mut ingredients = self.ingredients;
        ingredients.push(ingredient);
        FoldState {
            section: self.section,
            seen,
            ingredients,
            equipment: self.equipment,
        }
    }

    fn with_equipment(self, item: String) -> Self {
        let mut equipment = self.equipment;
        if !item.is_empty() && !equipment.contains(&item) {
            equipment.push(item);
        }
        FoldState { equipment, ..self }
    }
}

/// Group, filter and deduplicate ingredient lines.
pub fn process_ingredient_lines<S: AsRef<str>>(
    lines: &[S],
    options: &ListOptions,
) -> ProcessedList {
    let non_blank: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect();

    let state = non_blank
        .iter()
        .fold(FoldState::default(), |state, line| state.step(line));

    let mut ingredients = state.ingredients;
    if options.sort_by_quantity {
        sort_by_quantity(&mut ingredients);
    }

    ProcessedList {
        ingredients,
        equipment: state.equipment,
        raw: non_blank.into_iter().map(build_raw_ingredient).collect(),
    }
}

/// Stable descending sort by quantity score.
///
/// Leaves the list untouched when any section placeholder is present: section
/// order is the author's order.
pub fn sort_by_quantity(ingredients: &mut [Ingredient]) {
    if ingredients.iter().any(Ingredient::is_section_marker) {
        return;
    }
    ingredients.sort_by(|a, b| {
        quantity_score(b)
            .partial_cmp(&quantity_score(a))
            .unwrap_or(Ordering::Equal)
    });
}

/// Unit-class priority times the quantity in the class's base unit.
/// A bare count ("3 eggs") scores as whole items; unknown units score 0.
pub fn quantity_score(ingredient: &Ingredient) -> f64 {
    let Some(amount) = quantity::parse_quantity(&ingredient.amount) else {
        return 0.0;
    };
    if ingredient.unit.is_empty() {
        return quantity::UnitClass::Count.priority() * amount;
    }
    match quantity::find_canonical(&ingredient.unit) {
        Some(unit) => unit.class.priority() * amount * unit.base_factor,
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &ProcessedList) -> Vec<String> {
        list.ingredients
            .iter()
            .map(|i| {
                if i.is_section_marker() {
                    format!("[{}]", i.section.as_deref().unwrap_or_default())
                } else {
                    i.name.clone()
                }
            })
            .collect()
    }

    #[test]
    fn test_dedup_is_section_scoped() {
        let list = process_ingredient_lines(
            &["[Cake]", "2 eggs", "[Custard]", "2 eggs"],
            &ListOptions::default(),
        );
        assert_eq!(list.real_count(), 2);
        assert_eq!(names(&list), vec!["[Cake]", "Eggs", "[Custard]", "Eggs"]);
        assert_eq!(list.ingredients[1].section.as_deref(), Some("Cake"));
        assert_eq!(list.ingredients[3].section.as_deref(), Some("Custard"));
    }

    #[test]
    fn test_dedup_within_section() {
        let list = process_ingredient_lines(
            &["2 eggs", "1 cup sugar", "2 Eggs"],
            &ListOptions::default(),
        );
        assert_eq!(names(&list), vec!["Eggs", "Sugar"]);
    }

    #[test]
    fn test_every_marker_emits_placeholder() {
        let list = process_ingredient_lines(
            &["For the Crust:", "For the Filling:", "1 cup cream"],
            &ListOptions::default(),
        );
        assert_eq!(names(&list), vec!["[Crust]", "[Filling]", "Cream"]);
    }

    #[test]
    fn test_inline_section_switches_section() {
        let list = process_ingredient_lines(
            &["[Crust] 2 cups flour", "1 stick butter", "[Filling] 3 apples"],
            &ListOptions::default(),
        );
        assert_eq!(
            names(&list),
            vec!["[Crust]", "Flour", "Butter", "[Filling]", "Apples"]
        );
        assert_eq!(list.ingredients[2].section.as_deref(), Some("Crust"));
    }

    #[test]
    fn test_drops_directions_and_garbage_keeps_equipment() {
        let list = process_ingredient_lines(
            &[
                "2 cups flour",
                "Preheat the oven to 350°F.",
                "Subscribe to our newsletter",
                "Stand mixer",
                "1 tsp salt",
            ],
            &ListOptions::default(),
        );
        assert_eq!(names(&list), vec!["Flour", "Salt"]);
        assert_eq!(list.equipment, vec!["Stand mixer"]);
        assert_eq!(list.raw.len(), 5);
    }

    #[test]
    fn test_verb_led_ingredient_names_are_kept() {
        let list = process_ingredient_lines(
            &[
                "Cream cheese, 16 oz, softened",
                "Dry white wine, 1/2 cup",
                "Graham crackers, 2 cups",
                "Top up with soda water",
            ],
            &ListOptions::default(),
        );
        assert_eq!(
            names(&list),
            vec!["Cream Cheese", "Dry White Wine", "Graham Crackers", "Soda Water"]
        );
        assert!(list.raw.iter().all(|r| r.looks_like_ingredient));
    }

    #[test]
    fn test_step_labels_are_dropped() {
        let list = process_ingredient_lines(
            &["Step 1", "2 cups flour", "Step 2:", "1 egg", "STEP 3", "Step 4."],
            &ListOptions::default(),
        );
        assert_eq!(names(&list), vec!["Flour", "Egg"]);
        assert!(!list.has_sections());
        assert_eq!(list.raw.iter().filter(|r| r.looks_like_ingredient).count(), 2);
    }

    #[test]
    fn test_sort_by_quantity() {
        let list = process_ingredient_lines(
            &["1 tsp salt", "500 g flour", "2 eggs", "1 cup milk"],
            &ListOptions {
                sort_by_quantity: true,
            },
        );
        // 500 g outweighs 240 ml, which outweighs 5 ml of salt and two whole eggs
        assert_eq!(names(&list), vec!["Flour", "Milk", "Salt", "Eggs"]);
    }

    #[test]
    fn test_sections_are_never_reordered() {
        let lines = ["[Dough]", "1 tsp salt", "500 g flour", "[Topping]", "1 cup milk"];
        let sorted = process_ingredient_lines(
            &lines,
            &ListOptions {
                sort_by_quantity: true,
            },
        );
        let unsorted = process_ingredient_lines(&lines, &ListOptions::default());
        assert_eq!(sorted.ingredients, unsorted.ingredients);
        assert_eq!(
            names(&sorted),
            vec!["[Dough]", "Salt", "Flour", "[Topping]", "Milk"]
        );
    }

    #[test]
    fn test_quantity_score_classes() {
        let flour = ingredient_parser::parse_ingredient("100 g flour");
        let unknown = Ingredient {
            name: "Thing".to_string(),
            amount: "2 glugs".to_string(),
            unit: "glugs".to_string(),
            ..Ingredient::default()
        };
        assert_eq!(quantity_score(&flour), 500.0);
        assert_eq!(quantity_score(&unknown), 0.0);
    }
}
