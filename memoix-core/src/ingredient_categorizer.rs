//! Ingredient categorization for shopping list grouping.
//!
//! Maps ingredient names to grocery categories. Rules are loaded from
//! `data/ingredient_categories.json` at compile time and tried in file order;
//! the first keyword that matches wins. Multi-word keywords match as
//! substrings, single words only as whole words (plural `s`/`es` allowed), so
//! "egg" matches "eggs" but not "eggplant".

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Produce,
    Meat,
    Poultry,
    Seafood,
    Dairy,
    Cheese,
    Baking,
    Pantry,
    Spices,
    Condiments,
    Oils,
    Nuts,
    Frozen,
    Beverages,
    Alcohol,
    Unknown,
}

impl IngredientCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Produce => "produce",
            IngredientCategory::Meat => "meat",
            IngredientCategory::Poultry => "poultry",
            IngredientCategory::Seafood => "seafood",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Cheese => "cheese",
            IngredientCategory::Baking => "baking",
            IngredientCategory::Pantry => "pantry",
            IngredientCategory::Spices => "spices",
            IngredientCategory::Condiments => "condiments",
            IngredientCategory::Oils => "oils",
            IngredientCategory::Nuts => "nuts",
            IngredientCategory::Frozen => "frozen",
            IngredientCategory::Beverages => "beverages",
            IngredientCategory::Alcohol => "alcohol",
            IngredientCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw JSON structure for the categories data file.
#[derive(Deserialize)]
struct CategoryData {
    version: u32,
    rules: Vec<CategoryRule>,
}

#[derive(Deserialize)]
struct CategoryRule {
    category: IngredientCategory,
    keywords: Vec<String>,
}

/// Ordered (keyword, category) pairs, keywords lower-cased.
static RULES: LazyLock<(u32, Vec<(String, IngredientCategory)>)> = LazyLock::new(|| {
    let json = include_str!("../data/ingredient_categories.json");
    let data: CategoryData =
        serde_json::from_str(json).expect("Failed to parse ingredient_categories.json");
    let rules = data
        .rules
        .into_iter()
        .flat_map(|rule| {
            rule.keywords
                .into_iter()
                .map(move |keyword| (keyword.to_lowercase(), rule.category))
        })
        .collect();
    (data.version, rules)
});

/// Version of the embedded rule table.
pub fn rules_version() -> u32 {
    RULES.0
}

/// Categorize an ingredient by name. Case-insensitive.
pub fn categorize(name: &str) -> IngredientCategory {
    let lower = name.to_lowercase();
    if lower.trim().is_empty() {
        return IngredientCategory::Unknown;
    }
    RULES
        .1
        .iter()
        .find(|(keyword, _)| keyword_matches(&lower, keyword))
        .map(|(_, category)| *category)
        .unwrap_or(IngredientCategory::Unknown)
}

fn keyword_matches(name: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        return name.contains(keyword);
    }
    name.match_indices(keyword).any(|(start, _)| {
        let before = name[..start].chars().next_back();
        let rest = &name[start + keyword.len()..];
        let rest = rest
            .strip_prefix("es")
            .or_else(|| rest.strip_prefix('s'))
            .filter(|r| !r.starts_with(char::is_alphanumeric))
            .unwrap_or(rest);
        !before.is_some_and(char::is_alphanumeric) && !rest.starts_with(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use IngredientCategory::*;

    #[test]
    fn test_produce() {
        assert_eq!(categorize("chicken breast"), Poultry);
        assert_eq!(categorize("Olive Oil"), Oils);
        assert_eq!(categorize("tomatoes"), Produce);
        assert_eq!(categorize("Fresh Basil"), Produce);
        assert_eq!(categorize("dried basil"), Spices);
    }

    #[test]
    fn test_dairy() {
        assert_eq!(categorize("butter"), Dairy);
        assert_eq!(categorize("eggs"), Dairy);
        assert_eq!(categorize("Greek Yogurt"), Dairy);
        assert_eq!(categorize("peanut butter"), Condiments);
    }

    #[test]
    fn test_cheese() {
        assert_eq!(categorize("parmesan cheese"), Cheese);
        assert_eq!(categorize("mozzarella"), Cheese);
        assert_eq!(categorize("cream cheese"), Cheese);
    }

    #[test]
    fn test_whole_words() {
        assert_eq!(categorize("eggplant"), Produce);
        assert_eq!(categorize("coconut"), Unknown);
        assert_eq!(categorize("gin"), Alcohol);
        assert_eq!(categorize("ginger"), Produce);
        assert_eq!(categorize("ginger beer"), Beverages);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(categorize("xyzfoobar123"), Unknown);
        assert_eq!(categorize(""), Unknown);
        assert!(rules_version() >= 1);
    }
}
