//! Structured recipe sources: JSON-LD, microdata and framework hydration JSON.
//!
//! Every source is reduced to a [`RecipeCandidate`] holding raw, unparsed
//! strings. Parsing and confidence scoring happen in the merge stage.

pub mod duration;
pub mod embedded;
pub mod jsonld;
pub mod microdata;
pub mod raw_lines;
pub mod visitor;

use serde_json::Value;

use crate::text;

/// Keys that hold an ingredient list, in preference order.
pub const INGREDIENT_KEYS: &[&str] = &[
    "recipeIngredient",
    "ingredients",
    "ingredient",
    "recipeIngredients",
];

/// Keys that hold the instructions, in preference order.
pub const DIRECTION_KEYS: &[&str] = &[
    "recipeInstructions",
    "instructions",
    "directions",
    "method",
    "steps",
];

/// A recipe as found in one structured source, before parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeCandidate {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Raw ingredient lines, section names as `[Name]` markers
    pub ingredients: Vec<String>,
    pub directions: Vec<String>,
    pub serves: Option<String>,
    pub time: Option<String>,
    /// `recipeCategory`, used as a course hint
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub nutrition: Option<String>,
    pub images: Vec<String>,
}

impl RecipeCandidate {
    /// A candidate with neither ingredients nor directions is not a recipe.
    pub fn has_content(&self) -> bool {
        !self.ingredients.is_empty() || !self.directions.is_empty()
    }
}

/// True if `@type` is "Recipe" or an array containing it.
pub fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(s)) => s == "Recipe",
        Some(Value::Array(types)) => types.iter().any(|t| t == "Recipe"),
        _ => false,
    }
}

/// Read a recipe-shaped JSON object. Used for both JSON-LD and hydration JSON,
/// which share most field names.
pub fn candidate_from_object(obj: &Value) -> RecipeCandidate {
    let ingredients = INGREDIENT_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .map(raw_lines::ingredient_lines)
        .find(|lines| !lines.is_empty())
        .unwrap_or_default();
    let directions = DIRECTION_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .map(raw_lines::direction_lines)
        .find(|lines| !lines.is_empty())
        .unwrap_or_default();

    let str_field = |key: &str| obj.get(key).and_then(Value::as_str);

    RecipeCandidate {
        name: ["name", "title", "headline"]
            .iter()
            .find_map(|key| str_field(*key))
            .map(text::strip_tags)
            .filter(|s| !s.is_empty()),
        description: str_field("description")
            .map(text::strip_tags)
            .filter(|s| !s.is_empty()),
        ingredients,
        directions,
        serves: obj
            .get("recipeYield")
            .or_else(|| obj.get("yield"))
            .or_else(|| obj.get("servings"))
            .and_then(first_scalar),
        time: duration::recipe_time(
            str_field("totalTime"),
            str_field("prepTime"),
            str_field("cookTime"),
        ),
        category: obj.get("recipeCategory").and_then(first_scalar),
        cuisine: obj.get("recipeCuisine").and_then(first_scalar),
        nutrition: obj.get("nutrition").and_then(format_nutrition),
        images: obj.get("image").map(image_urls).unwrap_or_default(),
    }
}

/// First non-empty string or number, looking inside arrays.
fn first_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(text::strip_tags(s)).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(first_scalar),
        _ => None,
    }
}

/// `{"calories": "250 kcal", "fatContent": "9 g"}` → "calories: 250 kcal; fatContent: 9 g"
fn format_nutrition(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    let parts: Vec<String> = obj
        .iter()
        .filter(|(key, _)| !key.starts_with('@'))
        .filter_map(|(key, v)| {
            let shown = match v {
                Value::String(s) => text::clean_text(s),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            (!shown.is_empty()).then(|| format!("{key}: {shown}"))
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Image URLs from a string, an ImageObject, or an array of either.
pub fn image_urls(image: &Value) -> Vec<String> {
    match image {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Array(items) => items.iter().flat_map(image_urls).collect(),
        Value::Object(obj) => obj
            .get("url")
            .or_else(|| obj.get("contentUrl"))
            .map(image_urls)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_fields() {
        let recipe = json!({
            "@type": "Recipe",
            "name": "Pancakes &amp; Syrup",
            "description": "<p>Fluffy.</p>",
            "recipeIngredient": ["1 cup flour", "1 egg"],
            "recipeInstructions": [{"@type": "HowToStep", "text": "Mix."}],
            "recipeYield": ["4", "4 servings"],
            "totalTime": "PT25M",
            "recipeCategory": ["Breakfast"],
            "recipeCuisine": "American",
            "nutrition": {"@type": "NutritionInformation", "calories": "250 kcal", "fatContent": "9 g"},
            "image": [{"@type": "ImageObject", "url": "https://example.com/a.jpg"}, "https://example.com/b.jpg"]
        });
        let candidate = candidate_from_object(&recipe);
        assert_eq!(candidate.name.as_deref(), Some("Pancakes & Syrup"));
        assert_eq!(candidate.description.as_deref(), Some("Fluffy."));
        assert_eq!(candidate.ingredients, vec!["1 cup flour", "1 egg"]);
        assert_eq!(candidate.directions, vec!["Mix."]);
        assert_eq!(candidate.serves.as_deref(), Some("4"));
        assert_eq!(candidate.time.as_deref(), Some("25 min"));
        assert_eq!(candidate.category.as_deref(), Some("Breakfast"));
        assert_eq!(candidate.cuisine.as_deref(), Some("American"));
        assert_eq!(
            candidate.nutrition.as_deref(),
            Some("calories: 250 kcal; fatContent: 9 g")
        );
        assert_eq!(
            candidate.images,
            vec!["https://example.com/a.jpg", "https://example.com/b.jpg"]
        );
    }

    #[test]
    fn test_ingredient_aliases() {
        let recipe = json!({"name": "X", "ingredients": "2 eggs\n1 cup milk", "method": "Whisk."});
        let candidate = candidate_from_object(&recipe);
        assert_eq!(candidate.ingredients, vec!["2 eggs", "1 cup milk"]);
        assert_eq!(candidate.directions, vec!["Whisk."]);
    }

    #[test]
    fn test_numeric_yield() {
        let candidate = candidate_from_object(&json!({"recipeYield": 6}));
        assert_eq!(candidate.serves.as_deref(), Some("6"));
        assert!(!candidate.has_content());
    }

    #[test]
    fn test_is_recipe_type() {
        assert!(is_recipe_type(&json!({"@type": "Recipe"})));
        assert!(is_recipe_type(&json!({"@type": ["Thing", "Recipe"]})));
        assert!(!is_recipe_type(&json!({"@type": "Article"})));
        assert!(!is_recipe_type(&json!({"name": "Recipe"})));
    }
}
