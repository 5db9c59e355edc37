//! schema.org microdata (`itemtype=".../Recipe"` with `itemprop` fields).

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{duration, RecipeCandidate};
use crate::html::element_text;
use crate::text;

static RECIPE_SCOPE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[itemtype="http://schema.org/Recipe"], [itemtype="https://schema.org/Recipe"]"#,
    )
    .expect("Invalid selector")
});

static INGREDIENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[itemprop="recipeIngredient"], [itemprop="ingredients"]"#)
        .expect("Invalid selector")
});

static STEP_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[itemprop="recipeInstructions"], [itemprop="instructions"], [itemtype*="HowToStep"]"#,
    )
    .expect("Invalid selector")
});

static STEP_TEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="text"]"#).expect("Invalid selector"));

static LIST_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li, p").expect("Invalid selector"));

static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="image"]"#).expect("Invalid selector"));

/// True if the page declares a microdata Recipe scope.
pub fn has_recipe_scope(document: &Html) -> bool {
    document.select(&RECIPE_SCOPE_SELECTOR).next().is_some()
}

/// Read the first microdata Recipe scope on the page.
pub fn extract(document: &Html) -> Option<RecipeCandidate> {
    let scope = document.select(&RECIPE_SCOPE_SELECTOR).next()?;

    let ingredients: Vec<String> = scope
        .select(&INGREDIENT_SELECTOR)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect();

    let candidate = RecipeCandidate {
        name: prop(&scope, "name"),
        description: prop(&scope, "description"),
        ingredients,
        directions: directions(&scope),
        serves: prop(&scope, "recipeYield"),
        time: duration::recipe_time(
            prop(&scope, "totalTime").as_deref(),
            prop(&scope, "prepTime").as_deref(),
            prop(&scope, "cookTime").as_deref(),
        ),
        category: prop(&scope, "recipeCategory"),
        cuisine: prop(&scope, "recipeCuisine"),
        nutrition: None,
        images: images(&scope),
    };
    tracing::debug!(
        ingredients = candidate.ingredients.len(),
        directions = candidate.directions.len(),
        "read microdata recipe scope"
    );
    Some(candidate)
}

/// Text of the first element carrying `itemprop`, preferring its `content`
/// attribute (meta tags) and then `datetime` (time tags).
fn prop(scope: &ElementRef, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"[itemprop="{name}"]"#)).ok()?;
    let el = scope.select(&selector).next()?;
    let value = el
        .value()
        .attr("content")
        .or_else(|| el.value().attr("datetime"))
        .map(text::clean_text)
        .unwrap_or_else(|| element_text(el));
    (!value.is_empty()).then_some(value)
}

fn directions(scope: &ElementRef) -> Vec<String> {
    let mut steps = Vec::new();
    for el in scope.select(&STEP_SELECTOR) {
        // Nested steps are read through their outermost container
        let nested = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|ancestor| ancestor.id() != scope.id())
            .any(|ancestor| STEP_SELECTOR.matches(&ancestor));
        if nested {
            continue;
        }
        let texts: Vec<String> = el
            .select(&STEP_TEXT_SELECTOR)
            .map(element_text)
            .filter(|s| !s.is_empty())
            .collect();
        if !texts.is_empty() {
            steps.extend(texts);
            continue;
        }
        let items: Vec<String> = el
            .select(&LIST_ITEM_SELECTOR)
            .map(element_text)
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            push_nonempty(&mut steps, element_text(el));
        } else {
            steps.extend(items);
        }
    }
    steps
}

fn images(scope: &ElementRef) -> Vec<String> {
    scope
        .select(&IMAGE_SELECTOR)
        .filter_map(|el| {
            let attrs = el.value();
            attrs
                .attr("src")
                .or_else(|| attrs.attr("href"))
                .or_else(|| attrs.attr("content"))
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn push_nonempty(steps: &mut Vec<String>, step: String) {
    if !step.is_empty() {
        steps.push(step);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const MICRODATA_PAGE: &str = r#"
        <html><body>
        <div itemscope itemtype="https://schema.org/Recipe">
          <h1 itemprop="name">Grandma's Biscuits</h1>
          <meta itemprop="totalTime" content="PT30M">
          <img itemprop="image" src="https://example.com/biscuits.jpg">
          <span itemprop="recipeYield">12 biscuits</span>
          <ul>
            <li itemprop="recipeIngredient">2 cups flour</li>
            <li itemprop="recipeIngredient">1 Tbsp baking powder</li>
            <li itemprop="recipeIngredient">  </li>
          </ul>
          <div itemprop="recipeInstructions">
            <ol><li>Mix the dry ingredients.</li><li>Bake for 12 minutes.</li></ol>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_microdata_recipe() {
        let document = Html::parse_document(MICRODATA_PAGE);
        assert!(has_recipe_scope(&document));
        let recipe = extract(&document).expect("recipe scope");
        assert_eq!(recipe.name.as_deref(), Some("Grandma's Biscuits"));
        assert_eq!(recipe.ingredients, vec!["2 cups flour", "1 Tbsp baking powder"]);
        assert_eq!(
            recipe.directions,
            vec!["Mix the dry ingredients.", "Bake for 12 minutes."]
        );
        assert_eq!(recipe.serves.as_deref(), Some("12 biscuits"));
        assert_eq!(recipe.time.as_deref(), Some("30 min"));
        assert_eq!(recipe.images, vec!["https://example.com/biscuits.jpg"]);
    }

    #[test]
    fn test_how_to_step_text() {
        let html = r#"
            <div itemscope itemtype="http://schema.org/Recipe">
              <span itemprop="name">Tea</span>
              <div itemscope itemtype="http://schema.org/HowToStep"><span itemprop="text">Boil water.</span></div>
              <div itemscope itemtype="http://schema.org/HowToStep"><span itemprop="text">Steep.</span></div>
            </div>
        "#;
        let recipe = extract(&Html::parse_document(html)).expect("recipe scope");
        assert_eq!(recipe.directions, vec!["Boil water.", "Steep."]);
    }

    #[test]
    fn test_no_scope() {
        let document = Html::parse_document("<p itemprop=\"recipeIngredient\">1 egg</p>");
        assert!(!has_recipe_scope(&document));
        assert!(extract(&document).is_none());
    }
}
