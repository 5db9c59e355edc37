use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Merge stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    StructuredData,
    HtmlSupplement,
    EmbeddedJson,
    HtmlFallback,
}

impl ImportStage {
    /// All stages in execution order
    pub const ALL: &'static [ImportStage] = &[
        ImportStage::StructuredData,
        ImportStage::HtmlSupplement,
        ImportStage::EmbeddedJson,
        ImportStage::HtmlFallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::StructuredData => "structured_data",
            ImportStage::HtmlSupplement => "html_supplement",
            ImportStage::EmbeddedJson => "embedded_json",
            ImportStage::HtmlFallback => "html_fallback",
        }
    }
}

/// What a stage did to the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// The stage produced the base result
    Produced,
    /// The stage filled in fields on an existing result
    Supplemented,
    /// The stage found a candidate source but nothing was taken from it
    NoChange,
    /// The stage found no candidate source
    NotFound,
    /// The stage's entry condition was not met
    Skipped,
}

/// Result of running a single merge stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageAttempt {
    pub stage: ImportStage,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Identifies where the base record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    JsonLd,
    Microdata,
    EmbeddedJson,
    Html,
    Transcript,
    PlainText,
}

/// A parsed ingredient line.
///
/// An ingredient with an empty name and a section is a section header
/// placeholder, never a real ingredient (see [`Ingredient::is_section_marker`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    /// Quantity plus unit as displayed ("1½ tsp"), may be empty
    pub amount: String,
    /// Canonical unit token ("tsp"), may be empty
    pub unit: String,
    /// Notes, conversions and other annotations
    pub preparation: String,
    pub alternative: Option<String>,
    pub is_optional: bool,
    pub section: Option<String>,
    pub baker_percent: Option<String>,
}

impl Ingredient {
    /// Placeholder that marks the start of a section.
    pub fn section_marker(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            ..Self::default()
        }
    }

    pub fn is_section_marker(&self) -> bool {
        self.name.is_empty() && self.section.is_some()
    }
}

/// Pre-parse audit record for a single raw ingredient string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIngredientData {
    pub original: String,
    pub amount: String,
    pub unit: String,
    pub preparation: String,
    pub name: String,
    pub baker_percent: Option<String>,
    pub looks_like_ingredient: bool,
    pub is_section: bool,
    pub section_name: Option<String>,
}

/// Per-field extraction confidence, each in 0.0..=1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfidence {
    pub name: f32,
    pub course: f32,
    pub cuisine: f32,
    pub subcategory: f32,
    pub serves: f32,
    pub time: f32,
    pub ingredients: f32,
    pub directions: f32,
    pub equipment: f32,
    pub glass: f32,
    pub garnish: f32,
    pub comments: f32,
    pub nutrition: f32,
    pub images: f32,
}

/// Confidence given to a populated field that arrived without one.
const MIN_POPULATED_CONFIDENCE: f32 = 0.1;

/// The engine's output: a confidence-scored recipe record.
///
/// Immutable once built. Later merge stages derive a new record with
/// [`RecipeImportResult::to_builder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeImportResult {
    name: Option<String>,
    course: Option<String>,
    cuisine: Option<String>,
    subcategory: Option<String>,
    serves: Option<String>,
    time: Option<String>,
    ingredients: Vec<Ingredient>,
    directions: Vec<String>,
    equipment: Vec<String>,
    glass: Option<String>,
    garnish: Vec<String>,
    comments: Option<String>,
    nutrition: Option<String>,
    raw_ingredients: Vec<RawIngredientData>,
    raw_directions: Vec<String>,
    detected_courses: BTreeSet<String>,
    detected_cuisines: BTreeSet<String>,
    confidence: FieldConfidence,
    source_url: String,
    source_kind: SourceKind,
    image_paths: Vec<String>,
}

impl RecipeImportResult {
    pub fn builder(source_url: impl Into<String>, source_kind: SourceKind) -> RecipeImportBuilder {
        RecipeImportBuilder {
            inner: RecipeImportResult {
                name: None,
                course: None,
                cuisine: None,
                subcategory: None,
                serves: None,
                time: None,
                ingredients: Vec::new(),
                directions: Vec::new(),
                equipment: Vec::new(),
                glass: None,
                garnish: Vec::new(),
                comments: None,
                nutrition: None,
                raw_ingredients: Vec::new(),
                raw_directions: Vec::new(),
                detected_courses: BTreeSet::new(),
                detected_cuisines: BTreeSet::new(),
                confidence: FieldConfidence::default(),
                source_url: source_url.into(),
                source_kind,
                image_paths: Vec::new(),
            },
        }
    }

    /// Copy this record into a builder for deriving a new one.
    pub fn to_builder(&self) -> RecipeImportBuilder {
        RecipeImportBuilder {
            inner: self.clone(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn course(&self) -> Option<&str> {
        self.course.as_deref()
    }

    pub fn cuisine(&self) -> Option<&str> {
        self.cuisine.as_deref()
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn serves(&self) -> Option<&str> {
        self.serves.as_deref()
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn directions(&self) -> &[String] {
        &self.directions
    }

    pub fn equipment(&self) -> &[String] {
        &self.equipment
    }

    pub fn glass(&self) -> Option<&str> {
        self.glass.as_deref()
    }

    pub fn garnish(&self) -> &[String] {
        &self.garnish
    }

    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    pub fn nutrition(&self) -> Option<&str> {
        self.nutrition.as_deref()
    }

    pub fn raw_ingredients(&self) -> &[RawIngredientData] {
        &self.raw_ingredients
    }

    pub fn raw_directions(&self) -> &[String] {
        &self.raw_directions
    }

    pub fn detected_courses(&self) -> &BTreeSet<String> {
        &self.detected_courses
    }

    pub fn detected_cuisines(&self) -> &BTreeSet<String> {
        &self.detected_cuisines
    }

    pub fn confidence(&self) -> &FieldConfidence {
        &self.confidence
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn image_paths(&self) -> &[String] {
        &self.image_paths
    }

    /// Real ingredients, skipping section header placeholders.
    pub fn real_ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.iter().filter(|i| !i.is_section_marker())
    }

    /// True if any ingredient is grouped under a section.
    pub fn has_sections(&self) -> bool {
        self.ingredients.iter().any(|i| i.section.is_some())
    }

    /// True if the record carries nothing a user could cook from.
    pub fn is_empty(&self) -> bool {
        self.real_ingredients().next().is_none() && self.directions.is_empty()
    }
}

/// Builder for [`RecipeImportResult`]. Each setter takes the field's confidence.
#[derive(Debug, Clone)]
pub struct RecipeImportBuilder {
    inner: RecipeImportResult,
}

impl RecipeImportBuilder {
    pub fn name(mut self, name: Option<String>, confidence: f32) -> Self {
        self.inner.name = non_blank(name);
        self.inner.confidence.name = confidence;
        self
    }

    pub fn course(mut self, course: Option<String>, confidence: f32) -> Self {
        self.inner.course = non_blank(course);
        self.inner.confidence.course = confidence;
        self
    }

    pub fn cuisine(mut self, cuisine: Option<String>, confidence: f32) -> Self {
        self.inner.cuisine = non_blank(cuisine);
        self.inner.confidence.cuisine = confidence;
        self
    }

    pub fn subcategory(mut self, subcategory: Option<String>, confidence: f32) -> Self {
        self.inner.subcategory = non_blank(subcategory);
        self.inner.confidence.subcategory = confidence;
        self
    }

    pub fn serves(mut self, serves: Option<String>, confidence: f32) -> Self {
        self.inner.serves = non_blank(serves);
        self.inner.confidence.serves = confidence;
        self
    }

    pub fn time(mut self, time: Option<String>, confidence: f32) -> Self {
        self.inner.time = non_blank(time);
        self.inner.confidence.time = confidence;
        self
    }

    pub fn ingredients(mut self, ingredients: Vec<Ingredient>, confidence: f32) -> Self {
        self.inner.ingredients = ingredients;
        self.inner.confidence.ingredients = confidence;
        self
    }

    pub fn directions(mut self, directions: Vec<String>, confidence: f32) -> Self {
        self.inner.directions = directions;
        self.inner.confidence.directions = confidence;
        self
    }

    pub fn equipment(mut self, equipment: Vec<String>, confidence: f32) -> Self {
        self.inner.equipment = equipment;
        self.inner.confidence.equipment = confidence;
        self
    }

    pub fn glass(mut self, glass: Option<String>, confidence: f32) -> Self {
        self.inner.glass = non_blank(glass);
        self.inner.confidence.glass = confidence;
        self
    }

    pub fn garnish(mut self, garnish: Vec<String>, confidence: f32) -> Self {
        self.inner.garnish = garnish;
        self.inner.confidence.garnish = confidence;
        self
    }

    pub fn comments(mut self, comments: Option<String>, confidence: f32) -> Self {
        self.inner.comments = non_blank(comments);
        self.inner.confidence.comments = confidence;
        self
    }

    pub fn nutrition(mut self, nutrition: Option<String>, confidence: f32) -> Self {
        self.inner.nutrition = non_blank(nutrition);
        self.inner.confidence.nutrition = confidence;
        self
    }

    pub fn image_paths(mut self, image_paths: Vec<String>, confidence: f32) -> Self {
        self.inner.image_paths = image_paths;
        self.inner.confidence.images = confidence;
        self
    }

    pub fn raw_ingredients(mut self, raw: Vec<RawIngredientData>) -> Self {
        self.inner.raw_ingredients = raw;
        self
    }

    pub fn raw_directions(mut self, raw: Vec<String>) -> Self {
        self.inner.raw_directions = raw;
        self
    }

    pub fn detected_courses(mut self, courses: BTreeSet<String>) -> Self {
        self.inner.detected_courses = courses;
        self
    }

    pub fn detected_cuisines(mut self, cuisines: BTreeSet<String>) -> Self {
        self.inner.detected_cuisines = cuisines;
        self
    }

    pub fn source_kind(mut self, source_kind: SourceKind) -> Self {
        self.inner.source_kind = source_kind;
        self
    }

    /// Finish the record, reconciling every confidence with its field:
    /// empty fields get 0, populated fields are clamped into (0, 1].
    pub fn build(self) -> RecipeImportResult {
        let mut r = self.inner;
        let c = &mut r.confidence;
        c.name = reconcile(r.name.is_some(), c.name);
        c.course = reconcile(r.course.is_some(), c.course);
        c.cuisine = reconcile(r.cuisine.is_some(), c.cuisine);
        c.subcategory = reconcile(r.subcategory.is_some(), c.subcategory);
        c.serves = reconcile(r.serves.is_some(), c.serves);
        c.time = reconcile(r.time.is_some(), c.time);
        let has_ingredients = r.ingredients.iter().any(|i| !i.is_section_marker());
        c.ingredients = reconcile(has_ingredients, c.ingredients);
        c.directions = reconcile(!r.directions.is_empty(), c.directions);
        c.equipment = reconcile(!r.equipment.is_empty(), c.equipment);
        c.glass = reconcile(r.glass.is_some(), c.glass);
        c.garnish = reconcile(!r.garnish.is_empty(), c.garnish);
        c.comments = reconcile(r.comments.is_some(), c.comments);
        c.nutrition = reconcile(r.nutrition.is_some(), c.nutrition);
        c.images = reconcile(!r.image_paths.is_empty(), c.images);
        r
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn reconcile(populated: bool, confidence: f32) -> f32 {
    if !populated {
        0.0
    } else if confidence.is_nan() || confidence <= 0.0 {
        MIN_POPULATED_CONFIDENCE
    } else {
        confidence.min(1.0)
    }
}

/// Output from a full document import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub result: RecipeImportResult,
    /// What every merge stage did, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<StageAttempt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(ImportStage::ALL.len(), 4);
        assert_eq!(ImportStage::ALL[0], ImportStage::StructuredData);
        assert_eq!(ImportStage::ALL[3].as_str(), "html_fallback");
    }

    #[test]
    fn test_build_zeroes_empty_fields() {
        let result = RecipeImportResult::builder("https://example.com", SourceKind::Html)
            .name(Some("  ".to_string()), 0.9)
            .glass(None, 0.7)
            .build();
        assert_eq!(result.name(), None);
        assert_eq!(result.confidence().name, 0.0);
        assert_eq!(result.confidence().glass, 0.0);
    }

    #[test]
    fn test_build_floors_populated_fields() {
        let result = RecipeImportResult::builder("https://example.com", SourceKind::Html)
            .serves(Some("4".to_string()), 0.0)
            .time(Some("1 hr".to_string()), 1.7)
            .build();
        assert!(result.confidence().serves > 0.0);
        assert_eq!(result.confidence().time, 1.0);
    }

    #[test]
    fn test_marker_only_ingredients_count_as_empty() {
        let result = RecipeImportResult::builder("https://example.com", SourceKind::Html)
            .ingredients(vec![Ingredient::section_marker("Crust")], 0.8)
            .build();
        assert_eq!(result.confidence().ingredients, 0.0);
        assert!(result.is_empty());
    }

    #[test]
    fn test_to_builder_leaves_original_untouched() {
        let original = RecipeImportResult::builder("https://example.com", SourceKind::JsonLd)
            .name(Some("Cake".to_string()), 0.95)
            .build();
        let derived = original
            .to_builder()
            .glass(Some("Coupe".to_string()), 0.7)
            .build();
        assert_eq!(original.glass(), None);
        assert_eq!(derived.glass(), Some("Coupe"));
        assert_eq!(derived.name(), Some("Cake"));
    }
}
