//! Four-stage merge of a page's recipe sources.
//!
//! Stages run forward in [`ImportStage::ALL`] order and never short-circuit:
//!
//! 1. structured data (JSON-LD, then microdata) produces the base record;
//! 2. HTML supplementation always runs on top of a structured record, so
//!    section headers, glass and garnish that only the HTML carries are kept;
//! 3. hydration JSON fills gaps when the record is missing or incomplete;
//! 4. pure HTML heuristics run only when no structured data was found.
//!
//! A field is only ever filled when it is empty, except that a sectioned
//! ingredient list replaces a flat one of comparable size.

use scraper::Html;
use url::Url;

use crate::classifier::{self, ClassifierRules, ClassifyInput};
use crate::classify_line::{self, LineKind};
use crate::config::ImportConfig;
use crate::error::{Diagnostics, ExtractError};
use crate::html::{self, HtmlRecipe, SiteRegistry};
use crate::sections::{self, ListOptions, ProcessedList};
use crate::structured::{embedded, jsonld, microdata, RecipeCandidate};
use crate::text;
use crate::types::{
    ImportOutcome, ImportStage, RecipeImportResult, SourceKind, StageAttempt, StageStatus,
};

/// Field confidences for one kind of structured source.
#[derive(Debug, Clone, Copy)]
struct Tier {
    name: f32,
    ingredients: f32,
    directions: f32,
    details: f32,
}

const JSONLD_TIER: Tier = Tier {
    name: 0.95,
    ingredients: 0.9,
    directions: 0.9,
    details: 0.85,
};

const MICRODATA_TIER: Tier = Tier {
    name: 0.85,
    ingredients: 0.85,
    directions: 0.8,
    details: 0.8,
};

const EMBEDDED_TIER: Tier = Tier {
    name: 0.75,
    ingredients: 0.75,
    directions: 0.75,
    details: 0.75,
};

/// Ceiling for anything read from raw HTML.
pub const HTML_CONFIDENCE_CAP: f32 = 0.7;
const HTML_TITLE_CONFIDENCE: f32 = 0.6;
const HTML_DETAIL_CONFIDENCE: f32 = 0.6;
const HTML_IMAGE_CONFIDENCE: f32 = 0.5;
const BODY_DIRECTIONS_CONFIDENCE: f32 = 0.4;

/// Collaborators shared by every import.
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a> {
    pub config: &'a ImportConfig,
    pub sites: &'a SiteRegistry,
    pub rules: &'a ClassifierRules,
}

/// Run all four stages over one document.
pub fn merge_document(
    body: &str,
    url: &str,
    from_archive: bool,
    ctx: MergeContext,
) -> Result<ImportOutcome, ExtractError> {
    let mut merge = Merge::new(body, url, ctx);
    let mut attempts = Vec::with_capacity(ImportStage::ALL.len());

    for &stage in ImportStage::ALL {
        let _span = tracing::info_span!("import_stage", stage = stage.as_str()).entered();
        let (status, detail) = match stage {
            ImportStage::StructuredData => merge.structured(),
            ImportStage::HtmlSupplement => merge.html_supplement(),
            ImportStage::EmbeddedJson => merge.embedded(),
            ImportStage::HtmlFallback => merge.html_fallback(),
        };
        tracing::debug!(
            status = ?status,
            detail = detail.as_deref().unwrap_or(""),
            "stage finished"
        );
        attempts.push(StageAttempt {
            stage,
            status,
            detail,
        });
    }

    let Some(result) = merge.result.take().filter(|r| !r.is_empty()) else {
        let diagnostics = merge.diagnostics();
        tracing::info!(url, %diagnostics, "no recipe found");
        return Err(ExtractError::NoRecipe(diagnostics));
    };

    let result = merge.finish(result, from_archive);
    tracing::info!(
        url,
        source_kind = ?result.source_kind(),
        ingredients = result.real_ingredients().count(),
        directions = result.directions().len(),
        "recipe imported"
    );
    Ok(ImportOutcome { result, attempts })
}

/// Host without a leading `www.`, lower-cased.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_lowercase())
}

type StageReport = (StageStatus, Option<String>);

fn report(status: StageStatus, detail: impl Into<String>) -> StageReport {
    (status, Some(detail.into()))
}

fn supplemented(taken: &[&str]) -> StageReport {
    if taken.is_empty() {
        (StageStatus::NoChange, None)
    } else {
        report(StageStatus::Supplemented, taken.join(", "))
    }
}

struct Merge<'a> {
    ctx: MergeContext<'a>,
    raw: &'a str,
    url: &'a str,
    document: Html,
    html: HtmlRecipe,
    jsonld: jsonld::JsonLdScan,
    result: Option<RecipeImportResult>,
    structured_found: bool,
    category_hint: Option<String>,
}

impl<'a> Merge<'a> {
    fn new(raw: &'a str, url: &'a str, ctx: MergeContext<'a>) -> Self {
        let document = Html::parse_document(raw);
        let host = host_of(url);
        let html = html::extract_page(&document, raw, ctx.sites, host.as_deref());
        let jsonld = jsonld::scan(raw, ctx.config.max_json_depth);
        Merge {
            ctx,
            raw,
            url,
            document,
            html,
            jsonld,
            result: None,
            structured_found: false,
            category_hint: None,
        }
    }

    fn process(&self, lines: &[String]) -> ProcessedList {
        let options = ListOptions {
            sort_by_quantity: self.ctx.config.sort_ingredients,
        };
        sections::process_ingredient_lines(lines, &options)
    }

    fn structured(&mut self) -> StageReport {
        if let Some(candidate) = self.jsonld.recipe.clone().filter(RecipeCandidate::has_content) {
            let path = self
                .jsonld
                .path
                .as_deref()
                .filter(|p| !p.is_empty())
                .unwrap_or("root")
                .to_string();
            self.produce(candidate, SourceKind::JsonLd, JSONLD_TIER);
            self.structured_found = true;
            return report(StageStatus::Produced, format!("json-ld at {path}"));
        }

        if let Some(candidate) =
            microdata::extract(&self.document).filter(RecipeCandidate::has_content)
        {
            self.produce(candidate, SourceKind::Microdata, MICRODATA_TIER);
            self.structured_found = true;
            return report(StageStatus::Produced, "microdata");
        }

        report(
            StageStatus::NotFound,
            format!(
                "{} json-ld blocks ({} unparseable), no recipe microdata",
                self.jsonld.blocks, self.jsonld.parse_failures
            ),
        )
    }

    fn html_supplement(&mut self) -> StageReport {
        if !self.structured_found {
            return report(StageStatus::Skipped, "no structured result");
        }
        let Some(current) = self.result.take() else {
            return report(StageStatus::Skipped, "no structured result");
        };
        let (next, taken) = self.supplement_with_html(&current);
        self.result = Some(next);
        supplemented(&taken)
    }

    fn embedded(&mut self) -> StageReport {
        if self.result.as_ref().is_some_and(is_complete) {
            return report(StageStatus::Skipped, "result complete");
        }
        let Some(found) = embedded::find_recipe(self.raw, self.ctx.config.max_json_depth)
            .filter(|f| f.candidate.has_content())
        else {
            return (StageStatus::NotFound, None);
        };
        let detail = format!("{} at {}", found.source, found.path);

        match self.result.take() {
            None => {
                self.produce(found.candidate, SourceKind::EmbeddedJson, EMBEDDED_TIER);
                report(StageStatus::Produced, detail)
            }
            Some(current) => {
                let (next, taken) =
                    self.supplement_with_candidate(&current, found.candidate, EMBEDDED_TIER);
                self.result = Some(next);
                match supplemented(&taken) {
                    (StageStatus::Supplemented, Some(fields)) => {
                        report(StageStatus::Supplemented, format!("{detail}: {fields}"))
                    }
                    _ => report(StageStatus::NoChange, detail),
                }
            }
        }
    }

    fn html_fallback(&mut self) -> StageReport {
        if self.structured_found {
            return report(StageStatus::Skipped, "structured data found");
        }
        match self.result.take() {
            Some(current) => {
                let (next, taken) = self.supplement_with_html(&current);
                self.result = Some(next);
                supplemented(&taken)
            }
            None => {
                let result = self.from_html();
                if result.is_empty() {
                    return (StageStatus::NotFound, None);
                }
                let source = self
                    .html
                    .ingredients
                    .as_ref()
                    .map(|i| i.source.clone())
                    .unwrap_or_else(|| "directions only".to_string());
                self.result = Some(result);
                report(StageStatus::Produced, source)
            }
        }
    }

    fn produce(&mut self, candidate: RecipeCandidate, kind: SourceKind, tier: Tier) {
        self.category_hint = candidate.category.clone();
        self.result = Some(self.from_candidate(candidate, kind, tier));
    }

    fn from_candidate(
        &self,
        candidate: RecipeCandidate,
        kind: SourceKind,
        tier: Tier,
    ) -> RecipeImportResult {
        let list = self.process(&candidate.ingredients);
        let directions = clean_directions(&candidate.directions);
        RecipeImportResult::builder(self.url, kind)
            .name(candidate.name, tier.name)
            .ingredients(list.ingredients, tier.ingredients)
            .raw_ingredients(list.raw)
            .equipment(list.equipment, tier.details)
            .directions(directions, tier.directions)
            .raw_directions(candidate.directions)
            .serves(candidate.serves, tier.details)
            .time(candidate.time, tier.details)
            .cuisine(candidate.cuisine, tier.details)
            .nutrition(candidate.nutrition, tier.details)
            .comments(candidate.description, tier.details)
            .image_paths(candidate.images, tier.details)
            .build()
    }

    /// Fill the empty fields of `current` from a structured candidate.
    fn supplement_with_candidate(
        &mut self,
        current: &RecipeImportResult,
        candidate: RecipeCandidate,
        tier: Tier,
    ) -> (RecipeImportResult, Vec<&'static str>) {
        let mut builder = current.to_builder();
        let mut taken = Vec::new();

        let list = self.process(&candidate.ingredients);
        if takes_ingredients(current, &list) {
            builder = builder
                .ingredients(list.ingredients, tier.ingredients)
                .raw_ingredients(list.raw);
            taken.push("ingredients");
        }

        let directions = clean_directions(&candidate.directions);
        if current.directions().is_empty() && !directions.is_empty() {
            builder = builder
                .directions(directions, tier.directions)
                .raw_directions(candidate.directions);
            taken.push("directions");
        }

        let details: [(&'static str, bool, Option<String>); 6] = [
            ("name", current.name().is_none(), candidate.name),
            ("serves", current.serves().is_none(), candidate.serves),
            ("time", current.time().is_none(), candidate.time),
            ("cuisine", current.cuisine().is_none(), candidate.cuisine),
            ("nutrition", current.nutrition().is_none(), candidate.nutrition),
            ("comments", current.comments().is_none(), candidate.description),
        ];
        for (field, empty, value) in details {
            if !empty || value.is_none() {
                continue;
            }
            builder = match field {
                "name" => builder.name(value, tier.name),
                "serves" => builder.serves(value, tier.details),
                "time" => builder.time(value, tier.details),
                "cuisine" => builder.cuisine(value, tier.details),
                "nutrition" => builder.nutrition(value, tier.details),
                _ => builder.comments(value, tier.details),
            };
            taken.push(field);
        }

        if current.image_paths().is_empty() && !candidate.images.is_empty() {
            builder = builder.image_paths(candidate.images, tier.details);
            taken.push("images");
        }
        if self.category_hint.is_none() {
            self.category_hint = candidate.category;
        }

        (builder.build(), taken)
    }

    /// Fill the empty fields of `current` from the page's HTML.
    fn supplement_with_html(
        &self,
        current: &RecipeImportResult) -> (RecipeImportResult, Vec<&'static str>,
    ) {
        let html = &self.html;
        let mut builder = current.to_builder();
        let mut taken = Vec::new();

        if let Some(found) = &html.ingredients {
            let list = self.process(&found.lines);
            if takes_ingredients(current, &list) {
                tracing::debug!(
                    source = %found.source,
                    sections = list.has_sections(),
                    "taking html ingredients"
                );
                if current.equipment().is_empty() && !list.equipment.is_empty() {
                    builder = builder.equipment(list.equipment, HTML_DETAIL_CONFIDENCE);
                    taken.push("equipment");
                }
                builder = builder
                    .ingredients(list.ingredients, found.confidence.min(HTML_CONFIDENCE_CAP))
                    .raw_ingredients(list.raw);
                taken.push("ingredients");
            }
        }

        if current.directions().is_empty() {
            if let Some(found) = &html.directions {
                let directions = clean_directions(&found.steps);
                if !directions.is_empty() {
                    builder = builder
                        .directions(directions, found.confidence.min(HTML_CONFIDENCE_CAP))
                        .raw_directions(found.steps.clone());
                    taken.push("directions");
                }
            }
        }

        if current.glass().is_none() && html.glass.is_some() {
            builder = builder.glass(html.glass.clone(), HTML_CONFIDENCE_CAP);
            taken.push("glass");
        }
        if current.garnish().is_empty() && !html.garnish.is_empty() {
            builder = builder.garnish(html.garnish.clone(), HTML_DETAIL_CONFIDENCE);
            taken.push("garnish");
        }
        if current.equipment().is_empty()
            && !html.equipment.is_empty()
            && !taken.contains(&"equipment")
        {
            builder = builder.equipment(html.equipment.clone(), HTML_DETAIL_CONFIDENCE);
            taken.push("equipment");
        }
        if current.serves().is_none() && html.serves.is_some() {
            builder = builder.serves(html.serves.clone(), HTML_DETAIL_CONFIDENCE);
            taken.push("serves");
        }
        if current.image_paths().is_empty() {
            if let Some(image) = &html.image {
                builder = builder.image_paths(vec![image.clone()], HTML_IMAGE_CONFIDENCE);
                taken.push("images");
            }
        }

        (builder.build(), taken)
    }

    /// A record built from HTML alone.
    fn from_html(&self) -> RecipeImportResult {
        let html = &self.html;
        let mut builder = RecipeImportResult::builder(self.url, SourceKind::Html)
            .name(html.title.clone(), HTML_TITLE_CONFIDENCE)
            .glass(html.glass.clone(), HTML_CONFIDENCE_CAP)
            .garnish(html.garnish.clone(), HTML_DETAIL_CONFIDENCE)
            .serves(html.serves.clone(), HTML_DETAIL_CONFIDENCE)
            .image_paths(html.image.iter().cloned().collect(), HTML_IMAGE_CONFIDENCE);

        let mut equipment = html.equipment.clone();
        let mut has_ingredients = false;
        if let Some(found) = &html.ingredients {
            let list = self.process(&found.lines);
            has_ingredients = list.real_count() > 0;
            for item in list.equipment {
                if !equipment.contains(&item) {
                    equipment.push(item);
                }
            }
            builder = builder
                .ingredients(list.ingredients, found.confidence.min(HTML_CONFIDENCE_CAP))
                .raw_ingredients(list.raw);
        }
        builder = builder.equipment(equipment, HTML_DETAIL_CONFIDENCE);

        match &html.directions {
            Some(found) => {
                builder = builder
                    .directions(
                        clean_directions(&found.steps),
                        found.confidence.min(HTML_CONFIDENCE_CAP),
                    )
                    .raw_directions(found.steps.clone());
            }
            // Loose body text only counts once we know this is a recipe page
            None if has_ingredients => {
                let lines = body_directions(&self.document);
                builder = builder
                    .directions(lines.clone(), BODY_DIRECTIONS_CONFIDENCE)
                    .raw_directions(lines);
            }
            None => {}
        }

        builder.build()
    }

    /// Classification, title fallback and the archive image rule.
    fn finish(&self, result: RecipeImportResult, from_archive: bool) -> RecipeImportResult {
        let mut builder = result.to_builder();

        if result.name().is_none() {
            if let Some(title) = &self.html.title {
                builder = builder.name(Some(title.clone()), HTML_TITLE_CONFIDENCE);
            }
        }

        let names: Vec<String> = result.real_ingredients().map(|i| i.name.clone()).collect();
        let context = format!(
            "{} {}",
            result.comments().unwrap_or_default(),
            result.directions().join(" ")
        );
        let input = ClassifyInput {
            title: result.name().or(self.html.title.as_deref()).unwrap_or_default(),
            url: self.url,
            ingredients: &names,
            category_hint: self.category_hint.as_deref(),
            context: &context,
        };
        let classification = classifier::classify(&input, self.ctx.rules);

        let course = classification.course;
        builder = builder.course(Some(course.label.to_string()), course.confidence);
        if let Some(spirit) = course.subcategory {
            builder = builder.subcategory(Some(spirit.to_string()), course.confidence);
        }

        let mut cuisines = classification.detected_cuisines;
        match result.cuisine() {
            Some(cuisine) => {
                cuisines.insert(cuisine.to_string());
            }
            None => {
                if let Some(inferred) = classification.cuisine {
                    builder =
                        builder.cuisine(Some(inferred.label.to_string()), inferred.confidence);
                }
            }
        }
        builder = builder
            .detected_courses(classification.detected_courses)
            .detected_cuisines(cuisines);

        if from_archive
            && !self.ctx.config.keep_archive_images
            && !result.image_paths().is_empty()
        {
            tracing::debug!(
                images = result.image_paths().len(),
                "dropping images from archived page"
            );
            builder = builder.image_paths(Vec::new(), 0.0);
        }

        builder.build()
    }

    fn diagnostics(&self) -> Diagnostics {
        let signals = html::page_signals(&self.document);
        Diagnostics {
            jsonld_blocks: self.jsonld.blocks,
            jsonld_parse_failures: self.jsonld.parse_failures,
            has_microdata: microdata::has_recipe_scope(&self.document),
            has_embedded_json: embedded::has_embedded_json(self.raw),
            heading_count: signals.heading_count,
            ingredient_headings: signals.ingredient_headings,
            list_items: signals.list_items,
            has_bullets: signals.has_bullets,
            has_measurements: signals.has_measurements,
        }
    }
}

/// Nothing left for a later stage to add.
fn is_complete(result: &RecipeImportResult) -> bool {
    result.name().is_some()
        && result.real_ingredients().next().is_some()
        && !result.directions().is_empty()
        && result.serves().is_some()
        && result.time().is_some()
        && result.has_sections()
}

/// Take a candidate ingredient list if the current one is empty, or if the
/// candidate adds sections to a flat list of comparable size.
fn takes_ingredients(current: &RecipeImportResult, candidate: &ProcessedList) -> bool {
    let candidate_count = candidate.real_count();
    if candidate_count == 0 {
        return false;
    }
    let current_count = current.real_ingredients().count();
    current_count == 0
        || (candidate.has_sections()
            && !current.has_sections()
            && candidate_count * 2 >= current_count)
}

/// Clean direction strings and drop the lines the classifier calls garbage.
fn clean_directions(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| text::clean_text(line))
        .filter(|line| classify_line::classify_line(line) != LineKind::Garbage)
        .collect()
}

fn body_directions(document: &Html) -> Vec<String> {
    html::body_lines(document)
        .into_iter()
        .filter(|line| classify_line::classify_line(line) == LineKind::Direction)
        .collect()
}
