use crate::classifier::{self, Classification, ClassifierRules, ClassifyInput};
use crate::config::ImportConfig;
use crate::error::ExtractError;
use crate::fetch::FetchedDocument;
use crate::html::SiteRegistry;
use crate::merge::{self, MergeContext};
use crate::plain_text;
use crate::transcript::{self, TranscriptSegment};
use crate::types::{ImportOutcome, RecipeImportResult};

/// The engine: configuration plus the site and classifier registries.
///
/// Holds no mutable state; one importer can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct RecipeImporter {
    config: ImportConfig,
    sites: SiteRegistry,
    rules: ClassifierRules,
}

impl RecipeImporter {
    pub fn new(config: ImportConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Importer configured from `MEMOIX_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(ImportConfig::from_env())
    }

    pub fn with_sites(mut self, sites: SiteRegistry) -> Self {
        self.sites = sites;
        self
    }

    pub fn with_rules(mut self, rules: ClassifierRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn sites(&self) -> &SiteRegistry {
        &self.sites
    }

    pub fn rules(&self) -> &ClassifierRules {
        &self.rules
    }

    /// Extract a recipe from a fetched document, HTML or plain text.
    pub fn import_document(
        &self,
        document: &FetchedDocument,
    ) -> Result<ImportOutcome, ExtractError> {
        if plain_text::looks_like_plain_text(&document.body) {
            return plain_text::import_plain_text(&document.body, &document.url, &self.config);
        }
        let ctx = MergeContext {
            config: &self.config,
            sites: &self.sites,
            rules: &self.rules,
        };
        merge::merge_document(&document.body, &document.url, document.from_archive, ctx)
    }

    pub fn import_html(&self, html: &str, url: &str) -> Result<ImportOutcome, ExtractError> {
        self.import_document(&FetchedDocument::new(url, html))
    }

    pub fn import_transcript(
        &self,
        url: &str,
        title: Option<&str>,
        segments: &[TranscriptSegment],
    ) -> RecipeImportResult {
        transcript::import_transcript(url, title, segments, &self.rules)
    }

    pub fn classify(&self, input: &ClassifyInput) -> Classification {
        classifier::classify(input, &self.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    #[test]
    fn test_dispatches_on_body() {
        let importer = RecipeImporter::default();
        let text = importer
            .import_html(
                "Toast\n1 slice bread\n1 tbsp butter\nToast the bread and spread the butter on top.",
                "",
            )
            .expect("text recipe");
        assert_eq!(text.result.source_kind(), SourceKind::PlainText);

        let html = importer
            .import_html(
                r#"<html><script type="application/ld+json">{"@type":"Recipe","name":"Toast","recipeIngredient":["1 slice bread"]}</script></html>"#,
                "https://example.com/toast",
            )
            .expect("html recipe");
        assert_eq!(html.result.source_kind(), SourceKind::JsonLd);
    }

    #[test]
    fn test_injected_registries() {
        let importer = RecipeImporter::new(ImportConfig::default())
            .with_sites(SiteRegistry::new(99, Vec::new()))
            .with_rules(ClassifierRules::default());
        assert_eq!(importer.sites().version, 99);
        assert!(importer.sites().is_empty());
        assert_eq!(importer.rules().version, ClassifierRules::builtin().version);
    }
}
