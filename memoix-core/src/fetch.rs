//! The boundary to whatever fetches documents.
//!
//! Retries, header rotation and archive fallback live on the far side of
//! [`DocumentFetcher`]. This crate only consumes the [`FetchedDocument`] it
//! hands back.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FetchError, ImportError};
use crate::importer::RecipeImporter;
use crate::types::ImportOutcome;

/// A fetched page, ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedDocument {
    pub body: String,
    /// Final URL after redirects
    pub url: String,
    /// Served from an archival mirror; image paths from it are not kept
    #[serde(default)]
    pub from_archive: bool,
}

impl FetchedDocument {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            url: url.into(),
            from_archive: false,
        }
    }
}

/// Trait for document fetchers, enabling mockability in tests.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError>;
}

/// Fetch a URL and run the engine over it.
pub async fn import_url(
    fetcher: &dyn DocumentFetcher,
    url: &str,
    importer: &RecipeImporter,
) -> Result<ImportOutcome, ImportError> {
    Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    let document = fetcher.fetch(url).await?;
    tracing::debug!(
        url = %document.url,
        bytes = document.body.len(),
        from_archive = document.from_archive,
        "fetched document"
    );
    Ok(importer.import_document(&document)?)
}

/// Canned response for [`MockFetcher`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    Html(String),
    Archived(String),
    Blocked(u16),
    Error(String),
}

/// Mock fetcher for testing.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, MockResponse>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_response(url, MockResponse::Html(html.to_string()))
    }

    /// Serve `html` as if it came from an archive mirror.
    pub fn with_archived(self, url: &str, html: &str) -> Self {
        self.with_response(url, MockResponse::Archived(html.to_string()))
    }

    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.with_response(url, MockResponse::Error(error.to_string()))
    }
}

#[async_trait]
impl DocumentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        match self.responses.get(url) {
            Some(MockResponse::Html(html)) => Ok(FetchedDocument::new(url, html.clone())),
            Some(MockResponse::Archived(html)) => Ok(FetchedDocument {
                from_archive: true,
                ..FetchedDocument::new(url, html.clone())
            }),
            Some(MockResponse::Blocked(status)) => Err(FetchError::BotDetected(*status)),
            Some(MockResponse::Error(e)) => Err(FetchError::RequestFailed(e.clone())),
            None => Err(FetchError::RequestFailed(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    const RECIPE: &str = r#"<html><head>
        <meta property="og:image" content="https://example.com/og.jpg">
        <script type="application/ld+json">{"@type":"Recipe","name":"Toast","recipeIngredient":["2 slices bread","1 tbsp butter"]}</script>
        </head><body></body></html>"#;

    #[tokio::test]
    async fn test_import_url() {
        let fetcher = MockFetcher::new().with_html("https://example.com/toast", RECIPE);
        let outcome = import_url(&fetcher, "https://example.com/toast", &RecipeImporter::default())
            .await
            .expect("import");
        assert_eq!(outcome.result.name(), Some("Toast"));
        assert_eq!(outcome.result.image_paths(), ["https://example.com/og.jpg"]);
    }

    #[tokio::test]
    async fn test_archived_document_drops_images() {
        let fetcher = MockFetcher::new().with_archived("https://example.com/toast", RECIPE);
        let outcome = import_url(&fetcher, "https://example.com/toast", &RecipeImporter::default())
            .await
            .expect("import");
        assert!(outcome.result.image_paths().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_errors_pass_through() {
        let fetcher = MockFetcher::new()
            .with_response("https://example.com/blocked", MockResponse::Blocked(403))
            .with_html("https://example.com/empty", "<html><body><p>Nothing</p></body></html>");
        let importer = RecipeImporter::default();

        let err = import_url(&fetcher, "https://example.com/blocked", &importer)
            .await
            .expect_err("blocked");
        assert!(matches!(err, ImportError::Fetch(FetchError::BotDetected(403))));

        let err = import_url(&fetcher, "not a url", &importer)
            .await
            .expect_err("invalid");
        assert!(matches!(err, ImportError::Fetch(FetchError::InvalidUrl(_))));

        let err = import_url(&fetcher, "https://example.com/empty", &importer)
            .await
            .expect_err("no recipe");
        assert!(matches!(err, ImportError::Extract(ExtractError::NoRecipe(_))));
    }
}
