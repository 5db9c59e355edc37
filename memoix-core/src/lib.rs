pub mod classifier;
pub mod classify_line;
pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod importer;
pub mod ingredient_categorizer;
pub mod ingredient_parser;
pub mod merge;
pub mod plain_text;
pub mod quantity;
pub mod sections;
pub mod structured;
pub mod text;
pub mod transcript;
pub mod types;

pub use classifier::{Classification, ClassifierRules, ClassifyInput};
pub use classify_line::{classify_line, LineKind};
pub use config::ImportConfig;
pub use error::{Diagnostics, ExtractError, FetchError, ImportError};
pub use fetch::{import_url, DocumentFetcher, FetchedDocument, MockFetcher, MockResponse};
pub use html::{ExtractionMode, SiteConfig, SiteRegistry};
pub use importer::RecipeImporter;
pub use ingredient_categorizer::{categorize, IngredientCategory};
pub use ingredient_parser::parse_ingredient;
pub use sections::{process_ingredient_lines, ListOptions, ProcessedList};
pub use transcript::{import_transcript, TranscriptSegment};
pub use types::{
    FieldConfidence, ImportOutcome, ImportStage, Ingredient, RawIngredientData, RecipeImportBuilder,
    RecipeImportResult, SourceKind, StageAttempt, StageStatus,
};
