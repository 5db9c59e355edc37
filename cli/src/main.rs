mod batch;
mod ingredient_categories;
mod ingredient_tests;
mod inspect;
mod parse_html;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use memoix_core::RecipeImporter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "memoix")]
#[command(about = "Memoix recipe import tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a recipe from a saved HTML (or plain text) file
    ParseHtml {
        /// Path to the saved page
        file: PathBuf,
        /// URL the page was fetched from
        #[arg(long, default_value = "")]
        url: String,
        /// Print the stage attempts along with the recipe
        #[arg(long)]
        attempts: bool,
    },
    /// Parse ingredient lines through the section-aware list processor
    ParseIngredients {
        /// Lines to parse; read from stdin when empty
        lines: Vec<String>,
        /// Sort by quantity unless a section marker is present
        #[arg(long)]
        sort: bool,
    },
    /// Classify a recipe's course and cuisine
    Classify {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        url: String,
        /// Ingredient names, repeatable
        #[arg(long = "ingredient")]
        ingredients: Vec<String>,
        /// Category or keyword hint from the source
        #[arg(long)]
        category: Option<String>,
    },
    /// Print the grocery category for each ingredient name
    Categorize {
        names: Vec<String>,
    },
    /// Write a CSV of every fixture ingredient and its grocery category
    CategoryAudit {
        /// Fixture directory (default: memoix-core/tests/fixtures/ingredient_parsing)
        #[arg(long)]
        fixtures_dir: Option<PathBuf>,
        #[arg(long, default_value = "ingredient_categories.csv")]
        output: PathBuf,
    },
    /// Build a recipe from a caption transcript (JSON array of {start_secs, text})
    Transcript {
        file: PathBuf,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Import every saved page in a directory concurrently
    Batch {
        dir: PathBuf,
        /// Glob relative to the directory
        #[arg(long, default_value = "*.html")]
        pattern: String,
        /// Write one JSON result per page into this directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare ingredient parsing fixtures against the current parser
    IngredientTests {
        /// Fixture directory (default: memoix-core/tests/fixtures/ingredient_parsing)
        #[arg(long)]
        fixtures_dir: Option<PathBuf>,
        /// Rewrite the expected output of changed fixtures
        #[arg(long)]
        update: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let importer = RecipeImporter::from_env();

    match cli.command {
        Commands::ParseHtml {
            file,
            url,
            attempts,
        } => {
            parse_html::parse_html(&importer, &file, &url, attempts)?;
        }
        Commands::ParseIngredients { lines, sort } => {
            inspect::parse_ingredients(&lines, sort)?;
        }
        Commands::Classify {
            title,
            url,
            ingredients,
            category,
        } => {
            inspect::classify(&importer, &title, &url, &ingredients, category.as_deref())?;
        }
        Commands::Categorize { names } => {
            inspect::categorize(&names);
        }
        Commands::CategoryAudit {
            fixtures_dir,
            output,
        } => {
            ingredient_categories::generate(fixtures_dir.as_deref(), &output)?;
        }
        Commands::Transcript { file, url, title } => {
            inspect::transcript(&importer, &file, &url, title.as_deref())?;
        }
        Commands::Batch {
            dir,
            pattern,
            output,
        } => {
            batch::run(importer, &dir, &pattern, output.as_deref()).await?;
        }
        Commands::IngredientTests {
            fixtures_dir,
            update,
        } => {
            ingredient_tests::check_fixtures(fixtures_dir.as_deref(), update)?;
        }
    }

    Ok(())
}
