use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use clap::Parser;
use serde_json::{from_str, Value};
use tracing::{info, Level};

use recipe_api::config::DatabaseConfig;
use recipe_api::database::connection::establish_pooled_connection;
use recipe_api::repository::{database_repository::DatabaseRepository, RecipeCreate, RecipeStore};
use recipe_api::serializers::recipe::{IngredientWriteMode, RecipeSerializer};

/// Loads recipes, with their nested ingredients, from a JSON file.
#[derive(Parser, Debug)]
#[command(name = "import-data")]
struct ImportArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// JSON array of `{name, description, ingredients: [{name}]}` objects
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = ImportArgs::parse();

    info!(file = %args.file.display(), "Starting import");
    let recipes = read_recipes(&args.file)?;

    let pool = establish_pooled_connection(&args.database)?;
    let repository = DatabaseRepository::new(pool);

    // every recipe or none of them
    let imported = repository.import_recipes(recipes)?;

    info!(count = imported.len(), "End import");
    Ok(())
}

fn read_recipes(file: &Path) -> anyhow::Result<Vec<RecipeCreate>> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Can't read {}", file.display()))?;
    let json: Value = from_str(&text).with_context(|| format!("Can't parse {}", file.display()))?;

    parse_recipes(&json)
}

fn parse_recipes(json: &Value) -> anyhow::Result<Vec<RecipeCreate>> {
    let entries = json
        .as_array()
        .context("Expected a JSON array of recipes")?;

    let serializer = RecipeSerializer::new(IngredientWriteMode::Nested);

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serializer
                .validate_create(entry)
                .map_err(|errors| anyhow!("Recipe #{index} is invalid: {errors}"))
        })
        .collect()
}
