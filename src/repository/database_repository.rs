use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::SqliteConnection;
use itertools::Itertools;
use lombok::AllArgsConstructor;
use tracing::{debug, trace_span};

use super::{IngredientSet, IngredientStore, RecipeCreate, RecipeFilter, RecipeStore, RecipeUpdate};
use crate::{
    database::{
        connection::{DbConnection, DbPool},
        models::{
            ingredient::{Ingredient, IngredientChangeset, NewIngredient},
            recipe::{Recipe, RecipeWithIngredients},
            recipe_ingredient::RecipeIngredient,
        },
        schema::{ingredients, recipes, recipes_ingredients},
    },
    error::{Error, Result},
    serializers::{errors::ValidationErrors, recipe::INGREDIENTS},
};

diesel::define_sql_function! {
    /// 1-based position of `needle` in `haystack`, 0 when absent. Unlike
    /// `LIKE`, case-sensitive.
    fn instr(haystack: Text, needle: Text) -> Integer;
}

#[derive(AllArgsConstructor, Clone)]
pub struct DatabaseRepository {
    pool: DbPool,
}

impl DatabaseRepository {
    fn connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }
}

impl RecipeStore for DatabaseRepository {
    fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<RecipeWithIngredients>> {
        let span = trace_span!("list_recipes", ?filter);
        let _guard = span.enter();

        let mut connection = self.connection()?;

        // one snapshot for the recipes and their links
        let recipes = connection.transaction(|connection| {
            let mut query = recipes::table
                .select(Recipe::as_select())
                .order(recipes::id.asc())
                .into_boxed();

            if let Some(name) = &filter.name_contains {
                query = query.filter(instr(recipes::name, name.clone()).gt(0));
            }

            let recipes = query.load(connection)?;
            with_ingredients(connection, recipes)
        })?;

        debug!(count = recipes.len(), "Loaded recipes");
        Ok(recipes)
    }

    fn get_recipe(&self, id: i32) -> Result<Option<RecipeWithIngredients>> {
        let span = trace_span!("get_recipe", id);
        let _guard = span.enter();

        let mut connection = self.connection()?;
        Ok(connection.transaction(|connection| find_recipe(connection, id))?)
    }

    fn create_recipe(&self, create: RecipeCreate) -> Result<RecipeWithIngredients> {
        let span = trace_span!("create_recipe");
        let _guard = span.enter();

        let mut connection = self.connection()?;
        connection.immediate_transaction(|connection| insert_recipe(connection, create))
    }

    fn update_recipe(
        &self,
        id: i32,
        update: RecipeUpdate,
    ) -> Result<Option<RecipeWithIngredients>> {
        let span = trace_span!("update_recipe", id);
        let _guard = span.enter();

        let mut connection = self.connection()?;
        connection.immediate_transaction(|connection| {
            let recipe = if update.changes.is_empty() {
                recipes::table
                    .find(id)
                    .select(Recipe::as_select())
                    .first(connection)
                    .optional()?
            } else {
                diesel::update(recipes::table.find(id))
                    .set(&update.changes)
                    .returning(Recipe::as_returning())
                    .get_result(connection)
                    .optional()?
            };

            let Some(recipe) = recipe else {
                return Ok(None);
            };

            if let Some(ingredients) = update.ingredients {
                // replaced wholesale, the old ingredients themselves stay
                let cleared = diesel::delete(
                    recipes_ingredients::table
                        .filter(recipes_ingredients::recipe_id.eq(recipe.id)),
                )
                .execute(connection)?;
                debug!(cleared, "Cleared ingredient links");

                attach_ingredients(connection, recipe.id, ingredients)?;
            }

            Ok(find_recipe(connection, recipe.id)?)
        })
    }

    fn delete_recipe(&self, id: i32) -> Result<bool> {
        let span = trace_span!("delete_recipe", id);
        let _guard = span.enter();

        let mut connection = self.connection()?;
        let deleted = diesel::delete(recipes::table.find(id)).execute(&mut connection)?;

        Ok(deleted > 0)
    }

    fn import_recipes(&self, recipes: Vec<RecipeCreate>) -> Result<Vec<RecipeWithIngredients>> {
        let span = trace_span!("import_recipes", count = recipes.len());
        let _guard = span.enter();

        let mut connection = self.connection()?;
        connection.immediate_transaction(|connection| {
            recipes
                .into_iter()
                .map(|create| insert_recipe(connection, create))
                .collect()
        })
    }
}

impl IngredientStore for DatabaseRepository {
    fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        let mut connection = self.connection()?;

        Ok(ingredients::table
            .select(Ingredient::as_select())
            .order(ingredients::id.asc())
            .load(&mut connection)?)
    }

    fn get_ingredient(&self, id: i32) -> Result<Option<Ingredient>> {
        let mut connection = self.connection()?;

        Ok(ingredients::table
            .find(id)
            .select(Ingredient::as_select())
            .first(&mut connection)
            .optional()?)
    }

    fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient> {
        let mut connection = self.connection()?;

        Ok(diesel::insert_into(ingredients::table)
            .values(&ingredient)
            .returning(Ingredient::as_returning())
            .get_result(&mut connection)?)
    }

    fn update_ingredient(
        &self,
        id: i32,
        changes: IngredientChangeset,
    ) -> Result<Option<Ingredient>> {
        if changes.is_empty() {
            return self.get_ingredient(id);
        }

        let mut connection = self.connection()?;

        Ok(diesel::update(ingredients::table.find(id))
            .set(&changes)
            .returning(Ingredient::as_returning())
            .get_result(&mut connection)
            .optional()?)
    }

    fn delete_ingredient(&self, id: i32) -> Result<bool> {
        let mut connection = self.connection()?;
        let deleted = diesel::delete(ingredients::table.find(id)).execute(&mut connection)?;

        Ok(deleted > 0)
    }
}

fn insert_recipe(
    connection: &mut SqliteConnection,
    create: RecipeCreate,
) -> Result<RecipeWithIngredients> {
    let recipe = diesel::insert_into(recipes::table)
        .values(&create.recipe)
        .returning(Recipe::as_returning())
        .get_result(connection)?;

    attach_ingredients(connection, recipe.id, create.ingredients)?;

    find_recipe(connection, recipe.id)?.ok_or(Error::NotFound)
}

/// Links `ingredients` to the recipe. Nested ingredients are created first;
/// referenced ids must all exist or nothing is linked.
fn attach_ingredients(
    connection: &mut SqliteConnection,
    recipe_id: i32,
    ingredients: IngredientSet,
) -> Result<()> {
    let ingredient_ids = match ingredients {
        IngredientSet::Existing(ids) => {
            let ids = ids.into_iter().unique().collect_vec();
            if ids.is_empty() {
                return Ok(());
            }

            let found: Vec<i32> = ingredients::table
                .filter(ingredients::id.eq_any(&ids))
                .select(ingredients::id)
                .load(connection)?;

            let missing = ids
                .iter()
                .filter(|id| !found.contains(id))
                .map(|id| format!("Invalid pk \"{id}\" - object does not exist."))
                .collect_vec();
            if !missing.is_empty() {
                let mut errors = ValidationErrors::new();
                errors.extend(INGREDIENTS, missing);
                return Err(Error::Validation(errors));
            }

            ids
        }
        IngredientSet::Nested(new_ingredients) => new_ingredients
            .iter()
            .map(|ingredient| {
                diesel::insert_into(ingredients::table)
                    .values(ingredient)
                    .returning(ingredients::id)
                    .get_result(connection)
            })
            .collect::<QueryResult<Vec<i32>>>()?,
    };

    if ingredient_ids.is_empty() {
        return Ok(());
    }

    let links = ingredient_ids
        .into_iter()
        .map(|ingredient_id| RecipeIngredient::new(recipe_id, ingredient_id))
        .collect_vec();

    let linked = diesel::insert_into(recipes_ingredients::table)
        .values(&links)
        .execute(connection)?;
    debug!(recipe_id, linked, "Linked ingredients");

    Ok(())
}

fn find_recipe(
    connection: &mut SqliteConnection,
    id: i32,
) -> QueryResult<Option<RecipeWithIngredients>> {
    let recipe = recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(connection)
        .optional()?;

    let Some(recipe) = recipe else {
        return Ok(None);
    };

    Ok(with_ingredients(connection, vec![recipe])?.pop())
}

fn with_ingredients(
    connection: &mut SqliteConnection,
    recipes: Vec<Recipe>,
) -> QueryResult<Vec<RecipeWithIngredients>> {
    let links: Vec<(RecipeIngredient, Ingredient)> = RecipeIngredient::belonging_to(&recipes)
        .inner_join(ingredients::table)
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        .order(ingredients::id.asc())
        .load(connection)?;

    Ok(links
        .grouped_by(&recipes)
        .into_iter()
        .zip(recipes)
        .map(|(links, recipe)| RecipeWithIngredients {
            recipe,
            ingredients: links
                .into_iter()
                .map(|(_, ingredient)| ingredient)
                .collect(),
        })
        .collect())
}
