//! Data access for recipes and ingredients. Records are plain structs from
//! `database::models`; all persistence goes through these traits.

pub mod database_repository;

use crate::{
    database::models::{
        ingredient::{Ingredient, IngredientChangeset, NewIngredient},
        recipe::{NewRecipe, RecipeChangeset, RecipeWithIngredients},
    },
    error::Result,
};

/// Ingredients to attach to a recipe on create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngredientSet {
    /// Ids of ingredients that already exist.
    Existing(Vec<i32>),
    /// New ingredients, created and attached in the same transaction.
    Nested(Vec<NewIngredient>),
}

impl Default for IngredientSet {
    fn default() -> Self {
        IngredientSet::Existing(Vec::new())
    }
}

#[cfg(test)]
impl IngredientSet {
    pub fn len(&self) -> usize {
        match self {
            IngredientSet::Existing(ids) => ids.len(),
            IngredientSet::Nested(ingredients) => ingredients.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCreate {
    pub recipe: NewRecipe,
    pub ingredients: IngredientSet,
}

/// `ingredients: None` leaves the current links untouched; `Some` replaces
/// them wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeUpdate {
    pub changes: RecipeChangeset,
    pub ingredients: Option<IngredientSet>,
}

/// Criteria for [`RecipeStore::list_recipes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Case-sensitive substring the recipe name must contain.
    pub name_contains: Option<String>,
}

impl RecipeFilter {
    #[cfg(test)]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name_contains: Some(name.into()),
        }
    }

    /// Builds the filter from the `name` query parameter. An empty value
    /// means no filtering.
    pub fn from_query(name: Option<String>) -> Self {
        Self {
            name_contains: name.filter(|name| !name.is_empty()),
        }
    }
}

pub trait RecipeStore: Send + Sync {
    fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<RecipeWithIngredients>>;

    fn get_recipe(&self, id: i32) -> Result<Option<RecipeWithIngredients>>;

    fn create_recipe(&self, create: RecipeCreate) -> Result<RecipeWithIngredients>;

    /// `Ok(None)` when no recipe has this id.
    fn update_recipe(&self, id: i32, update: RecipeUpdate)
        -> Result<Option<RecipeWithIngredients>>;

    /// `Ok(false)` when no recipe has this id. Ingredients are kept.
    fn delete_recipe(&self, id: i32) -> Result<bool>;

    /// Creates every recipe in one transaction: all of them or none.
    fn import_recipes(&self, recipes: Vec<RecipeCreate>) -> Result<Vec<RecipeWithIngredients>>;
}

pub trait IngredientStore: Send + Sync {
    fn list_ingredients(&self) -> Result<Vec<Ingredient>>;

    fn get_ingredient(&self, id: i32) -> Result<Option<Ingredient>>;

    fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient>;

    fn update_ingredient(&self, id: i32, changes: IngredientChangeset)
        -> Result<Option<Ingredient>>;

    fn delete_ingredient(&self, id: i32) -> Result<bool>;
}

/// Everything the HTTP layer needs from storage.
pub trait Repository: RecipeStore + IngredientStore {}

impl<T: RecipeStore + IngredientStore> Repository for T {}
