use std::fmt;

use diesel::prelude::*;
use lombok::AllArgsConstructor;

use super::ingredient::Ingredient;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Recipe {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Insertable, AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
}

// Only the fields that are `Some` end up in the UPDATE statement
#[derive(AsChangeset, Default, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl RecipeChangeset {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

impl From<NewRecipe> for RecipeChangeset {
    fn from(recipe: NewRecipe) -> Self {
        Self {
            name: Some(recipe.name),
            description: Some(recipe.description),
        }
    }
}

/// A recipe row together with every ingredient linked to it, ordered by
/// ingredient id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeWithIngredients {
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeWithIngredients {
    pub fn ingredient_ids(&self) -> Vec<i32> {
        self.ingredients.iter().map(|ingredient| ingredient.id).collect()
    }
}
