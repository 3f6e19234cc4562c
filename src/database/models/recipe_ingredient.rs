use diesel::prelude::*;
use lombok::AllArgsConstructor;

use super::{ingredient::Ingredient, recipe::Recipe};

// Pure link row: no payload besides the two keys
#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Associations,
    Insertable,
    AllArgsConstructor,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
)]
#[diesel(table_name = crate::database::schema::recipes_ingredients)]
#[diesel(primary_key(recipe_id, ingredient_id))]
#[diesel(belongs_to(Recipe))]
#[diesel(belongs_to(Ingredient))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeIngredient {
    pub recipe_id: i32,
    pub ingredient_id: i32,
}
