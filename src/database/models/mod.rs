pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
