use std::fmt;

use diesel::prelude::*;
use lombok::AllArgsConstructor;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Hash)]
#[diesel(table_name = crate::database::schema::ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Insertable, AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct NewIngredient {
    pub name: String,
}

#[derive(AsChangeset, Default, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct IngredientChangeset {
    pub name: Option<String>,
}

impl IngredientChangeset {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
