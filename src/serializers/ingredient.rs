use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    errors::ValidationErrors,
    fields::{self, CharField},
};
use crate::{
    database::models::ingredient::{Ingredient, IngredientChangeset, NewIngredient},
    error::{self, Error},
    repository::IngredientStore,
};

pub const NAME: CharField = CharField::new("name", 255);

/// Wire shape of an ingredient: `{id, name}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IngredientView {
    pub id: i32,
    pub name: String,
}

impl From<&Ingredient> for IngredientView {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name.clone(),
        }
    }
}

pub struct IngredientSerializer;

impl IngredientSerializer {
    pub fn render(ingredient: &Ingredient) -> IngredientView {
        IngredientView::from(ingredient)
    }

    pub fn validate_create(payload: &Value) -> Result<NewIngredient, ValidationErrors> {
        let payload = fields::as_object(payload)?;

        let mut errors = ValidationErrors::new();
        let name = NAME.extract(payload, true, &mut errors);

        match name {
            Some(name) if errors.is_empty() => Ok(NewIngredient::new(name)),
            _ => Err(errors),
        }
    }

    pub fn validate_update(
        payload: &Value,
        partial: bool,
    ) -> Result<IngredientChangeset, ValidationErrors> {
        let payload = fields::as_object(payload)?;

        let mut errors = ValidationErrors::new();
        let name = NAME.extract(payload, !partial, &mut errors);

        errors.into_result(IngredientChangeset { name })
    }

    /// Validates one element of a recipe's nested `ingredients` list. Errors
    /// come back as messages for the containing field.
    pub fn validate_nested(value: &Value) -> Result<NewIngredient, Vec<String>> {
        Self::validate_create(value).map_err(ValidationErrors::into_messages)
    }

    pub fn create<S>(store: &S, payload: &Value) -> error::Result<Ingredient>
    where
        S: IngredientStore + ?Sized,
    {
        let ingredient = Self::validate_create(payload)?;
        store.create_ingredient(ingredient)
    }

    pub fn update<S>(
        store: &S,
        existing: &Ingredient,
        payload: &Value,
        partial: bool,
    ) -> error::Result<Ingredient>
    where
        S: IngredientStore + ?Sized,
    {
        let changes = Self::validate_update(payload, partial)?;
        store
            .update_ingredient(existing.id, changes)?
            .ok_or(Error::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_requires_a_name() {
        let errors = IngredientSerializer::validate_create(&json!({})).unwrap_err();
        assert_eq!(errors.get("name"), Some(&[fields::REQUIRED.to_owned()][..]));

        let ingredient = IngredientSerializer::validate_create(&json!({ "name": " Kale " }));
        assert_eq!(ingredient, Ok(NewIngredient::new("Kale".to_owned())));
    }

    #[test]
    fn partial_update_accepts_empty_payload() {
        let changes = IngredientSerializer::validate_update(&json!({}), true).unwrap();
        assert!(changes.is_empty());

        let errors = IngredientSerializer::validate_update(&json!({}), false).unwrap_err();
        assert!(errors.get("name").is_some());
    }

    #[test]
    fn nested_errors_are_flattened_into_messages() {
        assert_eq!(
            IngredientSerializer::validate_nested(&json!({ "name": "" })),
            Err(vec!["name: This field may not be blank.".to_owned()])
        );
        assert_eq!(
            IngredientSerializer::validate_nested(&json!("Salt")),
            Err(vec![
                "Invalid data. Expected a dictionary, but got str.".to_owned()
            ])
        );
    }

    #[test]
    fn renders_id_and_name() {
        let ingredient = Ingredient {
            id: 4,
            name: "Salt".to_owned(),
        };

        assert_eq!(
            serde_json::to_value(IngredientSerializer::render(&ingredient)).unwrap(),
            json!({ "id": 4, "name": "Salt" })
        );
    }
}
