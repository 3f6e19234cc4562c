//! Recipe mapping. Ingredients are written either as ids of existing
//! ingredients or as nested `{name}` objects, depending on
//! [`IngredientWriteMode`]. Reads always carry full `{id, name}` objects on
//! the detail representation.

use clap::ValueEnum;
use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    errors::ValidationErrors,
    fields::{self, CharField},
    ingredient::{IngredientSerializer, IngredientView},
};
use crate::{
    database::models::{
        ingredient::NewIngredient,
        recipe::{NewRecipe, RecipeChangeset, RecipeWithIngredients},
    },
    error::{self, Error},
    repository::{IngredientSet, RecipeCreate, RecipeStore, RecipeUpdate},
};

pub const NAME: CharField = CharField::new("name", 255);
pub const DESCRIPTION: CharField = CharField::new("description", 1500);
pub const INGREDIENTS: &str = "ingredients";

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngredientWriteMode {
    /// `ingredients` is a list of existing ingredient ids
    Reference,
    /// `ingredients` is a list of `{name}` objects created with the recipe
    #[default]
    Nested,
}

/// The operations a recipe handler performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeAction {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Summary,
    Detail,
}

impl RecipeAction {
    pub fn representation(self) -> Representation {
        match self {
            RecipeAction::Retrieve => Representation::Detail,
            RecipeAction::List
            | RecipeAction::Create
            | RecipeAction::Update
            | RecipeAction::PartialUpdate => Representation::Summary,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum IngredientsView {
    Ids(Vec<i32>),
    Objects(Vec<IngredientView>),
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub ingredients: IngredientsView,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<IngredientView>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecipeView {
    Summary(RecipeSummary),
    Detail(RecipeDetail),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeSerializer {
    mode: IngredientWriteMode,
}

impl RecipeSerializer {
    pub fn new(mode: IngredientWriteMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> IngredientWriteMode {
        self.mode
    }

    pub fn render(&self, action: RecipeAction, recipe: &RecipeWithIngredients) -> RecipeView {
        match action.representation() {
            Representation::Summary => RecipeView::Summary(self.summary(recipe)),
            Representation::Detail => RecipeView::Detail(Self::detail(recipe)),
        }
    }

    pub fn summary(&self, recipe: &RecipeWithIngredients) -> RecipeSummary {
        let ingredients = match self.mode {
            IngredientWriteMode::Reference => IngredientsView::Ids(recipe.ingredient_ids()),
            IngredientWriteMode::Nested => IngredientsView::Objects(ingredient_views(recipe)),
        };

        RecipeSummary {
            id: recipe.recipe.id,
            name: recipe.recipe.name.clone(),
            description: recipe.recipe.description.clone(),
            ingredients,
        }
    }

    pub fn detail(recipe: &RecipeWithIngredients) -> RecipeDetail {
        RecipeDetail {
            id: recipe.recipe.id,
            name: recipe.recipe.name.clone(),
            description: recipe.recipe.description.clone(),
            ingredients: ingredient_views(recipe),
        }
    }

    pub fn validate_create(&self, payload: &Value) -> Result<RecipeCreate, ValidationErrors> {
        let payload = fields::as_object(payload)?;

        let mut errors = ValidationErrors::new();
        let name = NAME.extract(payload, true, &mut errors);
        let description = DESCRIPTION.extract(payload, true, &mut errors);
        let ingredients = self.extract_ingredients(payload, &mut errors);

        match (name, description) {
            (Some(name), Some(description)) if errors.is_empty() => Ok(RecipeCreate {
                recipe: NewRecipe::new(name, description),
                ingredients: ingredients.unwrap_or_default(),
            }),
            _ => Err(errors),
        }
    }

    /// `partial` only validates the fields present in the payload; otherwise
    /// `name` and `description` are required as on create.
    pub fn validate_update(
        &self,
        payload: &Value,
        partial: bool,
    ) -> Result<RecipeUpdate, ValidationErrors> {
        let payload = fields::as_object(payload)?;

        let mut errors = ValidationErrors::new();
        let changes = RecipeChangeset {
            name: NAME.extract(payload, !partial, &mut errors),
            description: DESCRIPTION.extract(payload, !partial, &mut errors),
        };
        let ingredients = self.extract_ingredients(payload, &mut errors);

        errors.into_result(RecipeUpdate {
            changes,
            ingredients,
        })
    }

    pub fn create<S>(&self, store: &S, payload: &Value) -> error::Result<RecipeWithIngredients>
    where
        S: RecipeStore + ?Sized,
    {
        let create = self.validate_create(payload)?;
        store.create_recipe(create)
    }

    pub fn update<S>(
        &self,
        store: &S,
        existing: &RecipeWithIngredients,
        payload: &Value,
        partial: bool,
    ) -> error::Result<RecipeWithIngredients>
    where
        S: RecipeStore + ?Sized,
    {
        let update = self.validate_update(payload, partial)?;
        store
            .update_recipe(existing.recipe.id, update)?
            .ok_or(Error::NotFound)
    }

    fn extract_ingredients(
        &self,
        payload: &Map<String, Value>,
        errors: &mut ValidationErrors,
    ) -> Option<IngredientSet> {
        let value = payload.get(INGREDIENTS)?;

        let items = match value {
            Value::Array(items) => items,
            Value::Null => {
                errors.add(INGREDIENTS, fields::NOT_NULL);
                return None;
            }
            other => {
                errors.add(
                    INGREDIENTS,
                    format!(
                        "Expected a list of items but got type \"{}\".",
                        fields::type_name(other)
                    ),
                );
                return None;
            }
        };

        let result = match self.mode {
            IngredientWriteMode::Reference => items
                .iter()
                .map(primary_key)
                .collect::<Result<Vec<_>, _>>()
                .map(IngredientSet::Existing),
            IngredientWriteMode::Nested => nested_ingredients(items).map(IngredientSet::Nested),
        };

        result.map_err(|messages| errors.extend(INGREDIENTS, messages)).ok()
    }
}

fn ingredient_views(recipe: &RecipeWithIngredients) -> Vec<IngredientView> {
    recipe
        .ingredients
        .iter()
        .map(IngredientSerializer::render)
        .collect()
}

/// An ingredient id as sent by the client: a JSON integer or a string of
/// digits.
fn primary_key(value: &Value) -> Result<i32, Vec<String>> {
    let id = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    id.and_then(|id| i32::try_from(id).ok()).ok_or_else(|| {
        vec![format!(
            "Incorrect type. Expected pk value, received {}.",
            fields::type_name(value)
        )]
    })
}

// Collects the errors of every element instead of stopping at the first one
fn nested_ingredients(items: &[Value]) -> Result<Vec<NewIngredient>, Vec<String>> {
    let (ingredients, errors): (Vec<_>, Vec<_>) = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            IngredientSerializer::validate_nested(item).map_err(|messages| {
                messages
                    .into_iter()
                    .map(|message| format!("[{index}] {message}"))
                    .collect_vec()
            })
        })
        .partition_result();

    if errors.is_empty() {
        Ok(ingredients)
    } else {
        Err(errors.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::database::models::{ingredient::Ingredient, recipe::Recipe};

    fn curry() -> RecipeWithIngredients {
        RecipeWithIngredients {
            recipe: Recipe {
                id: 1,
                name: "Thai prawn red curry".to_owned(),
                description: "Description".to_owned(),
            },
            ingredients: vec![
                Ingredient {
                    id: 1,
                    name: "Prawns".to_owned(),
                },
                Ingredient {
                    id: 2,
                    name: "Ginger".to_owned(),
                },
            ],
        }
    }

    #[test]
    fn only_retrieve_uses_the_detail_representation() {
        assert_eq!(
            RecipeAction::Retrieve.representation(),
            Representation::Detail
        );
        for action in [
            RecipeAction::List,
            RecipeAction::Create,
            RecipeAction::Update,
            RecipeAction::PartialUpdate,
        ] {
            assert_eq!(action.representation(), Representation::Summary);
        }
    }

    #[test]
    fn summary_follows_write_mode_and_detail_does_not() {
        let recipe = curry();
        let reference = RecipeSerializer::new(IngredientWriteMode::Reference);
        let nested = RecipeSerializer::new(IngredientWriteMode::Nested);

        assert_eq!(
            serde_json::to_value(reference.render(RecipeAction::List, &recipe)).unwrap(),
            json!({
                "id": 1,
                "name": "Thai prawn red curry",
                "description": "Description",
                "ingredients": [1, 2],
            })
        );

        let objects = json!([
            { "id": 1, "name": "Prawns" },
            { "id": 2, "name": "Ginger" },
        ]);
        assert_eq!(
            serde_json::to_value(nested.render(RecipeAction::List, &recipe)).unwrap()
                ["ingredients"],
            objects
        );
        assert_eq!(
            serde_json::to_value(reference.render(RecipeAction::Retrieve, &recipe)).unwrap()
                ["ingredients"],
            objects
        );
    }

    #[test]
    fn create_requires_name_and_description() {
        let serializer = RecipeSerializer::default();

        let errors = serializer.validate_create(&json!({})).unwrap_err();

        assert_eq!(errors.get("name"), Some(&[fields::REQUIRED.to_owned()][..]));
        assert_eq!(
            errors.get("description"),
            Some(&[fields::REQUIRED.to_owned()][..])
        );
    }

    #[test]
    fn create_rejects_values_over_the_bound() {
        let serializer = RecipeSerializer::default();
        let payload = json!({
            "name": "x".repeat(256),
            "description": "y".repeat(1501),
        });

        let errors = serializer.validate_create(&payload).unwrap_err();

        assert_eq!(
            errors.get("name"),
            Some(&["Ensure this field has no more than 255 characters.".to_owned()][..])
        );
        assert_eq!(
            errors.get("description"),
            Some(&["Ensure this field has no more than 1500 characters.".to_owned()][..])
        );
    }

    #[test]
    fn nested_mode_reads_ingredient_objects() {
        let serializer = RecipeSerializer::new(IngredientWriteMode::Nested);
        let payload = json!({
            "name": "Thai prawn red curry",
            "description": "Description",
            "ingredients": [{ "name": "Prawns" }, { "name": "Ginger" }],
        });

        let create = serializer.validate_create(&payload).unwrap();

        assert_eq!(
            create.recipe,
            NewRecipe::new("Thai prawn red curry".to_owned(), "Description".to_owned())
        );
        assert_eq!(
            create.ingredients,
            IngredientSet::Nested(vec![
                NewIngredient::new("Prawns".to_owned()),
                NewIngredient::new("Ginger".to_owned()),
            ])
        );
    }

    #[test]
    fn nested_mode_reports_every_malformed_entry() {
        let serializer = RecipeSerializer::new(IngredientWriteMode::Nested);
        let payload = json!({
            "name": "Soup",
            "description": "Hot",
            "ingredients": [{ "name": "Leek" }, {}, 3],
        });

        let errors = serializer.validate_create(&payload).unwrap_err();

        assert_eq!(
            errors.get(INGREDIENTS),
            Some(
                &[
                    "[1] name: This field is required.".to_owned(),
                    "[2] Invalid data. Expected a dictionary, but got int.".to_owned(),
                ][..]
            )
        );
        assert!(errors.get("name").is_none());
    }

    #[test]
    fn reference_mode_reads_ids() {
        let serializer = RecipeSerializer::new(IngredientWriteMode::Reference);
        let payload = json!({
            "name": "Soup",
            "description": "Hot",
            "ingredients": [3, "7"],
        });

        let create = serializer.validate_create(&payload).unwrap();
        assert_eq!(create.ingredients, IngredientSet::Existing(vec![3, 7]));

        let errors = serializer
            .validate_create(&json!({
                "name": "Soup",
                "description": "Hot",
                "ingredients": [{ "name": "Leek" }],
            }))
            .unwrap_err();
        assert_eq!(
            errors.get(INGREDIENTS),
            Some(&["Incorrect type. Expected pk value, received dict.".to_owned()][..])
        );
    }

    #[test]
    fn ingredients_must_be_a_list() {
        let serializer = RecipeSerializer::default();

        let errors = serializer
            .validate_update(&json!({ "ingredients": "Salt" }), true)
            .unwrap_err();
        assert_eq!(
            errors.get(INGREDIENTS),
            Some(&["Expected a list of items but got type \"str\".".to_owned()][..])
        );

        let errors = serializer
            .validate_update(&json!({ "ingredients": null }), true)
            .unwrap_err();
        assert_eq!(
            errors.get(INGREDIENTS),
            Some(&[fields::NOT_NULL.to_owned()][..])
        );
    }

    #[test]
    fn partial_update_keeps_omitted_fields_out_of_the_changeset() {
        let serializer = RecipeSerializer::default();

        let update = serializer
            .validate_update(&json!({ "name": "Chicken tikka" }), true)
            .unwrap();

        assert_eq!(update.changes.name.as_deref(), Some("Chicken tikka"));
        assert_eq!(update.changes.description, None);
        assert_eq!(update.ingredients, None);
    }

    #[test]
    fn full_update_requires_every_writable_field() {
        let serializer = RecipeSerializer::default();

        let errors = serializer
            .validate_update(&json!({ "name": "Chicken tikka" }), false)
            .unwrap_err();

        assert!(errors.get("name").is_none());
        assert_eq!(
            errors.get("description"),
            Some(&[fields::REQUIRED.to_owned()][..])
        );
    }

    #[test]
    fn id_in_payload_is_ignored() {
        let serializer = RecipeSerializer::default();

        let create = serializer
            .validate_create(&json!({ "id": 99, "name": "Soup", "description": "Hot" }))
            .unwrap();

        assert_eq!(create.recipe.name, "Soup");
        assert!(create.ingredients.is_empty());
    }
}
