//! Table definitions matching `migrations/`.

diesel::table! {
    ingredients (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    recipes (id) {
        id -> Integer,
        name -> Text,
        description -> Text,
    }
}

diesel::table! {
    recipes_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Integer,
        ingredient_id -> Integer,
    }
}

diesel::joinable!(recipes_ingredients -> ingredients (ingredient_id));
diesel::joinable!(recipes_ingredients -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(ingredients, recipes, recipes_ingredients,);
