use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{blocking, error::ApiResult, json_body, object_id, AppState};
use crate::{
    error::Error,
    repository::RecipeFilter,
    serializers::recipe::{RecipeAction, RecipeView},
};

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub name: Option<String>,
}

/// GET /recipes/?name=
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<RecipeListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RecipeView>>> {
    let Query(query) = query.map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
    let filter = RecipeFilter::from_query(query.name);
    let repository = state.repository.clone();

    let recipes = blocking(move || repository.list_recipes(&filter)).await?;
    debug!(count = recipes.len(), "Listing recipes");

    Ok(Json(
        recipes
            .iter()
            .map(|recipe| state.recipes.render(RecipeAction::List, recipe))
            .collect(),
    ))
}

/// POST /recipes/
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    let payload = json_body(payload)?;
    let serializer = state.recipes;
    let repository = state.repository.clone();

    let recipe = blocking(move || serializer.create(repository.as_ref(), &payload)).await?;
    info!(id = recipe.recipe.id, name = %recipe.recipe, "Created recipe");

    Ok((
        StatusCode::CREATED,
        Json(serializer.render(RecipeAction::Create, &recipe)),
    ))
}

/// GET /recipes/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<RecipeView>> {
    let id = object_id(id)?;
    let repository = state.repository.clone();

    let recipe = blocking(move || repository.get_recipe(id)?.ok_or(Error::NotFound)).await?;

    Ok(Json(state.recipes.render(RecipeAction::Retrieve, &recipe)))
}

/// PUT /recipes/:id/
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<RecipeView>> {
    save(state, id, payload, RecipeAction::Update).await
}

/// PATCH /recipes/:id/
pub async fn partial_update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<RecipeView>> {
    save(state, id, payload, RecipeAction::PartialUpdate).await
}

async fn save(
    state: AppState,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
    action: RecipeAction,
) -> ApiResult<Json<RecipeView>> {
    // an unknown id answers 404 before the body is looked at
    let id = object_id(id)?;
    let repository = state.repository.clone();
    let existing = blocking(move || repository.get_recipe(id)?.ok_or(Error::NotFound)).await?;

    let payload = json_body(payload)?;
    let serializer = state.recipes;
    let repository = state.repository.clone();
    let partial = action == RecipeAction::PartialUpdate;

    let recipe = blocking(move || {
        serializer.update(repository.as_ref(), &existing, &payload, partial)
    })
    .await?;
    info!(id, partial, "Updated recipe");

    Ok(Json(serializer.render(action, &recipe)))
}

/// DELETE /recipes/:id/
pub async fn destroy(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = object_id(id)?;
    let repository = state.repository.clone();

    let deleted = blocking(move || repository.delete_recipe(id)).await?;
    if !deleted {
        return Err(Error::NotFound.into());
    }

    info!(id, "Deleted recipe");
    Ok(StatusCode::NO_CONTENT)
}
