use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use tracing::info;

use super::{blocking, error::ApiResult, json_body, object_id, AppState};
use crate::{
    error::Error,
    serializers::ingredient::{IngredientSerializer, IngredientView},
};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<IngredientView>>> {
    let repository = state.repository.clone();

    let ingredients = blocking(move || repository.list_ingredients()).await?;

    Ok(Json(
        ingredients
            .iter()
            .map(IngredientSerializer::render)
            .collect(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IngredientView>)> {
    let payload = json_body(payload)?;
    let repository = state.repository.clone();

    let ingredient =
        blocking(move || IngredientSerializer::create(repository.as_ref(), &payload)).await?;
    info!(id = ingredient.id, name = %ingredient, "Created ingredient");

    Ok((
        StatusCode::CREATED,
        Json(IngredientSerializer::render(&ingredient)),
    ))
}

pub async fn retrieve(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<IngredientView>> {
    let id = object_id(id)?;
    let repository = state.repository.clone();

    let ingredient =
        blocking(move || repository.get_ingredient(id)?.ok_or(Error::NotFound)).await?;

    Ok(Json(IngredientSerializer::render(&ingredient)))
}

pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<IngredientView>> {
    save(state, id, payload, false).await
}

pub async fn partial_update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<IngredientView>> {
    save(state, id, payload, true).await
}

async fn save(
    state: AppState,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> ApiResult<Json<IngredientView>> {
    let id = object_id(id)?;
    let repository = state.repository.clone();
    let existing =
        blocking(move || repository.get_ingredient(id)?.ok_or(Error::NotFound)).await?;

    let payload = json_body(payload)?;
    let repository = state.repository.clone();
    let ingredient = blocking(move || {
        IngredientSerializer::update(repository.as_ref(), &existing, &payload, partial)
    })
    .await?;

    Ok(Json(IngredientSerializer::render(&ingredient)))
}

pub async fn destroy(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = object_id(id)?;
    let repository = state.repository.clone();

    if !blocking(move || repository.delete_ingredient(id)).await? {
        return Err(Error::NotFound.into());
    }

    Ok(StatusCode::NO_CONTENT)
}
