//! Axum routes for the recipe and ingredient resources.

pub mod error;
pub mod ingredients;
pub mod recipes;

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, Path,
    },
    routing::get,
    Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use self::error::{ApiError, ApiResult};
use crate::{
    error::{self as app_error, Error},
    repository::Repository,
    serializers::recipe::RecipeSerializer,
};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub recipes: RecipeSerializer,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>, recipes: RecipeSerializer) -> Self {
        Self {
            repository,
            recipes,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let resources = Router::new()
        .route("/recipes/", get(recipes::list).post(recipes::create))
        .route(
            "/recipes/:id/",
            get(recipes::retrieve)
                .put(recipes::update)
                .patch(recipes::partial_update)
                .delete(recipes::destroy),
        )
        .route(
            "/ingredients/",
            get(ingredients::list).post(ingredients::create),
        )
        .route(
            "/ingredients/:id/",
            get(ingredients::retrieve)
                .put(ingredients::update)
                .patch(ingredients::partial_update)
                .delete(ingredients::destroy),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/recipe", resources)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Runs diesel work on the blocking pool.
async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> app_error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(work)
        .await
        .map_err(Error::from)?;

    Ok(result?)
}

// Ids that don't parse can't name a record
fn object_id(id: Result<Path<i32>, PathRejection>) -> ApiResult<i32> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError(Error::NotFound))
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError(Error::BadRequest(rejection.body_text())))
}
