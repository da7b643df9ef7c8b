use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::NewCategory;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn list_categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let categories = state.store.list_categories().await?;
    Ok(success(categories, "Categories retrieved").into_response())
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let category = state.store.get_category(id).await?;
    Ok(success(category, "Category retrieved").into_response())
}

pub async fn create_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(new): Json<NewCategory>,
) -> Result<Response, AppError> {
    let category = state.store.create_category(new).await?;
    Ok(created(category, "Category created").into_response())
}

pub async fn update_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(new): Json<NewCategory>,
) -> Result<Response, AppError> {
    let category = state.store.update_category(id, new).await?;
    Ok(success(category, "Category updated").into_response())
}

pub async fn delete_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.store.delete_category(id).await?;
    Ok(empty_success("Category deleted").into_response())
}
