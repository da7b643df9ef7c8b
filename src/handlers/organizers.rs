use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{require_admin, AuthUser};
use crate::models::NewOrganizer;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct UpdateOrganizer {
    pub company_name: String,
}

pub async fn create_organizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(new): Json<NewOrganizer>,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    // The linked account must exist.
    state.store.get_user(new.user_id).await?;
    let organizer = state.store.create_organizer(new).await?;
    Ok(created(organizer, "Organizer created").into_response())
}

pub async fn list_organizers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    let organizers = state.store.list_organizers().await?;
    Ok(success(organizers, "Organizers retrieved").into_response())
}

pub async fn get_organizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    let organizer = state.store.get_organizer(id).await?;
    Ok(success(organizer, "Organizer retrieved").into_response())
}

pub async fn update_organizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateOrganizer>,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    let organizer = state
        .store
        .update_organizer(id, update.company_name)
        .await?;
    Ok(success(organizer, "Organizer updated").into_response())
}

pub async fn delete_organizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    state.store.delete_organizer(id).await?;
    Ok(empty_success("Organizer deleted").into_response())
}
