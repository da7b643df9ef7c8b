use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::{require_admin, AuthUser};
use crate::models::NewVenue;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

fn validate(new: &NewVenue) -> Result<(), AppError> {
    if new.capacity < 0 {
        return Err(AppError::Validation("capacity must be non-negative".to_string()));
    }
    Ok(())
}

pub async fn create_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(new): Json<NewVenue>,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    validate(&new)?;
    let venue = state.store.create_venue(new).await?;
    Ok(created(venue, "Venue created").into_response())
}

pub async fn list_venues(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    let venues = state.store.list_venues().await?;
    Ok(success(venues, "Venues retrieved").into_response())
}

pub async fn get_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    let venue = state.store.get_venue(id).await?;
    Ok(success(venue, "Venue retrieved").into_response())
}

pub async fn update_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(new): Json<NewVenue>,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    validate(&new)?;
    let venue = state.store.update_venue(id, new).await?;
    Ok(success(venue, "Venue updated").into_response())
}

pub async fn delete_venue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;
    state.store.delete_venue(id).await?;
    Ok(empty_success("Venue deleted").into_response())
}
