use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::guards::{check_rating, RatingSnapshot};
use crate::models::NewRating;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn create_rating(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(new): Json<NewRating>,
) -> Result<Response, AppError> {
    if new.score < 0 {
        return Err(AppError::Validation("score must be non-negative".to_string()));
    }
    let event = state.store.get_event(new.event_id).await?;

    let snapshot = RatingSnapshot {
        is_participant: state.store.is_registered(event.id, auth.user_id).await?,
        already_rated: state.store.has_rated(event.id, auth.user_id).await?,
    };
    check_rating(&snapshot)?;

    let rating = state.store.create_rating(auth.user_id, new).await?;
    Ok(created(rating, "Rating recorded").into_response())
}

pub async fn list_ratings(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Response, AppError> {
    let ratings = state.store.list_ratings().await?;
    Ok(success(ratings, "Ratings retrieved").into_response())
}

pub async fn get_rating(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let rating = state.store.get_rating(id).await?;
    Ok(success(rating, "Rating retrieved").into_response())
}

pub async fn delete_rating(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.store.delete_rating(id).await?;
    Ok(empty_success("Rating deleted").into_response())
}
