use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::guards::{check_registration, RegistrationSnapshot};
use crate::models::NewParticipant;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

/// Register the caller for an event. The guard reads current rows and
/// decides; the insert is a single row with no further side effects.
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(new): Json<NewParticipant>,
) -> Result<Response, AppError> {
    let event = state.store.get_event(new.event_id).await?;

    let snapshot = RegistrationSnapshot {
        already_registered: state.store.is_registered(event.id, auth.user_id).await?,
        participant_count: state.store.participant_count(event.id).await?,
        max_participants: event.max_participants,
    };
    check_registration(&snapshot)?;

    let participant = state.store.create_participant(auth.user_id, new).await?;
    Ok(created(participant, "Registered for event").into_response())
}

pub async fn list_participants(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Response, AppError> {
    let participants = state.store.list_participants().await?;
    Ok(success(participants, "Participants retrieved").into_response())
}

pub async fn get_participant(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let participant = state.store.get_participant(id).await?;
    Ok(success(participant, "Participant retrieved").into_response())
}

#[derive(Debug, Deserialize)]
pub struct UpdateParticipant {
    pub special_requirements: Option<String>,
}

/// Only the registration's own user may change their requirements.
pub async fn update_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateParticipant>,
) -> Result<Response, AppError> {
    let participant = state.store.get_participant(id).await?;
    if participant.user_id != auth.user_id {
        return Err(AppError::Forbidden(
            "You can only change your own registration".to_string(),
        ));
    }
    let participant = state
        .store
        .update_participant(id, update.special_requirements)
        .await?;
    Ok(success(participant, "Registration updated").into_response())
}

pub async fn delete_participant(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.store.delete_participant(id).await?;
    Ok(empty_success("Registration cancelled").into_response())
}
