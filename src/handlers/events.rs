use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::domain::stats::average_score;
use crate::models::{Event, EventDetails, EventFilter, EventUpdate, NewEvent, Organizer};
use crate::state::AppState;
use crate::store::{Store, StoreError};
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

/// Assemble the full event payload: related rows plus the per-request
/// computed fields (spec'd to be recomputed every time, never cached).
pub(crate) async fn load_details(
    store: &dyn Store,
    event: Event,
    caller: Option<Uuid>,
) -> Result<EventDetails, AppError> {
    let organizer = match store.get_organizer(event.organizer_id).await {
        Ok(organizer) => Some(organizer),
        Err(StoreError::NotFound { .. }) => None,
        Err(e) => return Err(e.into()),
    };
    let venue = match event.venue_id {
        Some(venue_id) => match store.get_venue(venue_id).await {
            Ok(venue) => Some(venue),
            Err(StoreError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        },
        None => None,
    };
    let categories = store.categories_for_event(event.id).await?;
    let is_favorite = match caller {
        Some(user_id) => store.is_favorite(event.id, user_id).await?,
        None => false,
    };
    let scores = store.rating_scores(event.id).await?;
    let participants_count = store.participant_count(event.id).await?;

    Ok(EventDetails {
        event,
        organizer,
        venue,
        categories,
        is_favorite,
        average_rating: average_score(&scores),
        participants_count,
    })
}

async fn require_organizer(store: &dyn Store, auth: AuthUser) -> Result<Organizer, AppError> {
    store
        .organizer_for_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Only organizers can manage events".to_string()))
}

/// Owning organizer or an administrator.
async fn authorize_event_owner(
    store: &dyn Store,
    event: &Event,
    auth: AuthUser,
) -> Result<(), AppError> {
    if let Some(organizer) = store.organizer_for_user(auth.user_id).await? {
        if organizer.id == event.organizer_id {
            return Ok(());
        }
    }
    match store.get_user(auth.user_id).await {
        Ok(user) if user.is_admin => Ok(()),
        Ok(_) | Err(StoreError::NotFound { .. }) => Err(AppError::Forbidden(
            "You do not manage this event".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Referenced venue and categories must exist; shared by create and update
/// so a stale id is a 400, not a foreign-key blowup.
async fn validate_references(
    store: &dyn Store,
    venue_id: Option<Uuid>,
    category_ids: &[Uuid],
) -> Result<(), AppError> {
    if let Some(venue_id) = venue_id {
        match store.get_venue(venue_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(AppError::Validation("unknown venue".to_string()))
            }
            Err(e) => return Err(e.into()),
        }
    }
    for category_id in category_ids {
        match store.get_category(*category_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(AppError::Validation("unknown category".to_string()))
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub async fn list_events(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Query(filter): Query<EventFilter>,
) -> Result<Response, AppError> {
    let events = state.store.list_events(&filter).await?;
    let mut payload = Vec::with_capacity(events.len());
    for event in events {
        payload.push(load_details(state.store.as_ref(), event, caller.user_id()).await?);
    }
    Ok(success(payload, "Events retrieved").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.store.get_event(id).await?;
    let details = load_details(state.store.as_ref(), event, caller.user_id()).await?;
    Ok(success(details, "Event retrieved").into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(new): Json<NewEvent>,
) -> Result<Response, AppError> {
    let organizer = require_organizer(state.store.as_ref(), auth).await?;
    if new.max_participants < 0 {
        return Err(AppError::Validation(
            "max_participants must be non-negative".to_string(),
        ));
    }
    if new.price.is_sign_negative() {
        return Err(AppError::Validation("price must be non-negative".to_string()));
    }
    validate_references(state.store.as_ref(), new.venue_id, &new.category_ids).await?;
    let event = state.store.create_event(organizer.id, new).await?;
    let details = load_details(state.store.as_ref(), event, Some(auth.user_id)).await?;
    Ok(created(details, "Event created").into_response())
}

pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<EventUpdate>,
) -> Result<Response, AppError> {
    let event = state.store.get_event(id).await?;
    authorize_event_owner(state.store.as_ref(), &event, auth).await?;
    if update.max_participants.is_some_and(|max| max < 0) {
        return Err(AppError::Validation(
            "max_participants must be non-negative".to_string(),
        ));
    }
    if update.price.is_some_and(|price| price.is_sign_negative()) {
        return Err(AppError::Validation("price must be non-negative".to_string()));
    }
    validate_references(
        state.store.as_ref(),
        update.venue_id.flatten(),
        update.category_ids.as_deref().unwrap_or(&[]),
    )
    .await?;
    let updated = state.store.update_event(id, update).await?;
    let details = load_details(state.store.as_ref(), updated, Some(auth.user_id)).await?;
    Ok(success(details, "Event updated").into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.store.get_event(id).await?;
    authorize_event_owner(state.store.as_ref(), &event, auth).await?;
    state.store.delete_event(id).await?;
    Ok(empty_success("Event deleted").into_response())
}

pub async fn add_to_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.store.get_event(id).await?;
    state.store.add_favorite(event.id, auth.user_id).await?;
    Ok(empty_success("Added to favorites").into_response())
}

pub async fn remove_from_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.store.get_event(id).await?;
    state.store.remove_favorite(event.id, auth.user_id).await?;
    Ok(empty_success("Removed from favorites").into_response())
}

pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.store.get_event(id).await?;
    let subscription = state.store.subscribe(event.id, auth.user_id).await?;
    Ok(success(subscription, "Subscribed to event notifications").into_response())
}

/// Events belonging to the caller's organizer profile.
pub async fn my_events(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    let organizer = require_organizer(state.store.as_ref(), auth).await?;
    let events = state.store.events_by_organizer(organizer.id).await?;
    let mut payload = Vec::with_capacity(events.len());
    for event in events {
        payload.push(load_details(state.store.as_ref(), event, Some(auth.user_id)).await?);
    }
    Ok(success(payload, "Events retrieved").into_response())
}
