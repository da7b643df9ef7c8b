use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

/// Callers only ever see their own subscriptions.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    let subscriptions = state.store.subscriptions_for_user(auth.user_id).await?;
    Ok(success(subscriptions, "Subscriptions retrieved").into_response())
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let subscription = state.store.get_subscription(id).await?;
    // Another user's subscription is indistinguishable from a missing one.
    if subscription.user_id != auth.user_id {
        return Err(AppError::NotFound("subscription not found".to_string()));
    }
    state.store.delete_subscription(id).await?;
    Ok(empty_success("Unsubscribed").into_response())
}
