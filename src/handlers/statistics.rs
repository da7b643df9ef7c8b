use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::auth::{require_admin, AuthUser};
use crate::domain::Statistics;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Aggregate totals over the live rows; nothing is cached between requests.
pub async fn get_statistics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    require_admin(state.store.as_ref(), auth).await?;

    let statistics = Statistics {
        total_events: state.store.count_events().await?,
        total_participants: state.store.count_participants().await?,
        total_revenue: state.store.sum_event_prices().await?,
    };
    Ok(success(statistics, "Statistics retrieved").into_response())
}
