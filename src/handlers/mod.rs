pub mod categories;
pub mod events;
pub mod organizers;
pub mod participants;
pub mod ratings;
pub mod statistics;
pub mod subscriptions;
pub mod venues;

use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "eventum-api",
    };

    success(payload, "Health check successful").into_response()
}
