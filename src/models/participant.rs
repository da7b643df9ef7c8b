use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub special_requirements: Option<String>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewParticipant {
    pub event_id: Uuid,
    pub special_requirements: Option<String>,
}
