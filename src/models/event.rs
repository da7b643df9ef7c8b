use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{EventCategory, Organizer, Venue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
pub enum EventStatus {
    Planned,
    Active,
    Cancelled,
    Completed,
}

impl Default for EventStatus {
    fn default() -> Self {
        EventStatus::Planned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub venue_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub max_participants: i32,
    pub price: Decimal,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event as served to clients: the row plus its related records and the
/// per-request computed fields. Never cached; rebuilt on every read.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub organizer: Option<Organizer>,
    pub venue: Option<Venue>,
    pub categories: Vec<EventCategory>,
    /// False for anonymous callers.
    pub is_favorite: bool,
    /// 0 when the event has no ratings.
    pub average_rating: f64,
    pub participants_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub venue_id: Option<Uuid>,
    pub max_participants: i32,
    pub price: Decimal,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// `null` detaches the venue; an absent field leaves it alone.
    #[serde(default, deserialize_with = "double_option")]
    pub venue_id: Option<Option<Uuid>>,
    pub max_participants: Option<i32>,
    pub price: Option<Decimal>,
    pub status: Option<EventStatus>,
    pub category_ids: Option<Vec<Uuid>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventOrdering {
    #[serde(rename = "date")]
    DateAsc,
    #[serde(rename = "-date")]
    DateDesc,
    #[serde(rename = "price")]
    PriceAsc,
    #[serde(rename = "-price")]
    PriceDesc,
}

/// Query-string filters for the event listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    /// Exact category name.
    pub category: Option<String>,
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    pub ordering: Option<EventOrdering>,
}
