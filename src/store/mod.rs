//! Persistence capability. Handlers hold an `Arc<dyn Store>` and never touch
//! a connection directly; guards and projections operate on the values read
//! through these traits.
//!
//! Two implementations: [`PgStore`] over sqlx/Postgres for production and
//! [`MemoryStore`] over in-process maps for tests and local development.
//! Both enforce the same (user, event) uniqueness pairs.

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    Event, EventCategory, EventFilter, EventUpdate, NewCategory, NewEvent, NewOrganizer,
    NewParticipant, NewRating, NewUser, NewVenue, Organizer, Participant, Rating, Subscription,
    User, Venue,
};

#[async_trait]
pub trait EventStore {
    /// Persist a new event owned by `organizer_id`, including its category
    /// links.
    async fn create_event(&self, organizer_id: Uuid, new: NewEvent) -> StoreResult<Event>;
    async fn get_event(&self, id: Uuid) -> StoreResult<Event>;
    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>>;
    async fn events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>>;
    async fn update_event(&self, id: Uuid, update: EventUpdate) -> StoreResult<Event>;
    async fn delete_event(&self, id: Uuid) -> StoreResult<()>;

    async fn categories_for_event(&self, event_id: Uuid) -> StoreResult<Vec<EventCategory>>;

    /// Idempotent: adding an existing favorite is a no-op.
    async fn add_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    /// Idempotent: removing an absent favorite is a no-op.
    async fn remove_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    async fn is_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn count_events(&self) -> StoreResult<i64>;
    async fn sum_event_prices(&self) -> StoreResult<Decimal>;
}

#[async_trait]
pub trait RegistrationStore {
    async fn create_participant(&self, user_id: Uuid, new: NewParticipant)
        -> StoreResult<Participant>;
    async fn get_participant(&self, id: Uuid) -> StoreResult<Participant>;
    async fn update_participant(
        &self,
        id: Uuid,
        special_requirements: Option<String>,
    ) -> StoreResult<Participant>;
    async fn list_participants(&self) -> StoreResult<Vec<Participant>>;
    async fn delete_participant(&self, id: Uuid) -> StoreResult<()>;
    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    async fn participant_count(&self, event_id: Uuid) -> StoreResult<i64>;
    async fn count_participants(&self) -> StoreResult<i64>;

    async fn create_rating(&self, user_id: Uuid, new: NewRating) -> StoreResult<Rating>;
    async fn get_rating(&self, id: Uuid) -> StoreResult<Rating>;
    async fn list_ratings(&self) -> StoreResult<Vec<Rating>>;
    async fn delete_rating(&self, id: Uuid) -> StoreResult<()>;
    async fn has_rated(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    async fn rating_scores(&self, event_id: Uuid) -> StoreResult<Vec<i32>>;

    /// Get-or-create: returns the existing subscription when one exists.
    async fn subscribe(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Subscription>;
    async fn get_subscription(&self, id: Uuid) -> StoreResult<Subscription>;
    async fn subscriptions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>>;
    async fn delete_subscription(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait DirectoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: Uuid) -> StoreResult<User>;

    async fn create_organizer(&self, new: NewOrganizer) -> StoreResult<Organizer>;
    async fn get_organizer(&self, id: Uuid) -> StoreResult<Organizer>;
    async fn organizer_for_user(&self, user_id: Uuid) -> StoreResult<Option<Organizer>>;
    async fn list_organizers(&self) -> StoreResult<Vec<Organizer>>;
    async fn update_organizer(&self, id: Uuid, company_name: String) -> StoreResult<Organizer>;
    async fn delete_organizer(&self, id: Uuid) -> StoreResult<()>;

    async fn create_venue(&self, new: NewVenue) -> StoreResult<Venue>;
    async fn get_venue(&self, id: Uuid) -> StoreResult<Venue>;
    async fn list_venues(&self) -> StoreResult<Vec<Venue>>;
    async fn update_venue(&self, id: Uuid, new: NewVenue) -> StoreResult<Venue>;
    async fn delete_venue(&self, id: Uuid) -> StoreResult<()>;

    async fn create_category(&self, new: NewCategory) -> StoreResult<EventCategory>;
    async fn get_category(&self, id: Uuid) -> StoreResult<EventCategory>;
    async fn list_categories(&self) -> StoreResult<Vec<EventCategory>>;
    async fn update_category(&self, id: Uuid, new: NewCategory) -> StoreResult<EventCategory>;
    async fn delete_category(&self, id: Uuid) -> StoreResult<()>;
}

/// The full capability handlers depend on.
pub trait Store: EventStore + RegistrationStore + DirectoryStore + Send + Sync {}

impl<T> Store for T where T: EventStore + RegistrationStore + DirectoryStore + Send + Sync {}
