//! In-memory store for tests and local development. Mirrors the database
//! schema's uniqueness constraints so guard-bypassing writes fail the same
//! way they would against Postgres.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    Event, EventCategory, EventFilter, EventOrdering, EventUpdate, NewCategory, NewEvent,
    NewOrganizer, NewParticipant, NewRating, NewUser, NewVenue, Organizer, Participant, Rating,
    Subscription, User, Venue,
};
use crate::store::{
    DirectoryStore, EventStore, RegistrationStore, StoreError, StoreResult,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    organizers: HashMap<Uuid, Organizer>,
    venues: HashMap<Uuid, Venue>,
    categories: HashMap<Uuid, EventCategory>,
    events: HashMap<Uuid, Event>,
    event_categories: HashMap<Uuid, Vec<Uuid>>,
    favorites: HashSet<(Uuid, Uuid)>,
    participants: HashMap<Uuid, Participant>,
    ratings: HashMap<Uuid, Rating>,
    subscriptions: HashMap<Uuid, Subscription>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(tables: &Tables, event: &Event, filter: &EventFilter) -> bool {
    if let Some(status) = filter.status {
        if event.status != status {
            return false;
        }
    }
    if let Some(ref category) = filter.category {
        let linked = tables
            .event_categories
            .get(&event.id)
            .map(|ids| {
                ids.iter().any(|id| {
                    tables
                        .categories
                        .get(id)
                        .is_some_and(|c| c.name == *category)
                })
            })
            .unwrap_or(false);
        if !linked {
            return false;
        }
    }
    if let Some(ref search) = filter.search {
        let needle = search.to_lowercase();
        if !event.title.to_lowercase().contains(&needle)
            && !event.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

fn sort_events(events: &mut [Event], ordering: Option<EventOrdering>) {
    match ordering.unwrap_or(EventOrdering::DateAsc) {
        EventOrdering::DateAsc => events.sort_by_key(|e| e.date),
        EventOrdering::DateDesc => events.sort_by_key(|e| std::cmp::Reverse(e.date)),
        EventOrdering::PriceAsc => events.sort_by_key(|e| e.price),
        EventOrdering::PriceDesc => events.sort_by_key(|e| std::cmp::Reverse(e.price)),
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, organizer_id: Uuid, new: NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.write();
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id,
            venue_id: new.venue_id,
            title: new.title,
            description: new.description,
            date: new.date,
            max_participants: new.max_participants,
            price: new.price,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        tables.event_categories.insert(event.id, new.category_ids);
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Event> {
        self.tables
            .read()
            .events
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("event"))
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let tables = self.tables.read();
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| matches_filter(&tables, e, filter))
            .cloned()
            .collect();
        sort_events(&mut events, filter.ordering);
        Ok(events)
    }

    async fn events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>> {
        let tables = self.tables.read();
        let mut events: Vec<Event> = tables
            .events
            .values()
            .filter(|e| e.organizer_id == organizer_id)
            .cloned()
            .collect();
        sort_events(&mut events, None);
        Ok(events)
    }

    async fn update_event(&self, id: Uuid, update: EventUpdate) -> StoreResult<Event> {
        let mut tables = self.tables.write();
        // Existence first, or a failed update would leave dangling links.
        if !tables.events.contains_key(&id) {
            return Err(StoreError::not_found("event"));
        }
        if let Some(category_ids) = update.category_ids.clone() {
            tables.event_categories.insert(id, category_ids);
        }
        let event = tables
            .events
            .get_mut(&id)
            .ok_or(StoreError::not_found("event"))?;
        if let Some(title) = update.title {
            event.title = title;
        }
        if let Some(description) = update.description {
            event.description = description;
        }
        if let Some(date) = update.date {
            event.date = date;
        }
        if let Some(venue_id) = update.venue_id {
            event.venue_id = venue_id;
        }
        if let Some(max_participants) = update.max_participants {
            event.max_participants = max_participants;
        }
        if let Some(price) = update.price {
            event.price = price;
        }
        if let Some(status) = update.status {
            event.status = status;
        }
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables
            .events
            .remove(&id)
            .ok_or(StoreError::not_found("event"))?;
        // Same cascade the schema declares.
        tables.event_categories.remove(&id);
        tables.favorites.retain(|(event_id, _)| *event_id != id);
        tables.participants.retain(|_, p| p.event_id != id);
        tables.ratings.retain(|_, r| r.event_id != id);
        tables.subscriptions.retain(|_, s| s.event_id != id);
        Ok(())
    }

    async fn categories_for_event(&self, event_id: Uuid) -> StoreResult<Vec<EventCategory>> {
        let tables = self.tables.read();
        let ids = tables.event_categories.get(&event_id);
        Ok(ids
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.categories.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn add_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.tables.write().favorites.insert((event_id, user_id));
        Ok(())
    }

    async fn remove_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.tables.write().favorites.remove(&(event_id, user_id));
        Ok(())
    }

    async fn is_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.read().favorites.contains(&(event_id, user_id)))
    }

    async fn count_events(&self) -> StoreResult<i64> {
        Ok(self.tables.read().events.len() as i64)
    }

    async fn sum_event_prices(&self) -> StoreResult<Decimal> {
        Ok(self.tables.read().events.values().map(|e| e.price).sum())
    }
}

#[async_trait]
impl RegistrationStore for MemoryStore {
    async fn create_participant(
        &self,
        user_id: Uuid,
        new: NewParticipant,
    ) -> StoreResult<Participant> {
        let mut tables = self.tables.write();
        if tables
            .participants
            .values()
            .any(|p| p.user_id == user_id && p.event_id == new.event_id)
        {
            return Err(StoreError::Conflict(
                "duplicate key value violates participants (user_id, event_id)".to_string(),
            ));
        }
        let participant = Participant {
            id: Uuid::new_v4(),
            user_id,
            event_id: new.event_id,
            special_requirements: new.special_requirements,
            registered_at: Utc::now(),
        };
        tables.participants.insert(participant.id, participant.clone());
        Ok(participant)
    }

    async fn get_participant(&self, id: Uuid) -> StoreResult<Participant> {
        self.tables
            .read()
            .participants
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("participant"))
    }

    async fn update_participant(
        &self,
        id: Uuid,
        special_requirements: Option<String>,
    ) -> StoreResult<Participant> {
        let mut tables = self.tables.write();
        let participant = tables
            .participants
            .get_mut(&id)
            .ok_or(StoreError::not_found("participant"))?;
        participant.special_requirements = special_requirements;
        Ok(participant.clone())
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        let mut participants: Vec<Participant> =
            self.tables.read().participants.values().cloned().collect();
        participants.sort_by_key(|p| p.registered_at);
        Ok(participants)
    }

    async fn delete_participant(&self, id: Uuid) -> StoreResult<()> {
        self.tables
            .write()
            .participants
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::not_found("participant"))
    }

    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .participants
            .values()
            .any(|p| p.event_id == event_id && p.user_id == user_id))
    }

    async fn participant_count(&self, event_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .tables
            .read()
            .participants
            .values()
            .filter(|p| p.event_id == event_id)
            .count() as i64)
    }

    async fn count_participants(&self) -> StoreResult<i64> {
        Ok(self.tables.read().participants.len() as i64)
    }

    async fn create_rating(&self, user_id: Uuid, new: NewRating) -> StoreResult<Rating> {
        let mut tables = self.tables.write();
        if tables
            .ratings
            .values()
            .any(|r| r.user_id == user_id && r.event_id == new.event_id)
        {
            return Err(StoreError::Conflict(
                "duplicate key value violates ratings (user_id, event_id)".to_string(),
            ));
        }
        let rating = Rating {
            id: Uuid::new_v4(),
            user_id,
            event_id: new.event_id,
            score: new.score,
            comment: new.comment,
            created_at: Utc::now(),
        };
        tables.ratings.insert(rating.id, rating.clone());
        Ok(rating)
    }

    async fn get_rating(&self, id: Uuid) -> StoreResult<Rating> {
        self.tables
            .read()
            .ratings
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("rating"))
    }

    async fn list_ratings(&self) -> StoreResult<Vec<Rating>> {
        let mut ratings: Vec<Rating> = self.tables.read().ratings.values().cloned().collect();
        ratings.sort_by_key(|r| r.created_at);
        Ok(ratings)
    }

    async fn delete_rating(&self, id: Uuid) -> StoreResult<()> {
        self.tables
            .write()
            .ratings
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::not_found("rating"))
    }

    async fn has_rated(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .ratings
            .values()
            .any(|r| r.event_id == event_id && r.user_id == user_id))
    }

    async fn rating_scores(&self, event_id: Uuid) -> StoreResult<Vec<i32>> {
        Ok(self
            .tables
            .read()
            .ratings
            .values()
            .filter(|r| r.event_id == event_id)
            .map(|r| r.score)
            .collect())
    }

    async fn subscribe(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Subscription> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .subscriptions
            .values()
            .find(|s| s.event_id == event_id && s.user_id == user_id)
        {
            return Ok(existing.clone());
        }
        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            subscribed_at: Utc::now(),
        };
        tables
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn get_subscription(&self, id: Uuid) -> StoreResult<Subscription> {
        self.tables
            .read()
            .subscriptions
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("subscription"))
    }

    async fn subscriptions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>> {
        let mut subscriptions: Vec<Subscription> = self
            .tables
            .read()
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        subscriptions.sort_by_key(|s| s.subscribed_at);
        Ok(subscriptions)
    }

    async fn delete_subscription(&self, id: Uuid) -> StoreResult<()> {
        self.tables
            .write()
            .subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::not_found("subscription"))
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            is_admin: new.is_admin,
            created_at: Utc::now(),
        };
        self.tables.write().users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<User> {
        self.tables
            .read()
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("user"))
    }

    async fn create_organizer(&self, new: NewOrganizer) -> StoreResult<Organizer> {
        let mut tables = self.tables.write();
        if tables.organizers.values().any(|o| o.user_id == new.user_id) {
            return Err(StoreError::Conflict(
                "duplicate key value violates organizers (user_id)".to_string(),
            ));
        }
        let now = Utc::now();
        let organizer = Organizer {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            company_name: new.company_name,
            created_at: now,
            updated_at: now,
        };
        tables.organizers.insert(organizer.id, organizer.clone());
        Ok(organizer)
    }

    async fn get_organizer(&self, id: Uuid) -> StoreResult<Organizer> {
        self.tables
            .read()
            .organizers
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("organizer"))
    }

    async fn organizer_for_user(&self, user_id: Uuid) -> StoreResult<Option<Organizer>> {
        Ok(self
            .tables
            .read()
            .organizers
            .values()
            .find(|o| o.user_id == user_id)
            .cloned())
    }

    async fn list_organizers(&self) -> StoreResult<Vec<Organizer>> {
        let mut organizers: Vec<Organizer> =
            self.tables.read().organizers.values().cloned().collect();
        organizers.sort_by_key(|o| o.created_at);
        Ok(organizers)
    }

    async fn update_organizer(&self, id: Uuid, company_name: String) -> StoreResult<Organizer> {
        let mut tables = self.tables.write();
        let organizer = tables
            .organizers
            .get_mut(&id)
            .ok_or(StoreError::not_found("organizer"))?;
        organizer.company_name = company_name;
        organizer.updated_at = Utc::now();
        Ok(organizer.clone())
    }

    async fn delete_organizer(&self, id: Uuid) -> StoreResult<()> {
        self.tables
            .write()
            .organizers
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::not_found("organizer"))
    }

    async fn create_venue(&self, new: NewVenue) -> StoreResult<Venue> {
        let now = Utc::now();
        let venue = Venue {
            id: Uuid::new_v4(),
            name: new.name,
            address: new.address,
            capacity: new.capacity,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn get_venue(&self, id: Uuid) -> StoreResult<Venue> {
        self.tables
            .read()
            .venues
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("venue"))
    }

    async fn list_venues(&self) -> StoreResult<Vec<Venue>> {
        let mut venues: Vec<Venue> = self.tables.read().venues.values().cloned().collect();
        venues.sort_by_key(|v| v.created_at);
        Ok(venues)
    }

    async fn update_venue(&self, id: Uuid, new: NewVenue) -> StoreResult<Venue> {
        let mut tables = self.tables.write();
        let venue = tables
            .venues
            .get_mut(&id)
            .ok_or(StoreError::not_found("venue"))?;
        venue.name = new.name;
        venue.address = new.address;
        venue.capacity = new.capacity;
        venue.updated_at = Utc::now();
        Ok(venue.clone())
    }

    async fn delete_venue(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables
            .venues
            .remove(&id)
            .ok_or(StoreError::not_found("venue"))?;
        // Schema uses ON DELETE SET NULL for events.venue_id.
        for event in tables.events.values_mut() {
            if event.venue_id == Some(id) {
                event.venue_id = None;
            }
        }
        Ok(())
    }

    async fn create_category(&self, new: NewCategory) -> StoreResult<EventCategory> {
        let category = EventCategory {
            id: Uuid::new_v4(),
            name: new.name,
        };
        self.tables
            .write()
            .categories
            .insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<EventCategory> {
        self.tables
            .read()
            .categories
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("category"))
    }

    async fn list_categories(&self) -> StoreResult<Vec<EventCategory>> {
        let mut categories: Vec<EventCategory> =
            self.tables.read().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update_category(&self, id: Uuid, new: NewCategory) -> StoreResult<EventCategory> {
        let mut tables = self.tables.write();
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(StoreError::not_found("category"))?;
        category.name = new.name;
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables
            .categories
            .remove(&id)
            .ok_or(StoreError::not_found("category"))?;
        for links in tables.event_categories.values_mut() {
            links.retain(|cid| *cid != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_event(max: i32) -> NewEvent {
        NewEvent {
            title: "Rust Meetup".to_string(),
            description: "Monthly meetup".to_string(),
            date: Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap(),
            venue_id: None,
            max_participants: max,
            price: Decimal::new(2500, 2),
            status: Default::default(),
            category_ids: vec![],
        }
    }

    fn registration(event_id: Uuid) -> NewParticipant {
        NewParticipant {
            event_id,
            special_requirements: None,
        }
    }

    #[tokio::test]
    async fn duplicate_participant_pair_is_a_conflict() {
        let store = MemoryStore::new();
        let event = store.create_event(Uuid::new_v4(), new_event(10)).await.unwrap();
        let user = Uuid::new_v4();

        store.create_participant(user, registration(event.id)).await.unwrap();
        let second = store.create_participant(user, registration(event.id)).await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn subscribe_is_get_or_create() {
        let store = MemoryStore::new();
        let (event, user) = (Uuid::new_v4(), Uuid::new_v4());

        let first = store.subscribe(event, user).await.unwrap();
        let second = store.subscribe(event, user).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.subscriptions_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn favorites_are_idempotent() {
        let store = MemoryStore::new();
        let (event, user) = (Uuid::new_v4(), Uuid::new_v4());

        store.add_favorite(event, user).await.unwrap();
        store.add_favorite(event, user).await.unwrap();
        assert!(store.is_favorite(event, user).await.unwrap());

        store.remove_favorite(event, user).await.unwrap();
        store.remove_favorite(event, user).await.unwrap();
        assert!(!store.is_favorite(event, user).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_an_event_cascades() {
        let store = MemoryStore::new();
        let event = store.create_event(Uuid::new_v4(), new_event(10)).await.unwrap();
        let user = Uuid::new_v4();
        store.create_participant(user, registration(event.id)).await.unwrap();
        store.subscribe(event.id, user).await.unwrap();
        store.add_favorite(event.id, user).await.unwrap();

        store.delete_event(event.id).await.unwrap();
        assert_eq!(store.count_participants().await.unwrap(), 0);
        assert!(store.subscriptions_for_user(user).await.unwrap().is_empty());
        assert!(!store.is_favorite(event.id, user).await.unwrap());
    }

    #[tokio::test]
    async fn one_organizer_profile_per_user() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                is_admin: false,
            })
            .await
            .unwrap();

        store
            .create_organizer(NewOrganizer {
                user_id: user.id,
                company_name: "Acme Events".to_string(),
            })
            .await
            .unwrap();
        let second = store
            .create_organizer(NewOrganizer {
                user_id: user.id,
                company_name: "Other Co".to_string(),
            })
            .await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn updating_a_missing_event_leaves_no_links() {
        let store = MemoryStore::new();
        let category = store
            .create_category(NewCategory {
                name: "Music".to_string(),
            })
            .await
            .unwrap();

        let ghost = Uuid::new_v4();
        let update = EventUpdate {
            category_ids: Some(vec![category.id]),
            ..Default::default()
        };
        let result = store.update_event(ghost, update).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.categories_for_event(ghost).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn event_filters_apply() {
        let store = MemoryStore::new();
        let organizer = Uuid::new_v4();
        let mut workshop = new_event(10);
        workshop.title = "Tokio Workshop".to_string();
        let meetup = new_event(10);
        store.create_event(organizer, workshop).await.unwrap();
        store.create_event(organizer, meetup).await.unwrap();

        let filter = EventFilter {
            search: Some("workshop".to_string()),
            ..Default::default()
        };
        let found = store.list_events(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Tokio Workshop");
    }
}
