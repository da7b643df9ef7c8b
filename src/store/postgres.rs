//! Postgres-backed store. Runtime queries over a sqlx pool; schema lives in
//! `migrations/` and is applied by `sqlx::migrate!` at startup.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{
    Event, EventCategory, EventFilter, EventOrdering, EventUpdate, NewCategory, NewEvent,
    NewOrganizer, NewParticipant, NewRating, NewUser, NewVenue, Organizer, Participant, Rating,
    Subscription, User, Venue,
};
use crate::store::{
    DirectoryStore, EventStore, RegistrationStore, StoreError, StoreResult,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn create_event(&self, organizer_id: Uuid, new: NewEvent) -> StoreResult<Event> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;
        let now = Utc::now();
        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events \
             (id, organizer_id, venue_id, title, description, date, max_participants, price, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(organizer_id)
        .bind(new.venue_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.date)
        .bind(new.max_participants)
        .bind(new.price)
        .bind(new.status)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        for category_id in &new.category_ids {
            sqlx::query("INSERT INTO event_categories (event_id, category_id) VALUES ($1, $2)")
                .bind(event.id)
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
        }
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("event"))
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<Event>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT e.* FROM events e WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND e.status = ").push_bind(status);
        }
        if let Some(ref category) = filter.category {
            qb.push(
                " AND EXISTS (SELECT 1 FROM event_categories ec \
                 JOIN categories c ON c.id = ec.category_id \
                 WHERE ec.event_id = e.id AND c.name = ",
            )
            .push_bind(category.clone())
            .push(")");
        }
        if let Some(ref search) = filter.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (e.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(match filter.ordering {
            Some(EventOrdering::DateDesc) => " ORDER BY e.date DESC",
            Some(EventOrdering::PriceAsc) => " ORDER BY e.price ASC",
            Some(EventOrdering::PriceDesc) => " ORDER BY e.price DESC",
            Some(EventOrdering::DateAsc) | None => " ORDER BY e.date ASC",
        });
        qb.build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn events_by_organizer(&self, organizer_id: Uuid) -> StoreResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE organizer_id = $1 ORDER BY date ASC",
        )
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn update_event(&self, id: Uuid, update: EventUpdate) -> StoreResult<Event> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;
        let current = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("event"))?;

        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET venue_id = $2, title = $3, description = $4, date = $5, \
             max_participants = $6, price = $7, status = $8, updated_at = $9 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(update.venue_id.unwrap_or(current.venue_id))
        .bind(update.title.unwrap_or(current.title))
        .bind(update.description.unwrap_or(current.description))
        .bind(update.date.unwrap_or(current.date))
        .bind(update.max_participants.unwrap_or(current.max_participants))
        .bind(update.price.unwrap_or(current.price))
        .bind(update.status.unwrap_or(current.status))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        if let Some(category_ids) = update.category_ids {
            sqlx::query("DELETE FROM event_categories WHERE event_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
            for category_id in category_ids {
                sqlx::query(
                    "INSERT INTO event_categories (event_id, category_id) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
            }
        }
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(event)
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("event"));
        }
        Ok(())
    }

    async fn categories_for_event(&self, event_id: Uuid) -> StoreResult<Vec<EventCategory>> {
        sqlx::query_as::<_, EventCategory>(
            "SELECT c.* FROM categories c \
             JOIN event_categories ec ON ec.category_id = c.id \
             WHERE ec.event_id = $1 ORDER BY c.name",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn add_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO event_favorites (event_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    async fn remove_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM event_favorites WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    async fn is_favorite(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM event_favorites WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn count_events(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn sum_event_prices(&self) -> StoreResult<Decimal> {
        sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(price), 0) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

#[async_trait]
impl RegistrationStore for PgStore {
    async fn create_participant(
        &self,
        user_id: Uuid,
        new: NewParticipant,
    ) -> StoreResult<Participant> {
        sqlx::query_as::<_, Participant>(
            "INSERT INTO participants (id, user_id, event_id, special_requirements, registered_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new.event_id)
        .bind(&new.special_requirements)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_participant(&self, id: Uuid) -> StoreResult<Participant> {
        sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("participant"))
    }

    async fn update_participant(
        &self,
        id: Uuid,
        special_requirements: Option<String>,
    ) -> StoreResult<Participant> {
        sqlx::query_as::<_, Participant>(
            "UPDATE participants SET special_requirements = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(special_requirements)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::not_found("participant"))
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        sqlx::query_as::<_, Participant>("SELECT * FROM participants ORDER BY registered_at")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_participant(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("participant"));
        }
        Ok(())
    }

    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM participants WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn participant_count(&self, event_id: Uuid) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM participants WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn count_participants(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM participants")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn create_rating(&self, user_id: Uuid, new: NewRating) -> StoreResult<Rating> {
        sqlx::query_as::<_, Rating>(
            "INSERT INTO ratings (id, user_id, event_id, score, comment, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new.event_id)
        .bind(new.score)
        .bind(&new.comment)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_rating(&self, id: Uuid) -> StoreResult<Rating> {
        sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("rating"))
    }

    async fn list_ratings(&self) -> StoreResult<Vec<Rating>> {
        sqlx::query_as::<_, Rating>("SELECT * FROM ratings ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_rating(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("rating"));
        }
        Ok(())
    }

    async fn has_rated(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ratings WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn rating_scores(&self, event_id: Uuid) -> StoreResult<Vec<i32>> {
        sqlx::query_scalar::<_, i32>("SELECT score FROM ratings WHERE event_id = $1")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn subscribe(&self, event_id: Uuid, user_id: Uuid) -> StoreResult<Subscription> {
        // Get-or-create in one statement; the no-op update makes RETURNING
        // yield the existing row on conflict.
        sqlx::query_as::<_, Subscription>(
            "INSERT INTO subscriptions (id, user_id, event_id, subscribed_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, event_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(event_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_subscription(&self, id: Uuid) -> StoreResult<Subscription> {
        sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("subscription"))
    }

    async fn subscriptions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY subscribed_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn delete_subscription(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("subscription"));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, is_admin, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.is_admin)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("user"))
    }

    async fn create_organizer(&self, new: NewOrganizer) -> StoreResult<Organizer> {
        let now = Utc::now();
        sqlx::query_as::<_, Organizer>(
            "INSERT INTO organizers (id, user_id, company_name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.company_name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_organizer(&self, id: Uuid) -> StoreResult<Organizer> {
        sqlx::query_as::<_, Organizer>("SELECT * FROM organizers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("organizer"))
    }

    async fn organizer_for_user(&self, user_id: Uuid) -> StoreResult<Option<Organizer>> {
        sqlx::query_as::<_, Organizer>("SELECT * FROM organizers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn list_organizers(&self) -> StoreResult<Vec<Organizer>> {
        sqlx::query_as::<_, Organizer>("SELECT * FROM organizers ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_organizer(&self, id: Uuid, company_name: String) -> StoreResult<Organizer> {
        sqlx::query_as::<_, Organizer>(
            "UPDATE organizers SET company_name = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(company_name)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::not_found("organizer"))
    }

    async fn delete_organizer(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM organizers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("organizer"));
        }
        Ok(())
    }

    async fn create_venue(&self, new: NewVenue) -> StoreResult<Venue> {
        let now = Utc::now();
        sqlx::query_as::<_, Venue>(
            "INSERT INTO venues (id, name, address, capacity, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.address)
        .bind(new.capacity)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_venue(&self, id: Uuid) -> StoreResult<Venue> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("venue"))
    }

    async fn list_venues(&self) -> StoreResult<Vec<Venue>> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_venue(&self, id: Uuid, new: NewVenue) -> StoreResult<Venue> {
        sqlx::query_as::<_, Venue>(
            "UPDATE venues SET name = $2, address = $3, capacity = $4, updated_at = $5 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&new.name)
        .bind(&new.address)
        .bind(new.capacity)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::not_found("venue"))
    }

    async fn delete_venue(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("venue"));
        }
        Ok(())
    }

    async fn create_category(&self, new: NewCategory) -> StoreResult<EventCategory> {
        sqlx::query_as::<_, EventCategory>(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<EventCategory> {
        sqlx::query_as::<_, EventCategory>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::not_found("category"))
    }

    async fn list_categories(&self) -> StoreResult<Vec<EventCategory>> {
        sqlx::query_as::<_, EventCategory>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_category(&self, id: Uuid, new: NewCategory) -> StoreResult<EventCategory> {
        sqlx::query_as::<_, EventCategory>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&new.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?
        .ok_or(StoreError::not_found("category"))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("category"));
        }
        Ok(())
    }
}
