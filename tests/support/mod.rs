use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use eventum_server::auth::USER_ID_HEADER;
use eventum_server::models::{Event, NewEvent, NewOrganizer, NewUser};
use eventum_server::routes::create_routes;
use eventum_server::state::AppState;
use eventum_server::store::{DirectoryStore, EventStore, MemoryStore, Store};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(Arc::clone(&store) as Arc<dyn Store>);
    TestApp {
        router: create_routes(state),
        store,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn seed_user(&self, is_admin: bool) -> Uuid {
        self.store
            .create_user(NewUser {
                name: "Test User".to_string(),
                email: format!("{}@example.com", Uuid::new_v4()),
                is_admin,
            })
            .await
            .unwrap()
            .id
    }

    /// A user with an organizer profile; returns (user_id, organizer_id).
    pub async fn seed_organizer(&self) -> (Uuid, Uuid) {
        let user_id = self.seed_user(false).await;
        let organizer = self
            .store
            .create_organizer(NewOrganizer {
                user_id,
                company_name: "Acme Events".to_string(),
            })
            .await
            .unwrap();
        (user_id, organizer.id)
    }

    pub async fn seed_event(&self, organizer_id: Uuid, max_participants: i32) -> Event {
        self.seed_event_with(
            organizer_id,
            "Rust Meetup",
            max_participants,
            Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap(),
            Decimal::new(2500, 2),
        )
        .await
    }

    pub async fn seed_event_with(
        &self,
        organizer_id: Uuid,
        title: &str,
        max_participants: i32,
        date: DateTime<Utc>,
        price: Decimal,
    ) -> Event {
        self.store
            .create_event(
                organizer_id,
                NewEvent {
                    title: title.to_string(),
                    description: "Monthly community meetup".to_string(),
                    date,
                    venue_id: None,
                    max_participants,
                    price,
                    status: Default::default(),
                    category_ids: vec![],
                },
            )
            .await
            .unwrap()
    }
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
