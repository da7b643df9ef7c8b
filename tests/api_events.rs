//! Event resource behavior: computed payload fields, favorites, filters,
//! permissions and the admin statistics endpoint.

mod support;

use axum::http::{Method, StatusCode};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use support::{error_code, spawn_app};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn unrated_event_averages_exactly_zero() {
    let app = spawn_app();
    let (_, organizer_id) = app.seed_organizer().await;
    let event = app.seed_event(organizer_id, 10).await;

    let (status, body) = app
        .request(Method::GET, &format!("/events/{}", event.id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["average_rating"], 0.0);
    assert_eq!(body["data"]["participants_count"], 0);
    assert_eq!(body["data"]["is_favorite"], false);
}

#[tokio::test]
async fn computed_fields_reflect_current_rows() {
    let app = spawn_app();
    let (_, organizer_id) = app.seed_organizer().await;
    let event = app.seed_event(organizer_id, 10).await;
    let alice = app.seed_user(false).await;
    let bob = app.seed_user(false).await;

    for (user, score) in [(alice, 4), (bob, 5)] {
        let (status, _) = app
            .request(
                Method::POST,
                "/participants",
                Some(user),
                Some(json!({ "event_id": event.id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = app
            .request(
                Method::POST,
                "/ratings",
                Some(user),
                Some(json!({ "event_id": event.id, "score": score })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/events/{}/favorites", event.id);
    let (status, _) = app.request(Method::POST, &uri, Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);

    // Alice sees her favorite flag; the payload carries fresh aggregates.
    let (_, body) = app
        .request(Method::GET, &format!("/events/{}", event.id), Some(alice), None)
        .await;
    assert_eq!(body["data"]["average_rating"], 4.5);
    assert_eq!(body["data"]["participants_count"], 2);
    assert_eq!(body["data"]["is_favorite"], true);

    // Bob did not favorite it.
    let (_, body) = app
        .request(Method::GET, &format!("/events/{}", event.id), Some(bob), None)
        .await;
    assert_eq!(body["data"]["is_favorite"], false);

    // Removal is idempotent and flips the flag back.
    let (status, _) = app.request(Method::DELETE, &uri, Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app
        .request(Method::GET, &format!("/events/{}", event.id), Some(alice), None)
        .await;
    assert_eq!(body["data"]["is_favorite"], false);
}

#[tokio::test]
async fn creating_events_requires_an_organizer_profile() {
    let app = spawn_app();
    let plain_user = app.seed_user(false).await;

    let payload = json!({
        "title": "Pop-up Concert",
        "description": "One night only",
        "date": "2026-10-01T20:00:00Z",
        "max_participants": 100,
        "price": "15.00"
    });

    let (status, body) = app
        .request(Method::POST, "/events", Some(plain_user), Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");

    let (organizer_user, _) = app.seed_organizer().await;
    let (status, body) = app
        .request(Method::POST, "/events", Some(organizer_user), Some(payload))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "Pop-up Concert");
    assert_eq!(body["data"]["status"], "planned");
}

#[tokio::test]
async fn only_the_owner_or_admin_updates_an_event() {
    let app = spawn_app();
    let (_, organizer_id) = app.seed_organizer().await;
    let event = app.seed_event(organizer_id, 10).await;
    let (other_user, _) = app.seed_organizer().await;

    let update = json!({ "title": "Renamed" });
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/events/{}", event.id),
            Some(other_user),
            Some(update.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.seed_user(true).await;
    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/events/{}", event.id),
            Some(admin),
            Some(update),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Renamed");
}

#[tokio::test]
async fn updating_with_unknown_references_is_rejected() {
    let app = spawn_app();
    let (organizer_user, organizer_id) = app.seed_organizer().await;
    let event = app.seed_event(organizer_id, 10).await;
    let uri = format!("/events/{}", event.id);

    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some(organizer_user),
            Some(json!({ "venue_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some(organizer_user),
            Some(json!({ "category_ids": [Uuid::new_v4()] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    // The event is untouched by the rejected updates.
    let (_, body) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(body["data"]["venue"], serde_json::Value::Null);
    assert!(body["data"]["categories"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn event_list_filters_by_status_and_search() {
    let app = spawn_app();
    let (_, organizer_id) = app.seed_organizer().await;
    app.seed_event(organizer_id, 10).await;
    let workshop = app.seed_event(organizer_id, 10).await;

    // Flip one event to active with a distinctive title.
    let admin = app.seed_user(true).await;
    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/events/{}", workshop.id),
            Some(admin),
            Some(json!({ "title": "Tokio Workshop", "status": "active" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request(Method::GET, "/events?status=active", None, None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .request(Method::GET, "/events?search=tokio", None, None)
        .await;
    let found = body["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["title"], "Tokio Workshop");
}

#[tokio::test]
async fn statistics_are_admin_only_and_match_rows() {
    let app = spawn_app();
    let (_, organizer_id) = app.seed_organizer().await;
    let event_a = app.seed_event(organizer_id, 10).await;
    app.seed_event(organizer_id, 10).await;
    let user = app.seed_user(false).await;
    app.request(
        Method::POST,
        "/participants",
        Some(user),
        Some(json!({ "event_id": event_a.id })),
    )
    .await;

    // Anonymous and non-admin callers are rejected.
    let (status, _) = app.request(Method::GET, "/statistics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .request(Method::GET, "/statistics", Some(user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.seed_user(true).await;
    let (status, body) = app
        .request(Method::GET, "/statistics", Some(admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_events"], 2);
    assert_eq!(body["data"]["total_participants"], 1);
    // Two events at 25.00 each; listed prices, not collected revenue.
    assert_eq!(body["data"]["total_revenue"], "50.00");
}

#[tokio::test]
async fn venues_are_admin_only() {
    let app = spawn_app();
    let user = app.seed_user(false).await;
    let venue = json!({ "name": "Main Hall", "address": "1 Center St", "capacity": 300 });

    let (status, _) = app
        .request(Method::POST, "/venues", Some(user), Some(venue.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.seed_user(true).await;
    let (status, body) = app
        .request(Method::POST, "/venues", Some(admin), Some(venue))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Main Hall");
}

#[tokio::test]
async fn my_events_lists_only_the_callers_events() {
    let app = spawn_app();
    let (organizer_user, organizer_id) = app.seed_organizer().await;
    let (_, other_organizer_id) = app.seed_organizer().await;
    let mine = app.seed_event(organizer_id, 10).await;
    app.seed_event(other_organizer_id, 10).await;

    let (status, body) = app
        .request(Method::GET, "/me/events", Some(organizer_user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], mine.id.to_string());

    // A user without an organizer profile has no events to manage.
    let plain_user = app.seed_user(false).await;
    let (status, body) = app
        .request(Method::GET, "/me/events", Some(plain_user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");
}

#[tokio::test]
async fn event_list_honors_the_ordering_param() {
    let app = spawn_app();
    let (_, organizer_id) = app.seed_organizer().await;
    let early_cheap = app
        .seed_event_with(
            organizer_id,
            "Early Cheap",
            10,
            Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap(),
            Decimal::new(1000, 2),
        )
        .await;
    let late_pricey = app
        .seed_event_with(
            organizer_id,
            "Late Pricey",
            10,
            Utc.with_ymd_and_hms(2026, 11, 1, 18, 0, 0).unwrap(),
            Decimal::new(9000, 2),
        )
        .await;

    let titles = |body: &serde_json::Value| -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, body) = app
        .request(Method::GET, "/events?ordering=price", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Early Cheap", "Late Pricey"]);

    let (status, body) = app
        .request(Method::GET, "/events?ordering=-date", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Late Pricey", "Early Cheap"]);

    let ids = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![late_pricey.id.to_string(), early_cheap.id.to_string()]);
}

#[tokio::test]
async fn subscriptions_are_scoped_to_the_caller() {
    let app = spawn_app();
    let (_, organizer_id) = app.seed_organizer().await;
    let event = app.seed_event(organizer_id, 10).await;
    let alice = app.seed_user(false).await;
    let bob = app.seed_user(false).await;

    let uri = format!("/events/{}/subscribe", event.id);
    let (_, created) = app.request(Method::POST, &uri, Some(alice), None).await;
    let subscription_id = created["data"]["id"].as_str().unwrap().to_string();

    // Bob sees nothing and cannot delete Alice's subscription.
    let (_, list) = app.request(Method::GET, "/subscriptions", Some(bob), None).await;
    assert!(list["data"].as_array().unwrap().is_empty());

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/subscriptions/{}", subscription_id),
            Some(bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/subscriptions/{}", subscription_id),
            Some(alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
