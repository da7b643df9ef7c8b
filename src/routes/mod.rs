use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    self, categories, events, organizers, participants, ratings, statistics, subscriptions,
    venues,
};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Events, with the action-style endpoints hanging off the resource
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/:id/favorites",
            post(events::add_to_favorites).delete(events::remove_from_favorites),
        )
        .route("/events/:id/subscribe", post(events::subscribe))
        .route("/me/events", get(events::my_events))
        // Registrations
        .route(
            "/participants",
            get(participants::list_participants).post(participants::register),
        )
        .route(
            "/participants/:id",
            get(participants::get_participant)
                .put(participants::update_participant)
                .delete(participants::delete_participant),
        )
        // Ratings
        .route(
            "/ratings",
            get(ratings::list_ratings).post(ratings::create_rating),
        )
        .route(
            "/ratings/:id",
            get(ratings::get_rating).delete(ratings::delete_rating),
        )
        // Subscriptions (caller-scoped)
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route(
            "/subscriptions/:id",
            delete(subscriptions::delete_subscription),
        )
        // Admin directory resources
        .route(
            "/organizers",
            get(organizers::list_organizers).post(organizers::create_organizer),
        )
        .route(
            "/organizers/:id",
            get(organizers::get_organizer)
                .put(organizers::update_organizer)
                .delete(organizers::delete_organizer),
        )
        .route("/venues", get(venues::list_venues).post(venues::create_venue))
        .route(
            "/venues/:id",
            get(venues::get_venue)
                .put(venues::update_venue)
                .delete(venues::delete_venue),
        )
        // Categories (public read)
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Reporting
        .route("/statistics", get(statistics::get_statistics))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
