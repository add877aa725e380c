mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::notify::Notifier;
use crate::scheduling::WorkingWindow;

/// Shared request state: the store, the outbound event channel, and the
/// bookable-hours policy.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub notifier: Arc<dyn Notifier>,
    pub window: WorkingWindow,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Appointments
        .route("/appointments", post(handlers::create_appointment))
        .route("/appointments", get(handlers::list_appointments))
        .route("/appointments/my", get(handlers::my_appointments))
        .route(
            "/appointments/available-slots",
            get(handlers::available_slots),
        )
        .route("/appointments/{id}", get(handlers::get_appointment))
        .route("/appointments/{id}", put(handlers::update_appointment))
        .route("/appointments/{id}", delete(handlers::delete_appointment))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
