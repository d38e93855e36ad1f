use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::handlers::booking;

pub fn create_router(state: AppState) -> Router {
    let booking_routes = Router::new().route(
        "/booking",
        get(booking::list_bookings).post(booking::create_booking),
    );

    Router::new()
        .nest("/api", booking_routes)
        .layer(TraceLayer::new_for_http())
        // Any origin may call the API
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
