use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::AppState;
use crate::booking::{BookingCandidate, BookingRecord};
use crate::error::{AppError, AppResult};
use crate::store::BookingStore;

/// List every booking, oldest first
pub async fn list_bookings(State(state): State<AppState>) -> AppResult<Json<Vec<BookingRecord>>> {
    let bookings = BookingStore::new(&state.db, &state.config.catalog)
        .list()
        .await?;

    tracing::debug!(count = bookings.len(), "Retrieved bookings");
    Ok(Json(bookings))
}

/// Create a booking
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingCandidate>, JsonRejection>,
) -> AppResult<Json<BookingRecord>> {
    let Json(payload) =
        payload.map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;

    let booking = BookingStore::new(&state.db, &state.config.catalog)
        .create(payload)
        .await?;

    Ok(Json(booking))
}
