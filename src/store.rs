use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};

use crate::booking::{BookingCandidate, BookingRecord, validate};
use crate::catalog::Catalog;
use crate::entities::booking;
use crate::error::{AppError, AppResult};

/// Validates and persists bookings.
///
/// There is no locking around `create`: two requests for the same slot and
/// seats are both stored, and no capacity is tracked across records.
pub struct BookingStore<'a> {
    db: &'a DatabaseConnection,
    catalog: &'a Catalog,
}

impl<'a> BookingStore<'a> {
    pub fn new(db: &'a DatabaseConnection, catalog: &'a Catalog) -> Self {
        Self { db, catalog }
    }

    /// Every stored booking, oldest first.
    pub async fn list(&self) -> AppResult<Vec<BookingRecord>> {
        let models = booking::Entity::find()
            .order_by_asc(booking::Column::Id)
            .all(self.db)
            .await
            .map_err(AppError::StorageRead)?;

        models
            .into_iter()
            .map(BookingRecord::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::StorageRead)
    }

    /// Validate the candidate and store it as a new booking.
    pub async fn create(&self, candidate: BookingCandidate) -> AppResult<BookingRecord> {
        if let Err(err) = validate(&candidate, self.catalog) {
            tracing::debug!(
                movie = %candidate.movie,
                slot = %candidate.slot,
                reason = %err,
                "Booking rejected"
            );
            return Err(err.into());
        }

        let requested = candidate.requested_seats(self.catalog);
        let seats = serde_json::to_value(&candidate.seats)
            .map_err(|e| AppError::StorageWrite(DbErr::Json(e.to_string())))?;

        let new_booking = booking::ActiveModel {
            movie: Set(candidate.movie),
            slot: Set(candidate.slot),
            seats: Set(seats),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let saved = new_booking
            .insert(self.db)
            .await
            .map_err(AppError::StorageWrite)?;

        tracing::info!(
            booking_id = saved.id,
            movie = %saved.movie,
            slot = %saved.slot,
            seats = requested,
            "Booking created"
        );

        BookingRecord::try_from(saved).map_err(AppError::StorageWrite)
    }
}

impl TryFrom<booking::Model> for BookingRecord {
    type Error = DbErr;

    fn try_from(model: booking::Model) -> Result<Self, Self::Error> {
        let seats = serde_json::from_value(model.seats).map_err(|e| {
            DbErr::Json(format!("booking {} has malformed seats: {e}", model.id))
        })?;

        Ok(Self {
            id: model.id,
            movie: model.movie,
            slot: model.slot,
            seats,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}
