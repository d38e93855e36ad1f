use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::catalog::Catalog;

/// Seat label -> number of tickets for that seat.
pub type SeatMap = BTreeMap<String, u32>;

/// A persisted booking as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: i32,
    pub movie: String,
    pub slot: String,
    pub seats: SeatMap,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/booking`. Missing fields deserialize as empty so
/// that they reach validation instead of failing extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingCandidate {
    #[serde(default, deserialize_with = "nullable_string")]
    pub movie: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub slot: String,
    #[serde(default, deserialize_with = "lenient_seats")]
    pub seats: SeatMap,
}

impl BookingCandidate {
    /// Total tickets requested for catalog seat labels.
    pub fn requested_seats(&self, catalog: &Catalog) -> u64 {
        catalog
            .seat_labels
            .iter()
            .filter_map(|label| self.seats.get(label))
            .map(|qty| u64::from(*qty))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a movie")]
    MissingMovie,
    #[error("Please select the slot")]
    MissingSlot,
    #[error("Please select a seat")]
    NoSeatSelected,
}

/// Check a candidate, reporting the first problem in movie, slot, seats
/// order. Only catalog seat labels count towards the seat check.
pub fn validate(candidate: &BookingCandidate, catalog: &Catalog) -> Result<(), ValidationError> {
    if candidate.movie.is_empty() {
        return Err(ValidationError::MissingMovie);
    }
    if candidate.slot.is_empty() {
        return Err(ValidationError::MissingSlot);
    }

    let any_seat = catalog
        .seat_labels
        .iter()
        .any(|label| candidate.seats.get(label).is_some_and(|qty| *qty > 0));
    if !any_seat {
        return Err(ValidationError::NoSeatSelected);
    }

    Ok(())
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Seat quantities are read leniently: anything that is not a whole,
/// non-negative count (negative, fractional, boolean, out of range or
/// non-numeric) counts as no seats, so the seat check reports it.
fn lenient_seats<'de, D>(deserializer: D) -> Result<SeatMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(label, value)| {
            let qty = quantity(&value).unwrap_or_else(|| {
                tracing::debug!(seat = %label, %value, "Ignoring unusable seat quantity");
                0
            });
            (label, qty)
        })
        .collect())
}

fn quantity(value: &Value) -> Option<u32> {
    match value {
        Value::Null => Some(0),
        Value::Number(n) => match n.as_u64() {
            Some(whole) => u32::try_from(whole).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u32),
        },
        // Browser number inputs post their value as a string.
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                Some(0)
            } else {
                text.parse().ok()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(movie: &str, slot: &str, seats: &[(&str, u32)]) -> BookingCandidate {
        BookingCandidate {
            movie: movie.to_string(),
            slot: slot.to_string(),
            seats: seats.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_missing_movie_reported_first() {
        let catalog = Catalog::default();
        let c = candidate("", "", &[]);
        assert_eq!(validate(&c, &catalog), Err(ValidationError::MissingMovie));

        let c = candidate("", "6PM", &[("A1", 3)]);
        assert_eq!(validate(&c, &catalog), Err(ValidationError::MissingMovie));
    }

    #[test]
    fn test_missing_slot_before_seats() {
        let catalog = Catalog::default();
        let c = candidate("Inception", "", &[]);
        assert_eq!(validate(&c, &catalog), Err(ValidationError::MissingSlot));
    }

    #[test]
    fn test_all_zero_seats_rejected() {
        let catalog = Catalog::default();
        let c = candidate("Inception", "6PM", &[("A1", 0), ("D2", 0)]);
        assert_eq!(validate(&c, &catalog), Err(ValidationError::NoSeatSelected));

        let c = candidate("Inception", "6PM", &[]);
        assert_eq!(validate(&c, &catalog), Err(ValidationError::NoSeatSelected));
    }

    #[test]
    fn test_unknown_seat_label_does_not_count() {
        let catalog = Catalog::default();
        let c = candidate("Inception", "6PM", &[("Z9", 4)]);
        assert_eq!(validate(&c, &catalog), Err(ValidationError::NoSeatSelected));
    }

    #[test]
    fn test_valid_candidate() {
        let catalog = Catalog::default();
        let c = candidate("Inception", "6PM", &[("A1", 2), ("A2", 0)]);
        assert!(validate(&c, &catalog).is_ok());
        assert_eq!(c.requested_seats(&catalog), 2);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::MissingMovie.to_string(), "Please select a movie");
        assert_eq!(ValidationError::MissingSlot.to_string(), "Please select the slot");
        assert_eq!(ValidationError::NoSeatSelected.to_string(), "Please select a seat");
    }

    #[test]
    fn test_candidate_accepts_strings_and_nulls() {
        let c: BookingCandidate = serde_json::from_value(json!({
            "movie": null,
            "seats": { "A1": "2", "A2": "", "A3": null, "A4": 1 }
        }))
        .unwrap();

        assert_eq!(c.movie, "");
        assert_eq!(c.slot, "");
        assert_eq!(c.seats["A1"], 2);
        assert_eq!(c.seats["A2"], 0);
        assert_eq!(c.seats["A3"], 0);
        assert_eq!(c.seats["A4"], 1);
    }

    #[test]
    fn test_unusable_quantities_count_as_zero() {
        let c: BookingCandidate = serde_json::from_value(json!({
            "movie": "Tenet",
            "slot": "9PM",
            "seats": { "A1": -1, "A2": 2.5, "A3": true, "A4": "lots", "D1": 4294967296u64, "D2": 3.0 }
        }))
        .unwrap();

        assert_eq!(c.seats["A1"], 0);
        assert_eq!(c.seats["A2"], 0);
        assert_eq!(c.seats["A3"], 0);
        assert_eq!(c.seats["A4"], 0);
        assert_eq!(c.seats["D1"], 0);
        assert_eq!(c.seats["D2"], 3);
    }

    #[test]
    fn test_requested_seats_does_not_overflow() {
        let catalog = Catalog::default();
        let c = candidate("Inception", "6PM", &[("A1", u32::MAX), ("A2", 1)]);
        assert_eq!(c.requested_seats(&catalog), u64::from(u32::MAX) + 1);
    }
}
