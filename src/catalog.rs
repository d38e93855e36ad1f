use std::env;

use serde::{Deserialize, Serialize};

const DEFAULT_MOVIES: &[&str] = &[
    "Inception",
    "Interstellar",
    "The Dark Knight",
    "Tenet",
    "Dunkirk",
];
const DEFAULT_SLOTS: &[&str] = &["10AM", "1PM", "3PM", "6PM", "9PM"];
const DEFAULT_SEATS: &[&str] = &["A1", "A2", "A3", "A4", "D1", "D2"];

/// The selectable movies, time slots and seat labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub movies: Vec<String>,
    pub slots: Vec<String>,
    pub seat_labels: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            movies: to_owned_list(DEFAULT_MOVIES),
            slots: to_owned_list(DEFAULT_SLOTS),
            seat_labels: to_owned_list(DEFAULT_SEATS),
        }
    }
}

impl Catalog {
    /// Load the catalog from `BOOKING_MOVIES`, `BOOKING_SLOTS` and
    /// `BOOKING_SEATS`, falling back to the built-in lists per variable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            movies: list_var("BOOKING_MOVIES").unwrap_or(defaults.movies),
            slots: list_var("BOOKING_SLOTS").unwrap_or(defaults.slots),
            seat_labels: list_var("BOOKING_SEATS").unwrap_or(defaults.seat_labels),
        }
    }

    pub fn has_seat(&self, label: &str) -> bool {
        self.seat_labels.iter().any(|s| s == label)
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn list_var(key: &str) -> Option<Vec<String>> {
    env::var(key).ok().and_then(|raw| parse_list(&raw))
}

/// Split a comma-separated list, dropping blank entries. `None` when
/// nothing is left.
fn parse_list(raw: &str) -> Option<Vec<String>> {
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if items.is_empty() { None } else { Some(items) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_skips_blanks() {
        let parsed = parse_list(" A1, B2 ,,C3 ").unwrap();
        assert_eq!(parsed, vec!["A1", "B2", "C3"]);
    }

    #[test]
    fn test_parse_list_empty_is_none() {
        assert!(parse_list(" , ,").is_none());
        assert!(parse_list("").is_none());
    }

    #[test]
    fn test_default_seat_labels() {
        let catalog = Catalog::default();
        assert!(catalog.has_seat("A1"));
        assert!(catalog.has_seat("D2"));
        assert!(!catalog.has_seat("Z9"));
    }
}
