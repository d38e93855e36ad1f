//! The in-progress booking and the hook that mirrors it to storage.

use serde::{Deserialize, Serialize};

use crate::booking::SeatMap;
use crate::catalog::Catalog;
use crate::client::storage::DurableStore;

pub const DRAFT_KEY: &str = "booking.draft";
pub const SELECTED_MOVIE_KEY: &str = "booking.selected_movie";
pub const SELECTED_SLOT_KEY: &str = "booking.selected_slot";

/// A booking that has not been submitted yet. Serializes to the body of
/// `POST /api/booking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftBooking {
    pub movie: String,
    pub slot: String,
    pub seats: SeatMap,
}

impl DraftBooking {
    /// Empty movie and slot, zero tickets for every catalog seat.
    pub fn empty(catalog: &Catalog) -> Self {
        Self {
            movie: String::new(),
            slot: String::new(),
            seats: catalog
                .seat_labels
                .iter()
                .map(|label| (label.clone(), 0))
                .collect(),
        }
    }

    fn fill_missing_seats(&mut self, catalog: &Catalog) {
        for label in &catalog.seat_labels {
            self.seats.entry(label.clone()).or_insert(0);
        }
    }
}

/// Last chosen movie and slot, kept apart from the draft for highlighting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionEcho {
    pub movie: Option<String>,
    pub slot: Option<String>,
}

/// Called after every change to the draft or the selection echo.
pub trait DraftMirror: Send + Sync {
    fn draft_changed(&self, draft: &DraftBooking);
    fn selection_changed(&self, selection: &SelectionEcho);

    /// Previously mirrored draft, if one exists and can be read back.
    fn restore_draft(&self) -> Option<DraftBooking>;
    fn restore_selection(&self) -> SelectionEcho;
}

/// Mirrors the session into a [`DurableStore`]. Writes are fire-and-forget:
/// failures are logged and the session carries on.
pub struct StorageMirror<S> {
    store: S,
}

impl<S: DurableStore> StorageMirror<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn write(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.store.set(key, value),
            None => self.store.remove(key),
        };
        if let Err(err) = result {
            tracing::warn!(key, error = %err, "Failed to mirror booking session");
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|err| {
            tracing::warn!(key, error = %err, "Failed to read booking session");
            None
        })
    }
}

impl<S: DurableStore> DraftMirror for StorageMirror<S> {
    fn draft_changed(&self, draft: &DraftBooking) {
        match serde_json::to_string(draft) {
            Ok(encoded) => self.write(DRAFT_KEY, Some(&encoded)),
            Err(err) => tracing::warn!(error = %err, "Failed to encode draft booking"),
        }
    }

    fn selection_changed(&self, selection: &SelectionEcho) {
        self.write(SELECTED_MOVIE_KEY, selection.movie.as_deref());
        self.write(SELECTED_SLOT_KEY, selection.slot.as_deref());
    }

    fn restore_draft(&self) -> Option<DraftBooking> {
        let raw = self.read(DRAFT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(err) => {
                tracing::warn!(error = %err, "Stored draft is incompatible, starting fresh");
                None
            }
        }
    }

    fn restore_selection(&self) -> SelectionEcho {
        let non_empty = |key: &str| self.read(key).filter(|v| !v.is_empty());
        SelectionEcho {
            movie: non_empty(SELECTED_MOVIE_KEY),
            slot: non_empty(SELECTED_SLOT_KEY),
        }
    }
}

/// Draft and selection echo for one session. Every mutation goes through
/// here so the mirror sees each change.
pub struct DraftSession<M> {
    draft: DraftBooking,
    selection: SelectionEcho,
    catalog: Catalog,
    mirror: M,
}

impl<M: DraftMirror> DraftSession<M> {
    /// Start from whatever the mirror holds, defaulting anything missing.
    pub fn restore(mirror: M, catalog: Catalog) -> Self {
        let draft = match mirror.restore_draft() {
            Some(mut draft) => {
                draft.fill_missing_seats(&catalog);
                draft
            }
            None => DraftBooking::empty(&catalog),
        };
        let selection = mirror.restore_selection();

        Self {
            draft,
            selection,
            catalog,
            mirror,
        }
    }

    pub fn draft(&self) -> &DraftBooking {
        &self.draft
    }

    pub fn selection(&self) -> &SelectionEcho {
        &self.selection
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn select_movie(&mut self, label: &str) {
        self.draft.movie = label.to_string();
        self.selection.movie = Some(label.to_string());
        self.mirror.draft_changed(&self.draft);
        self.mirror.selection_changed(&self.selection);
    }

    pub fn select_slot(&mut self, label: &str) {
        self.draft.slot = label.to_string();
        self.selection.slot = Some(label.to_string());
        self.mirror.draft_changed(&self.draft);
        self.mirror.selection_changed(&self.selection);
    }

    pub fn set_seat_quantity(&mut self, label: &str, quantity: u32) {
        self.draft.seats.insert(label.to_string(), quantity);
        self.mirror.draft_changed(&self.draft);
    }

    /// Back to the empty draft and no selection, mirrored.
    pub fn reset(&mut self) {
        self.draft = DraftBooking::empty(&self.catalog);
        self.selection = SelectionEcho::default();
        self.mirror.draft_changed(&self.draft);
        self.mirror.selection_changed(&self.selection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStore;
    use std::sync::Arc;

    fn session(store: Arc<MemoryStore>) -> DraftSession<StorageMirror<Arc<MemoryStore>>> {
        DraftSession::restore(StorageMirror::new(store), Catalog::default())
    }

    #[test]
    fn test_fresh_session_is_empty() {
        let s = session(Arc::new(MemoryStore::new()));
        assert_eq!(s.draft(), &DraftBooking::empty(&Catalog::default()));
        assert_eq!(s.selection(), &SelectionEcho::default());
        assert_eq!(s.draft().seats.len(), 6);
    }

    #[test]
    fn test_mutations_are_mirrored() {
        let store = Arc::new(MemoryStore::new());
        let mut s = session(store.clone());

        s.select_movie("Tenet");
        s.select_slot("9PM");
        s.set_seat_quantity("A2", 3);

        let stored: DraftBooking =
            serde_json::from_str(&store.get(DRAFT_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.movie, "Tenet");
        assert_eq!(stored.slot, "9PM");
        assert_eq!(stored.seats["A2"], 3);
        assert_eq!(store.get(SELECTED_MOVIE_KEY).unwrap().as_deref(), Some("Tenet"));
        assert_eq!(store.get(SELECTED_SLOT_KEY).unwrap().as_deref(), Some("9PM"));
    }

    #[test]
    fn test_restore_picks_up_previous_session() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut s = session(store.clone());
            s.select_movie("Dunkirk");
            s.set_seat_quantity("D1", 1);
        }

        let s = session(store);
        assert_eq!(s.draft().movie, "Dunkirk");
        assert_eq!(s.draft().seats["D1"], 1);
        assert_eq!(s.selection().movie.as_deref(), Some("Dunkirk"));
        assert_eq!(s.selection().slot, None);
    }

    #[test]
    fn test_incompatible_draft_falls_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set(DRAFT_KEY, r#"{"movie": 42, "seats": []}"#).unwrap();

        let s = session(store);
        assert_eq!(s.draft(), &DraftBooking::empty(&Catalog::default()));
    }

    #[test]
    fn test_restored_draft_gains_missing_seats() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(DRAFT_KEY, r#"{"movie":"Tenet","slot":"","seats":{"A1":2}}"#)
            .unwrap();

        let s = session(store);
        assert_eq!(s.draft().seats["A1"], 2);
        assert_eq!(s.draft().seats["D2"], 0);
    }

    #[test]
    fn test_reset_clears_storage_selection() {
        let store = Arc::new(MemoryStore::new());
        let mut s = session(store.clone());
        s.select_movie("Tenet");
        s.reset();

        assert_eq!(store.get(SELECTED_MOVIE_KEY).unwrap(), None);
        let stored: DraftBooking =
            serde_json::from_str(&store.get(DRAFT_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, DraftBooking::empty(&Catalog::default()));
    }
}
