//! Client side of the booking flow: a draft that survives restarts, the
//! HTTP client for the booking API and the session controller tying them
//! together.

pub mod api;
pub mod config;
pub mod controller;
pub mod draft;
pub mod storage;

pub use api::{ApiError, BookingApi, HttpBookingApi};
pub use config::ClientConfig;
pub use controller::{BookingController, Notice, SubmitOutcome};
pub use draft::{DraftBooking, DraftMirror, DraftSession, SelectionEcho, StorageMirror};
pub use storage::{DurableStore, FileStore, MemoryStore, StoreError};
