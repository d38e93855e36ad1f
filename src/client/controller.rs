use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::booking::BookingRecord;
use crate::catalog::Catalog;
use crate::client::api::{ApiError, BookingApi};
use crate::client::draft::{DraftBooking, DraftMirror, DraftSession, SelectionEcho, StorageMirror};
use crate::client::storage::DurableStore;

/// A message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    BookingSuccessful,
    /// Validation message from the server, shown verbatim.
    Rejected(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::BookingSuccessful => f.write_str("Booking Successful"),
            Notice::Rejected(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Booked(BookingRecord),
    Rejected(String),
    /// Transport or server fault; logged, nothing shown to the user.
    Failed,
}

struct SessionState<M> {
    session: DraftSession<M>,
    last_booking: Option<BookingRecord>,
    notice: Option<Notice>,
}

/// Counts a request as in flight until dropped, whichever way the request
/// ends.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Client-side booking session: owns the draft, submits it and tracks the
/// last booking shown to the user.
///
/// The in-flight flags are advisory. Nothing stops a second `submit` while
/// one is pending, and a request that never settles keeps
/// [`is_submitting`](Self::is_submitting) true.
pub struct BookingController<A, M> {
    api: A,
    catalog: Catalog,
    state: Mutex<SessionState<M>>,
    submissions: AtomicUsize,
    loads: AtomicUsize,
}

impl<A, S> BookingController<A, StorageMirror<S>>
where
    A: BookingApi,
    S: DurableStore,
{
    /// Start a session from whatever `store` holds from a previous one.
    pub fn restore(api: A, store: S, catalog: Catalog) -> Self {
        let session = DraftSession::restore(StorageMirror::new(store), catalog);
        Self::new(api, session)
    }
}

impl<A, M> BookingController<A, M>
where
    A: BookingApi,
    M: DraftMirror,
{
    pub fn new(api: A, session: DraftSession<M>) -> Self {
        Self {
            api,
            catalog: session.catalog().clone(),
            state: Mutex::new(SessionState {
                session,
                last_booking: None,
                notice: None,
            }),
            submissions: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn draft(&self) -> DraftBooking {
        self.state.lock().await.session.draft().clone()
    }

    pub async fn selection(&self) -> SelectionEcho {
        self.state.lock().await.session.selection().clone()
    }

    pub async fn last_booking(&self) -> Option<BookingRecord> {
        self.state.lock().await.last_booking.clone()
    }

    /// Pending notice, cleared once taken.
    pub async fn take_notice(&self) -> Option<Notice> {
        self.state.lock().await.notice.take()
    }

    pub fn is_submitting(&self) -> bool {
        self.submissions.load(Ordering::SeqCst) > 0
    }

    pub fn is_loading_last_booking(&self) -> bool {
        self.loads.load(Ordering::SeqCst) > 0
    }

    pub async fn select_movie(&self, label: &str) {
        self.state.lock().await.session.select_movie(label);
    }

    pub async fn select_slot(&self, label: &str) {
        self.state.lock().await.session.select_slot(label);
    }

    pub async fn set_seat_quantity(&self, label: &str, quantity: u32) {
        self.state
            .lock()
            .await
            .session
            .set_seat_quantity(label, quantity);
    }

    /// Send the draft to the server.
    ///
    /// The draft and selection are reset afterwards whatever the result,
    /// so a transport failure loses the user's picks.
    pub async fn submit(&self) -> SubmitOutcome {
        let _submitting = InFlight::enter(&self.submissions);

        let draft = self.draft().await;
        let result = self.api.create(&draft).await;

        let mut state = self.state.lock().await;
        let outcome = match result {
            Ok(record) => {
                tracing::info!(booking_id = record.id, "Booking successful");
                state.last_booking = Some(record.clone());
                state.notice = Some(Notice::BookingSuccessful);
                SubmitOutcome::Booked(record)
            }
            Err(ApiError::Validation(message)) => {
                tracing::debug!(%message, "Booking rejected");
                state.notice = Some(Notice::Rejected(message.clone()));
                SubmitOutcome::Rejected(message)
            }
            Err(err) => {
                tracing::error!(error = %err, "Booking submission failed");
                SubmitOutcome::Failed
            }
        };

        state.session.reset();
        outcome
    }

    /// Fetch bookings and show the most recent one. On failure the current
    /// value is kept.
    pub async fn load_last_booking(&self) -> Option<BookingRecord> {
        let _loading = InFlight::enter(&self.loads);

        match self.api.list().await {
            Ok(mut bookings) => {
                // The list is oldest first.
                let latest = bookings.pop();
                self.state.lock().await.last_booking = latest.clone();
                latest
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch last booking");
                None
            }
        }
    }
}
