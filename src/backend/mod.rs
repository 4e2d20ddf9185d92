//! Boundary to the hosted backend. The document store and auth provider are
//! external collaborators; these traits describe exactly what the booking
//! core consumes from them, and `memory` provides the implementations used
//! by tests and local runs.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::models::{Booking, Identity, NewBooking};

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("permission denied by the store")]
    PermissionDenied,
    #[error("rejected write: {0}")]
    Rejected(String),
}

/// Auth failures carry the provider's human-readable message so it can be
/// shown to the user verbatim.
#[derive(Debug, Error)]
pub enum AuthProviderError {
    #[error("{0}")]
    Rejected(String),
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

/// A change pushed by the store for a booking the subscriber can see.
#[derive(Debug, Clone)]
pub enum BookingEvent {
    Created(Booking),
    StatusChanged(Booking),
}

impl BookingEvent {
    pub fn booking(&self) -> &Booking {
        match self {
            BookingEvent::Created(b) | BookingEvent::StatusChanged(b) => b,
        }
    }
}

/// Live feed of booking changes for one user. Dropping the handle (or
/// calling [`cancel`](Self::cancel)) releases the store-side registration.
pub struct BookingSubscription {
    events: mpsc::UnboundedReceiver<BookingEvent>,
    _guard: SubscriptionGuard,
}

impl BookingSubscription {
    pub fn new(events: mpsc::UnboundedReceiver<BookingEvent>, guard: SubscriptionGuard) -> Self {
        Self {
            events,
            _guard: guard,
        }
    }

    /// Next change, or `None` once the store side has gone away.
    pub async fn next_event(&mut self) -> Option<BookingEvent> {
        self.events.recv().await
    }

    pub fn cancel(self) {}
}

/// Runs its unregister action exactly once, on drop.
pub struct SubscriptionGuard {
    unregister: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    pub fn new(unregister: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unregister: Some(Box::new(unregister)),
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

/// The `bookings` collection of the hosted document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new booking; the store assigns the id. All-or-nothing: on
    /// error no partial record exists.
    async fn create_booking(&self, record: NewBooking) -> Result<Booking, StoreError>;

    /// One-shot query filtered to `userId == user`, newest first.
    async fn bookings_for_user(&self, user: Uuid) -> Result<Vec<Booking>, StoreError>;

    /// Live subscription over the same filter.
    fn subscribe_bookings(&self, user: Uuid) -> BookingSubscription;
}

/// The hosted auth provider. Identity changes are published on a watch
/// channel so the session gate can run a single long-lived listener.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthProviderError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthProviderError>;
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthProviderError>;
    async fn sign_out(&self);

    fn current_identity(&self) -> Option<Identity>;
    fn watch_identity(&self) -> watch::Receiver<Option<Identity>>;
}
