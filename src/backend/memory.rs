//! In-memory document store and auth provider. These back local runs and the
//! test suite; a production deployment wires the hosted SDK behind the same
//! traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use super::{
    AuthProvider, AuthProviderError, BookingEvent, BookingSubscription, DocumentStore, StoreError,
    SubscriptionGuard,
};
use crate::models::{Booking, BookingStatus, Identity, NewBooking};

struct Subscriber {
    id: u64,
    user: Uuid,
    sender: mpsc::UnboundedSender<BookingEvent>,
}

/// Store backed by a plain vector. Also plays the part of the external
/// operations actor via [`set_status`](Self::set_status), and counts write
/// attempts so tests can assert that failed validation never reached it.
#[derive(Default)]
pub struct MemoryStore {
    bookings: Mutex<Vec<Booking>>,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_subscriber_id: AtomicU64,
    create_calls: AtomicU64,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of `create_booking` calls that reached the store, including
    /// injected failures.
    pub fn create_calls(&self) -> u64 {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail, simulating a network or permission
    /// problem at the hosted backend.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent queries fail the same way.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// External status transition, as operations staff would perform through
    /// the backend. Rejects anything but the forward lifecycle path.
    pub fn set_status(&self, id: Uuid, next: BookingStatus) -> Result<Booking, StoreError> {
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::Rejected(format!("no booking {id}")))?;

        if !booking.status.can_transition_to(next) {
            return Err(StoreError::Rejected(format!(
                "illegal status transition {} -> {}",
                booking.status, next
            )));
        }
        booking.status = next;
        let changed = booking.clone();
        drop(bookings);

        self.notify(BookingEvent::StatusChanged(changed.clone()));
        Ok(changed)
    }

    fn notify(&self, event: BookingEvent) {
        let user = event.booking().user_id;
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers
            .retain(|s| s.user != user || s.sender.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_booking(&self, record: NewBooking) -> Result<Booking, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            location: record.location,
            phone: record.phone,
            cart: record.cart,
            total: record.total,
            created_at: record.created_at,
            status: record.status,
        };
        self.bookings.lock().unwrap().push(booking.clone());
        self.notify(BookingEvent::Created(booking.clone()));
        Ok(booking)
    }

    async fn bookings_for_user(&self, user: Uuid) -> Result<Vec<Booking>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        let mut matches: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.user_id == user)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    fn subscribe_bookings(&self, user: Uuid) -> BookingSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .lock()
            .unwrap()
            .push(Subscriber { id, user, sender });

        let subscribers = Arc::clone(&self.subscribers);
        let guard = SubscriptionGuard::new(move || {
            subscribers.lock().unwrap().retain(|s| s.id != id);
        });
        BookingSubscription::new(receiver, guard)
    }
}

/// Email/password provider holding accounts in a map and publishing the
/// current identity on a watch channel, the way the hosted provider pushes
/// auth-state changes.
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, (Uuid, String)>>,
    current: watch::Sender<Option<Identity>>,
}

impl MemoryAuth {
    pub fn new() -> Arc<Self> {
        let (current, _) = watch::channel(None);
        Arc::new(Self {
            accounts: Mutex::new(HashMap::new()),
            current,
        })
    }

    fn publish(&self, identity: Option<Identity>) {
        // send_replace: keep the latest value even with no listener attached.
        self.current.send_replace(identity);
    }

    /// How many identity watchers are currently registered.
    #[cfg(test)]
    pub(crate) fn identity_watchers(&self) -> usize {
        self.current.receiver_count()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthProviderError> {
        let accounts = self.accounts.lock().unwrap();
        let identity = match accounts.get(email) {
            Some((id, stored)) if stored == password => Identity {
                id: *id,
                email: email.to_string(),
            },
            _ => {
                return Err(AuthProviderError::Rejected(
                    "Invalid email or password".to_string(),
                ));
            }
        };
        drop(accounts);

        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthProviderError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthProviderError::Rejected(
                "Email and password are required".to_string(),
            ));
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthProviderError::Rejected(
                "An account with this email already exists".to_string(),
            ));
        }
        let id = Uuid::new_v4();
        accounts.insert(email.to_string(), (id, password.to_string()));
        drop(accounts);

        let identity = Identity {
            id,
            email: email.to_string(),
        };
        // The provider signs a fresh account straight in.
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthProviderError> {
        if self.accounts.lock().unwrap().contains_key(email) {
            Ok(())
        } else {
            Err(AuthProviderError::Rejected(
                "No account found for this email".to_string(),
            ))
        }
    }

    async fn sign_out(&self) {
        self.publish(None);
    }

    fn current_identity(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn watch_identity(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }
}
