use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::{AuthProvider, DocumentStore};
use crate::cart::Cart;
use crate::error::{AppError, AppResult};
use crate::location::LocationDraft;
use crate::models::{Booking, Identity};

/// Owner of all per-session mutable state: the current identity (read from
/// the auth provider), the in-progress cart and location draft, and the
/// cached list of the user's bookings. Everything else in the crate reads
/// through this gate; snapshots are replaced wholesale, never mutated in
/// place.
pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    cart: Mutex<Cart>,
    location: Mutex<LocationDraft>,
    bookings: RwLock<Vec<Booking>>,
    refresh_gen: AtomicU64,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DocumentStore>) -> Arc<Self> {
        Arc::new(Self {
            auth,
            store,
            cart: Mutex::new(Cart::new()),
            location: Mutex::new(LocationDraft::new()),
            bookings: RwLock::new(Vec::new()),
            refresh_gen: AtomicU64::new(0),
            listener: Mutex::new(None),
        })
    }

    /// Start the single long-lived identity listener: sign-in triggers a
    /// booking refresh, sign-out clears the session. Runs until the provider
    /// goes away, the gate is dropped, or [`shutdown`](Self::shutdown)
    /// aborts it.
    pub fn spawn_listener(self: &Arc<Self>) {
        // The task holds only a weak handle; a strong one would keep the
        // gate alive forever and its Drop teardown could never run.
        let weak = Arc::downgrade(self);
        let mut watched = self.auth.watch_identity();
        let handle = tokio::spawn(async move {
            while watched.changed().await.is_ok() {
                let Some(gate) = weak.upgrade() else { break };
                let identity = watched.borrow_and_update().clone();
                match identity {
                    Some(identity) => {
                        info!(user = %identity.id, "identity present, refreshing bookings");
                        if let Err(err) = gate.refresh(&identity).await {
                            warn!(error = %err, "booking refresh after sign-in failed");
                        }
                    }
                    None => {
                        info!("identity cleared, resetting session");
                        gate.clear_session();
                    }
                }
            }
        });
        *self.listener.lock().unwrap() = Some(handle);
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.auth.current_identity()
    }

    pub fn require_identity(&self) -> AppResult<Identity> {
        self.current_identity().ok_or(AppError::Unauthenticated)
    }

    pub fn cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap()
    }

    pub fn location(&self) -> MutexGuard<'_, LocationDraft> {
        self.location.lock().unwrap()
    }

    /// Current cached bookings, newest first.
    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings.read().unwrap().clone()
    }

    /// Re-query the user's bookings and replace the cached snapshot.
    ///
    /// Refreshes can overlap (identity listener vs. an explicit list
    /// request); the last-issued one is authoritative. A slow earlier read
    /// that completes after a newer one was issued is discarded so it cannot
    /// overwrite fresher state. On failure the previous snapshot stays
    /// visible.
    pub async fn refresh(&self, identity: &Identity) -> AppResult<()> {
        let issued = self.refresh_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.store.bookings_for_user(identity.id).await;

        // Staleness check and write happen under the same lock, so a newer
        // refresh cannot slip its result in between them.
        let mut bookings = self.bookings.write().unwrap();
        if self.refresh_gen.load(Ordering::SeqCst) != issued {
            return Ok(());
        }
        *bookings = result?;
        Ok(())
    }

    /// Discard the in-progress draft, as after a confirmed submission.
    pub fn reset_draft(&self) {
        self.cart.lock().unwrap().clear();
        self.location.lock().unwrap().clear();
    }

    fn clear_session(&self) {
        self.reset_draft();
        self.bookings.write().unwrap().clear();
    }

    /// Release the identity listener. Also runs on drop.
    pub fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        self.shutdown();
    }
}
