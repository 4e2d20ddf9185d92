use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use carwash_booking_api::{
    backend::{
        AuthProvider, BookingEvent, BookingSubscription, DocumentStore, StoreError,
        memory::{MemoryAuth, MemoryStore},
    },
    config::AppConfig,
    dto::bookings::SubmitBookingRequest,
    error::AppError,
    models::{Booking, BookingStatus, Identity, NewBooking},
    services::{booking_service, tracking_service},
    state::AppState,
};

struct TestApp {
    state: AppState,
    auth: Arc<MemoryAuth>,
    store: Arc<MemoryStore>,
}

fn test_config(require_location: bool) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        require_location,
    }
}

fn setup(require_location: bool) -> TestApp {
    let auth = MemoryAuth::new();
    let store = MemoryStore::new();
    let state = AppState::new(test_config(require_location), auth.clone(), store.clone());
    TestApp { state, auth, store }
}

fn submit_request(phone: &str) -> SubmitBookingRequest {
    SubmitBookingRequest {
        phone: phone.to_string(),
    }
}

async fn seed_booking(store: &MemoryStore, user: Uuid, total: i64) -> Booking {
    store
        .create_booking(NewBooking {
            user_id: user,
            location: None,
            phone: "0711111111".to_string(),
            cart: Default::default(),
            total,
            created_at: chrono::Utc::now(),
            status: BookingStatus::Pending,
        })
        .await
        .expect("seed booking")
}

#[tokio::test]
async fn submit_without_identity_never_reaches_the_store() -> anyhow::Result<()> {
    let app = setup(false);
    let underwash = app.state.catalog.get("underwash").unwrap().clone();
    app.state.session.cart().add(&underwash);

    let err = booking_service::submit(&app.state, None, submit_request("0700000000"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthenticated));
    assert_eq!(app.store.create_calls(), 0);
    // The draft survives the rejection.
    assert_eq!(app.state.session.cart().item_count(), 1);
    Ok(())
}

#[tokio::test]
async fn submit_rejects_incomplete_forms_before_any_write() -> anyhow::Result<()> {
    let app = setup(false);
    let identity = app.auth.sign_up("u1@example.com", "pw").await?;

    // Empty cart.
    let err = booking_service::submit(&app.state, Some(&identity), submit_request("0700000000"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IncompleteForm(_)));

    // Blank phone.
    let normal = app.state.catalog.get("normal-car-wash").unwrap().clone();
    app.state.session.cart().add(&normal);
    let err = booking_service::submit(&app.state, Some(&identity), submit_request("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IncompleteForm(_)));

    assert_eq!(app.store.create_calls(), 0);
    assert_eq!(app.state.session.cart().item_count(), 1);
    Ok(())
}

// The canonical walkthrough: two Normal Car Washes and one Underwash, phone
// only, no location captured.
#[tokio::test]
async fn successful_submission_snapshots_and_resets_the_draft() -> anyhow::Result<()> {
    let app = setup(false);
    let identity = app.auth.sign_up("u1@example.com", "pw").await?;

    let normal = app.state.catalog.get("normal-car-wash").unwrap().clone();
    let underwash = app.state.catalog.get("underwash").unwrap().clone();
    {
        let mut cart = app.state.session.cart();
        cart.add(&normal);
        cart.add(&normal);
        cart.add(&underwash);
        assert_eq!(cart.total(), 1100);
    }

    let resp =
        booking_service::submit(&app.state, Some(&identity), submit_request("0700000000")).await?;
    let booking = resp.data.expect("created booking");

    assert_eq!(booking.user_id, identity.id);
    assert_eq!(booking.total, 1100);
    assert_eq!(booking.status, BookingStatus::Pending);
    assert!(booking.location.is_none());
    assert_eq!(booking.phone, "0700000000");
    assert_eq!(booking.cart.get("normal-car-wash").unwrap().quantity, 2);
    assert_eq!(booking.cart.get("underwash").unwrap().quantity, 1);

    // Draft reset as a consequence of success.
    assert!(app.state.session.cart().is_empty());
    assert!(app.state.session.location().detail().is_none());

    // And the tracking view shows exactly this one booking.
    let listed = tracking_service::list_bookings(&app.state, Some(&identity)).await?;
    let items = listed.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, booking.id);
    Ok(())
}

#[tokio::test]
async fn require_location_flag_restores_the_stricter_rule() -> anyhow::Result<()> {
    let app = setup(true);
    let identity = app.auth.sign_up("u1@example.com", "pw").await?;
    let engine = app.state.catalog.get("engine-wash").unwrap().clone();
    app.state.session.cart().add(&engine);

    let err = booking_service::submit(&app.state, Some(&identity), submit_request("0700000000"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::IncompleteForm(_)));
    assert_eq!(app.store.create_calls(), 0);

    app.state
        .session
        .location()
        .set_coordinates(-1.286389, 36.817223);
    let resp =
        booking_service::submit(&app.state, Some(&identity), submit_request("0700000000")).await?;
    let booking = resp.data.unwrap();
    let point = booking.location.unwrap().coordinates.unwrap();
    assert_eq!(point.lat, -1.286389);
    Ok(())
}

#[tokio::test]
async fn failed_store_write_preserves_the_draft_for_retry() -> anyhow::Result<()> {
    let app = setup(false);
    let identity = app.auth.sign_up("u1@example.com", "pw").await?;
    let underwash = app.state.catalog.get("underwash").unwrap().clone();
    app.state.session.cart().add(&underwash);
    app.state.session.location().set_coordinates(-1.3, 36.9);

    app.store.set_fail_writes(true);
    let err = booking_service::submit(&app.state, Some(&identity), submit_request("0700000000"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PersistenceError(_)));
    assert_eq!(app.store.create_calls(), 1);
    assert_eq!(app.state.session.cart().item_count(), 1);
    assert!(app.state.session.location().detail().is_some());

    // Retrying with the same draft succeeds once the store recovers.
    app.store.set_fail_writes(false);
    let resp =
        booking_service::submit(&app.state, Some(&identity), submit_request("0700000000")).await?;
    assert_eq!(resp.data.unwrap().total, 500);
    assert!(app.state.session.cart().is_empty());
    Ok(())
}

#[tokio::test]
async fn listing_is_scoped_to_the_queried_identity() -> anyhow::Result<()> {
    let app = setup(false);
    let mine = Identity {
        id: Uuid::new_v4(),
        email: "u1@example.com".to_string(),
    };
    let theirs = Identity {
        id: Uuid::new_v4(),
        email: "u2@example.com".to_string(),
    };

    seed_booking(&app.store, mine.id, 300).await;
    seed_booking(&app.store, theirs.id, 500).await;
    seed_booking(&app.store, mine.id, 800).await;

    let listed = tracking_service::list_bookings(&app.state, Some(&mine)).await?;
    let items = listed.data.unwrap().items;
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|b| b.user_id == mine.id));

    // A user with no bookings gets an empty list, not an error.
    let nobody = Identity {
        id: Uuid::new_v4(),
        email: "new@example.com".to_string(),
    };
    let listed = tracking_service::list_bookings(&app.state, Some(&nobody)).await?;
    assert!(listed.data.unwrap().items.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_refresh_keeps_the_previous_snapshot_visible() -> anyhow::Result<()> {
    let app = setup(false);
    let identity = app.auth.sign_up("u1@example.com", "pw").await?;
    seed_booking(&app.store, identity.id, 300).await;

    let listed = tracking_service::list_bookings(&app.state, Some(&identity)).await?;
    assert_eq!(listed.data.unwrap().items.len(), 1);

    // The store goes away; the list call fails but the cached snapshot is
    // not cleared, so the view can keep showing it next to the error.
    app.store.set_fail_reads(true);
    let err = tracking_service::list_bookings(&app.state, Some(&identity))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PersistenceError(_)));
    assert_eq!(app.state.session.bookings().len(), 1);

    app.store.set_fail_reads(false);
    let listed = tracking_service::list_bookings(&app.state, Some(&identity)).await?;
    assert_eq!(listed.data.unwrap().items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn lifecycle_runs_forward_to_a_terminal_state() -> anyhow::Result<()> {
    let app = setup(false);
    let identity = app.auth.sign_up("u1@example.com", "pw").await?;
    let normal = app.state.catalog.get("normal-car-wash").unwrap().clone();
    app.state.session.cart().add(&normal);
    let booking = booking_service::submit(&app.state, Some(&identity), submit_request("0700000000"))
        .await?
        .data
        .unwrap();

    // Operations staff drive the booking through the wash.
    app.store.set_status(booking.id, BookingStatus::Washing)?;
    app.store.set_status(booking.id, BookingStatus::Drying)?;
    app.store.set_status(booking.id, BookingStatus::Completed)?;

    let tracked = tracking_service::get_booking(&app.state, Some(&identity), booking.id).await?;
    let status = tracked.data.unwrap().status;
    assert_eq!(status, BookingStatus::Completed);
    assert!(status.is_terminal());

    // Terminal means terminal, even for the external actor.
    assert!(
        app.store
            .set_status(booking.id, BookingStatus::Pending)
            .is_err()
    );
    Ok(())
}

#[tokio::test]
async fn live_subscription_tracks_status_changes() -> anyhow::Result<()> {
    let app = setup(false);
    let identity = app.auth.sign_up("u1@example.com", "pw").await?;

    let mut subscription = tracking_service::watch_bookings(&app.state, Some(&identity))?;
    assert!(matches!(
        tracking_service::watch_bookings(&app.state, None),
        Err(AppError::Unauthenticated)
    ));

    let underwash = app.state.catalog.get("underwash").unwrap().clone();
    app.state.session.cart().add(&underwash);
    let booking = booking_service::submit(&app.state, Some(&identity), submit_request("0700000000"))
        .await?
        .data
        .unwrap();

    match subscription.next_event().await.unwrap() {
        BookingEvent::Created(b) => assert_eq!(b.id, booking.id),
        other => panic!("unexpected event {other:?}"),
    }

    app.store.set_status(booking.id, BookingStatus::Cancelled)?;
    match subscription.next_event().await.unwrap() {
        BookingEvent::StatusChanged(b) => {
            assert_eq!(b.status, BookingStatus::Cancelled);
            assert!(b.status.is_terminal());
        }
        other => panic!("unexpected event {other:?}"),
    }

    subscription.cancel();
    Ok(())
}

/// Store wrapper that reads immediately but holds the response back for a
/// configured delay, to interleave a slow read with a fresh one.
struct DelayStore {
    inner: Arc<MemoryStore>,
    delays: Mutex<VecDeque<Duration>>,
}

#[async_trait]
impl DocumentStore for DelayStore {
    async fn create_booking(&self, record: NewBooking) -> Result<Booking, StoreError> {
        self.inner.create_booking(record).await
    }

    async fn bookings_for_user(&self, user: Uuid) -> Result<Vec<Booking>, StoreError> {
        let result = self.inner.bookings_for_user(user).await;
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    fn subscribe_bookings(&self, user: Uuid) -> BookingSubscription {
        self.inner.subscribe_bookings(user)
    }
}

async fn race_stale_refresh_against_fresh() -> anyhow::Result<()> {
    let auth = MemoryAuth::new();
    let inner = MemoryStore::new();
    let store = Arc::new(DelayStore {
        inner: inner.clone(),
        delays: Mutex::new(VecDeque::from([Duration::from_millis(50)])),
    });
    let state = AppState::new(test_config(false), auth.clone(), store);

    let identity = auth.sign_up("u1@example.com", "pw").await?;
    seed_booking(&inner, identity.id, 300).await;

    // First refresh reads one booking and stalls; the second is issued while
    // it is in flight and sees two. The stalled result must be discarded.
    let slow = state.session.refresh(&identity);
    let fresh = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        seed_booking(&inner, identity.id, 800).await;
        state.session.refresh(&identity).await
    };
    let (slow_result, fresh_result) = tokio::join!(slow, fresh);
    slow_result?;
    fresh_result?;

    assert_eq!(state.session.bookings().len(), 2);
    Ok(())
}

#[tokio::test]
async fn slow_stale_refresh_cannot_overwrite_a_newer_one() -> anyhow::Result<()> {
    race_stale_refresh_against_fresh().await
}

// Same interleaving with real parallelism: the staleness check and the
// snapshot write must hold together even when refreshes race across threads.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stale_refresh_is_discarded_across_threads() -> anyhow::Result<()> {
    for _ in 0..10 {
        race_stale_refresh_against_fresh().await?;
    }
    Ok(())
}
