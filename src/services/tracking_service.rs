use uuid::Uuid;

use crate::{
    backend::BookingSubscription,
    dto::bookings::BookingList,
    error::{AppError, AppResult},
    models::{Booking, Identity},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// The user's bookings, newest first. An empty list is a normal result.
///
/// On a transport failure the session keeps its previous snapshot, so the
/// caller can keep showing stale data next to the error message.
pub async fn list_bookings(
    state: &AppState,
    identity: Option<&Identity>,
) -> AppResult<ApiResponse<BookingList>> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;
    state.session.refresh(identity).await?;

    let items = state.session.bookings();
    let count = items.len() as i64;
    Ok(ApiResponse::success(
        "OK",
        BookingList { items },
        Some(Meta::count(count)),
    ))
}

pub async fn get_booking(
    state: &AppState,
    identity: Option<&Identity>,
    id: Uuid,
) -> AppResult<ApiResponse<Booking>> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;
    state.session.refresh(identity).await?;

    let booking = state
        .session
        .bookings()
        .into_iter()
        .find(|b| b.id == id)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", booking, None))
}

/// Live feed of changes to the user's bookings. The returned handle
/// unregisters from the store when dropped; callers own its lifetime and
/// must release it on view teardown.
pub fn watch_bookings(
    state: &AppState,
    identity: Option<&Identity>,
) -> AppResult<BookingSubscription> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;
    Ok(state.store.subscribe_bookings(identity.id))
}
