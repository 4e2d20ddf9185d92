use chrono::Utc;
use tracing::{info, warn};

use crate::{
    dto::bookings::SubmitBookingRequest,
    error::{AppError, AppResult},
    models::{Booking, BookingStatus, Identity, NewBooking},
    response::ApiResponse,
    state::AppState,
};

/// Validate the in-progress draft and persist it as a booking.
///
/// Validation happens entirely before the store call, so a rejected form
/// never produces a write. The draft is only reset once the store has
/// acknowledged the record; on a failed write the user keeps the cart and
/// location and can retry as-is.
pub async fn submit(
    state: &AppState,
    identity: Option<&Identity>,
    payload: SubmitBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let identity = identity.ok_or(AppError::Unauthenticated)?;

    let phone = payload.phone.trim();
    if phone.is_empty() {
        return Err(AppError::IncompleteForm("phone number".to_string()));
    }

    // Freeze the draft; the guards must not be held across the store await.
    let (cart, total, location) = {
        let cart = state.session.cart();
        if cart.is_empty() {
            return Err(AppError::IncompleteForm(
                "select at least one service".to_string(),
            ));
        }
        (cart.snapshot(), cart.total(), state.session.location().detail())
    };

    if state.config.require_location && location.is_none() {
        return Err(AppError::IncompleteForm("location".to_string()));
    }

    let record = NewBooking {
        user_id: identity.id,
        location,
        phone: phone.to_string(),
        cart,
        total,
        created_at: Utc::now(),
        status: BookingStatus::Pending,
    };

    let booking = state.store.create_booking(record).await?;
    info!(
        booking = %booking.id,
        user = %identity.id,
        total = booking.total,
        "booking confirmed"
    );

    state.session.reset_draft();
    if let Err(err) = state.session.refresh(identity).await {
        warn!(error = %err, "booking list refresh after submit failed");
    }

    Ok(ApiResponse::success("Booking confirmed", booking, None))
}
