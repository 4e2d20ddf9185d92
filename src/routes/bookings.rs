use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::bookings::{BookingList, SubmitBookingRequest},
    error::AppResult,
    middleware::auth::CurrentUser,
    models::Booking,
    response::ApiResponse,
    services::{booking_service, tracking_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(submit_booking))
        .route("/{id}", get(get_booking))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = SubmitBookingRequest,
    responses(
        (status = 200, description = "Booking confirmed", body = ApiResponse<Booking>),
        (status = 400, description = "Incomplete form"),
        (status = 401, description = "Not signed in"),
    ),
    tag = "Bookings"
)]
pub async fn submit_booking(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<SubmitBookingRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::submit(&state, Some(&user.0), payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    responses(
        (status = 200, description = "The user's bookings, newest first", body = ApiResponse<BookingList>),
        (status = 401, description = "Not signed in"),
    ),
    tag = "Bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = tracking_service::list_bookings(&state, Some(&user.0)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "One booking", body = ApiResponse<Booking>),
        (status = 404, description = "No such booking for this user"),
        (status = 401, description = "Not signed in"),
    ),
    tag = "Bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = tracking_service::get_booking(&state, Some(&user.0), id).await?;
    Ok(Json(resp))
}
