use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Booking;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitBookingRequest {
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
}
