use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An offerable service from the static catalog. Prices are integer Ksh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
}

impl Service {
    pub fn new(id: &str, name: &str, price: i64, description: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            description: description.map(str::to_string),
        }
    }
}

/// One line of a cart: the unit price is captured when the service is first
/// added and is not re-read from the catalog afterwards. This is also the
/// exact per-entry shape persisted under a booking's `cart` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub name: String,
    pub price: i64,
    pub quantity: u32,
}

/// Cart snapshot as persisted: stable service id -> line.
pub type CartSnapshot = BTreeMap<String, CartLine>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Structured address attached to a booking. Entirely absent when the user
/// never interacted with the map or the address fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetail {
    pub coordinates: Option<Coordinates>,
    pub main_address: String,
    pub house_number: Option<String>,
    pub address_number: Option<String>,
    pub street: Option<String>,
    pub estate: Option<String>,
}

/// Booking lifecycle. Transitions are driven by operations staff through the
/// backend; this application only ever reads the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Washing,
    Drying,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Whether an external actor may move a booking from `self` to `next`.
    /// The path only moves forward; `cancelled` is reachable from `pending`
    /// alone.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Washing)
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (Washing, Drying)
                | (Washing, Completed)
                | (Drying, Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Washing => "washing",
            BookingStatus::Drying => "drying",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The durable booking record. Field names follow the stored `bookings`
/// documents and must stay camelCase to interoperate with existing data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub location: Option<LocationDetail>,
    pub phone: String,
    pub cart: CartSnapshot,
    pub total: i64,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Booking as handed to the store for creation; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub user_id: Uuid,
    pub location: Option<LocationDetail>,
    pub phone: String,
    pub cart: CartSnapshot,
    pub total: i64,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
}

/// The authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}
