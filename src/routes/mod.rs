use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod bookings;
pub mod cart;
pub mod doc;
pub mod health;
pub mod services;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/services", services::router())
        .nest("/auth", auth::router())
        .nest("/cart", cart::router())
        .nest("/bookings", bookings::router())
}
