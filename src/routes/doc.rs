use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, RegisterRequest, ResetPasswordRequest, SessionUser},
        bookings::{BookingList, SubmitBookingRequest},
        cart::CartView,
    },
    location::LocationUpdate,
    models::{Booking, BookingStatus, CartLine, Coordinates, Identity, LocationDetail, Service},
    response::{ApiResponse, Meta},
    routes::{auth, bookings, cart, health, services},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::reset_password,
        auth::logout,
        services::list_services,
        cart::view_cart,
        cart::add_service,
        cart::remove_service,
        cart::update_location,
        cart::clear_location,
        bookings::submit_booking,
        bookings::list_bookings,
        bookings::get_booking
    ),
    components(
        schemas(
            Service,
            CartLine,
            Coordinates,
            LocationDetail,
            LocationUpdate,
            BookingStatus,
            Booking,
            Identity,
            SessionUser,
            LoginRequest,
            RegisterRequest,
            ResetPasswordRequest,
            SubmitBookingRequest,
            CartView,
            BookingList,
            services::ServiceList,
            health::HealthData,
            Meta,
            ApiResponse<Booking>,
            ApiResponse<BookingList>,
            ApiResponse<CartView>,
            ApiResponse<services::ServiceList>,
            ApiResponse<SessionUser>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Sign in, sign up, password reset"),
        (name = "Services", description = "The static service catalog"),
        (name = "Cart", description = "The in-progress booking draft"),
        (name = "Bookings", description = "Submission and status tracking"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
