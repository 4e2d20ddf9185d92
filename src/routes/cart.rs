use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::cart::CartView,
    error::{AppError, AppResult},
    location::LocationUpdate,
    middleware::auth::CurrentUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/{service_id}", post(add_service).delete(remove_service))
        .route("/location", put(update_location).delete(clear_location))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "The in-progress cart with derived totals", body = ApiResponse<CartView>),
        (status = 401, description = "Not signed in"),
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let view = CartView::of(&state.session.cart());
    Ok(Json(ApiResponse::success("OK", view, None)))
}

#[utoipa::path(
    post,
    path = "/api/cart/{service_id}",
    params(("service_id" = String, Path, description = "Catalog service id")),
    responses(
        (status = 200, description = "One unit added", body = ApiResponse<CartView>),
        (status = 400, description = "Unknown service"),
        (status = 401, description = "Not signed in"),
    ),
    tag = "Cart"
)]
pub async fn add_service(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(service_id): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let service = state
        .catalog
        .get(&service_id)
        .ok_or_else(|| AppError::BadRequest(format!("unknown service {service_id}")))?;

    let mut cart = state.session.cart();
    cart.add(service);
    let view = CartView::of(&cart);
    Ok(Json(ApiResponse::success("Added to cart", view, None)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{service_id}",
    params(("service_id" = String, Path, description = "Catalog service id")),
    responses(
        (status = 200, description = "One unit removed; a no-op when absent", body = ApiResponse<CartView>),
        (status = 401, description = "Not signed in"),
    ),
    tag = "Cart"
)]
pub async fn remove_service(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(service_id): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let mut cart = state.session.cart();
    cart.remove(&service_id);
    let view = CartView::of(&cart);
    Ok(Json(ApiResponse::success("Removed from cart", view, None)))
}

#[utoipa::path(
    put,
    path = "/api/cart/location",
    request_body = LocationUpdate,
    responses(
        (status = 200, description = "Location draft updated", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not signed in"),
    ),
    tag = "Cart"
)]
pub async fn update_location(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<LocationUpdate>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let mut location = state.session.location();
    location.apply(payload);
    let detail = location.detail();
    Ok(Json(ApiResponse::success(
        "Location updated",
        serde_json::json!({ "location": detail }),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/cart/location",
    responses(
        (status = 200, description = "Location draft cleared", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not signed in"),
    ),
    tag = "Cart"
)]
pub async fn clear_location(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    state.session.location().clear();
    Ok(Json(ApiResponse::success(
        "Location cleared",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
