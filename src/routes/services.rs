use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::Service,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceList {
    pub items: Vec<Service>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_services))
}

#[utoipa::path(
    get,
    path = "/api/services",
    responses(
        (status = 200, description = "The offerable services", body = ApiResponse<ServiceList>)
    ),
    tag = "Services"
)]
pub async fn list_services(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ServiceList>>> {
    let items = state.catalog.services().to_vec();
    let count = items.len() as i64;
    Ok(Json(ApiResponse::success(
        "OK",
        ServiceList { items },
        Some(Meta::count(count)),
    )))
}
