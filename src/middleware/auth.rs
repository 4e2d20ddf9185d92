use axum::extract::FromRequestParts;

use crate::{error::AppError, models::Identity, state::AppState};

/// Extractor gating a handler behind "a user is present". Pulls the current
/// identity from the session gate and rejects with `Unauthenticated`
/// otherwise; the auth provider is the single source of truth for it.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.session.require_identity().map(CurrentUser)
    }
}
