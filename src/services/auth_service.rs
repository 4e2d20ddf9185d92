use tracing::info;

use crate::{
    dto::auth::{LoginRequest, RegisterRequest, ResetPasswordRequest, SessionUser},
    error::AppResult,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<SessionUser>> {
    let identity = state
        .auth
        .sign_in(&payload.email, &payload.password)
        .await?;
    info!(user = %identity.id, "signed in");
    Ok(ApiResponse::success(
        "Signed in",
        SessionUser {
            id: identity.id,
            email: identity.email,
        },
        None,
    ))
}

pub async fn register(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<SessionUser>> {
    let identity = state
        .auth
        .sign_up(&payload.email, &payload.password)
        .await?;
    info!(user = %identity.id, "account created");
    Ok(ApiResponse::success(
        "Account created",
        SessionUser {
            id: identity.id,
            email: identity.email,
        },
        None,
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.auth.send_password_reset(&payload.email).await?;
    Ok(ApiResponse::success(
        "Password reset email sent. Please check your inbox.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn logout(state: &AppState) -> AppResult<ApiResponse<serde_json::Value>> {
    state.auth.sign_out().await;
    info!("signed out");
    Ok(ApiResponse::success(
        "Signed out",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
