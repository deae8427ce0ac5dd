use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{debug, error};

use crate::{error::ApiError, middleware::auth::AuthenticatedMember, state::AppState};
use shared::models::auth::requests::{LoginRequest, RefreshTokenRequest, SignUpRequest};
use shared::models::auth::responses::TokenPair;
use shared::models::member::Member;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/member/signup", post(sign_up))
        .route("/api/member/login", post(login))
        .route("/api/member/token/refresh", post(refresh))
        .route("/api/member/logout", post(logout))
        .route("/api/member/me", get(get_me))
        .route("/api/member/signout", delete(sign_out))
}

async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    let member = state
        .member_service
        .sign_up(&request.email, &request.username, &request.password)
        .await
        .map_err(|e| {
            error!("Failed to sign up {}: {}", request.email, e);
            ApiError::from(e)
        })?;
    debug!("Member signed up: {}", member.email);
    Ok((StatusCode::CREATED, Json(member)))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    state
        .member_service
        .login(&request.email, &request.password)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to log in {}: {}", request.email, e);
            ApiError::from(e)
        })
}

async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    state
        .auth_service
        .rotate(&request.refresh_token)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to rotate refresh token: {}", e);
            ApiError::from(e)
        })
}

async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_service
        .revoke(&request.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to revoke refresh token: {}", e);
            ApiError::from(e)
        })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_me(
    State(state): State<AppState>,
    member: AuthenticatedMember,
) -> Result<Json<Member>, ApiError> {
    state
        .member_service
        .get_member_by_email(&member.email)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to retrieve member {}: {}", member.email, e);
            ApiError::from(e)
        })
}

async fn sign_out(
    State(state): State<AppState>,
    member: AuthenticatedMember,
) -> Result<StatusCode, ApiError> {
    state
        .member_service
        .sign_out(&member.email)
        .await
        .map_err(|e| {
            error!("Failed to sign out {}: {}", member.email, e);
            ApiError::from(e)
        })?;
    debug!("Member signed out: {}", member.email);
    Ok(StatusCode::NO_CONTENT)
}
