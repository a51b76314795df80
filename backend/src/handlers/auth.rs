//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shared::{AuthResponse, AuthTokens, User};

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::services::auth::{decode_access_token, LoginInput, RefreshInput, RegisterInput};
use crate::services::AuthService;
use crate::AppState;

/// Register endpoint handler. An admin's bearer token, when sent, allows
/// creating manager and admin accounts.
pub async fn register(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    ValidatedJson(body): ValidatedJson<RegisterInput>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let caller = match bearer {
        Some(TypedHeader(Authorization(bearer))) => {
            Some(decode_access_token(bearer.token(), &state.config.jwt.secret)?.role)
        }
        None => None,
    };

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.register(body, caller).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.login(body).await?;
    Ok(Json(response))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshInput>,
) -> AppResult<Json<AuthTokens>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens))
}

/// The signed-in user
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.get_user(current_user.0.user_id).await?;
    Ok(Json(user))
}
