//! User API Handlers
//!
//! 注册 / 登录返回 JWT；登录失败统一回 "Invalid email or password"，
//! 不暴露邮箱是否存在。

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{Json, extract::State};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{LoginRequest, RegisterRequest, Role, UserView};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// Authenticated session payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// POST /api/users - 注册
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_string();

    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if payload.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo.create(username, email, hash, Role::User).await?;

    session_response(&state, user.into())
}

/// POST /api/users/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .find_by_email(payload.email.trim())
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    verify_password(&payload.password, &user.password_hash)?;

    session_response(&state, user.into())
}

/// GET /api/users/profile - 当前用户资料
pub async fn profile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UserView>> {
    let repo = UserRepository::new(state.db.clone());
    let found = repo.find_by_id(&user.id).await?;
    Ok(Json(found.into()))
}

// ========== 内部 ==========

fn session_response(state: &ServerState, user: UserView) -> AppResult<Json<AuthResponse>> {
    let id = user
        .id
        .as_ref()
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::Internal("User record without id".into()))?;

    let token = state
        .jwt_service
        .generate_token(&id, &user.username, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(AuthResponse {
        id,
        username: user.username,
        email: user.email,
        role: user.role,
        token,
    }))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Stored hash is malformed: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::invalid_credentials())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("hunter42").expect("hash");
        assert!(verify_password("hunter42", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }
}
