//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use gflab_core::domain::User;
use gflab_core::ports::{PasswordService, ROLE_ADMIN, ROLE_USER, TokenService};
use gflab_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn roles_for(user: &User) -> Vec<String> {
    let mut roles = vec![ROLE_USER.to_string()];
    if user.is_admin {
        roles.push(ROLE_ADMIN.to_string());
    }
    roles
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Check if user already exists
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    // Hash password
    let password_hash = password_service.hash(&req.password)?;

    // Create user
    let user = User::new(req.email, req.name.trim().to_string(), password_hash);
    let saved_user = state.users.save(user).await?;

    // Generate token
    let token = token_service.generate_token(saved_user.id, &saved_user.email, roles_for(&saved_user))?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find user by email
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    let valid = password_service.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    // Generate token; admins get the elevated role claim
    let token = token_service.generate_token(user.id, &user.email, roles_for(&user))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        picture: user.picture,
        created_at: user.created_at,
    }))
}
