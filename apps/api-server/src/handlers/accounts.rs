//! Account handlers: registration, login, profile update.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use scribe_core::domain::Account;
use scribe_core::ports::{PasswordService, TokenService};
use scribe_shared::FieldErrors;
use scribe_shared::dto::{
    AccountResponse, AuthResponse, LoginRequest, RegisterAccountRequest, UpdateProfileRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn field_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// POST /register
///
/// Open to anyone; responds 201 with the public account projection. The
/// password is write-only - it is hashed and never serialized back.
pub async fn register(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterAccountRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Surrounding whitespace is never significant in an identifier.
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    let mut errors = FieldErrors::new();
    if username.is_empty() {
        field_error(&mut errors, "username", "username is required");
    }
    if email.is_empty() || !email.contains('@') {
        field_error(&mut errors, "email", "a valid email address is required");
    }
    if req.password.len() < 8 {
        field_error(
            &mut errors,
            "password",
            "password must be at least 8 characters",
        );
    }

    // Duplicate checks produce field-level errors, same as shape problems.
    if !username.is_empty() && state.accounts.find_by_username(&username).await?.is_some() {
        field_error(&mut errors, "username", "username is already taken");
    }
    if email.contains('@') && state.accounts.find_by_email(&email).await?.is_some() {
        field_error(&mut errors, "email", "email is already registered");
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let account = Account::new(
        username,
        email,
        req.first_name.unwrap_or_default(),
        req.last_name.unwrap_or_default(),
        password_hash,
    );
    let saved = state.accounts.insert(account).await?;

    tracing::info!(account_id = %saved.id, "Account registered");

    Ok(HttpResponse::Created().json(AccountResponse::from(saved)))
}

/// POST /login
///
/// Exchanges username + password for a bearer token.
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let account = state
        .accounts
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&req.password, &account.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = token_service
        .generate_token(account.id, &account.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// PUT /profile
///
/// Partial update of the caller's own profile: absent fields stay unchanged.
/// Username/email changes are re-checked for uniqueness excluding the caller.
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut account = state
        .accounts
        .find_by_id(identity.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    let mut errors = FieldErrors::new();

    if let Some(username) = req.username {
        let username = username.trim().to_string();
        if username.is_empty() {
            field_error(&mut errors, "username", "username is required");
        } else if username != account.username {
            match state.accounts.find_by_username(&username).await? {
                Some(existing) if existing.id != account.id => {
                    field_error(&mut errors, "username", "username is already taken");
                }
                _ => account.username = username,
            }
        }
    }
    if let Some(email) = req.email {
        let email = email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            field_error(&mut errors, "email", "a valid email address is required");
        } else if email != account.email {
            match state.accounts.find_by_email(&email).await? {
                Some(existing) if existing.id != account.id => {
                    field_error(&mut errors, "email", "email is already registered");
                }
                _ => account.email = email,
            }
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if let Some(first_name) = req.first_name {
        account.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        account.last_name = last_name;
    }
    if let Some(bio) = req.bio {
        account.bio = Some(bio);
    }
    if let Some(profile_image) = req.profile_image {
        account.profile_image = Some(profile_image);
    }
    if let Some(facebook) = req.facebook {
        account.facebook = Some(facebook);
    }
    if let Some(instagram) = req.instagram {
        account.instagram = Some(instagram);
    }
    if let Some(youtube) = req.youtube {
        account.youtube = Some(youtube);
    }
    if let Some(twitter) = req.twitter {
        account.twitter = Some(twitter);
    }

    account.touch(chrono::Utc::now());
    let saved = state.accounts.update(account).await?;

    Ok(HttpResponse::Accepted().json(AccountResponse::from(saved)))
}
