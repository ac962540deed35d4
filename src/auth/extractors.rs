use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::auth::handlers::TOKEN_COOKIE;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts and validates the session token, yielding the profile ID.
///
/// Accepts a `Bearer` Authorization header or the session cookie.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);

        let token = match bearer {
            Some(t) => t,
            None => {
                let jar = CookieJar::from_request_parts(parts, state)
                    .await
                    .unwrap_or_default();
                jar.get(TOKEN_COOKIE)
                    .map(|c| c.value().to_owned())
                    .ok_or_else(|| ApiError::unauthorized("Missing session token"))?
            }
        };

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid or expired session token");
            ApiError::unauthorized("Invalid or expired session token")
        })?;

        Ok(AuthUser(claims.sub))
    }
}
