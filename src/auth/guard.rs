//! Access guard: the gate every protected endpoint depends on.
//!
//! `resolve` answers "who is this token" and `require_active` additionally
//! answers "are they allowed in". The two stay separate so an unverified user
//! can still fetch their own profile while being kept away from resources.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::User;

use super::token::TokenService;

/// Turns a bearer token into a verified identity.
///
/// Expired and malformed tokens both collapse into a single `Unauthorized`
/// outcome, as does a subject with no matching user record (e.g. a deleted
/// account presenting a token that has not yet expired).
pub async fn resolve(pool: &PgPool, tokens: &TokenService, token: &str) -> Result<User, AppError> {
    let subject = tokens
        .validate(token)
        .map_err(|_| AppError::Unauthorized("Could not validate credentials.".into()))?;

    User::find_by_email(pool, &subject)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials.".into()))
}

/// Like [`resolve`], but additionally rejects users whose account has not
/// been activated yet. `Forbidden` (403) keeps this distinct from the 401
/// that a bad token produces.
pub async fn require_active(
    pool: &PgPool,
    tokens: &TokenService,
    token: &str,
) -> Result<User, AppError> {
    let user = resolve(pool, tokens, token).await?;
    if !user.active {
        return Err(AppError::Forbidden("Inactive user.".into()));
    }
    Ok(user)
}
