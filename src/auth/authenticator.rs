use sqlx::PgPool;

use crate::error::AppError;
use crate::models::User;

use super::password::verify_password;

/// Turns an email/password pair into a verified identity.
///
/// Unknown email and wrong password take the same exit, so the response can
/// never be used to probe which addresses are registered. The returned record
/// includes the activation flag; callers decide whether to gate on it.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
    let user = User::find_by_email(pool, email).await?;

    match user {
        Some(user) if verify_password(password, &user.password_hash) => Ok(user),
        _ => Err(AppError::AuthFailure),
    }
}
