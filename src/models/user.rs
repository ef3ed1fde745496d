use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    // Human names: letters, with spaces, apostrophes or hyphens between parts.
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[\p{L}][\p{L} '-]*$").unwrap();
}

/// A registered account as stored in the `users` table.
///
/// The password hash is part of the record (the authenticator needs it) but
/// is never serialized into a response body.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    /// Canonical identity key; unique.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// False until the email verification flow flips it; flipped exactly once.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Looks up a user by the canonical identity key.
    ///
    /// The single place user rows are loaded for identity purposes; both the
    /// authenticator and the access guard go through here.
    pub async fn find_by_email(pool: &sqlx::PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, email, password_hash, active, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }
}

/// Registration payload.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 50),
        regex(path = "NAME_REGEX", message = "First name contains invalid characters")
    )]
    pub firstname: String,
    #[validate(
        length(min = 1, max = 50),
        regex(path = "NAME_REGEX", message = "Last name contains invalid characters")
    )]
    pub lastname: String,
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}
