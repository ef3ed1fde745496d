use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::{
    authenticate, guard, hash_password, BearerToken, LoginForm, TokenResponse, TokenService,
};
use crate::error::AppError;
use crate::mail::Mailer;
use crate::models::{RegisterRequest, User};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPasswordForm {
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Registers a new account.
///
/// The account starts out inactive; a verification token is issued and the
/// verification mail is handed off to a background task so the response never
/// waits on SMTP. The created user is echoed back without the password hash.
///
/// ## Responses:
/// - `201 Created`: the new user.
/// - `400 Bad Request`: the email is already registered.
/// - `422 Unprocessable Entity`: payload failed validation.
#[post("/create")]
pub async fn create_user(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    mailer: web::Data<Mailer>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE email = $1")
        .bind(&register_data.email)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists.".into(),
        ));
    }

    let password_hash = hash_password(&register_data.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (firstname, lastname, email, password_hash) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, firstname, lastname, email, password_hash, active, created_at",
    )
    .bind(&register_data.firstname)
    .bind(&register_data.lastname)
    .bind(&register_data.email)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let token = tokens.issue(&user.email, None)?;
    let mailer = mailer.get_ref().clone();
    let email = user.email.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = mailer.send_verification(&email, &token).await {
            log::error!("verification mail to {} failed: {}", email, e);
        }
    });

    Ok(HttpResponse::Created().json(user))
}

/// Login: exchanges an OAuth2-style form for an access token.
///
/// ## Responses:
/// - `201 Created`: `{access_token, token_type: "bearer"}`.
/// - `401 Unauthorized` with a `WWW-Authenticate: Bearer` challenge on any
///   credential failure, without revealing which check failed.
#[post("/token")]
pub async fn issue_token(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let user = authenticate(&pool, &form.username, &form.password).await?;
    let access_token = tokens.issue(&user.email, None)?;
    Ok(HttpResponse::Created().json(TokenResponse::bearer(access_token)))
}

/// Returns the authenticated user's own profile.
///
/// Uses `resolve`, not `require_active`: an account that has not verified its
/// email yet can still see itself (with `active: false`).
#[get("/me")]
pub async fn me(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
) -> Result<impl Responder, AppError> {
    let user = guard::resolve(&pool, &tokens, &token.0).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Email verification: flips the account to active.
///
/// The transition happens at most once; calling this for an already-active
/// account is a harmless no-op that still reports success. Any token problem
/// surfaces as a 400 here (it is a link clicked from a mail, not an API call
/// holding a session).
#[get("/verification")]
pub async fn verify_email(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    query: web::Query<TokenQuery>,
) -> Result<impl Responder, AppError> {
    let user = guard::resolve(&pool, &tokens, &query.token)
        .await
        .map_err(|e| match e {
            AppError::Unauthorized(_) => AppError::BadRequest("Invalid or expired token.".into()),
            other => other,
        })?;

    if !user.active {
        let mut tx = pool.begin().await?;
        sqlx::query("UPDATE users SET active = TRUE WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Deletes the authenticated user's account.
///
/// Foreign keys cascade, so the user's lists and their tasks go with it, all
/// inside one transaction.
#[delete("/me/delete")]
pub async fn delete_me(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
) -> Result<impl Responder, AppError> {
    let user = guard::resolve(&pool, &tokens, &token.0).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Sends a password-reset mail.
///
/// Responds `{success: true}` whether or not the address is registered; the
/// mail is only actually sent for known accounts. This keeps the endpoint
/// useless for probing which addresses exist.
#[post("/reset/send")]
pub async fn send_reset_mail(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    mailer: web::Data<Mailer>,
    form: web::Form<ResetRequest>,
) -> Result<impl Responder, AppError> {
    form.validate()?;

    if User::find_by_email(&pool, &form.email).await?.is_some() {
        let token = tokens.issue(&form.email, None)?;
        let mailer = mailer.get_ref().clone();
        let email = form.email.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = mailer.send_password_reset(&email, &token).await {
                log::error!("reset mail to {} failed: {}", email, e);
            }
        });
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Sets a new password, authorized by the token from the reset mail.
///
/// Reuses the access guard's `resolve`; the new hash is persisted and never
/// echoed back.
#[patch("/reset/new_password")]
pub async fn reset_password(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    query: web::Query<TokenQuery>,
    form: web::Form<NewPasswordForm>,
) -> Result<impl Responder, AppError> {
    form.validate()?;

    let user = guard::resolve(&pool, &tokens, &query.token).await?;
    let password_hash = hash_password(&form.new_password)?;

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(&password_hash)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(HttpResponse::Created().json(json!({ "success": true })))
}
