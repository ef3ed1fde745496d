use actix_web::{delete, get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::{guard, BearerToken, TokenService};
use crate::error::AppError;
use crate::models::{ListInput, Task, TodoList};

/// Loads a list by id and enforces ownership, filling in its tasks.
///
/// 404 when the id does not exist at all, 403 when it exists but belongs to
/// someone else. Every list endpoint funnels through here so the ownership
/// invariant cannot be skipped.
pub(crate) async fn load_owned_list(
    pool: &PgPool,
    list_id: i32,
    user_id: i32,
) -> Result<TodoList, AppError> {
    let mut list = sqlx::query_as::<_, TodoList>("SELECT id, name, user_id FROM lists WHERE id = $1")
        .bind(list_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found.".into()))?;

    if list.user_id != user_id {
        return Err(AppError::Forbidden("This list belongs to another user.".into()));
    }

    list.tasks = Task::for_list(pool, list.id).await?;
    Ok(list)
}

/// Creates a new list owned by the caller.
#[post("/create")]
pub async fn create_list(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
    input: web::Json<ListInput>,
) -> Result<impl Responder, AppError> {
    let user = guard::require_active(&pool, &tokens, &token.0).await?;
    input.validate()?;

    let mut tx = pool.begin().await?;
    let list = sqlx::query_as::<_, TodoList>(
        "INSERT INTO lists (name, user_id) VALUES ($1, $2) RETURNING id, name, user_id",
    )
    .bind(&input.name)
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(HttpResponse::Created().json(list))
}

/// Returns all lists of the caller, tasks inlined.
#[get("")]
pub async fn get_lists(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
) -> Result<impl Responder, AppError> {
    let user = guard::require_active(&pool, &tokens, &token.0).await?;

    let mut lists = sqlx::query_as::<_, TodoList>(
        "SELECT id, name, user_id FROM lists WHERE user_id = $1 ORDER BY id",
    )
    .bind(user.id)
    .fetch_all(&**pool)
    .await?;

    let tasks =
        futures::future::try_join_all(lists.iter().map(|list| Task::for_list(&pool, list.id)))
            .await?;
    for (list, tasks) in lists.iter_mut().zip(tasks) {
        list.tasks = tasks;
    }

    Ok(HttpResponse::Ok().json(lists))
}

/// Returns a single list with its tasks.
///
/// ## Responses:
/// - `200 OK`: the list.
/// - `403 Forbidden`: the list is owned by another user, or the caller is
///   not activated yet.
/// - `404 Not Found`: no list with that id.
#[get("/{list_id}")]
pub async fn retrieve_list(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = guard::require_active(&pool, &tokens, &token.0).await?;
    let list = load_owned_list(&pool, path.into_inner(), user.id).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Deletes a list and, via the cascading foreign key, its tasks.
#[delete("/{list_id}/delete")]
pub async fn delete_list(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = guard::require_active(&pool, &tokens, &token.0).await?;
    let list = load_owned_list(&pool, path.into_inner(), user.id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM lists WHERE id = $1")
        .bind(list.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}
