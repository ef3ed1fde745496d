use actix_web::{delete, patch, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::{guard, BearerToken, TokenService};
use crate::error::AppError;
use crate::models::{Task, TaskInput};

use super::lists::load_owned_list;

/// Loads a task by id and enforces ownership through its owning list.
///
/// Ownership is always resolved via the list's `user_id`; tasks carry no
/// owner column of their own.
async fn load_owned_task(pool: &PgPool, task_id: i32, user_id: i32) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(
        "SELECT id, title, due_time, description, done, list_id FROM tasks WHERE id = $1",
    )
    .bind(task_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found.".into()))?;

    let (owner_id,) = sqlx::query_as::<_, (i32,)>("SELECT user_id FROM lists WHERE id = $1")
        .bind(task.list_id)
        .fetch_one(pool)
        .await?;

    if owner_id != user_id {
        return Err(AppError::Forbidden("This task belongs to another user.".into()));
    }

    Ok(task)
}

/// Creates a task in the given list.
///
/// The list must exist and belong to the caller.
#[post("/{list_id}/create")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
    path: web::Path<i32>,
    input: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let user = guard::require_active(&pool, &tokens, &token.0).await?;
    input.validate()?;

    let list = load_owned_list(&pool, path.into_inner(), user.id).await?;

    let mut tx = pool.begin().await?;
    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (title, due_time, description, done, list_id) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, title, due_time, description, done, list_id",
    )
    .bind(&input.title)
    .bind(input.due_time)
    .bind(&input.description)
    .bind(input.done)
    .bind(list.id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(HttpResponse::Created().json(task))
}

/// Marks a task as done.
#[patch("/{task_id}/complete")]
pub async fn complete_task(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = guard::require_active(&pool, &tokens, &token.0).await?;
    let task = load_owned_task(&pool, path.into_inner(), user.id).await?;

    let mut tx = pool.begin().await?;
    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks SET done = TRUE WHERE id = $1 \
         RETURNING id, title, due_time, description, done, list_id",
    )
    .bind(task.id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(HttpResponse::Created().json(task))
}

/// Replaces a task's title, due time and description. The done flag is left
/// as it is; completing goes through its own endpoint.
#[put("/{task_id}/edit")]
pub async fn edit_task(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
    path: web::Path<i32>,
    input: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let user = guard::require_active(&pool, &tokens, &token.0).await?;
    input.validate()?;

    let task = load_owned_task(&pool, path.into_inner(), user.id).await?;

    let mut tx = pool.begin().await?;
    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks SET title = $1, due_time = $2, description = $3 WHERE id = $4 \
         RETURNING id, title, due_time, description, done, list_id",
    )
    .bind(&input.title)
    .bind(input.due_time)
    .bind(&input.description)
    .bind(task.id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(HttpResponse::Created().json(task))
}

/// Deletes a task.
#[delete("/{task_id}/delete")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: BearerToken,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = guard::require_active(&pool, &tokens, &token.0).await?;
    let task = load_owned_task(&pool, path.into_inner(), user.id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}
