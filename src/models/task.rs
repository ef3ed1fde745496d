use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A single to-do item belonging to one list.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    /// Optional time of day the task is due.
    pub due_time: Option<NaiveTime>,
    pub description: String,
    pub done: bool,
    pub list_id: i32,
}

impl Task {
    /// Fetches all tasks belonging to a list, oldest first.
    pub async fn for_list(pool: &sqlx::PgPool, list_id: i32) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT id, title, due_time, description, done, list_id \
             FROM tasks WHERE list_id = $1 ORDER BY id",
        )
        .bind(list_id)
        .fetch_all(pool)
        .await
    }
}

/// Input structure for creating or editing a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub due_time: Option<NaiveTime>,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub done: bool,
}
