use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use validator::Validate;

use super::task::Task;

/// A to-do list owned by exactly one user (direct foreign key).
///
/// `tasks` is not a table column; list queries fill it in after fetching the
/// row so API responses always carry the list's tasks inline.
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoList {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

// Mapped by hand: the row carries only the table columns, `tasks` starts
// empty and is filled in by the caller.
impl FromRow<'_, PgRow> for TodoList {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            user_id: row.try_get("user_id")?,
            tasks: Vec::new(),
        })
    }
}

/// Input structure for creating a list.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ListInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}
