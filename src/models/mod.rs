pub mod list;
pub mod task;
pub mod user;

pub use list::{ListInput, TodoList};
pub use task::{Task, TaskInput};
pub use user::{RegisterRequest, User};
