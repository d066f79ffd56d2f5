use crate::{
    containers::{Container, ContainerKind, UpsertCoordinator},
    state::AppState,
};
use axum::Router;

pub mod dto;
pub mod handlers;

use dto::{Task, TaskResponse};

/// The per-user task list.
pub struct Tasks;

pub type TaskCoordinator = UpsertCoordinator<Tasks>;

impl ContainerKind for Tasks {
    const NAME: &'static str = "Tasks";
    const TABLE: &'static str = "tasks";
    const PAYLOAD_COLUMN: &'static str = "task_stored";
    const EXTRA_COLUMN: Option<&'static str> = None;

    type Item = Task;
    type View = TaskResponse;

    fn fill_defaults(items: Option<Vec<Task>>) -> Vec<Task> {
        items
            .unwrap_or_default()
            .into_iter()
            .map(|t| Task {
                description: Some(t.description.unwrap_or_default()),
                finished: Some(t.finished.unwrap_or(false)),
                show: Some(t.show.unwrap_or(true)),
            })
            .collect()
    }

    fn default_extra(_extra: Option<i32>) -> Option<i32> {
        None
    }

    fn shape(c: Container<Task>) -> TaskResponse {
        TaskResponse {
            id: c.id,
            user_id: c.owner_id,
            task_stored: c.items,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

pub fn router() -> Router<AppState> {
    handlers::task_routes()
}
