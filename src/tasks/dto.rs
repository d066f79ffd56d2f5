use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::containers::ContainerChanges;

/// A task as stored. Fields are absent when a merge write left them out.
///
/// Decoding stays lenient so rows written by older clients still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
}

/// Full task shape accepted by the create endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    pub description: String,
    #[serde(default)]
    pub finished: bool,
    #[serde(default = "default_show")]
    pub show: bool,
}

fn default_show() -> bool {
    true
}

impl From<NewTask> for Task {
    fn from(t: NewTask) -> Self {
        Self {
            description: Some(t.description),
            finished: Some(t.finished),
            show: Some(t.show),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskContainerRequest {
    #[serde(rename = "taskStored")]
    pub task_stored: Vec<NewTask>,
}

/// Task shape accepted by the upsert endpoint; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub finished: Option<bool>,
    #[serde(default)]
    pub show: Option<bool>,
}

impl From<TaskPatch> for Task {
    fn from(t: TaskPatch) -> Self {
        Self {
            description: t.description,
            finished: t.finished,
            show: t.show,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskContainerRequest {
    #[serde(rename = "taskStored", default)]
    pub task_stored: Option<Vec<TaskPatch>>,
}

impl UpdateTaskContainerRequest {
    pub fn into_changes(self) -> ContainerChanges<Task> {
        ContainerChanges {
            items: self
                .task_stored
                .map(|items| items.into_iter().map(Task::from).collect()),
            extra: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "taskStored")]
    pub task_stored: Vec<Task>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_shape_defaults_finished_and_show() {
        let req: CreateTaskContainerRequest =
            serde_json::from_str(r#"{"taskStored":[{"description":"Write report"}]}"#).unwrap();
        let task = Task::from(req.task_stored.into_iter().next().unwrap());
        assert_eq!(task.finished, Some(false));
        assert_eq!(task.show, Some(true));
    }

    #[test]
    fn create_shape_requires_description() {
        let res = serde_json::from_str::<CreateTaskContainerRequest>(r#"{"taskStored":[{"finished":true}]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn update_shape_allows_everything_to_be_omitted() {
        let req: UpdateTaskContainerRequest = serde_json::from_str("{}").unwrap();
        assert!(req.task_stored.is_none());
        let req: UpdateTaskContainerRequest =
            serde_json::from_str(r#"{"taskStored":[{"finished":true}]}"#).unwrap();
        let items = req.into_changes().items.unwrap();
        assert_eq!(items[0].description, None);
        assert_eq!(items[0].finished, Some(true));
    }

    #[test]
    fn update_shape_rejects_misspelled_task_fields() {
        let res = serde_json::from_str::<UpdateTaskContainerRequest>(r#"{"taskStored":[{"descripton":"x"}]}"#);
        assert!(res.is_err());
        let res = serde_json::from_str::<UpdateTaskContainerRequest>(
            r#"{"taskStored":[{"description":"Write report","id":1}]}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn stored_task_decoding_ignores_extra_keys() {
        let task: Task = serde_json::from_str(r#"{"description":"old","legacy":true}"#).unwrap();
        assert_eq!(task.description.as_deref(), Some("old"));
    }

    #[test]
    fn response_renames_owner_and_serializes_timestamps() {
        let ts = time::macros::datetime!(2025-08-11 21:00 UTC);
        let resp = TaskResponse {
            id: 3,
            user_id: 1,
            task_stored: vec![Task {
                description: Some("X".into()),
                finished: None,
                show: Some(true),
            }],
            created_at: ts,
            updated_at: ts,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["created_at"], "2025-08-11T21:00:00Z");
        assert_eq!(json["taskStored"][0], serde_json::json!({"description": "X", "show": true}));
        assert!(json.get("owner_id").is_none());
    }
}
