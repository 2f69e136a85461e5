use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    project::Project,
    task::{Task, TaskFields, TaskStatus},
};

// Create and update share the same shape: both fields are always replaced
#[derive(Deserialize)]
pub struct ProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Answer to every project mutation. `projects` is the owner's list as it
/// stands after the change, so callers never patch their copy by hand.
#[derive(Serialize, Deserialize)]
pub struct ProjectMutationResponse {
    pub success: bool,
    pub message: String,
    pub project: Option<Project>,
    pub projects: Vec<Project>,
}

// An absent or null status means "To Do"
#[derive(Deserialize)]
pub struct AddTaskRequest {
    pub title: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl From<AddTaskRequest> for TaskFields {
    fn from(req: AddTaskRequest) -> Self {
        Self {
            title: req.title,
            status: req.status.unwrap_or_default(),
            due_date: req.due_date,
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl From<UpdateTaskRequest> for TaskFields {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            status: req.status,
            due_date: req.due_date,
        }
    }
}

/// Same contract as [`ProjectMutationResponse`], scoped to the parent project.
#[derive(Serialize, Deserialize)]
pub struct TaskMutationResponse {
    pub success: bool,
    pub message: String,
    pub task: Option<Task>,
    pub tasks: Vec<Task>,
}
