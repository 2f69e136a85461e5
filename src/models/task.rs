use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::{
    project::{require_title, Project},
    session::SessionContext,
};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    #[sqlx(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    #[sqlx(rename = "Done")]
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub project_id: String,
    pub created_at: DateTime<Utc>,
}

/// The user-editable part of a task. Updates always replace all three.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub title: String,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

const TASK_COLUMNS: &str = "id, title, status, due_date, project_id, created_at";

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

impl Task {
    /// Tasks of an owned project, newest first.
    pub async fn list_for_project(
        pool: &SqlitePool,
        session: &SessionContext,
        project_id: &str,
    ) -> Result<Vec<Task>, AppError> {
        Project::find_owned(pool, session, project_id).await?;

        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    pub async fn create(
        pool: &SqlitePool,
        session: &SessionContext,
        project_id: &str,
        fields: &TaskFields,
    ) -> Result<Task, AppError> {
        require_title(&fields.title)?;
        Project::find_owned(pool, session, project_id).await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, status, due_date, project_id) VALUES (?, ?, ?, ?, ?) RETURNING {TASK_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&fields.title)
        .bind(fields.status)
        .bind(fields.due_date)
        .bind(project_id)
        .fetch_one(pool)
        .await?;

        info!("Task {} created in project {}", task.id, project_id);
        Ok(task)
    }

    pub async fn update(
        pool: &SqlitePool,
        session: &SessionContext,
        id: &str,
        fields: &TaskFields,
    ) -> Result<Task, AppError> {
        require_title(&fields.title)?;

        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET title = ?, status = ?, due_date = ?
             WHERE id = ? AND project_id IN (SELECT id FROM projects WHERE user_id = ?)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&fields.title)
        .bind(fields.status)
        .bind(fields.due_date)
        .bind(id)
        .bind(&session.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)
    }

    /// Returns the id of the project the task belonged to.
    pub async fn delete(pool: &SqlitePool, session: &SessionContext, id: &str) -> Result<String, AppError> {
        let deleted: Option<(String,)> = sqlx::query_as(
            "DELETE FROM tasks
             WHERE id = ? AND project_id IN (SELECT id FROM projects WHERE user_id = ?)
             RETURNING project_id",
        )
        .bind(id)
        .bind(&session.user_id)
        .fetch_optional(pool)
        .await?;

        let (project_id,) = deleted.ok_or_else(not_found)?;
        info!("Task {} deleted from project {}", id, project_id);
        Ok(project_id)
    }
}
