use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::session::SessionContext;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

const PROJECT_COLUMNS: &str = "id, title, description, user_id, created_at";

/// Whitespace-only titles count as missing; accepted titles are stored as sent.
pub(crate) fn require_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title is required".into()));
    }
    Ok(())
}

fn not_found() -> AppError {
    AppError::NotFound("Project not found".into())
}

impl Project {
    /// Projects owned by the caller, newest first.
    pub async fn list_for_owner(pool: &SqlitePool, session: &SessionContext) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = ? ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(&session.user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Projects of other users are reported as missing.
    pub async fn find_owned(pool: &SqlitePool, session: &SessionContext, id: &str) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(&session.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)
    }

    pub async fn create(
        pool: &SqlitePool,
        session: &SessionContext,
        title: &str,
        description: Option<&str>,
    ) -> Result<Project, AppError> {
        require_title(title)?;

        let project = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (id, title, description, user_id) VALUES (?, ?, ?, ?) RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(title)
        .bind(description)
        .bind(&session.user_id)
        .fetch_one(pool)
        .await?;

        info!("Project {} created for user {}", project.id, session.user_id);
        Ok(project)
    }

    /// Replaces both title and description.
    pub async fn update(
        pool: &SqlitePool,
        session: &SessionContext,
        id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Project, AppError> {
        require_title(title)?;

        sqlx::query_as::<_, Project>(&format!(
            "UPDATE projects SET title = ?, description = ? WHERE id = ? AND user_id = ? RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(title)
        .bind(description)
        .bind(id)
        .bind(&session.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)
    }

    /// Removes the project together with all of its tasks.
    pub async fn delete(pool: &SqlitePool, session: &SessionContext, id: &str) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;

        let owned = sqlx::query("SELECT 1 FROM projects WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&session.user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owned.is_none() {
            return Err(not_found());
        }

        let tasks = sqlx::query("DELETE FROM tasks WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM projects WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(&session.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Project {} deleted along with {} tasks", id, tasks.rows_affected());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{test_pool, test_project, test_user};

    #[actix_web::test]
    async fn created_project_is_listed_once_for_its_owner() {
        let pool = test_pool().await;
        let ada = test_user(&pool, "ada@example.com").await;

        Project::create(&pool, &ada, "Launch", Some("Q1 goals")).await.unwrap();
        let projects = Project::list_for_owner(&pool, &ada).await.unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "Launch");
        assert_eq!(projects[0].description.as_deref(), Some("Q1 goals"));
        assert_eq!(projects[0].user_id, ada.user_id);
    }

    #[actix_web::test]
    async fn list_is_newest_first() {
        let pool = test_pool().await;
        let ada = test_user(&pool, "ada@example.com").await;

        test_project(&pool, &ada, "First").await;
        test_project(&pool, &ada, "Second").await;
        test_project(&pool, &ada, "Third").await;

        let titles: Vec<String> = Project::list_for_owner(&pool, &ada)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Third", "Second", "First"]);
    }

    #[actix_web::test]
    async fn blank_title_is_rejected() {
        let pool = test_pool().await;
        let ada = test_user(&pool, "ada@example.com").await;

        let result = Project::create(&pool, &ada, "   ", None).await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "title is required"));
    }

    #[actix_web::test]
    async fn padded_title_is_stored_as_sent() {
        let pool = test_pool().await;
        let ada = test_user(&pool, "ada@example.com").await;

        let project = Project::create(&pool, &ada, "  Launch  ", None).await.unwrap();
        let renamed = Project::update(&pool, &ada, &project.id, " Relaunch", None).await.unwrap();

        assert_eq!(project.title, "  Launch  ");
        assert_eq!(renamed.title, " Relaunch");
        assert_eq!(Project::list_for_owner(&pool, &ada).await.unwrap()[0].title, " Relaunch");
    }

    #[actix_web::test]
    async fn projects_are_invisible_to_other_users() {
        let pool = test_pool().await;
        let ada = test_user(&pool, "ada@example.com").await;
        let bob = test_user(&pool, "bob@example.com").await;
        let project = test_project(&pool, &ada, "Private").await;

        assert!(Project::list_for_owner(&pool, &bob).await.unwrap().is_empty());
        assert!(matches!(
            Project::find_owned(&pool, &bob, &project.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            Project::update(&pool, &bob, &project.id, "Hijacked", None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            Project::delete(&pool, &bob, &project.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(Project::find_owned(&pool, &ada, &project.id).await.unwrap().title, "Private");
    }

    #[actix_web::test]
    async fn update_replaces_both_fields() {
        let pool = test_pool().await;
        let ada = test_user(&pool, "ada@example.com").await;
        let project = Project::create(&pool, &ada, "Launch", Some("Q1 goals")).await.unwrap();

        let updated = Project::update(&pool, &ada, &project.id, "Relaunch", None).await.unwrap();

        assert_eq!(updated.title, "Relaunch");
        assert_eq!(updated.description, None);
        assert_eq!(updated.created_at, project.created_at);
    }

    #[actix_web::test]
    async fn delete_cascades_to_tasks() {
        let pool = test_pool().await;
        let ada = test_user(&pool, "ada@example.com").await;
        let project = test_project(&pool, &ada, "Doomed").await;
        sqlx::query("INSERT INTO tasks (id, project_id, title) VALUES ('t1', ?, 'Orphan')")
            .bind(&project.id)
            .execute(&pool)
            .await
            .unwrap();

        Project::delete(&pool, &ada, &project.id).await.unwrap();

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE project_id = ?")
            .bind(&project.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(matches!(
            Project::find_owned(&pool, &ada, &project.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
