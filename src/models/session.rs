use std::{future::Future, pin::Pin};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::user::UserProfile;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub is_persistent: bool,
}

impl Session {
    pub async fn create(
        pool: &SqlitePool,
        user_id: &str,
        remember_me: bool,
        lifetime: Duration,
    ) -> Result<Session, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (session_id, user_id, expires_at, is_persistent) VALUES (?, ?, ?, ?)
             RETURNING session_id, user_id, expires_at, is_persistent",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(Utc::now() + lifetime)
        .bind(remember_me)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Returns whether a session was actually removed.
    pub async fn delete(pool: &SqlitePool, session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// The authenticated caller. Every data-access call takes one of these
/// explicitly; it is resolved once per request from the session cookie or a
/// bearer token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionContext {
    pub session_id: String,
    pub user_id: String,
    pub email: String,
}

#[derive(FromRow)]
struct ActiveSessionRow {
    session_id: String,
    user_id: String,
    email: String,
    expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub async fn resolve(pool: &SqlitePool, session_id: &str) -> Result<SessionContext, AppError> {
        let row = sqlx::query_as::<_, ActiveSessionRow>(
            "SELECT s.session_id, s.user_id, u.email, s.expires_at
             FROM sessions s
             JOIN users u ON s.user_id = u.id
             WHERE s.session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            info!("Invalid session ID: {}", session_id);
            return Err(AppError::Unauthenticated("Invalid session".into()));
        };

        if row.expires_at < Utc::now() {
            Session::delete(pool, &row.session_id).await?;
            info!("Session expired for session ID: {}", session_id);
            return Err(AppError::Unauthenticated("Login is needed, session expired".into()));
        }

        Ok(SessionContext {
            session_id: row.session_id,
            user_id: row.user_id,
            email: row.email,
        })
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }
}

/// An explicit bearer token wins over the ambient session cookie.
fn session_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|cookie| cookie.value().to_string()))
}

impl FromRequest for SessionContext {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<SqlitePool>>().cloned();
        let token = session_token(req);

        Box::pin(async move {
            let pool = pool.ok_or_else(|| AppError::Internal("Database pool is not configured".into()))?;
            let token = token.ok_or_else(|| AppError::Unauthenticated("Login is needed".into()))?;

            SessionContext::resolve(pool.get_ref(), &token).await
        })
    }
}
