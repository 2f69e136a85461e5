use actix_web::{cookie::Cookie, web, HttpResponse};
use bcrypt::{hash, verify};
use log::info;
use sqlx::SqlitePool;

use super::auth_models::{AuthResponse, LoginRequest, LogoutResponse, RegisterRequest};
use crate::{
    config::AuthConfig,
    error::AppError,
    models::{
        session::{Session, SessionContext, SESSION_COOKIE},
        user::{User, UserProfile},
    },
};

const MIN_PASSWORD_LENGTH: usize = 6;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session_id)
        .path("/")
        .http_only(true)
        .finish()
}

// register user to DB
pub async fn register(
    pool: web::Data<SqlitePool>,
    auth: web::Data<AuthConfig>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let email = normalize_email(&req.email);
    info!("Received request to register user: {}", email);

    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    // Hashing is CPU bound, keep it off the worker thread
    let password = req.password.clone();
    let cost = auth.bcrypt_cost;
    let hashed_password = web::block(move || hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;

    let user = User::insert(pool.get_ref(), &email, &hashed_password).await?;

    info!("User {} registered successfully", email);
    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        message: "User registered successfully".into(),
        user: user.into(),
    }))
}

// login logic
pub async fn login(
    pool: web::Data<SqlitePool>,
    auth: web::Data<AuthConfig>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let email = normalize_email(&req.email);
    info!("Received login request for user: {}", email);

    let invalid = || AppError::Unauthenticated("Invalid email or password".into());

    let Some(user) = User::find_by_email(pool.get_ref(), &email).await? else {
        info!("Unknown email: {}", email);
        return Err(invalid());
    };

    let password = req.password.clone();
    let password_hash = user.password_hash.clone();
    let valid = web::block(move || verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .unwrap_or(false);

    if !valid {
        info!("Invalid password for user: {}", email);
        return Err(invalid());
    }

    let session = Session::create(
        pool.get_ref(),
        &user.id,
        req.remember_me,
        auth.session_lifetime(req.remember_me),
    )
    .await?;

    info!("User {} logged in successfully", email);
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(session.session_id))
        .json(AuthResponse {
            success: true,
            message: "Login successful".into(),
            user: UserProfile::from(user),
        }))
}

pub async fn logout(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
) -> Result<HttpResponse, AppError> {
    info!("Received logout request for user: {}", session.email);

    if !Session::delete(pool.get_ref(), &session.session_id).await? {
        return Err(AppError::Unauthenticated("Session not found".into()));
    }

    let mut removal = session_cookie(String::new());
    removal.make_removal();

    info!("Logout successful for user: {}", session.email);
    Ok(HttpResponse::Ok().cookie(removal).json(LogoutResponse {
        success: true,
        message: "Logout successful".into(),
    }))
}

pub async fn current_user(session: SessionContext) -> web::Json<UserProfile> {
    web::Json(session.profile())
}
