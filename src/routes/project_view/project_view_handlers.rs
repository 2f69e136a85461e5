use actix_web::{web, HttpResponse};
use log::info;
use sqlx::SqlitePool;

use super::project_view_models::{
    AddTaskRequest, ProjectMutationResponse, ProjectRequest, TaskMutationResponse, UpdateTaskRequest,
};
use crate::{
    error::AppError,
    models::{
        project::Project,
        session::SessionContext,
        task::{Task, TaskFields},
    },
};

pub async fn list_projects(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
) -> Result<HttpResponse, AppError> {
    info!("Received request to list projects of user: {}", session.email);
    let projects = Project::list_for_owner(pool.get_ref(), &session).await?;
    Ok(HttpResponse::Ok().json(projects))
}

pub async fn get_project(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    info!("Received request for project: {}", project_id);
    let project = Project::find_owned(pool.get_ref(), &session, &project_id).await?;
    Ok(HttpResponse::Ok().json(project))
}

// Handler to add a project
pub async fn add_project(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
    request: web::Json<ProjectRequest>,
) -> Result<HttpResponse, AppError> {
    info!("Received request to add project: {}", request.title);

    let project = Project::create(
        pool.get_ref(),
        &session,
        &request.title,
        request.description.as_deref(),
    )
    .await?;
    let projects = Project::list_for_owner(pool.get_ref(), &session).await?;

    Ok(HttpResponse::Created().json(ProjectMutationResponse {
        success: true,
        message: "Project created successfully".to_string(),
        project: Some(project),
        projects,
    }))
}

pub async fn update_project(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
    path: web::Path<String>,
    request: web::Json<ProjectRequest>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    info!("Received request to update project: {}", project_id);

    let project = Project::update(
        pool.get_ref(),
        &session,
        &project_id,
        &request.title,
        request.description.as_deref(),
    )
    .await?;
    let projects = Project::list_for_owner(pool.get_ref(), &session).await?;

    Ok(HttpResponse::Ok().json(ProjectMutationResponse {
        success: true,
        message: "Project updated successfully".to_string(),
        project: Some(project),
        projects,
    }))
}

pub async fn delete_project(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    info!("Received request to delete project: {}", project_id);

    Project::delete(pool.get_ref(), &session, &project_id).await?;
    let projects = Project::list_for_owner(pool.get_ref(), &session).await?;

    Ok(HttpResponse::Ok().json(ProjectMutationResponse {
        success: true,
        message: "Project deleted successfully".to_string(),
        project: None,
        projects,
    }))
}

// Handler to get the tasks of a project
pub async fn get_tasks(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    info!("Received request for tasks of project: {}", project_id);
    let tasks = Task::list_for_project(pool.get_ref(), &session, &project_id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

pub async fn add_task(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
    path: web::Path<String>,
    request: web::Json<AddTaskRequest>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    let fields = TaskFields::from(request.into_inner());
    info!("Received request to add task {} ({}) to project {}", fields.title, fields.status, project_id);

    let task = Task::create(pool.get_ref(), &session, &project_id, &fields).await?;
    let tasks = Task::list_for_project(pool.get_ref(), &session, &project_id).await?;

    Ok(HttpResponse::Created().json(TaskMutationResponse {
        success: true,
        message: "Task created successfully".to_string(),
        task: Some(task),
        tasks,
    }))
}

pub async fn update_task(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
    path: web::Path<String>,
    request: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let fields = TaskFields::from(request.into_inner());
    info!("Received request to update task: {}", task_id);

    let task = Task::update(pool.get_ref(), &session, &task_id, &fields).await?;
    let tasks = Task::list_for_project(pool.get_ref(), &session, &task.project_id).await?;

    Ok(HttpResponse::Ok().json(TaskMutationResponse {
        success: true,
        message: "Task updated successfully".to_string(),
        task: Some(task),
        tasks,
    }))
}

pub async fn delete_task(
    pool: web::Data<SqlitePool>,
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    info!("Received request to delete task: {}", task_id);

    let project_id = Task::delete(pool.get_ref(), &session, &task_id).await?;
    let tasks = Task::list_for_project(pool.get_ref(), &session, &project_id).await?;

    Ok(HttpResponse::Ok().json(TaskMutationResponse {
        success: true,
        message: "Task deleted successfully".to_string(),
        task: None,
        tasks,
    }))
}
