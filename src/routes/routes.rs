use actix_web::{http::Method, web};

use crate::error::json_config;

use super::auth::auth_handlers;

pub fn auth_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-auth")
            .app_data(json_config())
            .route("/register", web::post().to(auth_handlers::register))
            .route("/login", web::post().to(auth_handlers::login))
            .route("/logout", web::post().to(auth_handlers::logout))
            .route("/me", web::get().to(auth_handlers::current_user))
    );
}

use super::project_view::project_view_handlers;

pub fn project_view_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-projects")
            .app_data(json_config())
            .route("", web::get().to(project_view_handlers::list_projects))
            .route("", web::post().to(project_view_handlers::add_project))
            .route("/{project_id}", web::get().to(project_view_handlers::get_project))
            .route("/{project_id}", web::put().to(project_view_handlers::update_project))
            .route("/{project_id}", web::delete().to(project_view_handlers::delete_project))
            .route("/{project_id}/tasks", web::get().to(project_view_handlers::get_tasks))
            .route("/{project_id}/tasks", web::post().to(project_view_handlers::add_task))
    );
}

pub fn task_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-tasks")
            .app_data(json_config())
            .route("/{task_id}", web::put().to(project_view_handlers::update_task))
            .route("/{task_id}", web::delete().to(project_view_handlers::delete_task))
    );
}

use super::squidler_proxy::proxy_handlers;

pub fn squidler_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/functions/v1")
            .service(
                web::resource("/get-squidler-problems")
                    .route(web::post().to(proxy_handlers::get_problems))
                    .route(web::method(Method::OPTIONS).to(proxy_handlers::preflight))
                    .default_service(web::to(proxy_handlers::method_not_allowed)),
            )
            .service(
                web::resource("/dismiss-squidler-problem")
                    .route(web::post().to(proxy_handlers::dismiss_problem))
                    .route(web::method(Method::OPTIONS).to(proxy_handlers::preflight))
                    .default_service(web::to(proxy_handlers::method_not_allowed)),
            )
            .service(
                web::resource("/resolve-squidler-problem")
                    .route(web::post().to(proxy_handlers::resolve_problem))
                    .route(web::method(Method::OPTIONS).to(proxy_handlers::preflight))
                    .default_service(web::to(proxy_handlers::method_not_allowed)),
            )
    );
}
