pub mod auth;
pub mod project_view;
pub mod routes;
pub mod squidler_proxy;
