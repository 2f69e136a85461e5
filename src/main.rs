use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::io;

mod config;
mod db;
mod error;
mod models;
mod routes;
mod squidler;

use config::Config;
use squidler::SquidlerClient;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::load().map_err(io::Error::other)?;
    let pool = db::connect(&config.database_url)
        .await
        .map_err(io::Error::other)?;

    let auth = web::Data::new(config.auth.clone());
    let squidler = web::Data::new(SquidlerClient::new(
        config.squidler_base_url.clone(),
        config.squidler_api_key.clone(),
    ));

    let server_address = config.server_address.clone();
    info!("Server running at http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(auth.clone())
            .app_data(squidler.clone())
            .configure(routes::routes::auth_configure)
            .configure(routes::routes::project_view_configure)
            .configure(routes::routes::task_configure)
            .configure(routes::routes::squidler_configure)
    })
    .bind(server_address)?
    .run()
    .await
}
