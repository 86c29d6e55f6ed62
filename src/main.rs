mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod repository;
mod state;
mod storage;
mod utils;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use crate::config::Config;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr.clone();
    let public_dir = config.public_dir.clone();

    let state = match AppState::from_config(config).await {
        Ok(state) => state,
        Err(err) => {
            error!("Startup failed: {}", err);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, err.to_string()));
        }
    };

    info!("Starting server at {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
            .service(handlers::static_files(&public_dir))
    })
    .bind(bind_addr)?
    .run()
    .await
}
