#[macro_use]
extern crate diesel;

pub mod app;
pub mod database;
pub mod schema;

mod auth;
mod routes;

use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web::Data, App, HttpServer};
use app::{config::Config, AppState};
use database::{db_utils::psql_connect_to_db, store::PgStore};

fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600);

    if config.cors_origins.is_empty() {
        return cors.allow_any_origin();
    }
    config
        .cors_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let postgres_pool = psql_connect_to_db(&config.database_url, config.pool_size)
        .map_err(|err| io::Error::new(io::ErrorKind::ConnectionRefused, err))?;

    let app_state = AppState::new(config.clone(), Arc::new(PgStore::new(postgres_pool)));

    log::info!("Server running on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&app_state.config))
            .wrap(Logger::default())
            .app_data(Data::new(app_state.clone()))
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
