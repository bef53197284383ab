use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Duration;
use dotenv::dotenv;

use taskdesk::auth::TokenIssuer;
use taskdesk::bootstrap::ensure_admin;
use taskdesk::config::Config;
use taskdesk::routes;
use taskdesk::store::{MemoryStore, PgStore, Store};

fn io_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(io_error)?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pg = PgStore::connect(url, config.database_max_connections)
                .await
                .map_err(io_error)?;
            pg.migrate().await.map_err(io_error)?;
            log::info!("connected to Postgres, migrations applied");
            Arc::new(pg)
        }
        None => {
            log::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some(admin) = &config.bootstrap_admin {
        ensure_admin(store.as_ref(), admin).await.map_err(io_error)?;
    }

    let issuer = TokenIssuer::new(
        &config.jwt_secret,
        Duration::minutes(config.access_token_ttl_minutes),
        Duration::hours(config.refresh_token_ttl_hours),
    );

    log::info!("Starting TaskDesk server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::new(issuer.clone()))
            .configure(routes::configure)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
