use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use taskmate::auth::{PasswordHasher, TokenIssuer};
use taskmate::config::Config;
use taskmate::routes;
use taskmate::store::{MemoryStore, PgStore, Store};
use taskmate::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            log::info!("using PostgreSQL store");
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL is not set; data is kept in memory and lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(
        store,
        TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_seconds),
        PasswordHasher::new(config.bcrypt_cost),
    );

    log::info!("Starting TaskMate server at {}", config.server_url());
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(move |cfg| routes::config(cfg, &state))
            .default_service(web::to(routes::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
