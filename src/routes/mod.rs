pub mod auth;
pub mod health;
pub mod tasks;

use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::auth::{AuthMiddleware, PasswordHasher, TokenIssuer};
use crate::error::AppError;
use crate::store::Store;

/// Shared collaborators handed to every worker's `App`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenIssuer,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }
}

/// Registers application data and the full route table.
///
/// Extractor failures are routed through `AppError` so that every error leaves
/// the API as `{"error": ...}`.
pub fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::from(state.store.clone()))
        .app_data(web::Data::new(state.tokens.clone()))
        .app_data(web::Data::new(state.hasher))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            AppError::BadRequest(err.to_string()).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|_err, _req| {
            AppError::NotFound("Task not found".into()).into()
        }))
        .service(health::health)
        .service(
            web::scope("/api")
                .service(auth::register)
                .service(auth::login)
                .service(
                    web::scope("/tasks")
                        .wrap(AuthMiddleware)
                        .service(tasks::list_tasks)
                        .service(tasks::create_task)
                        .service(tasks::update_task)
                        .service(tasks::delete_task)
                        .service(tasks::show_task),
                )
                .default_service(web::to(not_found)),
        );
}

/// Fallback for paths that match no route.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".into()))
}
