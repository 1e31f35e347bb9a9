#![doc = "The `taskmate` library crate."]
#![doc = ""]
#![doc = "Registration and login with bearer tokens, plus per-user task CRUD guarded by"]
#![doc = "ownership checks. The binary (`main.rs`) only reads configuration, picks a store"]
#![doc = "and mounts `routes::config` on an actix-web `HttpServer`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
pub use crate::routes::AppState;
