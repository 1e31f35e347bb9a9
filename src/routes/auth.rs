use crate::{
    auth::{AuthData, AuthResponse, LoginRequest, PasswordHasher, RegisterRequest, TokenIssuer},
    error::AppError,
    models::{NewUser, TaskSummary},
    store::{Store, DUPLICATE_EMAIL},
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
/// The password is hashed before the account record is built.
#[post("/register")]
pub async fn register(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    tokens: web::Data<TokenIssuer>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest { email, password } = register_data.into_inner();

    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_EMAIL.into()));
    }

    let password_hash = hasher.hash(&password)?;
    // The store re-checks the email under its unique constraint.
    let user = store.create_user(NewUser::new(email, password_hash)).await?;
    let token = tokens.issue(&user)?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".to_string(),
        data: AuthData {
            email: user.email,
            token,
            tasks: None,
        },
    }))
}

/// Login user
///
/// Authenticates a user and returns a fresh token together with all of the user's tasks.
#[post("/login")]
pub async fn login(
    store: web::Data<dyn Store>,
    hasher: web::Data<PasswordHasher>,
    tokens: web::Data<TokenIssuer>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let user = match store.find_user_by_email(&login_data.email).await? {
        Some(user) if hasher.verify(&login_data.password, &user.password_hash) => user,
        _ => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    let token = tokens.issue(&user)?;
    let tasks = store
        .list_tasks(user.id)
        .await?
        .iter()
        .map(TaskSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "User logged in successfully".to_string(),
        data: AuthData {
            email: user.email,
            token,
            tasks: Some(tasks),
        },
    }))
}
