use std::sync::Arc;

use actix_web::http::{header, Method, StatusCode};
use actix_web::{test, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskmate::auth::{AuthResponse, PasswordHasher, TokenIssuer};
use taskmate::routes;
use taskmate::routes::tasks::{TaskListResponse, TaskResponse};
use taskmate::store::{MemoryStore, Store};
use taskmate::AppState;

fn test_state() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        TokenIssuer::new("integration-test-secret", 3600),
        PasswordHasher::new(4),
    );
    (store, state)
}

/// Sends a request with an optional bearer token and returns status plus JSON body.
async fn send(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    method: Method,
    uri: &str,
    token: Option<&str>,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = test::TestRequest::default().method(method).uri(uri);
    if let Some(token) = token {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)));
    }
    if let Some(payload) = payload {
        req = req.set_json(payload);
    }

    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!(
            "{} returned a non-JSON body: {:?}",
            uri,
            String::from_utf8_lossy(&body)
        )
    });
    (status, json)
}

async fn register(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "Failed to register {}: {}", email, body);
    let response: AuthResponse = serde_json::from_value(body).unwrap();
    response.data.token
}

#[actix_rt::test]
async fn test_register_create_and_list_example() {
    let (_store, state) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &state))).await;

    let token = register(&app, "a@x.com", "secret123").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks/create",
        Some(&token),
        Some(json!({ "name": "Buy milk" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "message": "Task created successfully",
            "task": { "id": 1, "name": "Buy milk", "description": null, "owner": "a@x.com" }
        })
    );

    let (status, body) = send(&app, Method::GET, "/api/tasks/list", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "tasks": [{ "id": 1, "name": "Buy milk", "description": null }],
            "owner": "a@x.com"
        })
    );
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let (_store, state) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &state))).await;
    let token = register(&app, "crud@x.com", "PasswordCrud123!").await;

    // 1. Create
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks/create",
        Some(&token),
        Some(json!({ "name": "CRUD Task Original", "description": "Initial description" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: TaskResponse = serde_json::from_value(body).unwrap();
    let task_id = created.task.id;
    assert_eq!(created.task.description.as_deref(), Some("Initial description"));

    // 2. Show
    let uri = format!("/api/tasks/{}", task_id);
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "id": task_id,
            "name": "CRUD Task Original",
            "description": "Initial description",
            "owner": "crud@x.com"
        })
    );

    // 3. Update
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/tasks/update/{}", task_id),
        Some(&token),
        Some(json!({ "name": "CRUD Task Updated", "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: TaskResponse = serde_json::from_value(body).unwrap();
    assert_eq!(updated.message, "Task updated successfully");
    assert_eq!(updated.task.id, task_id);
    assert_eq!(updated.task.name, "CRUD Task Updated");
    assert_eq!(updated.task.description, None);
    assert_eq!(updated.task.owner, "crud@x.com");

    // 4. List reflects the update
    let (status, body) = send(&app, Method::GET, "/api/tasks/list", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: TaskListResponse = serde_json::from_value(body).unwrap();
    assert_eq!(listed.tasks.len(), 1);
    assert_eq!(listed.tasks[0].name, "CRUD Task Updated");

    // 5. Delete
    let delete_uri = format!("/api/tasks/delete/{}", task_id);
    let (status, body) = send(&app, Method::DELETE, &delete_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Task deleted successfully" }));

    // 6. Gone afterwards
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Task not found" }));

    let (status, _) = send(&app, Method::DELETE, &delete_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_task_names_are_unique_per_owner() {
    let (_store, state) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &state))).await;
    let token_a = register(&app, "a@x.com", "password-a").await;
    let token_b = register(&app, "b@x.com", "password-b").await;

    let payload = json!({ "name": "X", "description": "first" });

    let (status, _) = send(&app, Method::POST, "/api/tasks/create", Some(&token_a), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/api/tasks/create", Some(&token_a), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Task already exists." }));

    let (status, _) = send(&app, Method::POST, "/api/tasks/create", Some(&token_b), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_rt::test]
async fn test_update_cannot_collide_with_another_task_name() {
    let (_store, state) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &state))).await;
    let token = register(&app, "rename@x.com", "password").await;

    for name in ["first", "second"] {
        let (status, _) = send(&app, Method::POST, "/api/tasks/create", Some(&token), Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/tasks/update/2",
        Some(&token),
        Some(json!({ "name": "first", "description": "clash" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Task already exists." }));
}

#[actix_rt::test]
async fn test_task_ownership_and_authorization() {
    let (store, state) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &state))).await;
    let token_a = register(&app, "owner_a@x.com", "PasswordOwnerA123!").await;
    let token_b = register(&app, "other_b@x.com", "PasswordOtherB123!").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks/create",
        Some(&token_a),
        Some(json!({ "name": "User A's Task", "description": "private" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = body["task"]["id"].as_i64().unwrap();

    // User B does not see it in their list.
    let (_, body) = send(&app, Method::GET, "/api/tasks/list", Some(&token_b), None).await;
    assert_eq!(body, json!({ "tasks": [], "owner": "other_b@x.com" }));

    let forbidden = json!({ "error": "You do not own this task." });

    let (status, body) = send(&app, Method::GET, &format!("/api/tasks/{}", task_id), Some(&token_b), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, forbidden);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/tasks/update/{}", task_id),
        Some(&token_b),
        Some(json!({ "name": "Attempted Update by B", "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, forbidden);

    // Ownership is decided before the body is validated.
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/tasks/update/{}", task_id),
        Some(&token_b),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, forbidden);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/tasks/delete/{}", task_id), Some(&token_b), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, forbidden);

    // The task is untouched.
    let stored = store.find_task(task_id as i32).await.unwrap().unwrap();
    assert_eq!(stored.name, "User A's Task");
    assert_eq!(stored.description.as_deref(), Some("private"));

    let (status, _) = send(&app, Method::GET, &format!("/api/tasks/{}", task_id), Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_requests_without_valid_token_are_unauthorized() {
    let (_store, state) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &state))).await;

    let requests = vec![
        (Method::GET, "/api/tasks/list", None),
        (Method::POST, "/api/tasks/create", Some(json!({ "name": "Unauthorized Task" }))),
        (Method::GET, "/api/tasks/1", None),
        (Method::PUT, "/api/tasks/update/1", Some(json!({ "name": "n" }))),
        (Method::DELETE, "/api/tasks/delete/1", None),
    ];

    for (method, uri, payload) in requests {
        let (status, body) = send(&app, method.clone(), uri, None, payload.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} without token", method, uri);
        assert_eq!(body, json!({ "error": "Missing token" }));

        let (status, body) = send(&app, method.clone(), uri, Some("forged.token.value"), payload).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} with forged token", method, uri);
        assert_eq!(body, json!({ "error": "Invalid token" }));
    }

    // A token signed with a different secret is rejected as well.
    let foreign = AppState::new(
        Arc::new(MemoryStore::new()),
        TokenIssuer::new("some-other-secret", 3600),
        PasswordHasher::new(4),
    );
    let other_app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &foreign))).await;
    let foreign_token = register(&other_app, "x@x.com", "password").await;

    let (status, _) = send(&app, Method::GET, "/api/tasks/list", Some(&foreign_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_token_from_previous_store_does_not_reach_new_users_tasks() {
    let (_store, state) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &state))).await;
    let alice_token = register(&app, "alice@x.com", "alice-pw").await;

    // Same secret, fresh store: bob is now user 1.
    let (_store, restarted) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &restarted))).await;
    let bob_token = register(&app, "bob@x.com", "bob-pw").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tasks/create",
        Some(&bob_token),
        Some(json!({ "name": "bob secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let invalid = json!({ "error": "Invalid token" });

    let (status, body) = send(&app, Method::GET, "/api/tasks/list", Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, invalid);

    let (status, body) = send(&app, Method::GET, "/api/tasks/1", Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, invalid);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks/create",
        Some(&alice_token),
        Some(json!({ "name": "alice task" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, invalid);

    let (_, body) = send(&app, Method::GET, "/api/tasks/list", Some(&bob_token), None).await;
    assert_eq!(body["tasks"].as_array().map(Vec::len), Some(1));
}

#[actix_rt::test]
async fn test_missing_tasks_and_bad_input() {
    let (_store, state) = test_state();
    let app = test::init_service(App::new().configure(|cfg| routes::config(cfg, &state))).await;
    let token = register(&app, "edge@x.com", "password").await;

    let (status, body) = send(&app, Method::GET, "/api/tasks/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Task not found" }));

    let (status, body) = send(&app, Method::GET, "/api/tasks/not-a-number", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/tasks/update/999",
        Some(&token),
        Some(json!({ "name": "ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::POST, "/api/tasks/create", Some(&token), Some(json!({ "description": "no name" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::POST, "/api/tasks/create", Some(&token), Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "name: Task name must be between 1 and 255 characters" }));

    let (status, body) = send(&app, Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
}
