use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::Duration;
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use taskmaster::auth::{AuthResponse, TokenService, REFRESH_COOKIE};
use taskmaster::models::Role;
use taskmaster::routes;
use uuid::Uuid;

fn tokens() -> TokenService {
    TokenService::new(
        "tasks_integration_access_secret",
        "tasks_integration_refresh_secret",
        Duration::minutes(15),
        Duration::days(7),
    )
}

async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "setup: registration failed");
    test::read_body_json(resp).await
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

// Needs DATABASE_URL pointing at a prepared test database (schema.sql
// applied). Run with `cargo test -- --ignored`.
#[ignore]
#[actix_rt::test]
async fn test_task_crud_flow() {
    let pool = test_pool().await;
    let service = tokens();

    for email in ["task_owner@example.com", "task_other@example.com"] {
        let _ = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&pool)
            .await;
    }

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(service.clone()))
            .service(web::scope("/api").configure(routes::config(service.clone()))),
    )
    .await;

    let owner = register_user(&app, "Task Owner", "task_owner@example.com").await;
    let other = register_user(&app, "Task Other", "task_other@example.com").await;

    // Create a task.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(bearer(&owner.access_token))
        .set_json(json!({
            "title": "Write report",
            "description": "Quarterly progress report",
            "dueDate": "2026-09-15T12:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["task"]["status"], "pending");
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    // Listing returns only the owner's tasks.
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(bearer(&owner.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Another user cannot see the task; it reads as absent.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(bearer(&other.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Short validation round: create with a too-short title fails.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(bearer(&owner.access_token))
        .set_json(json!({
            "title": "ab",
            "description": "Quarterly progress report",
            "dueDate": "2026-09-15T12:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Updating requires manager or admin. The role travels in the token, so
    // a manager-scoped token for the same account exercises the elevated
    // path.
    let manager_token = service
        .issue_access_token(owner.user.id, Role::Manager)
        .unwrap();
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(bearer(&manager_token))
        .set_json(json!({ "title": "Write final report", "status": "in-progress" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["task"]["title"], "Write final report");
    assert_eq!(body["task"]["status"], "in-progress");

    // Completion is not ownership-scoped: another user can complete the
    // task, unlike reading or updating it.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}/complete", task_id))
        .append_header(bearer(&other.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["task"]["status"], "completed");

    // Completing an id that does not exist reads as absent.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}/complete", Uuid::new_v4()))
        .append_header(bearer(&owner.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Deletion requires admin.
    let admin_token = service
        .issue_access_token(owner.user.id, Role::Admin)
        .unwrap();
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Deleting again reads as absent.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    for email in ["task_owner@example.com", "task_other@example.com"] {
        let _ = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&pool)
            .await;
    }
}

#[ignore]
#[actix_rt::test]
async fn test_user_administration_flow() {
    let pool = test_pool().await;
    let service = tokens();

    for email in ["admin_flow_admin@example.com", "admin_flow_member@example.com"] {
        let _ = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&pool)
            .await;
    }

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(service.clone()))
            .service(web::scope("/api").configure(routes::config(service.clone()))),
    )
    .await;

    let admin = register_user(&app, "Admin Flow", "admin_flow_admin@example.com").await;
    let member = register_user(&app, "Member Flow", "admin_flow_member@example.com").await;
    let admin_token = service
        .issue_access_token(admin.user.id, Role::Admin)
        .unwrap();

    // Promote the member to manager.
    let req = test::TestRequest::put()
        .uri("/api/users/role")
        .append_header(bearer(&admin_token))
        .set_json(json!({ "userId": member.user.id, "newRole": "manager" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["role"], "manager");

    // An unrecognized role is rejected before the handler runs.
    let req = test::TestRequest::put()
        .uri("/api/users/role")
        .append_header(bearer(&admin_token))
        .set_json(json!({ "userId": member.user.id, "newRole": "root" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown user id surfaces as 404.
    let req = test::TestRequest::put()
        .uri("/api/users/role")
        .append_header(bearer(&admin_token))
        .set_json(json!({ "userId": Uuid::new_v4(), "newRole": "manager" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Listing and fetching users.
    let req = test::TestRequest::get()
        .uri("/api/users")
        .append_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: serde_json::Value = test::read_body_json(resp).await;
    assert!(listed.as_array().unwrap().len() >= 2);
    // Password hashes never leave the API.
    assert!(listed[0].get("passwordHash").is_none());
    assert!(listed[0].get("password_hash").is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", member.user.id))
        .append_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Profile self-update with a password change, then login with the new
    // password.
    let req = test::TestRequest::put()
        .uri("/api/users/profile")
        .append_header(bearer(&member.access_token))
        .set_json(json!({ "name": "Renamed Member", "password": "NewPassword123!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["name"], "Renamed Member");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "admin_flow_member@example.com",
            "password": "NewPassword123!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    // Login also refreshes the cookie.
    assert!(resp
        .response()
        .cookies()
        .any(|c: Cookie<'_>| c.name() == REFRESH_COOKIE));

    // Delete the member account.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{}", member.user.id))
        .append_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", member.user.id))
        .append_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind("admin_flow_admin@example.com")
        .execute(&pool)
        .await;
}
