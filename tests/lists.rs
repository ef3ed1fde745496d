//! End-to-end tests for list/task CRUD and the ownership invariant: a user
//! can never touch a list or task owned by someone else.
//!
//! These need a running Postgres with the migrations applied and a .env with
//! the DB_* variables set, so they are ignored by default:
//!
//!     cargo test -- --ignored

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use jsonwebtoken::Algorithm;
use sqlx::PgPool;

use listkeeper::auth::TokenService;
use listkeeper::config::MailConfig;
use listkeeper::mail::Mailer;
use listkeeper::routes;

const TEST_SECRET: &str = "integration-test-secret";

async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = format!(
        "postgresql://{}:{}@{}:{}/{}",
        std::env::var("DB_USER").expect("DB_USER must be set for tests"),
        std::env::var("DB_PASSWORD").expect("DB_PASSWORD must be set for tests"),
        std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
        std::env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
        std::env::var("DB_NAME").expect("DB_NAME must be set for tests"),
    );
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

fn test_tokens() -> web::Data<TokenService> {
    web::Data::new(TokenService::new(TEST_SECRET, Algorithm::HS256, 15))
}

fn test_mailer() -> web::Data<Mailer> {
    let config = MailConfig {
        smtp_server: "localhost".to_string(),
        smtp_port: 2525,
        username: "todo@example.com".to_string(),
        password: "unused".to_string(),
        public_base_url: "http://localhost:8080".to_string(),
    };
    web::Data::new(Mailer::from_config(&config).expect("Failed to build test mailer"))
}

/// Registers an already-activated user directly in the database and returns
/// a bearer token for them.
async fn seed_active_user(pool: &PgPool, tokens: &TokenService, email: &str) -> String {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;

    let password_hash = listkeeper::auth::hash_password("Password123!").unwrap();
    sqlx::query(
        "INSERT INTO users (firstname, lastname, email, password_hash, active) \
         VALUES ('Test', 'User', $1, $2, TRUE)",
    )
    .bind(email)
    .bind(&password_hash)
    .execute(pool)
    .await
    .expect("Failed to seed user");

    tokens.issue(email, None).unwrap()
}

macro_rules! init_app {
    ($pool:expr, $tokens:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data($tokens.clone())
                .app_data(test_mailer())
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(routes::health::health)
                .service(web::scope("/api/v1").configure(routes::config)),
        )
        .await
    };
}

#[ignore]
#[actix_rt::test]
async fn test_list_and_task_crud() {
    let pool = test_pool().await;
    let tokens = test_tokens();
    let alice = seed_active_user(&pool, &tokens, "crud-alice@example.com").await;

    let app = init_app!(pool, tokens);

    // Create a list.
    let req = test::TestRequest::post()
        .uri("/api/v1/lists/create")
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .set_json(serde_json::json!({ "name": "Groceries" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let list_id = body["id"].as_i64().unwrap();
    assert_eq!(body["name"], "Groceries");
    assert!(body["tasks"].as_array().unwrap().is_empty());

    // Add a task.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/tasks/{}/create", list_id))
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .set_json(serde_json::json!({
            "title": "Buy milk",
            "due_time": "09:30:00",
            "description": "Whole, not skimmed"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let task_id = body["id"].as_i64().unwrap();
    assert_eq!(body["done"], false);

    // The list now carries its task inline.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/lists/{}", list_id))
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(body["tasks"][0]["title"], "Buy milk");

    // Complete, then edit the task.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/tasks/{}/complete", task_id))
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["done"], true);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/tasks/{}/edit", task_id))
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .set_json(serde_json::json!({
            "title": "Buy oat milk",
            "description": ""
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Buy oat milk");
    // Editing leaves the done flag alone.
    assert_eq!(body["done"], true);

    // Delete the list; its tasks cascade away.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/lists/{}/delete", list_id))
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/tasks/{}/complete", task_id))
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[ignore]
#[actix_rt::test]
async fn test_cross_owner_access_is_forbidden() {
    let pool = test_pool().await;
    let tokens = test_tokens();
    let alice = seed_active_user(&pool, &tokens, "own-alice@example.com").await;
    let bob = seed_active_user(&pool, &tokens, "own-bob@example.com").await;

    let app = init_app!(pool, tokens);

    // Alice creates a list with one task.
    let req = test::TestRequest::post()
        .uri("/api/v1/lists/create")
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .set_json(serde_json::json!({ "name": "Private" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let list_id = body["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/tasks/{}/create", list_id))
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .set_json(serde_json::json!({ "title": "Secret errand" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let task_id = body["id"].as_i64().unwrap();

    // Bob holds a perfectly valid token, but everything of Alice's is 403.
    let forbidden = [
        test::TestRequest::get().uri(&format!("/api/v1/lists/{}", list_id)),
        test::TestRequest::delete().uri(&format!("/api/v1/lists/{}/delete", list_id)),
        test::TestRequest::post()
            .uri(&format!("/api/v1/tasks/{}/create", list_id))
            .set_json(serde_json::json!({ "title": "Intruding task" })),
        test::TestRequest::patch().uri(&format!("/api/v1/tasks/{}/complete", task_id)),
        test::TestRequest::put()
            .uri(&format!("/api/v1/tasks/{}/edit", task_id))
            .set_json(serde_json::json!({ "title": "Hijacked" })),
        test::TestRequest::delete().uri(&format!("/api/v1/tasks/{}/delete", task_id)),
    ];
    for request in forbidden {
        let req = request
            .insert_header(("Authorization", format!("Bearer {}", bob)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403, "cross-owner access must be forbidden");
    }

    // Bob's own list view does not include Alice's list.
    let req = test::TestRequest::get()
        .uri("/api/v1/lists")
        .insert_header(("Authorization", format!("Bearer {}", bob)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.as_array().unwrap().is_empty());

    // Alice's view still has everything.
    let req = test::TestRequest::get()
        .uri("/api/v1/lists")
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["tasks"].as_array().unwrap().len(), 1);
}
