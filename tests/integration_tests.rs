//! Integration tests for the Books & Reviews Server API
//!
//! These tests verify the complete request/response cycle for all endpoints.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use booksandreviews_server::{app, open_database, AppState, Config, Db};

// Test configuration constants
const TEST_SECRET: &str = "test-secret-key";
const TEST_ADMIN_KEY: &str = "test-admin-key";
const TEST_PASSWORD: &str = "Secreta1";

// =============================================================================
// Test Helpers
// =============================================================================

/// Create a test configuration
fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,            // Random port
        database_path: String::new(), // Will be set per test
        allowed_origins: vec!["http://localhost:3001".to_string()],
        environment: "test".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        bcrypt_cost: 4, // Low cost keeps tests fast
        admin_secret_key: Some(TEST_ADMIN_KEY.to_string()),
        openrouter_api_key: None, // Chat endpoint answers 503
        openrouter_model: None,
        openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
        public_origin: "http://localhost:3001".to_string(),
    }
}

/// Create a test database in a temporary directory
fn create_test_db(temp_dir: &TempDir) -> Db {
    let db_path = temp_dir.path().join("test.db");
    open_database(&db_path).expect("Failed to create test database")
}

/// Create a test app router
fn create_test_app(db: &Db) -> Router {
    app(AppState::new(db.clone(), test_config()))
}

/// Build a JSON request, optionally carrying a session cookie
fn json_request(method: Method, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a bodyless request, optionally carrying a session cookie
fn bare_request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Parse response body as JSON
async fn body_to_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the "auth-token=..." pair from the Set-Cookie header
fn auth_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header present")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// Register a user and return (user_id, session cookie)
async fn register(app: &Router, username: &str) -> (String, String) {
    let body = json!({
        "email": format!("{}@example.com", username),
        "username": username,
        "displayName": "Test Reader",
        "password": TEST_PASSWORD,
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            &body,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = auth_cookie(&response);
    let body = body_to_json(response.into_body()).await;
    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    (user_id, cookie)
}

/// Create a review and return its JSON body
async fn create_review(app: &Router, cookie: &str, book_id: &str) -> Value {
    let body = json!({
        "bookId": book_id,
        "bookTitle": "Test Book",
        "rating": 4,
        "content": "A fine read with memorable characters.",
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/reviews",
            &body,
            Some(cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_to_json(response.into_body()).await
}

/// Create a book list and return its JSON body
async fn create_list(app: &Router, cookie: &str, name: &str, list_type: &str) -> Value {
    let body = json!({ "name": name, "type": list_type });

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/lists", &body, Some(cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_to_json(response.into_body()).await
}

/// Add a book to a list
async fn add_book(app: &Router, cookie: &str, list_id: &str, book_id: &str) -> axum::response::Response {
    let body = json!({
        "bookId": book_id,
        "bookTitle": "Test Book",
        "bookAuthors": ["Test Author"],
    });

    app.clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/lists/{}/books", list_id),
            &body,
            Some(cookie),
        ))
        .await
        .unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check_returns_healthy() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let response = app
        .oneshot(bare_request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["version"].as_str().is_some());
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_register_success() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let body = json!({
        "email": "reader@example.com",
        "username": "reader",
        "displayName": "Avid Reader",
        "password": TEST_PASSWORD,
    });

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            &body,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("auth-token="));
    assert!(set_cookie.contains("HttpOnly"));

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "reader@example.com");
    assert_eq!(body["user"]["username"], "reader");
    assert_eq!(body["user"]["displayName"], "Avid Reader");
    assert!(body["token"].as_str().is_some());
    // The password hash must never appear in responses
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_invalid_email() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let body = json!({
        "email": "not-an-email",
        "username": "reader",
        "displayName": "Avid Reader",
        "password": TEST_PASSWORD,
    });

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            &body,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_weak_password() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    // No uppercase, no digit
    let body = json!({
        "email": "reader@example.com",
        "username": "reader",
        "displayName": "Avid Reader",
        "password": "weakpassword",
    });

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            &body,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("uppercase"));
}

#[tokio::test]
async fn test_register_invalid_username() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let body = json!({
        "email": "reader@example.com",
        "username": "bad name!",
        "displayName": "Avid Reader",
        "password": TEST_PASSWORD,
    });

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            &body,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    register(&app, "reader").await;

    // Same email, different username
    let body = json!({
        "email": "reader@example.com",
        "username": "other",
        "displayName": "Other Reader",
        "password": TEST_PASSWORD,
    });

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            &body,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("already in use"));
}

#[tokio::test]
async fn test_register_duplicate_username_conflict() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    register(&app, "reader").await;

    // Same username, different email
    let body = json!({
        "email": "other@example.com",
        "username": "reader",
        "displayName": "Other Reader",
        "password": TEST_PASSWORD,
    });

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/auth/register",
            &body,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// =============================================================================
// Login / Session Tests
// =============================================================================

#[tokio::test]
async fn test_login_success() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    register(&app, "reader").await;

    let body = json!({ "email": "reader@example.com", "password": TEST_PASSWORD });
    let response = app
        .oneshot(json_request(Method::POST, "/api/auth/login", &body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(auth_cookie(&response).starts_with("auth-token="));

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "reader");
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    register(&app, "reader").await;

    let body = json!({ "email": "reader@example.com", "password": "Wrong-Pass1" });
    let response = app
        .oneshot(json_request(Method::POST, "/api/auth/login", &body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_email_unauthorized() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let body = json!({ "email": "nobody@example.com", "password": TEST_PASSWORD });
    let response = app
        .oneshot(json_request(Method::POST, "/api/auth/login", &body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (user_id, cookie) = register(&app, "reader").await;

    let response = app
        .oneshot(bare_request(Method::GET, "/api/auth/me", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["user"]["email"], "reader@example.com");
}

#[tokio::test]
async fn test_me_without_cookie_unauthorized() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let response = app
        .oneshot(bare_request(Method::GET, "/api/auth/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_tampered_token_unauthorized() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let tampered = format!("{}corrupted", cookie);

    let response = app
        .oneshot(bare_request(Method::GET, "/api/auth/me", Some(&tampered)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let response = app
        .oneshot(bare_request(Method::POST, "/api/auth/logout", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("auth-token="));
    assert!(set_cookie.contains("Max-Age=0"));
}

// =============================================================================
// User Profile Tests
// =============================================================================

#[tokio::test]
async fn test_get_user_profile() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (user_id, _) = register(&app, "reader").await;

    let response = app
        .oneshot(bare_request(
            Method::GET,
            &format!("/api/users/{}", user_id),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["username"], "reader");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_get_unknown_user_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let response = app
        .oneshot(bare_request(Method::GET, "/api/users/does-not-exist", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_profile() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let body = json!({ "displayName": "Renamed Reader", "bio": "I read a lot." });
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            "/api/users/me",
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["displayName"], "Renamed Reader");
    assert_eq!(body["bio"], "I read a lot.");

    // The change is visible through /me as well
    let response = app
        .oneshot(bare_request(Method::GET, "/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["user"]["displayName"], "Renamed Reader");
}

#[tokio::test]
async fn test_update_profile_requires_auth() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let body = json!({ "displayName": "Renamed Reader" });
    let response = app
        .oneshot(json_request(Method::PATCH, "/api/users/me", &body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivated_account_cannot_login() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let response = app
        .clone()
        .oneshot(bare_request(Method::DELETE, "/api/users/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Login is rejected for the deactivated account
    let body = json!({ "email": "reader@example.com", "password": TEST_PASSWORD });
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/auth/login", &body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The old session no longer resolves either
    let response = app
        .oneshot(bare_request(Method::GET, "/api/auth/me", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_pagination() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    register(&app, "reader1").await;
    register(&app, "reader2").await;
    register(&app, "reader3").await;

    let response = app
        .oneshot(bare_request(Method::GET, "/api/users?page=1&limit=2", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 3);
}

// =============================================================================
// Review Tests
// =============================================================================

#[tokio::test]
async fn test_create_review() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (user_id, cookie) = register(&app, "reader").await;
    let review = create_review(&app, &cookie, "zyTCAlFPjgYC").await;

    assert_eq!(review["bookId"], "zyTCAlFPjgYC");
    assert_eq!(review["rating"], 4);
    assert_eq!(review["userId"], user_id.as_str());
    assert_eq!(review["userDisplayName"], "Test Reader");
    assert_eq!(review["isEdited"], false);
    assert_eq!(review["isPublic"], true);
    assert_eq!(review["stats"]["likes"], 0);
    assert_eq!(review["stats"]["dislikes"], 0);
}

#[tokio::test]
async fn test_create_review_requires_auth() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let body = json!({
        "bookId": "zyTCAlFPjgYC",
        "bookTitle": "Test Book",
        "rating": 4,
        "content": "A fine read.",
    });
    let response = app
        .oneshot(json_request(Method::POST, "/api/reviews", &body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_review_invalid_rating() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let body = json!({
        "bookId": "zyTCAlFPjgYC",
        "bookTitle": "Test Book",
        "rating": 6,
        "content": "A fine read.",
    });
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/reviews",
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_review_conflict() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    create_review(&app, &cookie, "zyTCAlFPjgYC").await;

    let body = json!({
        "bookId": "zyTCAlFPjgYC",
        "bookTitle": "Test Book",
        "rating": 5,
        "content": "Changed my mind, even better.",
    });
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/reviews",
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("already reviewed"));
}

#[tokio::test]
async fn test_list_reviews_filtered_by_book() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    create_review(&app, &cookie, "book-one").await;
    create_review(&app, &cookie, "book-two").await;

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::GET,
            "/api/reviews?bookId=book-one",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["reviews"][0]["bookId"], "book-one");

    // Unfiltered listing sees both
    let response = app
        .oneshot(bare_request(Method::GET, "/api/reviews", None))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_update_review_marks_edited() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let review = create_review(&app, &cookie, "zyTCAlFPjgYC").await;
    let review_id = review["id"].as_str().unwrap();

    let body = json!({ "rating": 5, "content": "Even better on a second read." });
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/reviews/{}", review_id),
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["rating"], 5);
    assert_eq!(body["isEdited"], true);
}

#[tokio::test]
async fn test_update_review_not_owner_forbidden() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, owner_cookie) = register(&app, "owner").await;
    let (_, other_cookie) = register(&app, "other").await;
    let review = create_review(&app, &owner_cookie, "zyTCAlFPjgYC").await;
    let review_id = review["id"].as_str().unwrap();

    let body = json!({ "content": "Hijacked!" });
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/reviews/{}", review_id),
            &body,
            Some(&other_cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_review_frees_book_for_rereview() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let review = create_review(&app, &cookie, "zyTCAlFPjgYC").await;
    let review_id = review["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::DELETE,
            &format!("/api/reviews/{}", review_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The listing is empty again
    let response = app
        .clone()
        .oneshot(bare_request(Method::GET, "/api/reviews", None))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["total"], 0);

    // And the (book, user) slot is free again
    create_review(&app, &cookie, "zyTCAlFPjgYC").await;
}

#[tokio::test]
async fn test_like_increments_by_exactly_one() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let review = create_review(&app, &cookie, "zyTCAlFPjgYC").await;
    let review_id = review["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::POST,
            &format!("/api/reviews/{}/likes", review_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["stats"]["likes"], 1);

    let response = app
        .oneshot(bare_request(
            Method::POST,
            &format!("/api/reviews/{}/likes", review_id),
            None,
        ))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["stats"]["likes"], 2);
    assert_eq!(body["stats"]["dislikes"], 0);
}

#[tokio::test]
async fn test_dislike_unknown_review_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let response = app
        .oneshot(bare_request(
            Method::POST,
            "/api/reviews/does-not-exist/dislikes",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Vote Tests
// =============================================================================

#[tokio::test]
async fn test_cast_vote() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let review = create_review(&app, &cookie, "zyTCAlFPjgYC").await;
    let review_id = review["id"].as_str().unwrap();

    let body = json!({ "targetType": "review", "targetId": review_id, "voteType": "like" });
    let response = app
        .oneshot(json_request(Method::POST, "/api/votes", &body, Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["voteType"], "like");
    assert_eq!(body["targetType"], "review");
    assert_eq!(body["isActive"], true);
}

#[tokio::test]
async fn test_revote_updates_instead_of_duplicating() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let review = create_review(&app, &cookie, "zyTCAlFPjgYC").await;
    let review_id = review["id"].as_str().unwrap().to_string();

    let like = json!({ "targetType": "review", "targetId": review_id, "voteType": "like" });
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/votes", &like, Some(&cookie)))
        .await
        .unwrap();
    let first = body_to_json(response.into_body()).await;

    let dislike = json!({ "targetType": "review", "targetId": review_id, "voteType": "dislike" });
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/votes",
            &dislike,
            Some(&cookie),
        ))
        .await
        .unwrap();
    let second = body_to_json(response.into_body()).await;

    // Same vote document, new vote type
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["voteType"], "dislike");

    // Stats see one dislike and no like
    let response = app
        .oneshot(bare_request(
            Method::GET,
            &format!("/api/votes/stats?targetType=review&targetId={}", review_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    let stats = body_to_json(response.into_body()).await;
    assert_eq!(stats["likes"], 0);
    assert_eq!(stats["dislikes"], 1);
    assert_eq!(stats["userVote"], "dislike");
}

#[tokio::test]
async fn test_vote_stats_aggregates_across_users() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, author_cookie) = register(&app, "author").await;
    let (_, fan_cookie) = register(&app, "fan").await;
    let (_, critic_cookie) = register(&app, "critic").await;

    let review = create_review(&app, &author_cookie, "zyTCAlFPjgYC").await;
    let review_id = review["id"].as_str().unwrap().to_string();

    for (cookie, vote_type) in [(&fan_cookie, "like"), (&critic_cookie, "dislike")] {
        let body = json!({ "targetType": "review", "targetId": review_id, "voteType": vote_type });
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/votes", &body, Some(cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Anonymous stats: counts but no userVote
    let response = app
        .clone()
        .oneshot(bare_request(
            Method::GET,
            &format!("/api/votes/stats?targetType=review&targetId={}", review_id),
            None,
        ))
        .await
        .unwrap();
    let stats = body_to_json(response.into_body()).await;
    assert_eq!(stats["likes"], 1);
    assert_eq!(stats["dislikes"], 1);
    assert!(stats.get("userVote").is_none());

    // The fan sees their own vote attached
    let response = app
        .oneshot(bare_request(
            Method::GET,
            &format!("/api/votes/stats?targetType=review&targetId={}", review_id),
            Some(&fan_cookie),
        ))
        .await
        .unwrap();
    let stats = body_to_json(response.into_body()).await;
    assert_eq!(stats["userVote"], "like");
}

#[tokio::test]
async fn test_remove_vote_is_soft_delete() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let review = create_review(&app, &cookie, "zyTCAlFPjgYC").await;
    let review_id = review["id"].as_str().unwrap().to_string();

    let body = json!({ "targetType": "review", "targetId": review_id, "voteType": "like" });
    app.clone()
        .oneshot(json_request(Method::POST, "/api/votes", &body, Some(&cookie)))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::DELETE,
            &format!("/api/votes?targetType=review&targetId={}", review_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The removed vote no longer counts and is no longer the user's vote
    let response = app
        .clone()
        .oneshot(bare_request(
            Method::GET,
            &format!("/api/votes/stats?targetType=review&targetId={}", review_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    let stats = body_to_json(response.into_body()).await;
    assert_eq!(stats["likes"], 0);
    assert!(stats.get("userVote").is_none());

    // Re-voting reactivates the same document
    let response = app
        .oneshot(json_request(Method::POST, "/api/votes", &body, Some(&cookie)))
        .await
        .unwrap();
    let vote = body_to_json(response.into_body()).await;
    assert_eq!(vote["isActive"], true);
}

#[tokio::test]
async fn test_remove_nonexistent_vote_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let response = app
        .oneshot(bare_request(
            Method::DELETE,
            "/api/votes?targetType=review&targetId=no-such-review",
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_my_votes_lists_active_only() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let review_a = create_review(&app, &cookie, "book-one").await;
    let review_b = create_review(&app, &cookie, "book-two").await;
    let id_a = review_a["id"].as_str().unwrap().to_string();
    let id_b = review_b["id"].as_str().unwrap().to_string();

    for id in [&id_a, &id_b] {
        let body = json!({ "targetType": "review", "targetId": id, "voteType": "helpful" });
        app.clone()
            .oneshot(json_request(Method::POST, "/api/votes", &body, Some(&cookie)))
            .await
            .unwrap();
    }

    // Remove the vote on the first review
    app.clone()
        .oneshot(bare_request(
            Method::DELETE,
            &format!("/api/votes?targetType=review&targetId={}", id_a),
            Some(&cookie),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(bare_request(Method::GET, "/api/votes/mine", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let votes = body_to_json(response.into_body()).await;
    let votes = votes.as_array().unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0]["targetId"], id_b.as_str());
}

// =============================================================================
// Book List Tests
// =============================================================================

#[tokio::test]
async fn test_create_list() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (user_id, cookie) = register(&app, "reader").await;
    let list = create_list(&app, &cookie, "To read this winter", "want-to-read").await;

    assert_eq!(list["name"], "To read this winter");
    assert_eq!(list["type"], "want-to-read");
    assert_eq!(list["userId"], user_id.as_str());
    assert_eq!(list["isPublic"], false);
    assert_eq!(list["isDefault"], false);
    assert_eq!(list["bookCount"], 0);
}

#[tokio::test]
async fn test_my_lists_filter_by_type() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    create_list(&app, &cookie, "Queue", "want-to-read").await;
    create_list(&app, &cookie, "Done", "read").await;

    let response = app
        .oneshot(bare_request(
            Method::GET,
            "/api/lists?type=read",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let lists = body_to_json(response.into_body()).await;
    let lists = lists.as_array().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0]["name"], "Done");
}

#[tokio::test]
async fn test_add_book_increments_count() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let list = create_list(&app, &cookie, "Queue", "want-to-read").await;
    let list_id = list["id"].as_str().unwrap();

    let response = add_book(&app, &cookie, list_id, "zyTCAlFPjgYC").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["bookCount"], 1);
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["books"][0]["bookId"], "zyTCAlFPjgYC");
}

#[tokio::test]
async fn test_add_duplicate_book_conflict() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let list = create_list(&app, &cookie, "Queue", "want-to-read").await;
    let list_id = list["id"].as_str().unwrap();

    add_book(&app, &cookie, list_id, "zyTCAlFPjgYC").await;
    let response = add_book(&app, &cookie, list_id, "zyTCAlFPjgYC").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_remove_book_restores_count() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let list = create_list(&app, &cookie, "Queue", "want-to-read").await;
    let list_id = list["id"].as_str().unwrap().to_string();

    add_book(&app, &cookie, &list_id, "zyTCAlFPjgYC").await;

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::DELETE,
            &format!("/api/lists/{}/books/zyTCAlFPjgYC", list_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["bookCount"], 0);
    assert!(body["books"].as_array().unwrap().is_empty());

    // Removing it again is a 404
    let response = app
        .oneshot(bare_request(
            Method::DELETE,
            &format!("/api/lists/{}/books/zyTCAlFPjgYC", list_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_book_entry() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let list = create_list(&app, &cookie, "Reading", "currently-reading").await;
    let list_id = list["id"].as_str().unwrap();

    add_book(&app, &cookie, list_id, "zyTCAlFPjgYC").await;

    let body = json!({ "notes": "Slow start, picks up.", "progress": 40 });
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/lists/{}/books/zyTCAlFPjgYC", list_id),
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["books"][0]["notes"], "Slow start, picks up.");
    assert_eq!(body["books"][0]["progress"], 40);
}

#[tokio::test]
async fn test_private_list_hidden_from_non_owner() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, owner_cookie) = register(&app, "owner").await;
    let (_, other_cookie) = register(&app, "other").await;
    let list = create_list(&app, &owner_cookie, "Secret queue", "custom").await;
    let list_id = list["id"].as_str().unwrap().to_string();

    // The owner can fetch it
    let response = app
        .clone()
        .oneshot(bare_request(
            Method::GET,
            &format!("/api/lists/{}", list_id),
            Some(&owner_cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Everyone else gets a 404, with or without a session
    for cookie in [Some(other_cookie.as_str()), None] {
        let response = app
            .clone()
            .oneshot(bare_request(
                Method::GET,
                &format!("/api/lists/{}", list_id),
                cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_public_lists_listing() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let list = create_list(&app, &cookie, "Shared shelf", "custom").await;
    let list_id = list["id"].as_str().unwrap();
    create_list(&app, &cookie, "Private shelf", "custom").await;

    // Publish one of the two
    let body = json!({ "isPublic": true });
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/lists/{}", list_id),
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(bare_request(Method::GET, "/api/lists/public", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["lists"][0]["name"], "Shared shelf");
}

#[tokio::test]
async fn test_delete_list() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let list = create_list(&app, &cookie, "Disposable", "custom").await;
    let list_id = list["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::DELETE,
            &format!("/api/lists/{}", list_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(bare_request(
            Method::GET,
            &format!("/api/lists/{}", list_id),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_contains_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    let list = create_list(&app, &cookie, "Queue", "want-to-read").await;
    let list_id = list["id"].as_str().unwrap().to_string();

    add_book(&app, &cookie, &list_id, "zyTCAlFPjgYC").await;

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::GET,
            "/api/lists/contains/zyTCAlFPjgYC",
            Some(&cookie),
        ))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["isInList"], true);
    assert_eq!(body["listId"], list_id.as_str());

    // Narrowing to a type that has no such list comes back false
    let response = app
        .oneshot(bare_request(
            Method::GET,
            "/api/lists/contains/zyTCAlFPjgYC?type=read",
            Some(&cookie),
        ))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["isInList"], false);
}

// =============================================================================
// Favorites Tests
// =============================================================================

#[tokio::test]
async fn test_favorites_created_once() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let response = app
        .clone()
        .oneshot(bare_request(Method::GET, "/api/favorites", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_to_json(response.into_body()).await;

    assert_eq!(first["type"], "favorites");
    assert_eq!(first["isDefault"], true);
    assert_eq!(first["isPublic"], false);

    // A second fetch returns the same list, not a new one
    let response = app
        .oneshot(bare_request(Method::GET, "/api/favorites", Some(&cookie)))
        .await
        .unwrap();
    let second = body_to_json(response.into_body()).await;
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_add_favorite_and_duplicate() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let body = json!({
        "bookId": "zyTCAlFPjgYC",
        "bookTitle": "The Google Story",
        "bookAuthors": ["David A. Vise"],
    });

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/favorites",
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_to_json(response.into_body()).await;
    assert_eq!(first["success"], true);

    // Adding the same book again reports failure in the message
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/favorites",
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_to_json(response.into_body()).await;
    assert_eq!(second["success"], false);
    assert!(second["message"]
        .as_str()
        .unwrap()
        .contains("already in your favorites"));

    // The favorites list holds exactly one copy
    let response = app
        .oneshot(bare_request(Method::GET, "/api/favorites", Some(&cookie)))
        .await
        .unwrap();
    let favorites = body_to_json(response.into_body()).await;
    assert_eq!(favorites["bookCount"], 1);
}

#[tokio::test]
async fn test_remove_favorite() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let body = json!({ "bookId": "zyTCAlFPjgYC", "bookTitle": "The Google Story" });
    app.clone()
        .oneshot(json_request(
            Method::POST,
            "/api/favorites",
            &body,
            Some(&cookie),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::DELETE,
            "/api/favorites/zyTCAlFPjgYC",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removed = body_to_json(response.into_body()).await;
    assert_eq!(removed["success"], true);

    // Removing a book that is not there reports failure
    let response = app
        .oneshot(bare_request(
            Method::DELETE,
            "/api/favorites/zyTCAlFPjgYC",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let again = body_to_json(response.into_body()).await;
    assert_eq!(again["success"], false);
}

#[tokio::test]
async fn test_favorites_contains() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;

    let response = app
        .clone()
        .oneshot(bare_request(
            Method::GET,
            "/api/favorites/contains/zyTCAlFPjgYC",
            Some(&cookie),
        ))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["isInFavorites"], false);

    let add = json!({ "bookId": "zyTCAlFPjgYC", "bookTitle": "The Google Story" });
    app.clone()
        .oneshot(json_request(
            Method::POST,
            "/api/favorites",
            &add,
            Some(&cookie),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(bare_request(
            Method::GET,
            "/api/favorites/contains/zyTCAlFPjgYC",
            Some(&cookie),
        ))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["isInFavorites"], true);
}

// =============================================================================
// Chat Tests
// =============================================================================

#[tokio::test]
async fn test_chat_unavailable_without_gateway_key() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let body = json!({
        "messages": [{ "role": "user", "content": "Recommend me a fantasy novel" }]
    });
    let response = app
        .oneshot(json_request(Method::POST, "/api/chat", &body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Admin Tests
// =============================================================================

#[tokio::test]
async fn test_admin_stats_wrong_key_unauthorized() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let response = app
        .oneshot(bare_request(
            Method::GET,
            "/api/admin/stats?key=wrong-key",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_stats_counts_records() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);
    let app = create_test_app(&db);

    let (_, cookie) = register(&app, "reader").await;
    create_review(&app, &cookie, "zyTCAlFPjgYC").await;

    let response = app
        .oneshot(bare_request(
            Method::GET,
            &format!("/api/admin/stats?key={}", TEST_ADMIN_KEY),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["user_count"], 1);
    assert_eq!(body["review_count"], 1);
    assert_eq!(body["vote_count"], 0);
    assert_eq!(body["total_records"], 2);
}
