//! Shared helpers for end-to-end tests against a running server.
//!
//! # Environment
//!
//! - `RATINGS_BASE_URL` - server under test (default: `http://localhost:5000`)
//! - `TEST_ADMIN_EMAIL`, `TEST_ADMIN_PASSWORD` - an administrator created
//!   with `sr-cli admin create`, needed by tests that provision stores
//!
//! The server must run with `COOKIE_SECURE=false` so the cookie store keeps
//! the token cookies over plain HTTP.

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

/// A password satisfying every sign-up rule.
pub const PASSWORD: &str = "Rat1ng!Pass";

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("RATINGS_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Absolute URL for an API path.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A client that keeps the token cookies between requests.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// An email address no other test run has registered.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// A name that satisfies the 20 character minimum.
#[must_use]
pub fn display_name(label: &str) -> String {
    format!("Integration Test {label} Account")
}

/// Parse the JSON envelope, returning status and body.
pub async fn envelope(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response
        .json::<Value>()
        .await
        .expect("Response body is not JSON");
    (status, body)
}

/// Self-service sign-up; returns the created user object.
pub async fn sign_up_user(client: &Client, email: &str) -> Value {
    let response = client
        .post(url("/api/auth/user/signup"))
        .json(&json!({
            "name": display_name("Customer"),
            "address": "12 Rating Lane",
            "email": email,
            "password": PASSWORD,
        }))
        .send()
        .await
        .expect("Sign-up request failed");

    let (status, body) = envelope(response).await;
    assert_eq!(status, StatusCode::CREATED, "sign-up failed: {body}");
    body["data"].clone()
}

/// Sign in, storing the token cookies on `client`; returns the envelope data.
pub async fn sign_in(client: &Client, email: &str, password: &str) -> Value {
    let response = client
        .post(url("/api/auth/signin"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Sign-in request failed");

    let (status, body) = envelope(response).await;
    assert_eq!(status, StatusCode::OK, "sign-in failed: {body}");
    body["data"].clone()
}

/// A client signed in as the bootstrap administrator.
pub async fn admin_client() -> Client {
    let email = std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL must be set");
    let password =
        std::env::var("TEST_ADMIN_PASSWORD").expect("TEST_ADMIN_PASSWORD must be set");

    let client = client();
    sign_in(&client, &email, &password).await;
    client
}

/// Create an account with an explicit role through the admin sign-up route.
pub async fn create_account(admin: &Client, role: &str, email: &str) -> Value {
    let response = admin
        .post(url("/api/auth/signup"))
        .json(&json!({
            "name": display_name(role),
            "address": "99 Storefront Avenue",
            "email": email,
            "password": PASSWORD,
            "role": role,
        }))
        .send()
        .await
        .expect("Admin sign-up request failed");

    let (status, body) = envelope(response).await;
    assert_eq!(status, StatusCode::CREATED, "admin sign-up failed: {body}");
    body["data"].clone()
}
