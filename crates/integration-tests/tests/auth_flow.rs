//! End-to-end tests for sign-up, sign-in and the token cookies.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`sr-cli migrate`)
//! - The server running with `COOKIE_SECURE=false`
//!
//! Run with: cargo test -p store-ratings-integration-tests -- --ignored

#![allow(clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::json;
use store_ratings_integration_tests::{
    PASSWORD, client, display_name, envelope, sign_in, sign_up_user, unique_email, url,
};

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_health() {
    let resp = client()
        .get(url("/health"))
        .send()
        .await
        .expect("Health request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_self_sign_up_creates_user_role() {
    let client = client();
    let email = unique_email("signup");

    let user = sign_up_user(&client, &email).await;

    assert_eq!(user["role"], "USER");
    assert_eq!(user["email"], email);
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_duplicate_email_conflicts() {
    let client = client();
    let email = unique_email("dup");
    sign_up_user(&client, &email).await;

    let resp = client
        .post(url("/api/auth/user/signup"))
        .json(&json!({
            "name": display_name("Duplicate"),
            "address": "1 Same Street",
            "email": email.to_uppercase(),
            "password": PASSWORD,
        }))
        .send()
        .await
        .expect("Sign-up request failed");

    let (status, body) = envelope(resp).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User with this email already exists.");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_invalid_sign_up_lists_every_error() {
    let resp = client()
        .post(url("/api/auth/user/signup"))
        .json(&json!({ "name": "Short", "email": "nope", "password": "short" }))
        .send()
        .await
        .expect("Sign-up request failed");

    let (status, body) = envelope(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed.");
    let errors = body["errors"].as_array().expect("errors array");
    assert!(errors.len() >= 3, "expected several errors: {body}");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_wrong_password_is_invalid_credentials() {
    let client = client();
    let email = unique_email("wrongpw");
    sign_up_user(&client, &email).await;

    for (email, password) in [(email.as_str(), "Wr0ng!pass"), ("nobody@example.com", PASSWORD)] {
        let resp = client
            .post(url("/api/auth/signin"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Sign-in request failed");

        let (status, body) = envelope(resp).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials.");
    }
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_cookie_session_lifecycle() {
    let client = client();
    let email = unique_email("session");
    sign_up_user(&client, &email).await;

    let data = sign_in(&client, &email, PASSWORD).await;
    assert!(data["accessToken"].is_string());
    assert!(data["refreshToken"].is_string());

    let me = client.get(url("/api/auth/me")).send().await.expect("me failed");
    let (status, body) = envelope(me).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], email);

    let refreshed = client
        .post(url("/api/auth/refresh"))
        .send()
        .await
        .expect("Refresh request failed");
    let (status, body) = envelope(refreshed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], email);

    let logout = client
        .post(url("/api/auth/logout"))
        .send()
        .await
        .expect("Logout request failed");
    assert_eq!(logout.status(), StatusCode::OK);

    let me = client.get(url("/api/auth/me")).send().await.expect("me failed");
    let (status, body) = envelope(me).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token missing.");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_bearer_header_is_accepted() {
    let signup = client();
    let email = unique_email("bearer");
    sign_up_user(&signup, &email).await;
    let data = sign_in(&signup, &email, PASSWORD).await;
    let token = data["accessToken"].as_str().expect("access token");

    let resp = client()
        .get(url("/api/auth/me"))
        .bearer_auth(token)
        .send()
        .await
        .expect("me failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_update_password() {
    let client = client();
    let email = unique_email("passwd");
    sign_up_user(&client, &email).await;
    sign_in(&client, &email, PASSWORD).await;

    let resp = client
        .post(url("/api/auth/update-password"))
        .json(&json!({ "oldPassword": "Wr0ng!pass", "newPassword": "N3w!Passw" }))
        .send()
        .await
        .expect("Update request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(url("/api/auth/update-password"))
        .json(&json!({ "oldPassword": PASSWORD, "newPassword": "weak" }))
        .send()
        .await
        .expect("Update request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(url("/api/auth/update-password"))
        .json(&json!({ "email": email, "oldPassword": PASSWORD, "newPassword": "N3w!Passw" }))
        .send()
        .await
        .expect("Update request failed");
    let (status, body) = envelope(resp).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully.");

    sign_in(&client, &email, "N3w!Passw").await;
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_non_admin_cannot_use_admin_sign_up() {
    let client = client();
    let email = unique_email("notadmin");
    sign_up_user(&client, &email).await;
    sign_in(&client, &email, PASSWORD).await;

    let resp = client
        .post(url("/api/auth/signup"))
        .json(&json!({
            "name": display_name("Escalation"),
            "address": "1 Nowhere",
            "email": unique_email("escalate"),
            "password": PASSWORD,
            "role": "ADMIN",
        }))
        .send()
        .await
        .expect("Admin sign-up request failed");

    let (status, body) = envelope(resp).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Admins only.");
}
