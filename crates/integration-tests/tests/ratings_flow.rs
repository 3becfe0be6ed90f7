//! End-to-end tests for the rating ledger and dashboards.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`sr-cli migrate`)
//! - The server running with `COOKIE_SECURE=false`
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` for a bootstrapped admin
//!
//! Run with: cargo test -p store-ratings-integration-tests -- --ignored

#![allow(clippy::expect_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use store_ratings_integration_tests::{
    PASSWORD, admin_client, client, create_account, envelope, sign_in, sign_up_user,
    unique_email, url,
};

/// A fresh store plus a signed-in customer and store owner.
struct Fixture {
    store_id: i64,
    owner: Client,
    customer: Client,
}

async fn fixture() -> Fixture {
    let admin = admin_client().await;
    let owner_email = unique_email("owner");
    let store = create_account(&admin, "OWNER", &owner_email).await;
    let store_id = store["id"].as_i64().expect("store id");

    let owner = client();
    sign_in(&owner, &owner_email, PASSWORD).await;

    let customer = client();
    let customer_email = unique_email("customer");
    sign_up_user(&customer, &customer_email).await;
    sign_in(&customer, &customer_email, PASSWORD).await;

    Fixture {
        store_id,
        owner,
        customer,
    }
}

async fn submit(client: &Client, store_id: i64, rating: i64) -> (StatusCode, Value) {
    let resp = client
        .post(url("/api/ratings/submit"))
        .json(&json!({ "storeId": store_id, "rating": rating }))
        .send()
        .await
        .expect("Submit request failed");
    envelope(resp).await
}

async fn get(client: &Client, path: &str) -> (StatusCode, Value) {
    let resp = client.get(url(path)).send().await.expect("GET failed");
    envelope(resp).await
}

#[tokio::test]
#[ignore = "Requires running server, database and admin credentials"]
async fn test_submit_then_replace_rating() {
    let f = fixture().await;

    let (status, body) = submit(&f.customer, f.store_id, 4).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rating submitted successfully.");
    assert_eq!(body["data"]["rating"], 4);
    assert_eq!(body["data"]["totalRatings"], 1);

    let (status, body) = submit(&f.customer, f.store_id, 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rating updated successfully.");
    assert_eq!(body["data"]["totalRatings"], 1);
    assert_eq!(body["data"]["averageRating"].as_f64(), Some(2.0));

    let (status, body) = get(&f.customer, &format!("/api/ratings/user/{}", f.store_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 2);
}

#[tokio::test]
#[ignore = "Requires running server, database and admin credentials"]
async fn test_rejected_submissions() {
    let f = fixture().await;

    let (status, body) = submit(&f.customer, f.store_id, 6).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Rating must be between 1 and 5.");

    let resp = f
        .customer
        .post(url("/api/ratings/submit"))
        .json(&json!({ "rating": 3 }))
        .send()
        .await
        .expect("Submit request failed");
    let (status, body) = envelope(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Store ID and rating are required.");

    let (status, body) = submit(&f.owner, f.store_id, 5).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot rate your own store.");

    let (status, body) = submit(&f.customer, i64::from(i32::MAX), 3).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Store not found.");
}

#[tokio::test]
#[ignore = "Requires running server, database and admin credentials"]
async fn test_aggregates_and_store_view() {
    let f = fixture().await;
    submit(&f.customer, f.store_id, 4).await;

    let second = client();
    let email = unique_email("second");
    sign_up_user(&second, &email).await;
    sign_in(&second, &email, PASSWORD).await;
    submit(&second, f.store_id, 5).await;

    let (status, body) = get(&f.customer, "/api/ratings/averages/all").await;
    assert_eq!(status, StatusCode::OK);
    let entry = &body["data"]["averages"][f.store_id.to_string()];
    assert_eq!(entry["averageRating"].as_f64(), Some(4.5));
    assert_eq!(entry["totalRatings"], 2);

    let (status, body) = get(&f.customer, &format!("/api/ratings/store/{}", f.store_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ratings"].as_array().map(Vec::len), Some(2));
    // newest first
    assert_eq!(body["data"]["ratings"][0]["rating"], 5);

    let (status, body) = get(&f.owner, "/api/dashboard/owner").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalRatings"], 2);

    let (status, _) = get(&f.customer, "/api/dashboard/owner").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running server, database and admin credentials"]
async fn test_user_dashboard_and_delete() {
    let f = fixture().await;
    submit(&f.customer, f.store_id, 3).await;

    // A second store rated by the same customer.
    let admin = admin_client().await;
    let other_store = create_account(&admin, "OWNER", &unique_email("other-owner")).await;
    let other_store_id = other_store["id"].as_i64().expect("store id");
    submit(&f.customer, other_store_id, 5).await;

    // A second rater on the same store.
    let neighbour = client();
    let email = unique_email("neighbour");
    sign_up_user(&neighbour, &email).await;
    sign_in(&neighbour, &email, PASSWORD).await;
    submit(&neighbour, f.store_id, 1).await;

    let (status, body) = get(&f.customer, "/api/dashboard/user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["myRatings"]["ratings"][f.store_id.to_string()]["rating"], 3);

    let delete_path = url(&format!("/api/ratings/{}", f.store_id));
    let resp = f
        .customer
        .delete(&delete_path)
        .send()
        .await
        .expect("Delete request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, body) = get(&f.customer, &format!("/api/ratings/user/{}", f.store_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Rating not found.");

    let resp = f
        .customer
        .delete(&delete_path)
        .send()
        .await
        .expect("Delete request failed");
    let (status, body) = envelope(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Rating not found.");

    let (status, body) = get(&f.customer, &format!("/api/ratings/store/{}", f.store_id)).await;
    assert_eq!(status, StatusCode::OK);
    let ratings = body["data"]["ratings"].as_array().expect("ratings array");
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["rating"], 1);
    assert_eq!(body["data"]["totalRatings"], 1);

    let (status, body) = get(&f.customer, &format!("/api/ratings/user/{other_store_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 5);
}

#[tokio::test]
#[ignore = "Requires running server, database and admin credentials"]
async fn test_admin_dashboard_and_listings() {
    let admin = admin_client().await;

    let (status, body) = get(&admin, "/api/dashboard/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["totalUsers"].as_i64().unwrap_or_default() >= 1);
    assert!(body["data"]["users"].is_array());

    let (status, body) = get(&admin, "/api/users/getUsers").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_array());

    let f = fixture().await;
    let (status, _) = get(&f.customer, "/api/users/getUsers").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&f.customer, "/api/users/getStores").await;
    assert_eq!(status, StatusCode::OK);
    let stores = body["data"].as_array().expect("stores array");
    assert!(stores.iter().any(|s| s["id"].as_i64() == Some(f.store_id)));
}
