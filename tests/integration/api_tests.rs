//! API integration tests
//!
//! These run against a live server with a clean database:
//! `cargo test -- --ignored`

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Register a fresh reader and return a bearer token
async fn register_and_login(client: &Client, email: &str) -> String {
    client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "testpass1!",
            "first_name": "Test",
            "last_name": "Reader"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "testpass1!"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Log in as the seeded administrator
async fn admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@libris.local",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_book(client: &Client, token: &str, inventory: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Test Book",
            "author": "Test Author",
            "cover": "hardcover",
            "inventory": inventory,
            "daily_fee": "9.99"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

async fn get_book(client: &Client, id: i64) -> Value {
    client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let token = register_and_login(&client, "login-test@example.com").await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "login-test@example.com");
    assert_eq!(body["account_type"], "reader");
}

#[tokio::test]
#[ignore]
async fn test_borrowing_decrements_inventory() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let token = register_and_login(&client, "borrower@example.com").await;

    let book_id = create_book(&client, &admin, 10).await;

    let expected = (Utc::now().date_naive() + Duration::days(2)).to_string();
    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "expected_return_date": expected
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"], 9);
}

#[tokio::test]
#[ignore]
async fn test_out_of_stock_borrowing_fails() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let token = register_and_login(&client, "unlucky@example.com").await;

    let book_id = create_book(&client, &admin, 0).await;

    let expected = (Utc::now().date_naive() + Duration::days(2)).to_string();
    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "expected_return_date": expected
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"], 0);
}

#[tokio::test]
#[ignore]
async fn test_return_restores_inventory_and_rejects_double_return() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let token = register_and_login(&client, "returner@example.com").await;

    let book_id = create_book(&client, &admin, 5).await;

    let expected = (Utc::now().date_naive() + Duration::days(2)).to_string();
    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "expected_return_date": expected
        }))
        .send()
        .await
        .expect("Failed to send request");
    let borrowing: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = borrowing["id"].as_i64().expect("No id in response");

    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], "The book was successfully returned.");

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"], 5);

    // Second return must be rejected without touching the inventory
    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let book = get_book(&client, book_id).await;
    assert_eq!(book["inventory"], 5);
}

#[tokio::test]
#[ignore]
async fn test_non_owner_cannot_return() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let owner = register_and_login(&client, "owner@example.com").await;
    let other = register_and_login(&client, "other@example.com").await;

    let book_id = create_book(&client, &admin, 3).await;

    let expected = (Utc::now().date_naive() + Duration::days(2)).to_string();
    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({
            "book_id": book_id,
            "expected_return_date": expected
        }))
        .send()
        .await
        .expect("Failed to send request");
    let borrowing: Value = response.json().await.expect("Failed to parse response");
    let borrowing_id = borrowing["id"].as_i64().expect("No id in response");

    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .header("Authorization", format!("Bearer {}", other))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_listing_is_scoped_to_the_caller() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let first = register_and_login(&client, "first@example.com").await;
    let second = register_and_login(&client, "second@example.com").await;

    let book_id = create_book(&client, &admin, 5).await;

    let expected = (Utc::now().date_naive() + Duration::days(2)).to_string();
    for token in [&first, &second] {
        client
            .post(format!("{}/borrowings", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({
                "book_id": book_id,
                "expected_return_date": expected
            }))
            .send()
            .await
            .expect("Failed to send request");
    }

    // A regular user only sees their own records, whatever the filter says
    let response = client
        .get(format!("{}/borrowings?user_id=1", BASE_URL))
        .header("Authorization", format!("Bearer {}", first))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    for borrowing in body.as_array().expect("Expected an array") {
        assert_eq!(borrowing["user_email"], "first@example.com");
    }
}
