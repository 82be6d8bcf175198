//! API integration tests
//!
//! These run against a provisioned server (database migrated, Redis up,
//! bootstrap admin created). Run with: cargo test -- --ignored

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated admin token
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to create a patron account and return its token
async fn create_patron(client: &Client, admin_token: &str) -> String {
    let login = format!("patron-{}", uuid::Uuid::new_v4().simple());

    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "login": login,
            "password": "patron-pass",
            "first_name": "Pat",
            "last_name": "Ron",
            "account_type": "patron"
        }))
        .send()
        .await
        .expect("Failed to create patron");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": login,
            "password": "patron-pass"
        }))
        .send()
        .await
        .expect("Failed to login as patron");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// 13-character unique ISBN-shaped string
fn fresh_isbn() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..13].to_string()
}

async fn create_author(client: &Client, token: &str) -> i64 {
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "first_name": "Ursula",
            "last_name": "Le Guin",
            "date_of_birth": "1929-10-21"
        }))
        .send()
        .await
        .expect("Failed to create author");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No author ID")
}

async fn create_book(client: &Client, token: &str, author_id: i64, isbn: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "The Dispossessed",
            "author_id": author_id,
            "summary": "An ambiguous utopia.",
            "isbn": isbn,
            "genre_ids": []
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

async fn delete_entity(client: &Client, token: &str, path: &str) {
    let _ = client
        .delete(format!("{}{}", BASE_URL, path))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
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
async fn test_overview_counts_and_visit_counter() {
    // Cookie store keeps the session cookie between the two calls
    let client = Client::builder().cookie_store(true).build().unwrap();

    let response = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["num_books"].is_number());
    assert!(body["num_instances"].is_number());
    assert!(body["num_instances_available"].is_number());
    assert!(body["num_authors"].is_number());
    assert_eq!(body["num_visits"], 0);

    let response = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["num_visits"], 1);
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_books_list_is_public_and_paginated() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
    assert!(body["total_pages"].is_number());
    assert!(body["has_next"].is_boolean());
    assert!(body["has_previous"].is_boolean());
}

#[tokio::test]
#[ignore]
async fn test_mybooks_requires_login() {
    let client = Client::new();

    let response = client
        .get(format!("{}/mybooks", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    // The error body points at login with the destination preserved
    let body: Value = response.json().await.expect("Failed to parse response");
    let login_url = body["login_url"].as_str().expect("No login_url in response");
    assert!(login_url.contains("next=/api/v1/mybooks"));
}

#[tokio::test]
#[ignore]
async fn test_mybooks_empty_for_new_patron() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let patron_token = create_patron(&client, &admin_token).await;

    let response = client
        .get(format!("{}/mybooks", BASE_URL))
        .header("Authorization", format!("Bearer {}", patron_token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 0);
    assert_eq!(body["total_pages"], 1);
}

#[tokio::test]
#[ignore]
async fn test_borrowed_list_requires_permission() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let patron_token = create_patron(&client, &admin_token).await;

    let response = client
        .get(format!("{}/borrowed", BASE_URL))
        .header("Authorization", format!("Bearer {}", patron_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_patron_cannot_create_book() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let patron_token = create_patron(&client, &admin_token).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", patron_token))
        .json(&json!({
            "title": "Nope",
            "isbn": fresh_isbn(),
            "genre_ids": []
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_author_create_update_delete() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let author_id = create_author(&client, &token).await;

    // Update
    let response = client
        .put(format!("{}/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "first_name": "Ursula K.",
            "last_name": "Le Guin",
            "date_of_birth": "1929-10-21",
            "date_of_death": "2018-01-22"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Detail carries the author's books
    let response = client
        .get(format!("{}/authors/{}", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["first_name"], "Ursula K.");
    assert!(body["books"].is_array());

    // Delete
    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // Gone
    let response = client
        .get(format!("{}/authors/{}", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_rejected() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let author_id = create_author(&client, &token).await;
    let isbn = fresh_isbn();
    let book_id = create_book(&client, &token, author_id, &isbn).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "The Dispossessed (again)",
            "author_id": author_id,
            "isbn": isbn,
            "genre_ids": []
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    delete_entity(&client, &token, &format!("/books/{}", book_id)).await;
    delete_entity(&client, &token, &format!("/authors/{}", author_id)).await;
}

#[tokio::test]
#[ignore]
async fn test_book_delete_blocked_while_copies_exist() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let author_id = create_author(&client, &token).await;
    let book_id = create_book(&client, &token, author_id, &fresh_isbn()).await;

    // Register a copy
    let response = client
        .post(format!("{}/instances", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "imprint": "Harper & Row, 1974",
            "status": "a"
        }))
        .send()
        .await
        .expect("Failed to create instance");
    assert_eq!(response.status(), 201);

    // Delete is blocked; the client returns to the confirmation step
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    delete_entity(&client, &token, &format!("/authors/{}", author_id)).await;
}

#[tokio::test]
#[ignore]
async fn test_renewal_flow() {
    let client = Client::new();
    let token = get_admin_token(&client).await;
    let author_id = create_author(&client, &token).await;
    let book_id = create_book(&client, &token, author_id, &fresh_isbn()).await;

    let today = Utc::now().date_naive();

    // A copy on loan, due back a week from now
    let response = client
        .post(format!("{}/instances", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "book_id": book_id,
            "imprint": "Harper & Row, 1974",
            "status": "o",
            "due_back": (today + Duration::days(7)).to_string()
        }))
        .send()
        .await
        .expect("Failed to create instance");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let instance_id = body["id"].as_str().expect("No instance ID").to_string();

    // Form data proposes a date three weeks out
    let response = client
        .get(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["proposed_renewal_date"],
        (today + Duration::weeks(3)).to_string()
    );

    // Yesterday is rejected with a field-level error
    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "renewal_date": (today - Duration::days(1)).to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["renewal_date"].is_array());

    // Five weeks out is rejected
    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "renewal_date": (today + Duration::weeks(5)).to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Exactly four weeks out is accepted and the client is sent back to
    // the borrowed list
    let renewal_date = (today + Duration::weeks(4)).to_string();
    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "renewal_date": renewal_date }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["instance"]["due_back"], renewal_date);
    assert_eq!(body["redirect_to"], "/api/v1/borrowed");

    // The renewed copy shows up in the borrowed list, ordered by due date
    let response = client
        .get(format!("{}/borrowed", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let due_dates: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["due_back"].as_str())
        .collect();
    let mut sorted = due_dates.clone();
    sorted.sort();
    assert_eq!(due_dates, sorted);
}

#[tokio::test]
#[ignore]
async fn test_renewal_of_unknown_instance_is_404() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!(
            "{}/instances/{}/renew",
            BASE_URL,
            uuid::Uuid::new_v4()
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
