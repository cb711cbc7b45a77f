//! API integration tests against a running server
//!
//! Start the server first (e.g. `LIBRARY_DATABASE__BACKEND=memory`), then run
//! `cargo test -- --ignored`.

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Client that reports redirects instead of following them
fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

async fn post_form(client: &Client, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .form(form)
        .send()
        .await
        .expect("Failed to send request")
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("No Location header")
        .to_str()
        .expect("Location is not ASCII")
        .to_string()
}

async fn get_json(client: &Client, path: &str) -> Value {
    client
        .get(format!("{}{}", BASE_URL, path))
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
    let client = client();

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
async fn test_author_lifecycle() {
    let client = client();

    let response = post_form(
        &client,
        "/catalog/author/add",
        &[
            ("first_name", "Ursula"),
            ("family_name", "LeGuin"),
            ("date_of_birth", "1929-10-21"),
            ("date_of_death", "2018-01-22"),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let author = location(&response);

    let detail = get_json(&client, &author).await;
    assert_eq!(detail["name"], "LeGuin, Ursula");
    assert_eq!(detail["lifespan"], "Oct 21, 1929 - Jan 22, 2018");

    let response = post_form(&client, &format!("{}/delete", author), &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/author/all");

    let response = client
        .get(format!("{}{}", BASE_URL, author))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_genre_add_is_idempotent() {
    let client = client();

    let first = post_form(&client, "/catalog/genre/add", &[("name", "Integration")]).await;
    let second = post_form(&client, "/catalog/genre/add", &[("name", "Integration")]).await;

    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first), location(&second));
}

#[tokio::test]
#[ignore]
async fn test_invalid_book_is_unprocessable() {
    let client = client();

    let response = post_form(&client, "/catalog/book/add", &[("title", "Untitled")]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["title"], "Untitled");
    assert!(body["errors"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
#[ignore]
async fn test_book_delete_refused_while_copies_exist() {
    let client = client();

    let response = post_form(
        &client,
        "/catalog/book/add",
        &[
            ("title", "Integration Book"),
            ("author", "1"),
            ("summary", "Written by a test"),
            ("isbn", "0000000000"),
        ],
    )
    .await;
    let book = location(&response);
    let book_id = book.rsplit('/').next().unwrap().to_string();

    let response = post_form(
        &client,
        "/catalog/book-copy/add",
        &[("book", book_id.as_str()), ("imprint", "Test Press"), ("status", "Available")],
    )
    .await;
    let copy = location(&response);

    let response = post_form(&client, &format!("{}/delete", book), &[]).await;
    assert_eq!(location(&response), book);
    let cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("No notice cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let detail: Value = client
        .get(format!("{}{}", BASE_URL, book))
        .header(reqwest::header::COOKIE, cookie)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(detail["notice"], "has_dependents");

    let response = post_form(&client, &format!("{}/delete", copy), &[]).await;
    assert_eq!(location(&response), book);
    let response = post_form(&client, &format!("{}/delete", book), &[]).await;
    assert_eq!(location(&response), "/catalog/book/all");
}
