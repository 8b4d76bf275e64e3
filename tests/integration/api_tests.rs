//! Live server tests
//!
//! Start the server first, then run with: cargo test -- --ignored

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let response = client()
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
async fn test_catalog_index() {
    let response = client()
        .get(format!("{}/catalog", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains("Local Library Home"));
}

#[tokio::test]
#[ignore]
async fn test_genre_create_twice_resolves_to_same_genre() {
    let client = client();
    let mut locations = Vec::new();

    for _ in 0..2 {
        let response = client
            .post(format!("{}/catalog/genre/create", BASE_URL))
            .form(&[("name", "Live Test Genre")])
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()["location"]
            .to_str()
            .expect("Invalid location header")
            .to_string();
        locations.push(location);
    }

    assert_eq!(locations[0], locations[1]);
}

#[tokio::test]
#[ignore]
async fn test_unknown_author_not_found() {
    let response = client()
        .get(format!("{}/catalog/author/does-not-exist", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
