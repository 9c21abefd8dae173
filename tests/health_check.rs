//! Integration tests for the unauthenticated health endpoints

use std::net::TcpListener;
use std::sync::Arc;

use jwt_user_service::auth::{AuthService, BcryptHasher, TokenCodec};
use jwt_user_service::configuration::JwtSettings;
use jwt_user_service::startup::run;
use jwt_user_service::store::{InMemoryCredentialStore, InMemoryProfileStore};

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let auth = AuthService::new(
        TokenCodec::new(&JwtSettings {
            secret: "health-check-secret-at-least-32-bytes!!".to_string(),
            access_token_expiry: 60,
            refresh_token_expiry: 3_600,
            issuer: "test".to_string(),
        }),
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(BcryptHasher::new(4)),
    )
    .expect("Failed to build auth service");

    let server = run(listener, Arc::new(auth)).expect("Failed to create server");
    let _ = tokio::spawn(async move {
        let _ = server.await;
    });

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn auth_health_is_public() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/api/auth/health", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "Auth service is healthy!");
}
