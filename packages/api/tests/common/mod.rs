use std::sync::Arc;

use api::{create_app, state::AppState};
use axum_test::TestServer;
use serde_json::{json, Value};
use shared::auth::signing_key::SigningKey;
use shared::services::auth_service::TokenLifetimes;
use shared::testing::{InMemorySessionCache, InMemoryStore, TestClock};

pub struct TestApp {
    pub server: TestServer,
    pub clock: Arc<TestClock>,
    pub store: Arc<InMemoryStore>,
}

pub fn spawn_app() -> TestApp {
    let clock = Arc::new(TestClock::fixed());
    let store = Arc::new(InMemoryStore::new());
    let cache = Arc::new(InMemorySessionCache::new(clock.clone()));

    let state = AppState::new(
        store.clone(),
        store.clone(),
        cache,
        Arc::new(SigningKey::from_bytes(&[7u8; 32]).unwrap()),
        clock.clone(),
        TokenLifetimes::default(),
    );
    let server = TestServer::new(create_app(state)).unwrap();

    TestApp {
        server,
        clock,
        store,
    }
}

impl TestApp {
    pub async fn sign_up(&self, email: &str) {
        self.server
            .post("/api/member/signup")
            .json(&json!({
                "email": email,
                "username": email.split('@').next().unwrap(),
                "password": "password1",
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    /// Signs up and logs in, returning the token pair JSON.
    pub async fn login(&self, email: &str) -> Value {
        self.sign_up(email).await;
        let response = self
            .server
            .post("/api/member/login")
            .json(&json!({ "email": email, "password": "password1" }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }
}

pub fn access_token(pair: &Value) -> String {
    pair["accessToken"].as_str().unwrap().to_string()
}

pub fn refresh_token(pair: &Value) -> String {
    pair["refreshToken"].as_str().unwrap().to_string()
}
