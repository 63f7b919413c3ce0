//! Shared fixtures for the HTTP integration tests.
//!
//! The router runs against an in-memory repository so no database is
//! needed; everything above the repository is the production code.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use user_accounts::api::{create_router, AppState};
use user_accounts::domain::{NewUser, User};
use user_accounts::errors::{AppError, AppResult};
use user_accounts::infra::UserRepository;
use user_accounts::services::{TokenService, UserManager};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-at-least-32-chars";
pub const PASSWORD: &str = "secret123";

/// HashMap backed repository with the same uniqueness rule as the users table
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            birth_date: new_user.birth_date,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_active: true,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(AppError::NotFound),
        }
    }
}

pub struct TestApp {
    router: Router,
    pub tokens: Arc<TokenService>,
    pub repo: Arc<InMemoryUserRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        let tokens = Arc::new(TokenService::new(TEST_SECRET, 24));
        let repo = Arc::new(InMemoryUserRepository::default());
        let service = Arc::new(UserManager::new(repo.clone(), tokens.clone()));

        Self {
            router: create_router(AppState::new(service, tokens.clone())),
            tokens,
            repo,
        }
    }

    /// Send a request and return the status with the decoded JSON body
    /// (`Value::Null` for an empty body).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.send_raw(method, uri, token, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register through the API and return the created user object.
    pub async fn register(&self, email: &str, role: Option<&str>) -> Value {
        let mut body = json!({
            "fullName": "Test Person",
            "birthDate": "1992-07-15",
            "email": email,
            "password": PASSWORD,
        });
        if let Some(role) = role {
            body["role"] = json!(role);
        }

        let (status, body) = self
            .send(Method::POST, "/api/users/register", None, Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["user"].clone()
    }

    /// Log in through the API and return the bearer token.
    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/users/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Register and log in; returns (user id, token).
    pub async fn signed_in(&self, email: &str, role: Option<&str>) -> (String, String) {
        let user = self.register(email, role).await;
        let token = self.login(email).await;
        (user["id"].as_str().unwrap().to_string(), token)
    }
}
