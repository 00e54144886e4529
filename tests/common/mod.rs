#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test, web,
    web::Bytes,
};
use serde_json::Value;
use uuid::Uuid;

use uptask::{
    auth::{generate_jwt, hash_password},
    config::Config,
    mail::{Mailer, OutgoingEmail},
    models::{Token, User},
    state::AppState,
    store::{InMemoryStore, Store},
};

pub const JWT_SECRET: &str = "integration-test-secret";

/// Mailer that drops every message.
pub struct SilentMailer;

impl Mailer for SilentMailer {
    fn send(&self, _email: &OutgoingEmail) -> Result<(), String> {
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_port: 0,
        server_host: "127.0.0.1".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 24,
        frontend_url: None,
        token_ttl_minutes: 10,
        bcrypt_cost: 4,
        smtp: None,
    }
}

pub fn test_state() -> (Arc<InMemoryStore>, web::Data<AppState>) {
    let store = Arc::new(InMemoryStore::new());
    let state = web::Data::new(AppState::new(
        store.clone(),
        Arc::new(SilentMailer),
        test_config(),
    ));
    (store, state)
}

/// Builds the full application around `state`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .configure(uptask::routes::config),
        )
        .await
    };
}

/// Sends `req` and returns status and body, whether the error surfaced as a response
/// or as a service error (middleware rejections).
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Bytes)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            (status, body)
        }
    }
}

pub async fn send_json<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = send(app, req).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn bearer(jwt: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", jwt))
}

/// Stores a confirmed user directly and returns it with a session token.
pub async fn seed_user(store: &InMemoryStore, name: &str, email: &str) -> (User, String) {
    let mut user = User::new(
        name.to_string(),
        email,
        hash_password("12345678", 4).unwrap(),
    );
    user.confirmed = true;
    store
        .create_user_with_token(&user, &Token::new("000000".into(), user.id))
        .await
        .unwrap();
    let jwt = generate_jwt(user.id, JWT_SECRET, 1).unwrap();
    (user, jwt)
}

pub fn uuid_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("response has an id")
}

pub async fn create_project<S, B>(app: &S, jwt: &str, name: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(jwt))
        .set_json(serde_json::json!({
            "projectName": name,
            "clientName": "Client",
            "description": "Description"
        }))
        .to_request();
    let (status, body) = send_json(app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

pub async fn create_task<S, B>(app: &S, jwt: &str, project_id: Uuid, name: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/projects/{}/tasks", project_id))
        .insert_header(bearer(jwt))
        .set_json(serde_json::json!({"name": name, "description": "Task description"}))
        .to_request();
    let (status, body) = send_json(app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

pub async fn add_member<S, B>(app: &S, jwt: &str, project_id: Uuid, user_id: Uuid) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/projects/{}/team", project_id))
        .insert_header(bearer(jwt))
        .set_json(serde_json::json!({"id": user_id}))
        .to_request();
    send(app, req).await.0
}
