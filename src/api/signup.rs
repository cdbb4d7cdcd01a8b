//! Signup endpoint

use axum::{extract::State, http::StatusCode, routing::post, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{validate_signup, DomainError};

pub const SIGNUP_SUCCESS_MESSAGE: &str = "User created successfully";

/// Body returned when a user is created
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
}

pub fn create_signup_router() -> Router<AppState> {
    Router::new().route("/signup", post(signup))
}

/// POST /signup
///
/// The body is taken as untyped JSON so every field problem can be reported
/// at once instead of failing on the first serde error.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let request = validate_signup(&payload).map_err(|errors| {
        debug!(fields = %errors, "Signup payload failed validation");
        DomainError::validation(errors)
    })?;

    state.signup_service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: SIGNUP_SUCCESS_MESSAGE.to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::api::router::create_router_with_state;
    use crate::config::ServerConfig;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::{
        fast_hasher, Argon2Hasher, InMemoryUserRepository, PasswordHasher, Registrar,
    };

    type MemoryRegistrar = Registrar<InMemoryUserRepository, Argon2Hasher>;

    fn app() -> (Router, Arc<MemoryRegistrar>) {
        let registrar = Arc::new(Registrar::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(fast_hasher()),
        ));
        let state = AppState::new(registrar.clone());

        (
            create_router_with_state(state, &ServerConfig::default()),
            registrar,
        )
    }

    fn ann_lee() -> Value {
        json!({
            "firstname": "Ann",
            "lastname": "Lee",
            "email": "ann@example.com",
            "age": 30,
            "password": "Abcdef1!"
        })
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    #[tokio::test]
    async fn test_signup_creates_user() {
        let (app, registrar) = app();

        let (status, body) = send(&app, post_json(ann_lee().to_string())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "User created successfully"}));

        let user = registrar
            .get_by_email("ann@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.firstname(), "Ann");
        assert_eq!(user.age(), 30);
        assert_ne!(user.password_hash(), "Abcdef1!");
        assert!(fast_hasher().verify("Abcdef1!", user.password_hash()));
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let (app, registrar) = app();

        let (first, _) = send(&app, post_json(ann_lee().to_string())).await;
        assert_eq!(first, StatusCode::CREATED);

        let mut second = ann_lee();
        second["firstname"] = json!("Annie");
        let (status, body) = send(&app, post_json(second.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Email already registered"}));
        assert_eq!(registrar.user_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_signup_reports_every_invalid_field() {
        let (app, registrar) = app();

        let payload = json!({
            "firstname": "A",
            "lastname": "Lee",
            "email": "not-an-email",
            "age": 17,
            "password": "password"
        });
        let (status, body) = send(&app, post_json(payload.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors = body["errors"].as_object().unwrap();
        assert!(errors.contains_key("firstname"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("age"));
        assert!(!errors.contains_key("lastname"));

        let password = errors["password"].as_array().unwrap();
        assert!(password.contains(&json!("Password must contain at least one digit")));
        assert!(password.contains(&json!("Password must contain at least one uppercase letter")));
        assert!(password.contains(&json!("Password must contain at least one special character")));

        assert_eq!(registrar.user_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_signup_missing_and_unknown_fields() {
        let (app, _) = app();

        let payload = json!({
            "firstname": "Ann",
            "lastname": "Lee",
            "email": "ann@example.com",
            "password": "Passw0rd!",
            "role": "admin"
        });
        let (status, body) = send(&app, post_json(payload.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["age"], json!(["Missing data for required field."]));
        assert_eq!(body["errors"]["role"], json!(["Unknown field."]));
    }

    #[tokio::test]
    async fn test_signup_non_object_payload() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json("[1, 2, 3]")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"errors": {"_schema": ["Invalid input type."]}}));
    }

    #[tokio::test]
    async fn test_signup_malformed_json() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json("{\"firstname\": ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["_schema"][0].is_string());
    }

    #[tokio::test]
    async fn test_signup_storage_failure_is_internal_error() {
        let repository = Arc::new(MockUserRepository::new());
        repository.set_should_fail(true).await;

        let registrar = Registrar::new(repository, Arc::new(fast_hasher()));
        let app = create_router_with_state(
            AppState::new(Arc::new(registrar)),
            &ServerConfig::default(),
        );

        let (status, body) = send(&app, post_json(ann_lee().to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_signup_rejects_get() {
        let (app, _) = app();

        let request = Request::builder()
            .method("GET")
            .uri("/signup")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
