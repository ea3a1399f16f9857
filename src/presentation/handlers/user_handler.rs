use std::sync::Arc;

use crate::{
    domain::{
        error::ValidationErrors,
        models::user::NewUser,
        repositories::user_repository::UserRepository,
        services::password_service::PasswordHasher,
    },
    presentation::flash,
    usecase::register_user_usecase::RegisterUserUsecase,
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const NEW_USER_PATH: &str = "/users/new";
pub const MISSING_USER_PARAM: &str = "param is missing or the value is empty: user";

// Request

/// json for create request; only the `user` group is read
#[derive(Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub user: Option<Value>,
}

impl CreateUserRequest {
    /// Require a non-empty `user` object, then keep only the permitted keys.
    pub fn user_params(self) -> Result<UserParams, ParamsError> {
        match self.user {
            Some(Value::Object(group)) if !group.is_empty() => {
                serde_json::from_value(Value::Object(group)).map_err(ParamsError::Invalid)
            }
            _ => Err(ParamsError::Missing),
        }
    }
}

/// Permitted attributes of the `user` group. Unknown keys are dropped by serde.
#[derive(Default, Serialize, Deserialize)]
pub struct UserParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub github_username: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("{}", MISSING_USER_PARAM)]
    Missing,

    #[error("invalid value in user: {0}")]
    Invalid(serde_json::Error),
}

impl IntoResponse for ParamsError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

impl From<UserParams> for NewUser {
    fn from(params: UserParams) -> Self {
        NewUser {
            first_name: params.first_name,
            last_name: params.last_name,
            email: None,
            github_username: params.github_username,
            password: params.password,
            password_confirmation: params.password_confirmation,
        }
    }
}

// Response

/// json for the registration form
#[derive(Serialize, Deserialize)]
pub struct UserForm {
    pub user: UserFormFields,
    pub errors: ValidationErrors,
}

/// Echoable attributes; passwords are never rendered back
#[derive(Serialize, Deserialize)]
pub struct UserFormFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub github_username: Option<String>,
}

impl From<NewUser> for UserFormFields {
    fn from(user: NewUser) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
            github_username: user.github_username,
        }
    }
}

/* Router Function and Handler Function */

/// Routes for `/users`, ready to be merged into the main router
pub fn create_user_router<
    R: UserRepository + Send + Sync + 'static,
    P: PasswordHasher + 'static,
>(
    register_service: RegisterUserUsecase<R, P>,
) -> Router {
    let state = AppState {
        register_service: Arc::new(register_service),
    };

    Router::new()
        .route("/users/new", get(new::<R, P>))
        .route("/users", post(create::<R, P>))
        .route("/users/{id}", delete(destroy))
        .with_state(state)
}

pub struct AppState<R: UserRepository, P: PasswordHasher> {
    pub register_service: Arc<RegisterUserUsecase<R, P>>,
}

impl<R: UserRepository, P: PasswordHasher> Clone for AppState<R, P> {
    fn clone(&self) -> Self {
        Self {
            register_service: Arc::clone(&self.register_service),
        }
    }
}

// handler function

/// blank form, plus errors flashed by a failed create
async fn new<R: UserRepository + Send + Sync, P: PasswordHasher>(
    State(state): State<AppState<R, P>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, errors) = flash::take_errors(jar);
    let form = UserForm {
        user: state.register_service.new_user().into(),
        errors,
    };
    (jar, Json(form))
}

async fn create<R: UserRepository + Send + Sync, P: PasswordHasher>(
    State(state): State<AppState<R, P>>,
    jar: CookieJar,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Response {
    let params = match payload {
        Ok(Json(request)) => request.user_params(),
        Err(rejection) => {
            debug!(rejection = %rejection.body_text(), "rejected create body");
            Err(ParamsError::Missing)
        }
    };
    let params = match params {
        Ok(params) => params,
        Err(e) => return e.into_response(),
    };

    match state.register_service.save(params.into()).await {
        Ok(_) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Success!",
        )
            .into_response(),
        Err(e) => {
            debug!(error = %e, "registration failed; redirecting to form");
            let jar = flash::set_errors(jar, &e.errors());
            (
                StatusCode::FOUND,
                jar,
                [(header::LOCATION, NEW_USER_PATH)],
            )
                .into_response()
        }
    }
}

/// No-op; never touches the datastore
async fn destroy(Path(id): Path<String>) -> StatusCode {
    debug!(%id, "destroy is not implemented; ignoring");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use http_body_util::BodyExt;
    use rstest::*;
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::{InMemoryUserRepository, PrefixHasher};

    #[fixture]
    fn repository() -> InMemoryUserRepository {
        InMemoryUserRepository::default()
    }

    fn app(repository: InMemoryUserRepository) -> Router {
        create_user_router(RegisterUserUsecase::new(repository, PrefixHasher))
    }

    /// # Description
    ///
    /// POST a raw json body to /users
    async fn create_user(app: Router, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn new_form(app: Router, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().method("GET").uri(NEW_USER_PATH);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// "flash=..." pair from the Set-Cookie header
    fn flash_cookie(response: &Response) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("flash="))
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string()
    }

    const VALID_BODY: &str = r#"{"user": {
        "first_name": "Ada",
        "last_name": "Lovelace",
        "github_username": "ada",
        "password": "analytical",
        "password_confirmation": "analytical"
    }}"#;

    #[rstest]
    #[tokio::test]
    async fn test_create_positive(repository: InMemoryUserRepository) {
        let response = create_user(app(repository.clone()), VALID_BODY).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            mime::TEXT_PLAIN_UTF_8.as_ref()
        );
        assert_eq!(body_string(response).await, "Success!");
        assert_eq!(repository.users().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_strips_unpermitted_params(repository: InMemoryUserRepository) {
        let body = r#"{"user": {
            "first_name": "Ada",
            "last_name": "Lovelace",
            "github_username": "ada",
            "password": "analytical",
            "password_digest": "attacker-chosen",
            "email": "ada@example.com",
            "admin": true
        }, "admin": true}"#;
        let response = create_user(app(repository.clone()), body).await;

        assert_eq!(response.status(), StatusCode::OK);
        let users = repository.users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].password_digest().as_str(), "digest:analytical");
        assert_eq!(users[0].email(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_digest_only_negative(repository: InMemoryUserRepository) {
        let body = r#"{"user": {
            "first_name": "Ada",
            "last_name": "Lovelace",
            "github_username": "ada",
            "password_digest": "attacker-chosen"
        }}"#;
        let response = create_user(app(repository.clone()), body).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(repository.users().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_missing_password_redirects_with_errors(
        repository: InMemoryUserRepository,
    ) {
        let body = r#"{"user": {"first_name": "Ada", "last_name": "Lovelace", "github_username": "ada"}}"#;
        let response = create_user(app(repository.clone()), body).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], NEW_USER_PATH);
        assert!(repository.users().is_empty());

        // the errors survive the redirect
        let cookie = flash_cookie(&response);
        let response = new_form(app(repository.clone()), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let form: UserForm = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(form.errors.get("password").unwrap(), ["can't be blank"]);
        assert!(repository.users().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_duplicated_github_username_negative(
        repository: InMemoryUserRepository,
    ) {
        let first = create_user(app(repository.clone()), VALID_BODY).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = create_user(app(repository.clone()), VALID_BODY).await;
        assert_eq!(second.status(), StatusCode::FOUND);
        assert_eq!(repository.users().len(), 1);
    }

    #[tokio::test]
    async fn test_create_database_failure_redirects() {
        let repository = InMemoryUserRepository::unavailable();
        let response = create_user(app(repository.clone()), VALID_BODY).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        let cookie = flash_cookie(&response);
        let response = new_form(app(repository), Some(&cookie)).await;
        let form: UserForm = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(form.errors.get("base").unwrap(), ["could not be saved"]);
    }

    #[rstest]
    #[case::missing_group(r#"{"first_name": "Ada"}"#)]
    #[case::not_json("user[first_name]=Ada")]
    #[case::null_group(r#"{"user": null}"#)]
    #[case::empty_group(r#"{"user": {}}"#)]
    #[case::scalar_group(r#"{"user": "ada"}"#)]
    #[tokio::test]
    async fn test_create_missing_user_param_negative(
        repository: InMemoryUserRepository,
        #[case] body: &str,
    ) {
        let response = create_user(app(repository.clone()), body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, MISSING_USER_PARAM);
        assert!(repository.users().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_wrong_type_is_not_reported_as_missing(
        repository: InMemoryUserRepository,
    ) {
        let body = r#"{"user": {"first_name": 5, "last_name": "Lovelace"}}"#;
        let response = create_user(app(repository.clone()), body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = body_string(response).await;
        assert!(text.starts_with("invalid value in user:"), "{text}");
        assert_ne!(text, MISSING_USER_PARAM);
        assert!(repository.users().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_new_renders_blank_form(repository: InMemoryUserRepository) {
        let response = new_form(app(repository.clone()), None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let form: UserForm = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(form.user.first_name.is_none());
        assert!(form.user.github_username.is_none());
        assert!(form.errors.is_empty());
        assert!(repository.users().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_new_clears_flash(repository: InMemoryUserRepository) {
        let response = create_user(app(repository.clone()), r#"{"user": {"admin": true}}"#).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let cookie = flash_cookie(&response);

        let response = new_form(app(repository), Some(&cookie)).await;
        let cleared = flash_cookie(&response);
        assert_eq!(cleared, "flash=");
    }

    #[rstest]
    #[case::uuid("/users/00000000-0000-0000-0000-000000000001")]
    #[case::number("/users/42")]
    #[case::garbage("/users/not%20an%20id")]
    #[tokio::test]
    async fn test_destroy_is_a_noop(repository: InMemoryUserRepository, #[case] uri: &str) {
        let seeded = create_user(app(repository.clone()), VALID_BODY).await;
        assert_eq!(seeded.status(), StatusCode::OK);

        let response = app(repository.clone())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(repository.users().len(), 1);
    }
}
