//! Authentication handlers.

use actix_web::{HttpResponse, web};

use inkwell_core::domain::{Author, normalize_email};
use inkwell_shared::ErrorResponse;
use inkwell_shared::dto::{AuthResponse, CheckRequest, LoginRequest, ProfileResponse, RegisterRequest};

use super::authors::profile_response;
use super::non_blank;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn issue_token(state: &AppState, author: &Author) -> AppResult<AuthResponse> {
    let issued = state
        .tokens
        .issue(author)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
    })
}

/// Register an author
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Author registered", body = AuthResponse),
        (status = 400, description = "Invalid fields or email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.check()?;

    let email = normalize_email(&req.email)?;

    if state.authors.find_by_email(&email).await?.is_some() {
        return Err(AppError::field(
            "email",
            "An author with this email already exists",
        ));
    }

    let password_hash = state
        .passwords
        .hash(req.password)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut author = Author::new(email, password_hash, req.display_name.trim().to_string());
    author.bio = non_blank(req.bio);
    author.is_admin = state.is_admin_email(&author.email);

    let saved = state.authors.create(author).await?;
    tracing::info!(author_id = %saved.id, is_admin = saved.is_admin, "Author registered");

    Ok(HttpResponse::Created().json(issue_token(&state, &saved)?))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.check()?;

    let email = normalize_email(&req.email).map_err(|_| AppError::Unauthorized)?;
    let author = state
        .authors
        .find_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = state
        .passwords
        .verify(req.password, author.password_hash.clone())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::debug!(author_id = %author.id, "Rejected login");
        return Err(AppError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, &author)?))
}

/// The caller's own profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "The caller's profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    // A valid token for an author that no longer exists
    let author = state
        .authors
        .find_by_id(identity.author_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(profile_response(author)))
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde_json::json;

    use crate::handlers::test_support::{ADMIN_EMAIL, register, send, test_app, test_state};

    #[actix_web::test]
    async fn test_register_normalizes_email_and_logs_in() {
        let app = test_app(test_state()).await;

        let (status, body) = send(
            &app,
            TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
                "email": "Test2@Example.com",
                "password": "password123",
                "display_name": "Tess",
            })),
            None,
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body["token_type"], "Bearer");
        let token = format!("Bearer {}", body["access_token"].as_str().unwrap());

        let (status, profile) =
            send(&app, TestRequest::get().uri("/api/v1/auth/me"), Some(&token)).await;
        assert_eq!(status, 200);
        assert_eq!(profile["email"], "Test2@example.com");
        assert_eq!(profile["is_admin"], false);

        let (status, _) = send(
            &app,
            TestRequest::post().uri("/api/v1/auth/login").set_json(json!({
                "email": "Test2@EXAMPLE.COM",
                "password": "password123",
            })),
            None,
        )
        .await;
        assert_eq!(status, 200);
    }

    #[actix_web::test]
    async fn test_duplicate_email_and_bad_password() {
        let app = test_app(test_state()).await;
        register(&app, "dup@example.com").await;

        let (status, body) = send(
            &app,
            TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
                "email": "dup@EXAMPLE.com",
                "password": "password123",
                "display_name": "Again",
            })),
            None,
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["errors"]["email"].is_array());

        let (status, _) = send(
            &app,
            TestRequest::post().uri("/api/v1/auth/login").set_json(json!({
                "email": "dup@example.com",
                "password": "wrong-password",
            })),
            None,
        )
        .await;
        assert_eq!(status, 401);
    }

    #[actix_web::test]
    async fn test_register_rejects_empty_email() {
        let app = test_app(test_state()).await;

        let (status, body) = send(
            &app,
            TestRequest::post().uri("/api/v1/auth/register").set_json(json!({
                "email": "",
                "password": "password123",
                "display_name": "Nobody",
            })),
            None,
        )
        .await;

        assert_eq!(status, 400);
        assert!(body["errors"]["email"].is_array());
    }

    #[actix_web::test]
    async fn test_configured_admin_gets_admin_role() {
        let app = test_app(test_state()).await;
        let token = register(&app, ADMIN_EMAIL).await;

        let (_, profile) = send(&app, TestRequest::get().uri("/api/v1/auth/me"), Some(&token)).await;
        assert_eq!(profile["is_admin"], true);

        let (status, _) = send(
            &app,
            TestRequest::get().uri("/api/v1/auth/me"),
            Some("Bearer not-a-token"),
        )
        .await;
        assert_eq!(status, 401);
    }
}
