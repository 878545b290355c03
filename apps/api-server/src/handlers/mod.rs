//! HTTP handlers and route configuration.

pub(crate) mod auth;
pub(crate) mod authors;
pub(crate) mod categories;
pub(crate) mod comments;
pub(crate) mod health;
pub(crate) mod posts;
pub(crate) mod tags;

use actix_web::web;
use inkwell_core::ports::{Page, PageRequest};
use inkwell_shared::Paginated;
use inkwell_shared::dto::PageQuery;

use crate::docs;
use crate::middleware::error::{json_error_handler, path_error_handler, query_error_handler};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));

    // Registered ahead of the /api scope, which would otherwise swallow it
    docs::configure(cfg);

    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/v1")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::resource("/posts")
                            .route(web::get().to(posts::list_posts))
                            .route(web::post().to(posts::create_post)),
                    )
                    .service(
                        web::resource("/posts/slug/{slug}")
                            .route(web::get().to(posts::get_post_by_slug)),
                    )
                    .service(
                        web::resource("/posts/{id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::put().to(posts::replace_post))
                            .route(web::patch().to(posts::update_post))
                            .route(web::delete().to(posts::delete_post)),
                    )
                    .service(
                        web::resource("/posts/{id}/comments")
                            .route(web::get().to(comments::list_comments))
                            .route(web::post().to(comments::create_comment)),
                    )
                    .service(
                        web::resource("/comments/{id}")
                            .route(web::get().to(comments::get_comment))
                            .route(web::patch().to(comments::update_comment))
                            .route(web::delete().to(comments::delete_comment)),
                    )
                    .service(
                        web::resource("/categories")
                            .route(web::get().to(categories::list_categories))
                            .route(web::post().to(categories::create_category)),
                    )
                    .service(
                        web::resource("/categories/{id}")
                            .route(web::get().to(categories::get_category))
                            .route(web::put().to(categories::replace_category))
                            .route(web::patch().to(categories::update_category))
                            .route(web::delete().to(categories::delete_category)),
                    )
                    .service(
                        web::resource("/tags")
                            .route(web::get().to(tags::list_tags))
                            .route(web::post().to(tags::create_tag)),
                    )
                    .service(
                        web::resource("/tags/{id}")
                            .route(web::get().to(tags::get_tag))
                            .route(web::put().to(tags::replace_tag))
                            .route(web::patch().to(tags::update_tag))
                            .route(web::delete().to(tags::delete_tag)),
                    )
                    .service(web::resource("/authors").route(web::get().to(authors::list_authors)))
                    .service(
                        web::resource("/authors/{id}")
                            .route(web::get().to(authors::get_author))
                            .route(web::patch().to(authors::update_author)),
                    ),
            ),
    );
}

pub(crate) fn page_request(query: &PageQuery) -> PageRequest {
    PageRequest::new(query.limit, query.offset)
}

/// Convert a repository page into its wire form.
pub(crate) fn paginated<T, U>(page: Page<T>, convert: impl FnMut(T) -> U) -> Paginated<U> {
    let page = page.map(convert);
    Paginated {
        items: page.items,
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    }
}

/// Trimmed text, `None` when blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Helpers shared by the handler tests: an in-memory app and a few
    //! request builders.

    use actix_web::body::MessageBody;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use crate::config::AppConfig;
    use crate::observability::RequestIdMiddleware;
    use crate::state::AppState;

    pub const ADMIN_EMAIL: &str = "admin@example.com";

    pub fn test_state() -> AppState {
        let config = AppConfig::from_lookup(|key| match key {
            "ADMIN_EMAILS" => Some(ADMIN_EMAIL.to_string()),
            "JWT_SECRET" => Some("handler-test-secret".to_string()),
            _ => None,
        });
        AppState::in_memory(&config)
    }

    pub async fn test_app(
        state: AppState,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
    {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(state))
                .configure(super::configure_routes),
        )
        .await
    }

    /// Register an author and return their bearer token.
    pub async fn register<S, B>(app: &S, email: &str) -> String
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "email": email,
                "password": "password123",
                "display_name": "Writer",
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(app, req).await;
        body["access_token"]
            .as_str()
            .map(|t| format!("Bearer {t}"))
            .unwrap_or_default()
    }

    /// The id of the caller behind a token.
    pub async fn me<S, B>(app: &S, token: &str) -> String
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(("Authorization", token))
            .to_request();
        let body: Value = test::call_and_read_body_json(app, req).await;
        body["id"].as_str().unwrap_or_default().to_string()
    }

    pub async fn send<S, B>(
        app: &S,
        req: test::TestRequest,
        token: Option<&str>,
    ) -> (u16, Value)
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let req = match token {
            Some(token) => req.insert_header(("Authorization", token)),
            None => req,
        };
        let res = test::call_service(app, req.to_request()).await;
        let status = res.status().as_u16();
        let bytes = test::read_body(res).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}
