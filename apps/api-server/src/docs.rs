//! OpenAPI document and the Swagger UI serving it.

use actix_web::web;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use inkwell_shared::ErrorResponse;
use inkwell_shared::dto::{
    AuthResponse, AuthorResponse, CategoryRequest, CategoryResponse, CommentRequest,
    CommentResponse, LoginRequest, PostRequest, PostResponse, ProfileResponse, RegisterRequest,
    TagRequest, TagResponse, UpdateAuthorRequest, UpdateCategoryRequest, UpdateCommentRequest,
    UpdatePostRequest,
};
use inkwell_shared::response::{AuthorPage, CategoryPage, PostPage, TagPage};

use crate::handlers::health::HealthResponse;
use crate::handlers::{auth, authors, categories, comments, health, posts, tags};

pub const OPENAPI_PATH: &str = "/api/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "Inkwell API", description = "Blog posts, categories, tags and authors"),
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        posts::list_posts,
        posts::get_post,
        posts::get_post_by_slug,
        posts::create_post,
        posts::replace_post,
        posts::update_post,
        posts::delete_post,
        comments::list_comments,
        comments::create_comment,
        comments::get_comment,
        comments::update_comment,
        comments::delete_comment,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::replace_category,
        categories::update_category,
        categories::delete_category,
        tags::list_tags,
        tags::get_tag,
        tags::create_tag,
        tags::replace_tag,
        tags::update_tag,
        tags::delete_tag,
        authors::list_authors,
        authors::get_author,
        authors::update_author,
    ),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        AuthorResponse,
        ProfileResponse,
        UpdateAuthorRequest,
        PostRequest,
        UpdatePostRequest,
        PostResponse,
        PostPage,
        CategoryRequest,
        UpdateCategoryRequest,
        CategoryResponse,
        CategoryPage,
        TagRequest,
        TagResponse,
        TagPage,
        AuthorPage,
        CommentRequest,
        UpdateCommentRequest,
        CommentResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Registration and bearer tokens"),
        (name = "posts", description = "Blog posts with filtering and search"),
        (name = "comments", description = "Moderated comments on posts"),
        (name = "categories", description = "Ordered post categories"),
        (name = "tags", description = "Free-form post tags"),
        (name = "authors", description = "Author profiles"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the document and Swagger UI under `/api/docs/`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(SwaggerUi::new("/api/docs/{_:.*}").url(OPENAPI_PATH, ApiDoc::openapi()));
}
