//! Tag handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkwell_core::domain::Tag;
use inkwell_shared::ErrorResponse;
use inkwell_shared::dto::{CheckRequest, PageQuery, TagRequest, TagResponse};
use inkwell_shared::response::TagPage;

use super::{page_request, paginated};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn tag_response(tag: Tag) -> TagResponse {
    TagResponse {
        id: tag.id,
        name: tag.name,
    }
}

async fn load_tag(state: &AppState, id: Uuid) -> AppResult<Tag> {
    state
        .tags
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag with id {} not found", id)))
}

/// List tags by name
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "tags",
    params(PageQuery),
    responses((status = 200, description = "One page of tags", body = TagPage))
)]
pub async fn list_tags(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let tags = state.tags.list(page_request(&query)).await?;
    Ok(HttpResponse::Ok().json(paginated(tags, tag_response)))
}

/// Retrieve a tag
#[utoipa::path(
    get,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag id")),
    responses(
        (status = 200, description = "The tag", body = TagResponse),
        (status = 404, description = "No such tag", body = ErrorResponse)
    )
)]
pub async fn get_tag(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let tag = load_tag(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tag_response(tag)))
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    tag = "tags",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Invalid or duplicate name", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_tag(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.check()?;

    let saved = state.tags.create(Tag::new(req.name.trim().to_string())).await?;
    Ok(HttpResponse::Created().json(tag_response(saved)))
}

async fn rename(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    req: TagRequest,
) -> AppResult<HttpResponse> {
    identity.actor().ensure_admin()?;
    let mut tag = load_tag(state, id).await?;
    req.check()?;

    tag.name = req.name.trim().to_string();
    let saved = state.tags.update(tag).await?;
    Ok(HttpResponse::Ok().json(tag_response(saved)))
}

/// Rename a tag
#[utoipa::path(
    put,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag id")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Tag renamed", body = TagResponse),
        (status = 400, description = "Invalid or duplicate name", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "No such tag", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_tag(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    rename(&state, &identity, path.into_inner(), body.into_inner()).await
}

/// Rename a tag
///
/// A tag has a single mutable field, so this behaves like `PUT`.
#[utoipa::path(
    patch,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag id")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Tag renamed", body = TagResponse),
        (status = 400, description = "Invalid or duplicate name", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "No such tag", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_tag(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    rename(&state, &identity, path.into_inner(), body.into_inner()).await
}

/// Delete a tag; posts carrying it lose the tag
#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag id")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "No such tag", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_tag(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.actor().ensure_admin()?;
    state.tags.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde_json::json;

    use crate::handlers::test_support::{ADMIN_EMAIL, register, send, test_app, test_state};

    #[actix_web::test]
    async fn test_duplicate_tag_is_bad_request() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;
        let create = || {
            TestRequest::post()
                .uri("/api/v1/tags")
                .set_json(json!({"name": "rust"}))
        };

        let (status, _) = send(&app, create(), Some(&token)).await;
        assert_eq!(status, 201);

        let (status, _) = send(&app, create(), Some(&token)).await;
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn test_only_admins_rename_and_delete() {
        let app = test_app(test_state()).await;
        let admin = register(&app, ADMIN_EMAIL).await;
        let token = register(&app, "writer@example.com").await;

        let (_, tag) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/tags")
                .set_json(json!({"name": "rst"})),
            Some(&token),
        )
        .await;
        let uri = format!("/api/v1/tags/{}", tag["id"].as_str().unwrap());

        let (status, _) = send(
            &app,
            TestRequest::patch().uri(&uri).set_json(json!({"name": "rust"})),
            Some(&token),
        )
        .await;
        assert_eq!(status, 403);

        let (status, renamed) = send(
            &app,
            TestRequest::put().uri(&uri).set_json(json!({"name": "rust"})),
            Some(&admin),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(renamed["name"], "rust");

        let (status, _) = send(&app, TestRequest::delete().uri(&uri), Some(&admin)).await;
        assert_eq!(status, 204);
        let (status, _) = send(&app, TestRequest::get().uri(&uri), None).await;
        assert_eq!(status, 404);
    }

    #[actix_web::test]
    async fn test_blank_name_is_a_field_error() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;

        let (status, body) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/tags")
                .set_json(json!({"name": "   "})),
            Some(&token),
        )
        .await;

        assert_eq!(status, 400);
        assert!(body["errors"]["name"].is_array());
    }
}
