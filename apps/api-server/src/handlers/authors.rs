//! Author handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkwell_core::domain::Author;
use inkwell_shared::ErrorResponse;
use inkwell_shared::dto::{
    AuthorResponse, CheckRequest, PageQuery, ProfileResponse, UpdateAuthorRequest,
};
use inkwell_shared::response::AuthorPage;

use super::{non_blank, page_request, paginated};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn author_response(author: Author) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        display_name: author.display_name,
        bio: author.bio,
        created_at: author.created_at,
    }
}

pub(crate) fn profile_response(author: Author) -> ProfileResponse {
    ProfileResponse {
        id: author.id,
        email: author.email,
        display_name: author.display_name,
        bio: author.bio,
        is_admin: author.is_admin,
        created_at: author.created_at,
        updated_at: author.updated_at,
    }
}

async fn load_author(state: &AppState, id: Uuid) -> AppResult<Author> {
    state
        .authors
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
}

/// List authors
#[utoipa::path(
    get,
    path = "/api/v1/authors",
    tag = "authors",
    params(PageQuery),
    responses((status = 200, description = "One page of authors", body = AuthorPage))
)]
pub async fn list_authors(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let authors = state.authors.list(page_request(&query)).await?;
    Ok(HttpResponse::Ok().json(paginated(authors, author_response)))
}

/// Public profile of an author
#[utoipa::path(
    get,
    path = "/api/v1/authors/{id}",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 200, description = "The author", body = AuthorResponse),
        (status = 404, description = "No such author", body = ErrorResponse)
    )
)]
pub async fn get_author(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let author = load_author(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(author_response(author)))
}

/// Update one's own display name or bio
#[utoipa::path(
    patch,
    path = "/api/v1/authors/{id}",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    request_body = UpdateAuthorRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 403, description = "Not this author", body = ErrorResponse),
        (status = 404, description = "No such author", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_author(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAuthorRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    identity.actor().ensure_can_update_author(id)?;
    let mut author = load_author(&state, id).await?;

    let req = body.into_inner();
    req.check()?;

    if let Some(display_name) = req.display_name {
        author.display_name = display_name.trim().to_string();
    }
    if let Some(bio) = req.bio {
        author.bio = non_blank(bio);
    }
    author.touch();

    let saved = state.authors.update(author).await?;
    Ok(HttpResponse::Ok().json(profile_response(saved)))
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde_json::json;

    use crate::handlers::test_support::{me, register, send, test_app, test_state};

    #[actix_web::test]
    async fn test_author_updates_own_profile_only() {
        let app = test_app(test_state()).await;
        let ann = register(&app, "ann@example.com").await;
        let bob = register(&app, "bob@example.com").await;
        let ann_id = me(&app, &ann).await;
        let uri = format!("/api/v1/authors/{ann_id}");

        let (status, _) = send(
            &app,
            TestRequest::patch().uri(&uri).set_json(json!({"bio": "Hijacked"})),
            Some(&bob),
        )
        .await;
        assert_eq!(status, 403);

        let (status, profile) = send(
            &app,
            TestRequest::patch()
                .uri(&uri)
                .set_json(json!({"display_name": "Ann Lee", "bio": "Writes about Rust"})),
            Some(&ann),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(profile["display_name"], "Ann Lee");

        let (status, public) = send(&app, TestRequest::get().uri(&uri), None).await;
        assert_eq!(status, 200);
        assert_eq!(public["bio"], "Writes about Rust");
        assert!(public.get("email").is_none());

        let (_, list) = send(&app, TestRequest::get().uri("/api/v1/authors?limit=1"), None).await;
        assert_eq!(list["total"], 2);
        assert_eq!(list["items"].as_array().unwrap().len(), 1);
    }
}
