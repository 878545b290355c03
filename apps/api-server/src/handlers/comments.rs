//! Comment handlers. New comments start hidden until a moderator (the
//! post's author or an administrator) makes them visible.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkwell_core::domain::{Comment, CommentChanges};
use inkwell_shared::ErrorResponse;
use inkwell_shared::dto::{CheckRequest, CommentRequest, CommentResponse, UpdateCommentRequest};

use super::non_blank;
use super::posts::load_post;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        name: comment.name,
        message: comment.message,
        is_visible: comment.is_visible,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

fn comment_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Comment with id {} not found", id))
}

async fn load_comment(state: &AppState, id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| comment_not_found(id))
}

/// Comments on a post that the caller may see
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/comments",
    tag = "comments",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Comments in creation order", body = [CommentResponse]),
        (status = 404, description = "No such post", body = ErrorResponse)
    )
)]
pub async fn list_comments(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    let actor = identity.actor();

    let comments: Vec<CommentResponse> = state
        .comments
        .find_by_post(post.id)
        .await?
        .into_iter()
        .filter(|c| c.is_visible_to(actor.as_ref(), &post))
        .map(comment_response)
        .collect();

    Ok(HttpResponse::Ok().json(comments))
}

/// Comment on a post
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/comments",
    tag = "comments",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment stored, awaiting moderation", body = CommentResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "No such post", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;

    let req = body.into_inner();
    req.check()?;

    let comment = Comment::new(
        post.id,
        identity.author_id,
        non_blank(req.name),
        req.message.trim().to_string(),
    );
    let saved = state.comments.create(comment).await?;
    tracing::info!(comment_id = %saved.id, post_id = %post.id, "Comment created");

    Ok(HttpResponse::Created().json(comment_response(saved)))
}

/// Retrieve a comment
///
/// Hidden comments are reported as missing to callers who may not see them.
#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "The comment", body = CommentResponse),
        (status = 404, description = "No such comment", body = ErrorResponse)
    )
)]
pub async fn get_comment(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let comment = load_comment(&state, id).await?;
    let post = load_post(&state, comment.post_id).await?;

    if !comment.is_visible_to(identity.actor().as_ref(), &post) {
        return Err(comment_not_found(id));
    }

    Ok(HttpResponse::Ok().json(comment_response(comment)))
}

/// Edit or moderate a comment
///
/// The commenter may change `name` and `message`; the post's author or an
/// administrator may change `is_visible`.
#[utoipa::path(
    patch,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    params(("id" = Uuid, Path, description = "Comment id")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 403, description = "Change not permitted", body = ErrorResponse),
        (status = 404, description = "No such comment", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut comment = load_comment(&state, id).await?;
    let post = load_post(&state, comment.post_id).await?;
    let actor = identity.actor();

    if !comment.is_visible_to(Some(&actor), &post) {
        return Err(comment_not_found(id));
    }

    let req = body.into_inner();
    let changes = CommentChanges {
        name: req.name.clone().map(non_blank),
        message: req.message.as_deref().map(|m| m.trim().to_string()),
        is_visible: req.is_visible,
    };

    if changes.edits_content() && comment.author_id != actor.author_id {
        return Err(AppError::Forbidden);
    }
    if changes.is_visible.is_some() && !actor.can_moderate(&post) {
        return Err(AppError::Forbidden);
    }
    req.check()?;

    comment.apply(changes);
    let saved = state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(comment_response(saved)))
}

/// Delete a comment
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the commenter or a moderator", body = ErrorResponse),
        (status = 404, description = "No such comment", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comment = load_comment(&state, path.into_inner()).await?;
    let post = load_post(&state, comment.post_id).await?;

    identity
        .actor()
        .ensure_can_delete_comment(&comment, &post)?;

    state.comments.delete(comment.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde_json::{Value, json};

    use crate::handlers::test_support::{ADMIN_EMAIL, register, send, test_app, test_state};

    fn count(list: &Value) -> usize {
        list.as_array().map(Vec::len).unwrap_or_default()
    }

    #[actix_web::test]
    async fn test_hidden_comments_and_moderation() {
        let app = test_app(test_state()).await;
        let owner = register(&app, "owner@example.com").await;
        let reader = register(&app, "reader@example.com").await;
        let stranger = register(&app, "stranger@example.com").await;
        let admin = register(&app, ADMIN_EMAIL).await;

        let (_, post) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"title": "Open thread", "body": "Say hi"})),
            Some(&owner),
        )
        .await;
        let comments_uri = format!("/api/v1/posts/{}/comments", post["id"].as_str().unwrap());

        let (status, comment) = send(
            &app,
            TestRequest::post()
                .uri(&comments_uri)
                .set_json(json!({"name": "R", "message": "Hi there"})),
            Some(&reader),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(comment["is_visible"], false);
        let comment_uri = format!("/api/v1/comments/{}", comment["id"].as_str().unwrap());

        // anonymous and unrelated readers do not see it
        let (_, list) = send(&app, TestRequest::get().uri(&comments_uri), None).await;
        assert_eq!(count(&list), 0);
        let (status, _) = send(&app, TestRequest::get().uri(&comment_uri), Some(&stranger)).await;
        assert_eq!(status, 404);

        // the commenter and the post owner do
        let (_, list) = send(&app, TestRequest::get().uri(&comments_uri), Some(&reader)).await;
        assert_eq!(count(&list), 1);
        let (_, list) = send(&app, TestRequest::get().uri(&comments_uri), Some(&owner)).await;
        assert_eq!(count(&list), 1);

        // the commenter cannot publish their own comment
        let (status, _) = send(
            &app,
            TestRequest::patch()
                .uri(&comment_uri)
                .set_json(json!({"is_visible": true})),
            Some(&reader),
        )
        .await;
        assert_eq!(status, 403);

        // the owner cannot rewrite it
        let (status, _) = send(
            &app,
            TestRequest::patch()
                .uri(&comment_uri)
                .set_json(json!({"message": "Edited"})),
            Some(&owner),
        )
        .await;
        assert_eq!(status, 403);

        let (status, published) = send(
            &app,
            TestRequest::patch()
                .uri(&comment_uri)
                .set_json(json!({"is_visible": true})),
            Some(&owner),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(published["is_visible"], true);

        let (_, list) = send(&app, TestRequest::get().uri(&comments_uri), None).await;
        assert_eq!(count(&list), 1);

        let (status, _) = send(&app, TestRequest::delete().uri(&comment_uri), Some(&stranger)).await;
        assert_eq!(status, 403);
        let (status, _) = send(&app, TestRequest::delete().uri(&comment_uri), Some(&admin)).await;
        assert_eq!(status, 204);
    }

    #[actix_web::test]
    async fn test_comment_requires_message_and_post() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;

        let uri = format!("/api/v1/posts/{}/comments", uuid::Uuid::new_v4());
        let (status, _) = send(
            &app,
            TestRequest::post().uri(&uri).set_json(json!({"message": "Hello"})),
            Some(&token),
        )
        .await;
        assert_eq!(status, 404);

        let (_, post) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"title": "T", "body": "B"})),
            Some(&token),
        )
        .await;
        let uri = format!("/api/v1/posts/{}/comments", post["id"].as_str().unwrap());
        let (status, body) = send(
            &app,
            TestRequest::post().uri(&uri).set_json(json!({"message": ""})),
            Some(&token),
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["errors"]["message"].is_array());
    }
}
