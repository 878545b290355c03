//! Post handlers: CRUD plus the filtered, paginated list.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkwell_core::domain::{Post, PostChanges, Tag, normalize_tag_names, slugify};
use inkwell_core::ports::{PageRequest, PostFilter};
use inkwell_shared::dto::{
    CheckRequest, PostListQuery, PostRequest, PostResponse, TagResponse, UpdatePostRequest,
};
use inkwell_shared::ErrorResponse;
use inkwell_shared::response::PostPage;

use super::{non_blank, paginated};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MAX_TAG_LEN: usize = 100;
/// Highest numeric suffix tried when a derived slug is taken.
const MAX_SLUG_SUFFIX: u32 = 100;

pub(crate) fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        body: post.body,
        excerpt: post.excerpt,
        time_read: post.time_read,
        author_id: post.author_id,
        category_id: post.category_id,
        tags: post
            .tags
            .into_iter()
            .map(|t| TagResponse {
                id: t.id,
                name: t.name,
            })
            .collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub(crate) async fn load_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", id)))
}

/// A referenced category must exist; report it against the field.
async fn check_category(state: &AppState, category_id: Option<Uuid>) -> AppResult<()> {
    if let Some(id) = category_id {
        if state.categories.find_by_id(id).await?.is_none() {
            return Err(AppError::field(
                "category_id",
                format!("Category with id {} does not exist", id),
            ));
        }
    }
    Ok(())
}

/// Normalized tag names. The repository resolves them in the post's write.
fn tag_list(names: &[String]) -> AppResult<Vec<String>> {
    let names = normalize_tag_names(names);
    if let Some(long) = names.iter().find(|n| n.chars().count() > MAX_TAG_LEN) {
        return Err(AppError::field(
            "tags",
            format!("Tag name '{}' is longer than {} characters", long, MAX_TAG_LEN),
        ));
    }
    Ok(names)
}

fn tags_named(names: &[String]) -> Vec<Tag> {
    names.iter().map(|name| Tag::new(name.clone())).collect()
}

async fn slug_taken(state: &AppState, slug: &str, post_id: Uuid) -> AppResult<bool> {
    Ok(state
        .posts
        .find_by_slug(slug)
        .await?
        .is_some_and(|other| other.id != post_id))
}

/// A slug supplied by the client. It may not belong to another post.
async fn explicit_slug(state: &AppState, raw: &str, post_id: Uuid) -> AppResult<String> {
    let slug = slugify(raw);
    if slug.is_empty() {
        return Err(AppError::field(
            "slug",
            "Enter a slug made of letters, numbers, underscores or hyphens",
        ));
    }
    if slug_taken(state, &slug, post_id).await? {
        return Err(AppError::field("slug", "A post with this slug already exists"));
    }
    Ok(slug)
}

/// A slug derived from the title, numbered `-2`, `-3`, ... while taken.
/// Titles without a single slug character fall back to `post`.
async fn derived_slug(state: &AppState, title: &str, post_id: Uuid) -> AppResult<String> {
    let mut base = slugify(title);
    if base.is_empty() {
        base = "post".to_string();
    }
    if !slug_taken(state, &base, post_id).await? {
        return Ok(base);
    }
    for n in 2..=MAX_SLUG_SUFFIX {
        let candidate = format!("{base}-{n}");
        if !slug_taken(state, &candidate, post_id).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::field(
        "slug",
        "Too many posts share this title; supply a slug",
    ))
}

/// The explicit slug when one is given, otherwise `None`.
async fn requested_slug(
    state: &AppState,
    raw: Option<&str>,
    post_id: Uuid,
) -> AppResult<Option<String>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Ok(Some(explicit_slug(state, raw, post_id).await?)),
        None => Ok(None),
    }
}

/// List posts with optional filters
///
/// Every supplied filter narrows the result. `search` matches the title or
/// the body, ignoring case.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(PostListQuery),
    responses(
        (status = 200, description = "One page of matching posts", body = PostPage),
        (status = 400, description = "Malformed query parameter", body = ErrorResponse)
    )
)]
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PostFilter {
        author: query.author,
        category: query.category,
        tag: query.tag,
        search: query.search,
    };
    let page = PageRequest::new(query.limit, query.offset);

    let posts = state.posts.list(&filter, page).await?;

    Ok(HttpResponse::Ok().json(paginated(posts, post_response)))
}

/// Retrieve a post
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "No such post", body = ErrorResponse)
    )
)]
pub async fn get_post(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// Retrieve a post by its slug
#[utoipa::path(
    get,
    path = "/api/v1/posts/slug/{slug}",
    tag = "posts",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "No such post", body = ErrorResponse)
    )
)]
pub async fn get_post_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let post = state
        .posts
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with slug '{}' not found", slug)))?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// Create a post authored by the caller
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.check()?;

    check_category(&state, req.category_id).await?;
    let tag_names = tag_list(&req.tags)?;

    let mut post = Post::new(
        identity.author_id,
        req.title.trim().to_string(),
        req.body,
    );
    post.slug = match requested_slug(&state, req.slug.as_deref(), post.id).await? {
        Some(slug) => slug,
        None => derived_slug(&state, &post.title, post.id).await?,
    };
    post.excerpt = non_blank(req.excerpt);
    post.time_read = req.time_read;
    post.category_id = req.category_id;
    post.tag_names(&tag_names);

    let saved = state.posts.create(post).await?;
    tracing::info!(post_id = %saved.id, author_id = %saved.author_id, "Post created");

    Ok(HttpResponse::Created().json(post_response(saved)))
}

/// Replace every mutable field of a post
#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post replaced", body = PostResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the post's author", body = ErrorResponse),
        (status = 404, description = "No such post", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;
    identity.actor().ensure_can_update_post(&post)?;

    let req = body.into_inner();
    req.check()?;
    check_category(&state, req.category_id).await?;
    let tag_names = tag_list(&req.tags)?;
    let slug = requested_slug(&state, req.slug.as_deref(), post.id).await?;

    post.apply(PostChanges {
        title: Some(req.title.trim().to_string()),
        slug,
        body: Some(req.body),
        excerpt: Some(non_blank(req.excerpt)),
        time_read: Some(req.time_read),
        category_id: Some(req.category_id),
        tags: Some(tags_named(&tag_names)),
    });

    let saved = state.posts.update(post).await?;
    Ok(HttpResponse::Ok().json(post_response(saved)))
}

/// Change only the supplied fields of a post
///
/// `null` clears a nullable field; `tags` replaces the whole tag set.
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post id")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the post's author", body = ErrorResponse),
        (status = 404, description = "No such post", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;
    identity.actor().ensure_can_update_post(&post)?;

    let req = body.into_inner();
    req.check()?;
    if let Some(category_id) = req.category_id {
        check_category(&state, category_id).await?;
    }
    let tags = match &req.tags {
        Some(names) => Some(tags_named(&tag_list(names)?)),
        None => None,
    };
    let slug = requested_slug(&state, req.slug.as_deref(), post.id).await?;

    post.apply(PostChanges {
        title: req.title.map(|t| t.trim().to_string()),
        slug,
        body: req.body,
        excerpt: req.excerpt.map(non_blank),
        time_read: req.time_read,
        category_id: req.category_id,
        tags,
    });

    let saved = state.posts.update(post).await?;
    Ok(HttpResponse::Ok().json(post_response(saved)))
}

/// Delete a post
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Neither the author nor an administrator", body = ErrorResponse),
        (status = 404, description = "No such post", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    identity.actor().ensure_can_delete_post(&post)?;

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, by = %identity.author_id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde_json::json;

    use actix_web::body::MessageBody;
    use actix_web::dev::{Service, ServiceResponse};

    use crate::handlers::test_support::{ADMIN_EMAIL, me, register, send, test_app, test_state};

    async fn titles<S, B>(app: &S, query: &str) -> Vec<String>
    where
        S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let uri = format!("/api/v1/posts?{query}");
        let (status, body) = send(app, TestRequest::get().uri(&uri), None).await;
        assert_eq!(status, 200);
        body["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|p| p["title"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[actix_web::test]
    async fn test_create_post_then_retrieve() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;
        let author_id = me(&app, &token).await;

        let (status, created) = send(
            &app,
            TestRequest::post().uri("/api/v1/posts").set_json(json!({
                "title": "Hello Rust",
                "body": "Ownership explained",
                "time_read": 4,
                "tags": ["rust", "intro"],
            })),
            Some(&token),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(created["author_id"], author_id.as_str());

        let uri = format!("/api/v1/posts/{}", created["id"].as_str().unwrap());
        let (status, fetched) = send(&app, TestRequest::get().uri(&uri), None).await;
        assert_eq!(status, 200);
        assert_eq!(fetched["title"], "Hello Rust");
        assert_eq!(fetched["body"], "Ownership explained");
        assert_eq!(fetched["time_read"], 4);
        // sorted by name; unknown names were created
        assert_eq!(fetched["tags"][0]["name"], "intro");
        assert_eq!(fetched["tags"][1]["name"], "rust");

        let (_, tags) = send(&app, TestRequest::get().uri("/api/v1/tags"), None).await;
        assert_eq!(tags["total"], 2);
    }

    #[actix_web::test]
    async fn test_create_without_title_persists_nothing() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;

        let (status, body) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"body": "No title here"})),
            Some(&token),
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["errors"]["title"].is_array());

        let (_, list) = send(&app, TestRequest::get().uri("/api/v1/posts"), None).await;
        assert_eq!(list["total"], 0);
    }

    #[actix_web::test]
    async fn test_anonymous_create_is_unauthorized() {
        let app = test_app(test_state()).await;

        let (status, _) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"title": "T", "body": "B"})),
            None,
        )
        .await;

        assert_eq!(status, 401);
    }

    #[actix_web::test]
    async fn test_unknown_category_is_rejected() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;

        let (status, body) = send(
            &app,
            TestRequest::post().uri("/api/v1/posts").set_json(json!({
                "title": "T",
                "body": "B",
                "category_id": uuid::Uuid::new_v4(),
            })),
            Some(&token),
        )
        .await;

        assert_eq!(status, 400);
        assert!(body["errors"]["category_id"].is_array());
    }

    #[actix_web::test]
    async fn test_non_owner_cannot_modify_post() {
        let app = test_app(test_state()).await;
        let owner = register(&app, "owner@example.com").await;
        let other = register(&app, "other@example.com").await;

        let (_, created) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"title": "Mine", "body": "Original"})),
            Some(&owner),
        )
        .await;
        let uri = format!("/api/v1/posts/{}", created["id"].as_str().unwrap());

        let (status, _) = send(
            &app,
            TestRequest::patch().uri(&uri).set_json(json!({"title": "Stolen"})),
            Some(&other),
        )
        .await;
        assert_eq!(status, 403);

        let (status, _) = send(&app, TestRequest::delete().uri(&uri), Some(&other)).await;
        assert_eq!(status, 403);

        let (_, fetched) = send(&app, TestRequest::get().uri(&uri), None).await;
        assert_eq!(fetched["title"], "Mine");
        assert_eq!(fetched["updated_at"], created["updated_at"]);
    }

    #[actix_web::test]
    async fn test_patch_changes_only_given_fields() {
        let app = test_app(test_state()).await;
        let admin = register(&app, ADMIN_EMAIL).await;
        let token = register(&app, "writer@example.com").await;

        let (_, category) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/categories")
                .set_json(json!({"name": "News"})),
            Some(&admin),
        )
        .await;

        let (_, created) = send(
            &app,
            TestRequest::post().uri("/api/v1/posts").set_json(json!({
                "title": "Draft",
                "body": "Body",
                "excerpt": "Short",
                "category_id": category["id"],
                "tags": ["a"],
            })),
            Some(&token),
        )
        .await;
        let uri = format!("/api/v1/posts/{}", created["id"].as_str().unwrap());

        let (status, patched) = send(
            &app,
            TestRequest::patch()
                .uri(&uri)
                .set_json(json!({"category_id": null, "tags": ["b", "c"]})),
            Some(&token),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(patched["title"], "Draft");
        assert_eq!(patched["excerpt"], "Short");
        assert!(patched["category_id"].is_null());
        assert_eq!(patched["tags"].as_array().unwrap().len(), 2);
        assert_eq!(patched["tags"][0]["name"], "b");
    }

    #[actix_web::test]
    async fn test_put_replaces_every_field() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;

        let (_, created) = send(
            &app,
            TestRequest::post().uri("/api/v1/posts").set_json(json!({
                "title": "Old",
                "body": "Old body",
                "excerpt": "Old excerpt",
                "tags": ["x"],
            })),
            Some(&token),
        )
        .await;
        let uri = format!("/api/v1/posts/{}", created["id"].as_str().unwrap());

        let (status, replaced) = send(
            &app,
            TestRequest::put()
                .uri(&uri)
                .set_json(json!({"title": "New", "body": "New body"})),
            Some(&token),
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(replaced["title"], "New");
        assert!(replaced["excerpt"].is_null());
        assert!(replaced["tags"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_delete_then_retrieve_is_not_found() {
        let app = test_app(test_state()).await;
        let owner = register(&app, "owner@example.com").await;
        let admin = register(&app, ADMIN_EMAIL).await;

        let (_, created) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"title": "Bye", "body": "Soon gone"})),
            Some(&owner),
        )
        .await;
        let uri = format!("/api/v1/posts/{}", created["id"].as_str().unwrap());

        // administrators may delete any post
        let (status, _) = send(&app, TestRequest::delete().uri(&uri), Some(&admin)).await;
        assert_eq!(status, 204);

        let (status, _) = send(&app, TestRequest::get().uri(&uri), None).await;
        assert_eq!(status, 404);
    }

    #[actix_web::test]
    async fn test_filters_and_search() {
        let app = test_app(test_state()).await;
        let admin = register(&app, ADMIN_EMAIL).await;
        let alice = register(&app, "alice@example.com").await;
        let bob = register(&app, "bob@example.com").await;
        let alice_id = me(&app, &alice).await;

        let (_, category) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/categories")
                .set_json(json!({"name": "Systems"})),
            Some(&admin),
        )
        .await;

        for (token, title, body, in_category, tags) in [
            (&alice, "Rust lifetimes", "Borrowing", true, vec!["rust"]),
            (&alice, "Gardening", "All about RUST on tools", false, vec!["home"]),
            (&bob, "Async Rust", "Futures", true, vec!["rust"]),
            (&bob, "100% pure", "Percent signs", false, vec![]),
        ] {
            let mut payload = json!({"title": title, "body": body, "tags": tags});
            if in_category {
                payload["category_id"] = category["id"].clone();
            }
            let (status, _) = send(
                &app,
                TestRequest::post().uri("/api/v1/posts").set_json(payload),
                Some(token),
            )
            .await;
            assert_eq!(status, 201);
        }

        let category_id = category["id"].as_str().unwrap();
        assert_eq!(
            titles(&app, &format!("category={category_id}")).await,
            vec!["Rust lifetimes", "Async Rust"]
        );
        assert_eq!(
            titles(&app, "search=rust").await,
            vec!["Rust lifetimes", "Gardening", "Async Rust"]
        );
        assert_eq!(titles(&app, "search=%25").await, vec!["100% pure"]);
        assert_eq!(titles(&app, "search=%20%20").await.len(), 4);

        let (_, tags) = send(&app, TestRequest::get().uri("/api/v1/tags"), None).await;
        let rust_tag = tags["items"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == "rust")
            .map(|t| t["id"].as_str().unwrap().to_string())
            .unwrap();
        assert_eq!(
            titles(&app, &format!("author={alice_id}&tag={rust_tag}")).await,
            vec!["Rust lifetimes"]
        );

        let (status, page) =
            send(&app, TestRequest::get().uri("/api/v1/posts?limit=1&offset=1"), None).await;
        assert_eq!(status, 200);
        assert_eq!(page["total"], 4);
        assert_eq!(page["items"][0]["title"], "Gardening");

        let (status, _) =
            send(&app, TestRequest::get().uri("/api/v1/posts?author=not-a-uuid"), None).await;
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn test_slug_follows_title_and_is_numbered_on_clash() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;

        let mut slugs = Vec::new();
        for _ in 0..2 {
            let (status, created) = send(
                &app,
                TestRequest::post()
                    .uri("/api/v1/posts")
                    .set_json(json!({"title": "Hello, World!", "body": "B"})),
                Some(&token),
            )
            .await;
            assert_eq!(status, 201);
            slugs.push(created["slug"].as_str().unwrap().to_string());
        }
        assert_eq!(slugs, vec!["hello-world", "hello-world-2"]);

        let (status, fetched) = send(
            &app,
            TestRequest::get().uri("/api/v1/posts/slug/hello-world-2"),
            None,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(fetched["slug"], "hello-world-2");

        let (status, _) =
            send(&app, TestRequest::get().uri("/api/v1/posts/slug/missing"), None).await;
        assert_eq!(status, 404);
    }

    #[actix_web::test]
    async fn test_explicit_slug_must_be_free() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;

        let (_, first) = send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"title": "First", "body": "B", "slug": "Custom Name"})),
            Some(&token),
        )
        .await;
        assert_eq!(first["slug"], "custom-name");

        let (status, body) = send(
            &app,
            TestRequest::post().uri("/api/v1/posts").set_json(json!({
                "title": "Second",
                "body": "B",
                "slug": "custom-name",
                "tags": ["fresh"],
            })),
            Some(&token),
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["errors"]["slug"].is_array());

        // the rejected post left no tag behind
        let (_, tags) = send(&app, TestRequest::get().uri("/api/v1/tags"), None).await;
        assert_eq!(tags["total"], 0);

        // a post may keep its own slug
        let uri = format!("/api/v1/posts/{}", first["id"].as_str().unwrap());
        let (status, patched) = send(
            &app,
            TestRequest::patch()
                .uri(&uri)
                .set_json(json!({"title": "Renamed", "slug": "custom-name"})),
            Some(&token),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(patched["slug"], "custom-name");
    }

    #[actix_web::test]
    async fn test_unknown_category_creates_no_tags() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;

        let (status, _) = send(
            &app,
            TestRequest::post().uri("/api/v1/posts").set_json(json!({
                "title": "T",
                "body": "B",
                "category_id": uuid::Uuid::new_v4(),
                "tags": ["orphan"],
            })),
            Some(&token),
        )
        .await;
        assert_eq!(status, 400);

        let (_, tags) = send(&app, TestRequest::get().uri("/api/v1/tags"), None).await;
        assert_eq!(tags["total"], 0);
    }

    #[actix_web::test]
    async fn test_offset_past_sql_range_returns_empty_page() {
        let app = test_app(test_state()).await;
        let token = register(&app, "writer@example.com").await;
        send(
            &app,
            TestRequest::post()
                .uri("/api/v1/posts")
                .set_json(json!({"title": "Only", "body": "B"})),
            Some(&token),
        )
        .await;

        let (status, page) = send(
            &app,
            TestRequest::get().uri("/api/v1/posts?offset=18446744073709551615"),
            None,
        )
        .await;

        assert_eq!(status, 200);
        assert_eq!(page["total"], 1);
        assert!(page["items"].as_array().unwrap().is_empty());
        assert_eq!(page["offset"], i64::MAX);
    }

    #[actix_web::test]
    async fn test_missing_post_problem_names_request_and_path() {
        let app = test_app(test_state()).await;
        let uri = format!("/api/v1/posts/{}", uuid::Uuid::new_v4());

        let (status, body) = send(
            &app,
            TestRequest::get()
                .uri(&uri)
                .insert_header(("X-Request-ID", "req-404")),
            None,
        )
        .await;

        assert_eq!(status, 404);
        assert_eq!(body["request_id"], "req-404");
        assert_eq!(body["instance"], uri.as_str());
    }
}
