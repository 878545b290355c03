//! Category handlers. Reads are public, writes need an administrator.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkwell_core::domain::{Category, slugify};
use inkwell_shared::ErrorResponse;
use inkwell_shared::dto::{
    CategoryRequest, CategoryResponse, CheckRequest, PageQuery, UpdateCategoryRequest,
};
use inkwell_shared::response::CategoryPage;

use super::{page_request, paginated};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        slug: category.slug,
        ordering: category.ordering,
        created_at: category.created_at,
    }
}

async fn load_category(state: &AppState, id: Uuid) -> AppResult<Category> {
    state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
}

/// An explicit slug, or one derived from the name.
fn slug_for(name: &str, slug: Option<&str>) -> AppResult<String> {
    let slug = match slug {
        Some(slug) => slugify(slug),
        None => slugify(name),
    };
    if slug.is_empty() {
        return Err(AppError::field(
            "slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens",
        ));
    }
    Ok(slug)
}

/// List categories in display order
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    params(PageQuery),
    responses((status = 200, description = "One page of categories", body = CategoryPage))
)]
pub async fn list_categories(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let categories = state.categories.list(page_request(&query)).await?;
    Ok(HttpResponse::Ok().json(paginated(categories, category_response)))
}

/// Retrieve a category
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category", body = CategoryResponse),
        (status = 404, description = "No such category", body = ErrorResponse)
    )
)]
pub async fn get_category(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let category = load_category(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category_response(category)))
}

/// Create a category
///
/// The slug is derived from the name and the ordering placed after the
/// current last category when they are omitted.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid or duplicate fields", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    identity.actor().ensure_admin()?;

    let req = body.into_inner();
    req.check()?;

    let name = req.name.trim().to_string();
    let slug = slug_for(&name, req.slug.as_deref())?;
    let ordering = match req.ordering {
        Some(ordering) => ordering,
        None => Category::next_ordering(state.categories.max_ordering().await?),
    };

    let saved = state
        .categories
        .create(Category::new(name, slug, ordering))
        .await?;
    tracing::info!(category_id = %saved.id, slug = %saved.slug, "Category created");

    Ok(HttpResponse::Created().json(category_response(saved)))
}

/// Replace a category
///
/// An omitted slug is derived from the new name; an omitted ordering is kept.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category replaced", body = CategoryResponse),
        (status = 400, description = "Invalid or duplicate fields", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "No such category", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    identity.actor().ensure_admin()?;
    let mut category = load_category(&state, path.into_inner()).await?;

    let req = body.into_inner();
    req.check()?;

    category.name = req.name.trim().to_string();
    category.slug = slug_for(&category.name, req.slug.as_deref())?;
    if let Some(ordering) = req.ordering {
        category.ordering = ordering;
    }

    let saved = state.categories.update(category).await?;
    Ok(HttpResponse::Ok().json(category_response(saved)))
}

/// Change only the supplied fields of a category
#[utoipa::path(
    patch,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid or duplicate fields", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "No such category", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    identity.actor().ensure_admin()?;
    let mut category = load_category(&state, path.into_inner()).await?;

    let req = body.into_inner();
    req.check()?;

    if let Some(name) = req.name {
        category.name = name.trim().to_string();
    }
    if let Some(slug) = req.slug.as_deref() {
        category.slug = slug_for(&category.name, Some(slug))?;
    }
    if let Some(ordering) = req.ordering {
        category.ordering = ordering;
    }

    let saved = state.categories.update(category).await?;
    Ok(HttpResponse::Ok().json(category_response(saved)))
}

/// Delete a category; its posts become uncategorized
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "No such category", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.actor().ensure_admin()?;

    let id = path.into_inner();
    state.categories.delete(id).await?;
    tracing::info!(category_id = %id, "Category deleted");

    Ok(HttpResponse::NoContent().finish())
}
