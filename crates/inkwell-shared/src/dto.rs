//! Data Transfer Objects - request/response types for the API.
//!
//! Request types derive [`Validate`] for length, range and format rules.
//! [`CheckRequest::check`] adds the "must not be blank" rule on top and
//! turns everything into [`FieldErrors`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::response::FieldErrors;

const REQUIRED: &str = "This field may not be blank";

/// Validation entry point for request bodies.
pub trait CheckRequest: Validate {
    /// Text fields that must contain non-whitespace when present.
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        Vec::new()
    }

    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);

        for (field, value) in self.required_text() {
            if value.is_some_and(|v| v.trim().is_empty()) {
                let mut error = ValidationError::new("blank");
                error.message = Some(REQUIRED.into());
                errors.add(field, error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(field_errors(&errors))
        }
    }
}

/// Flatten validator output into field name to messages.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Authentication & authors
// ---------------------------------------------------------------------------

/// Request to register a new author.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters"))]
    pub display_name: String,
    #[validate(length(max = 2000, message = "Ensure this field has no more than 2000 characters"))]
    pub bio: Option<String>,
}

impl CheckRequest for RegisterRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("display_name", Some(&self.display_name))]
    }
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CheckRequest for LoginRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("email", Some(&self.email)), ("password", Some(&self.password))]
    }
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Public information about an author.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The authenticated author's own profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthorRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters"))]
    pub display_name: Option<String>,
    /// `null` clears the bio.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[validate(length(max = 2000, message = "Ensure this field has no more than 2000 characters"))]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
}

impl CheckRequest for UpdateAuthorRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("display_name", self.display_name.as_deref())]
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PostRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters"))]
    pub title: String,
    /// Derived from the title when omitted on create; kept when omitted on replace.
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters"))]
    pub slug: Option<String>,
    #[serde(default)]
    pub body: String,
    #[validate(length(max = 1000, message = "Ensure this field has no more than 1000 characters"))]
    pub excerpt: Option<String>,
    /// Estimated reading time in minutes.
    #[validate(range(min = 1, message = "Must be a positive number of minutes"))]
    pub time_read: Option<i32>,
    pub category_id: Option<Uuid>,
    /// Tag names; unknown names are created.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CheckRequest for PostRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("title", Some(&self.title)), ("body", Some(&self.body))]
    }
}

/// Body of `PATCH /posts/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters"))]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[validate(length(max = 1000, message = "Ensure this field has no more than 1000 characters"))]
    #[schema(value_type = Option<String>)]
    pub excerpt: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[validate(range(min = 1, message = "Must be a positive number of minutes"))]
    #[schema(value_type = Option<i32>)]
    pub time_read: Option<Option<i32>>,
    /// `null` removes the post from its category.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    /// Replaces the whole tag set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl CheckRequest for UpdatePostRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("title", self.title.as_deref()),
            ("body", self.body.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub time_read: Option<i32>,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    /// Only posts written by this author.
    pub author: Option<Uuid>,
    /// Only posts in this category.
    pub category: Option<Uuid>,
    /// Only posts carrying this tag.
    pub tag: Option<Uuid>,
    /// Case-insensitive substring of the title or body.
    pub search: Option<String>,
    /// Page size, 1 to 100 (default 20).
    pub limit: Option<u64>,
    /// Number of matches to skip.
    pub offset: Option<u64>,
}

/// Query string of the other collection endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size, 1 to 100 (default 20).
    pub limit: Option<u64>,
    /// Number of items to skip.
    pub offset: Option<u64>,
}

// ---------------------------------------------------------------------------
// Categories & tags
// ---------------------------------------------------------------------------

/// Body of `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters"))]
    pub name: String,
    /// Derived from the name when omitted.
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters"))]
    pub slug: Option<String>,
    /// Assigned after the current highest value when omitted.
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1"))]
    pub ordering: Option<i32>,
}

impl CheckRequest for CategoryRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("name", Some(&self.name)), ("slug", self.slug.as_deref())]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters"))]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1"))]
    pub ordering: Option<i32>,
}

impl CheckRequest for UpdateCategoryRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("name", self.name.as_deref()), ("slug", self.slug.as_deref())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub ordering: i32,
    pub created_at: DateTime<Utc>,
}

/// Body of every tag write.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TagRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters"))]
    pub name: String,
}

impl CheckRequest for TagRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("name", Some(&self.name))]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CommentRequest {
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1500, message = "Ensure this field has no more than 1500 characters"))]
    pub message: String,
}

impl CheckRequest for CommentRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("message", Some(&self.message))]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentRequest {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters"))]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1500, message = "Ensure this field has no more than 1500 characters"))]
    pub message: Option<String>,
    /// Moderation flag; only the post's owner or an administrator may set it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

impl CheckRequest for UpdateCommentRequest {
    fn required_text(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("message", self.message.as_deref())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub name: Option<String>,
    pub message: String,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
