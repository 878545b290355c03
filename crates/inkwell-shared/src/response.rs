//! Standardized API response types (RFC 7807 compliant for errors).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::{AuthorResponse, CategoryResponse, PostResponse, TagResponse};

/// Field name to validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// One page of a collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[aliases(
    PostPage = Paginated<PostResponse>,
    CategoryPage = Paginated<CategoryResponse>,
    TagPage = Paginated<TagResponse>,
    AuthorPage = Paginated<AuthorResponse>
)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Number of matches before pagination.
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Request ID for debugging purposes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Field-level validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            instance: None,
            request_id: None,
            errors: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn validation(errors: FieldErrors) -> Self {
        let mut response = Self::new(400, "Validation Failed")
            .with_detail("One or more fields are invalid");
        response.errors = Some(errors);
        response
    }

    pub fn unauthorized() -> Self {
        Self::new(401, "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(403, "Forbidden")
            .with_detail("You do not have permission to perform this action")
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_problem_serializes_field_errors() {
        let mut errors = FieldErrors::new();
        errors.insert("title".into(), vec!["This field is required".into()]);

        let body = serde_json::to_value(ErrorResponse::validation(errors)).unwrap();

        assert_eq!(body["status"], 400);
        assert_eq!(body["type"], "about:blank");
        assert_eq!(body["errors"]["title"][0], "This field is required");
        assert!(body.get("request_id").is_none());
    }
}
