//! # Inkwell Shared
//!
//! Wire types of the Inkwell API: request and response bodies, their
//! validation rules, and RFC 7807 problem documents.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, FieldErrors, Paginated};
