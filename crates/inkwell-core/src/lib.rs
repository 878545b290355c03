//! # Inkwell Core
//!
//! The domain layer of the Inkwell blog API: authors, posts, categories,
//! tags and comments, the rules about who may change them, and the ports
//! that infrastructure implements.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
