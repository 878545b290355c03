//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod query;
mod repository;

pub use auth::{AuthError, IssuedToken, PasswordService, TokenClaims, TokenService};
pub use query::{Page, PageRequest, PostFilter};
pub use repository::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository, PostRepository,
    TagRepository,
};
