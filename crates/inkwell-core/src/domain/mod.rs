//! Domain entities - the core business objects.

mod actor;
mod author;
mod category;
mod comment;
mod post;
mod slug;
mod tag;

pub use actor::Actor;
pub use author::{Author, normalize_email};
pub use category::Category;
pub use comment::{Comment, CommentChanges};
pub use post::{Post, PostChanges};
pub use slug::slugify;
pub use tag::{Tag, normalize_tag_names};
