use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity - the single classification label of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub ordering: i32,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, slug: String, ordering: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            ordering,
            created_at: Utc::now(),
        }
    }

    /// Ordering to assign when the caller does not pick one.
    pub fn next_ordering(current_max: Option<i32>) -> i32 {
        current_max.map_or(1, |max| max + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_ordering() {
        assert_eq!(Category::next_ordering(None), 1);
        assert_eq!(Category::next_ordering(Some(4)), 5);
    }
}
