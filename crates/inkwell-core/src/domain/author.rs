use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Author entity - a registered writer. Posts reference, never own, an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// Create a new author with generated ID and timestamps.
    pub fn new(email: String, password_hash: String, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            bio: None,
            password_hash,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Roles carried in this author's access tokens.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec!["author".to_string()];
        if self.is_admin {
            roles.push("admin".to_string());
        }
        roles
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Normalize an email address by lowercasing its domain part.
///
/// The local part is left untouched: `Test2@Example.com` becomes
/// `Test2@example.com`.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::validation("email", "Email is required"));
    }

    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(format!("{}@{}", local, domain.to_lowercase()))
        }
        _ => Err(DomainError::validation("email", "Invalid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        let samples = [
            ("test1@EXAMPLE.com", "test1@example.com"),
            ("Test2@Example.com", "Test2@example.com"),
            ("TEST3@EXAMPLE.COM", "TEST3@example.com"),
            ("test4@example.COM", "test4@example.com"),
        ];

        for (input, expected) in samples {
            assert_eq!(normalize_email(input).unwrap(), expected);
        }
    }

    #[test]
    fn test_normalize_email_rejects_empty() {
        assert!(matches!(
            normalize_email("  "),
            Err(DomainError::Validation { .. })
        ));
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
    }

    #[test]
    fn test_admin_roles() {
        let mut author = Author::new("a@b.c".into(), "hash".into(), "A".into());
        assert_eq!(author.roles(), vec!["author".to_string()]);

        author.is_admin = true;
        assert!(author.roles().contains(&"admin".to_string()));
    }
}
