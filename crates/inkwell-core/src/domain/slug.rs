/// Derive a URL slug: ASCII letters, digits and underscores are kept and
/// lowercased, runs of whitespace and hyphens collapse into one hyphen,
/// everything else is dropped.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
    }

    slug.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Rust Programming"), "rust-programming");
        assert_eq!(slugify("  Hello,   World! "), "hello-world");
        assert_eq!(slugify("already-a--slug"), "already-a-slug");
        assert_eq!(slugify("snake_case_name"), "snake_case_name");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn test_slugify_nothing_left() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("__"), "");
    }
}
