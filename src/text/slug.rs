//! URL slug generation.
//!
//! Only ASCII digits and lowercase ASCII letters survive; every other
//! character, including letters from non-Latin scripts, acts as a separator.

use thiserror::Error;

/// Errors returned by [`slugify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    /// The input string was empty.
    #[error("input string cannot be empty")]
    EmptyInput,

    /// Nothing was left once separators were collapsed and trimmed.
    #[error("slug is empty after character removal")]
    EmptyResult,
}

/// Create a URL-friendly slug from `input`.
pub fn slugify(input: &str) -> Result<String, SlugError> {
    if input.is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;
    for c in input.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            // Leading separators are dropped; inner runs collapse to one hyphen.
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        return Err(SlugError::EmptyResult);
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_cases() {
        let cases = [
            ("valid string", "now is the time", "now-is-the-time"),
            ("complex string", "Test + the & SLUG TiMe &^42", "test-the-slug-time-42"),
            ("mixed script", "hello world スラグタイムをテストする", "hello-world"),
            ("edge hyphens", "--already-a-slug--", "already-a-slug"),
            ("digits only", "2024", "2024"),
        ];
        for (name, input, expected) in cases {
            assert_eq!(slugify(input).as_deref(), Ok(expected), "{}", name);
        }
    }

    #[test]
    fn test_slugify_empty_input() {
        assert_eq!(slugify(""), Err(SlugError::EmptyInput));
    }

    #[test]
    fn test_slugify_non_latin_only() {
        assert_eq!(slugify("スラグタイムをテストする"), Err(SlugError::EmptyResult));
        assert_eq!(slugify("&^%$"), Err(SlugError::EmptyResult));
    }

    #[test]
    fn test_slugify_error_messages() {
        assert_eq!(SlugError::EmptyInput.to_string(), "input string cannot be empty");
        assert_eq!(
            SlugError::EmptyResult.to_string(),
            "slug is empty after character removal"
        );
    }

    proptest! {
        #[test]
        fn proptest_slug_shape(input in ".{1,64}") {
            if let Ok(slug) = slugify(&input) {
                prop_assert!(!slug.starts_with('-'));
                prop_assert!(!slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
                prop_assert!(slug.bytes().all(|b| b == b'-' || b.is_ascii_lowercase() || b.is_ascii_digit()));
            }
        }
    }
}
