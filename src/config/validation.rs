//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ceilings > 0, addresses parse)
//! - Reject malformed MIME types in the upload allow-list
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ToolkitConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ToolkitConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &ToolkitConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("server.bind_address", "must be a socket address"));
    }
    if config.upload.max_total_bytes == 0 {
        errors.push(ValidationError::new("upload.max_total_bytes", "must be greater than 0"));
    }
    for (i, content_type) in config.upload.allowed_content_types.iter().enumerate() {
        if !is_mime_like(content_type) {
            errors.push(ValidationError::new(
                format!("upload.allowed_content_types[{i}]"),
                format!("{content_type:?} is not a MIME type"),
            ));
        }
    }
    if config.json.max_body_bytes == 0 {
        errors.push(ValidationError::new("json.max_body_bytes", "must be greater than 0"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `type/subtype`, optionally followed by parameters.
fn is_mime_like(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && !essence.contains(char::is_whitespace)
                && !subtype.contains('/')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ToolkitConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = ToolkitConfig::default();
        config.server.bind_address = "nowhere".into();
        config.upload.max_total_bytes = 0;
        config.upload.allowed_content_types = vec!["image/png".into(), "png".into()];
        config.json.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "server.bind_address",
                "upload.max_total_bytes",
                "upload.allowed_content_types[1]",
                "json.max_body_bytes",
            ]
        );
    }

    #[test]
    fn test_mime_like() {
        assert!(is_mime_like("image/png"));
        assert!(is_mime_like("text/plain; charset=utf-8"));
        assert!(!is_mime_like("png"));
        assert!(!is_mime_like("image/"));
        assert!(!is_mime_like("a/b/c"));
    }
}
