use crate::utils::error::{Result, StackError};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(StackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(StackError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(StackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(StackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(StackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(StackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

fn service_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").expect("service name pattern is valid")
    })
}

/// Compose 服務名稱只允許英數字與 `_` `.` `-`，且不能以符號開頭
pub fn validate_service_name(field_name: &str, name: &str) -> Result<()> {
    if !service_name_pattern().is_match(name) {
        return Err(StackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Service names may only contain letters, digits, '_', '.' and '-'"
                .to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("health.endpoints", "http://localhost:3000/health").is_ok());
        assert!(validate_url("health.endpoints", "https://example.com").is_ok());
        assert!(validate_url("health.endpoints", "").is_err());
        assert!(validate_url("health.endpoints", "localhost:3000").is_err());
        assert!(validate_url("health.endpoints", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_service_name() {
        assert!(validate_service_name("SERVICE", "backend").is_ok());
        assert!(validate_service_name("SERVICE", "mongo-express_1.2").is_ok());
        assert!(validate_service_name("SERVICE", "").is_err());
        assert!(validate_service_name("SERVICE", "-backend").is_err());
        assert!(validate_service_name("SERVICE", "backend gateway").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("health.timeout_seconds", 5u64, 1, 300).is_ok());
        assert!(validate_range("health.timeout_seconds", 0u64, 1, 300).is_err());
        assert!(validate_range("health.timeout_seconds", 301u64, 1, 300).is_err());
    }
}
