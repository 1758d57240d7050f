use crate::domain::model::Color;
use crate::utils::error::{MapError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// A data source is either an http(s) URL or a local file path.
pub fn validate_source(field_name: &str, source: &str) -> Result<()> {
    if source.starts_with("http://") || source.starts_with("https://") {
        validate_url(field_name, source)
    } else if source.contains("://") {
        Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: source.to_string(),
            reason: "Only http(s) URLs and local paths are supported".to_string(),
        })
    } else {
        validate_path(field_name, source)
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_hex_color(field_name: &str, value: &str) -> Result<Color> {
    value
        .parse::<Color>()
        .map_err(|_| MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a #rgb or #rrggbb color".to_string(),
        })
}

/// File name only: no directory separators, not empty.
pub fn validate_file_name(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.contains('/') || value.contains('\\') {
        return Err(MapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "File name cannot contain path separators".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sources.geo", "https://example.com").is_ok());
        assert!(validate_url("sources.geo", "http://example.com").is_ok());
        assert!(validate_url("sources.geo", "").is_err());
        assert!(validate_url("sources.geo", "invalid-url").is_err());
        assert!(validate_url("sources.geo", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_source() {
        assert!(validate_source("sources.geo", "data/geo/russia.topo.json").is_ok());
        assert!(validate_source("sources.geo", "https://example.com/geo.json").is_ok());
        assert!(validate_source("sources.geo", "ftp://example.com/geo.json").is_err());
        assert!(validate_source("sources.geo", "").is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert_eq!(
            validate_hex_color("render.palette.high", "#d73027").unwrap(),
            Color::new(0xd7, 0x30, 0x27)
        );
        assert!(validate_hex_color("render.palette.high", "red").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("output.archive", "choropleth.zip").is_ok());
        assert!(validate_file_name("output.archive", "../choropleth.zip").is_err());
        assert!(validate_file_name("output.archive", " ").is_err());
    }
}
