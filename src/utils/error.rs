use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Year {year} not found in finance dataset")]
    YearNotFound { year: String },

    #[error("Failed to fetch {resource}: {message}")]
    FetchFailure { resource: String, message: String },

    #[error("Invalid geo data: {message}")]
    GeoFormat { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Network,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::YearNotFound { .. }
            | MapError::GeoFormat { .. }
            | MapError::CsvError(_)
            | MapError::SerializationError(_) => ErrorCategory::Data,
            MapError::FetchFailure { .. } | MapError::HttpError(_) => ErrorCategory::Network,
            MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            MapError::ZipError(_) | MapError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // a fetch may succeed on a later attempt
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            MapError::YearNotFound { year } => format!(
                "Pick a year present in the finance dataset instead of {}",
                year
            ),
            MapError::FetchFailure { resource, .. } => {
                format!("Check that {} exists and is reachable, then retry", resource)
            }
            MapError::GeoFormat { .. } => {
                "Check the topology object name and region key property".to_string()
            }
            MapError::HttpError(_) => "Check network connectivity and the source URL".to_string(),
            MapError::SerializationError(_) | MapError::CsvError(_) => {
                "Check that the input files are well-formed".to_string()
            }
            MapError::ConfigValidationError { .. }
            | MapError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            MapError::ZipError(_) | MapError::IoError(_) => {
                "Check disk space and write permissions of the output path".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MapError::YearNotFound { year } => {
                format!("No finance data for year {}; no map was drawn", year)
            }
            MapError::FetchFailure { resource, .. } => {
                format!("Could not load {}; no map was drawn", resource)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_not_found_is_high_severity_data_error() {
        let err = MapError::YearNotFound {
            year: "1999".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("1999"));
    }

    #[test]
    fn test_fetch_failure_is_retryable() {
        let err = MapError::FetchFailure {
            resource: "geo data".to_string(),
            message: "404".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.recovery_suggestion().contains("geo data"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = MapError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
