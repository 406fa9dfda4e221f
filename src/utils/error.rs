use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required column '{column}' in {source_path}")]
    MissingColumnError { column: String, source_path: String },

    #[error("Unreadable spreadsheet {source_path}: {message}")]
    SpreadsheetError { source_path: String, message: String },

    #[error("Invalid geographic data in {source_path}: {message}")]
    GeometryError { source_path: String, message: String },

    #[error("Unsupported coordinate reference system: {crs}")]
    UnsupportedCrsError { crs: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl DashboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::IoError(_) => ErrorCategory::Io,
            DashboardError::CsvError(_)
            | DashboardError::MissingColumnError { .. }
            | DashboardError::SpreadsheetError { .. }
            | DashboardError::GeometryError { .. }
            | DashboardError::UnsupportedCrsError { .. } => ErrorCategory::Data,
            DashboardError::ConfigValidationError { .. }
            | DashboardError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            DashboardError::ZipError(_) | DashboardError::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::IoError(e) => format!("File system error: {}", e),
            DashboardError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            DashboardError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value for '{}' is invalid: {}", field, reason)
            }
            DashboardError::MissingColumnError { column, .. } => {
                format!("The project table has no '{}' column", column)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the paths exist and the output directory is writable",
            ErrorCategory::Data => {
                "Check the GeoJSON boundaries and the project spreadsheet (first sheet or UTF-8 CSV, header row)"
            }
            ErrorCategory::Configuration => "Review the TOML file and the command line flags",
            ErrorCategory::Output => "Check free disk space and the output directory permissions",
        }
    }
}

/// 資料載入失敗時唯一對外的結果，保留底層原因的文字描述。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("data unavailable: {message}")]
pub struct DataUnavailable {
    pub message: String,
    pub regions_path: String,
    pub projects_path: String,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
