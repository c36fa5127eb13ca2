use thiserror::Error;

#[derive(Error, Debug)]
pub enum DedupError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Spreadsheet header row incorrect: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit status for a run that failed with this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl DedupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DedupError::CsvError(_) | DedupError::HeaderMismatch { .. } => ErrorCategory::Input,
            DedupError::ConfigValidationError { .. }
            | DedupError::InvalidConfigValueError { .. }
            | DedupError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DedupError::SerializationError(_) | DedupError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            DedupError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DedupError::CsvError(_) => {
                "Check that every row of the export has the same number of columns"
            }
            DedupError::HeaderMismatch { .. } => {
                "Re-run the AdvicePro client report with the standard duplicate-check column layout"
            }
            DedupError::IoError(_) => "Check that the input file exists and the output location is writable",
            DedupError::SerializationError(_) => "Try the CSV report format instead",
            DedupError::ConfigValidationError { .. }
            | DedupError::InvalidConfigValueError { .. }
            | DedupError::MissingConfigError { .. } => {
                "Fix the configuration file or command line option and try again"
            }
            DedupError::ProcessingError { .. } => "Re-run with --verbose for details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DedupError::HeaderMismatch { .. } => "Spreadsheet header row incorrect".to_string(),
            DedupError::CsvError(e) => format!("Could not read the spreadsheet: {}", e),
            DedupError::IoError(e) => format!("File error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DedupError>;
