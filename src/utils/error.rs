use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatterError {
    #[error("Unsupported file format: {file_name}")]
    UnsupportedFormatError { file_name: String },

    #[error("Failed to parse '{file_name}': {message}")]
    ParseError { file_name: String, message: String },

    #[error("PDF rendering failed: {message}")]
    RenderError { message: String },

    #[error("Cannot convert '{file_name}' to {target}")]
    UnsupportedConversionError { file_name: String, target: String },

    #[error("No uploaded file named '{file_name}'")]
    FileNotFoundError { file_name: String },

    #[error("Operation '{operation}' is not available for '{file_name}'")]
    InvalidOperationError { file_name: String, operation: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Rendering,
    Configuration,
    Session,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FormatterError {
    pub fn parse(file_name: &str, message: impl Into<String>) -> Self {
        FormatterError::ParseError {
            file_name: file_name.to_string(),
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        FormatterError::RenderError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FormatterError::UnsupportedFormatError { .. }
            | FormatterError::ParseError { .. }
            | FormatterError::UnsupportedConversionError { .. }
            | FormatterError::ValidationError { .. } => ErrorCategory::Input,
            FormatterError::RenderError { .. } => ErrorCategory::Rendering,
            FormatterError::FileNotFoundError { .. }
            | FormatterError::InvalidOperationError { .. } => ErrorCategory::Session,
            FormatterError::ConfigError { .. }
            | FormatterError::ConfigValidationError { .. }
            | FormatterError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            FormatterError::ZipError(_)
            | FormatterError::CsvError(_)
            | FormatterError::IoError(_)
            | FormatterError::ProcessingError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 使用者可自行修正（重新上傳、改選欄位）
            ErrorCategory::Input | ErrorCategory::Session => ErrorSeverity::Low,
            ErrorCategory::Rendering => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FormatterError::UnsupportedFormatError { file_name } => format!(
                "Unsupported file format for '{}'. Please upload CSV, Excel, or Word files.",
                file_name
            ),
            FormatterError::ParseError { file_name, .. } => {
                format!("Could not read '{}': the file appears to be malformed.", file_name)
            }
            FormatterError::RenderError { .. } => {
                "PDF conversion failed: the rendering engine is unavailable or reported an error."
                    .to_string()
            }
            FormatterError::UnsupportedConversionError { file_name, target } => {
                format!("'{}' cannot be converted to {}.", file_name, target)
            }
            FormatterError::FileNotFoundError { file_name } => {
                format!("'{}' is not part of the current upload.", file_name)
            }
            FormatterError::InvalidOperationError {
                file_name,
                operation,
            } => format!("'{}' is not available for '{}'.", operation, file_name),
            FormatterError::ConfigError { .. }
            | FormatterError::ConfigValidationError { .. }
            | FormatterError::InvalidConfigValueError { .. } => format!("Configuration problem: {}", self),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FormatterError::UnsupportedFormatError { .. } => {
                "Upload a file ending in .csv, .xlsx or .docx"
            }
            FormatterError::ParseError { .. } => "Re-upload a valid copy of the file",
            FormatterError::RenderError { .. } => {
                "Check that wkhtmltopdf is installed and renderer.wkhtmltopdf_path points to it, then try again"
            }
            FormatterError::UnsupportedConversionError { .. } => {
                "Tabular files convert to csv or xlsx; Word documents convert to pdf"
            }
            FormatterError::FileNotFoundError { .. } => "Run 'list' to see the uploaded files",
            FormatterError::InvalidOperationError { .. } => {
                "Cleaning, column selection and charts apply to CSV and Excel files that loaded successfully"
            }
            FormatterError::ValidationError { .. } => "Check the column names with 'preview'",
            FormatterError::ConfigError { .. }
            | FormatterError::ConfigValidationError { .. }
            | FormatterError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or the command line flags"
            }
            _ => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, FormatterError>;
