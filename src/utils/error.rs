use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

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

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown target: {name}")]
    UnknownTargetError { name: String },

    #[error("Program not found: {program}")]
    ToolNotFoundError { program: String },

    #[error("Command failed with {}: {command}", describe_code(.code))]
    CommandFailedError { command: String, code: Option<i32> },

    #[error("Interrupted: {command}")]
    InterruptedError { command: String },

    #[error("Target '{target}' aborted by user")]
    AbortedError { target: String },

    #[error("Unhealthy services: {}", .failed.join(", "))]
    UnhealthyError { failed: Vec<String> },
}

pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Usage,
    Execution,
    Network,
    System,
    UserAbort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl StackError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StackError::ConfigValidationError { .. }
            | StackError::InvalidConfigValueError { .. }
            | StackError::MissingConfigError { .. } => ErrorCategory::Configuration,
            StackError::UnknownTargetError { .. } => ErrorCategory::Usage,
            StackError::ToolNotFoundError { .. }
            | StackError::CommandFailedError { .. }
            | StackError::InterruptedError { .. } => ErrorCategory::Execution,
            StackError::HttpError(_) | StackError::UnhealthyError { .. } => ErrorCategory::Network,
            StackError::IoError(_) | StackError::SerializationError(_) => ErrorCategory::System,
            StackError::AbortedError { .. } => ErrorCategory::UserAbort,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::UserAbort => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Usage | ErrorCategory::Execution => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定行程結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StackError::ToolNotFoundError { program } => {
                format!("'{}' is not installed or not on PATH", program)
            }
            StackError::CommandFailedError { command, code } => {
                format!("`{}` failed ({})", command, describe_code(code))
            }
            StackError::AbortedError { target } => format!("{} cancelled, nothing was changed", target),
            StackError::UnknownTargetError { name } => {
                format!("'{}' is not a known target", name)
            }
            StackError::UnhealthyError { failed } => {
                format!("{} service(s) did not answer the health check", failed.len())
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            StackError::ConfigValidationError { .. } => {
                "Check the TOML syntax of the configuration file".to_string()
            }
            StackError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration or on the command line", field)
            }
            StackError::MissingConfigError { field } => {
                format!("Set '{}' in the configuration file or pass it explicitly", field)
            }
            StackError::UnknownTargetError { .. } => {
                "Run `stackctl help` to list the available targets".to_string()
            }
            StackError::ToolNotFoundError { program } => {
                format!("Install '{}' or adjust the program name in the configuration", program)
            }
            StackError::CommandFailedError { .. } => {
                "Inspect the command output above; `stackctl ps` shows the container state".to_string()
            }
            StackError::InterruptedError { .. } => {
                "Partial output was removed; re-run the target to start over".to_string()
            }
            StackError::AbortedError { .. } => "Re-run with --yes to skip the prompt".to_string(),
            StackError::UnhealthyError { .. } => {
                "Start the stack with `stackctl up` and check `stackctl logs`".to_string()
            }
            StackError::HttpError(_) => "Check network access and the health timeout".to_string(),
            StackError::IoError(_) | StackError::SerializationError(_) => {
                "Check file permissions and free disk space".to_string()
            }
        }
    }
}
