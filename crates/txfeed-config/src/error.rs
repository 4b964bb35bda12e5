//! Error types for txfeed-config

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config file is not valid YAML: {message}")]
    InvalidYaml { message: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{field} is {value}, the maximum is {max}")]
    OutOfRange { field: String, value: u64, max: u64 },

    #[error("Failed to read config file")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Stable code printed in front of the message
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ConfigError::InvalidYaml { .. } => "INVALID_YAML",
            ConfigError::InvalidValue { .. } => "INVALID_VALUE",
            ConfigError::OutOfRange { .. } => "OUT_OF_RANGE",
            ConfigError::IoError(_) => "IO_ERROR",
        }
    }

    /// The offending key, for errors tied to one setting
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { field, .. } | ConfigError::OutOfRange { field, .. } => Some(field),
            _ => None,
        }
    }

    /// What the user can do about it
    pub fn hints(&self) -> Vec<String> {
        let template = "Compare your file with `txfeed --print-default-config`.".to_string();
        match self {
            ConfigError::FileNotFound { .. } => vec![
                "Pass the right path with --config.".to_string(),
                "Without --config, a missing ./config.yaml falls back to the defaults.".to_string(),
            ],
            ConfigError::InvalidYaml { .. } => vec![template],
            ConfigError::InvalidValue { field, .. } => {
                vec![format!("Fix or remove `{}` to use its default.", field), template]
            }
            ConfigError::OutOfRange { field, max, .. } => {
                vec![format!("Set `{}` to at most {}.", field, max)]
            }
            ConfigError::IoError(e) => vec![format!("Check the file permissions ({}).", e)],
        }
    }

    /// Multi-line report for the CLI
    pub fn report(&self) -> String {
        let mut out = format!("[{}] {}", self.code(), self);
        for hint in self.hints() {
            out.push_str("\n  hint: ");
            out.push_str(&hint);
        }
        out
    }
}
