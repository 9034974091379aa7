use thiserror::Error;

#[derive(Error, Debug)]
pub enum VouchrError {
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Network error occurred: {message}")]
    Transport { message: String },

    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Server responded with status {status}")]
    Server { status: u16 },

    #[error("Malformed response from server: {message}")]
    MalformedResponse { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Invalid pattern: {message}")]
    Pattern { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unrecognized command: {message}")]
    Command { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for VouchrError {
    fn user_message(&self) -> String {
        match self {
            VouchrError::Validation { .. } => {
                "Please fill in all the fields before submitting.".to_string()
            }
            VouchrError::InvalidField { field, message } => {
                format!("{} is not valid: {}", field, message)
            }
            VouchrError::Transport { message } => {
                format!("Something went wrong: {}", message)
            }
            VouchrError::Timeout { seconds } => {
                format!("The request timed out after {} seconds", seconds)
            }
            VouchrError::Server { status } => {
                format!("The server rejected the request (status {})", status)
            }
            VouchrError::MalformedResponse { message } => {
                format!("The server sent a response that could not be read: {}", message)
            }
            VouchrError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            VouchrError::InvalidUrl { url } => {
                format!("Invalid endpoint URL: {}", url)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            VouchrError::Validation { missing } => Some(format!(
                "Still empty: {}. Parse a message or set the fields by hand.",
                missing.join(", ")
            )),
            VouchrError::InvalidField { field, .. } if field == "Expiry" => Some(
                "Use the YYYY-MM-DD format, for example 2025-01-31.".to_string()
            ),
            VouchrError::InvalidField { field, .. } if field == "Link" => Some(
                "Links must start with http:// or https://".to_string()
            ),
            VouchrError::Transport { .. } => Some(
                "Check your internet connection and the configured endpoint URLs, then try again.".to_string()
            ),
            VouchrError::Timeout { .. } => Some(
                "The server took longer than expected. Try again or increase the timeout with --timeout.".to_string()
            ),
            VouchrError::Server { .. } | VouchrError::MalformedResponse { .. } => Some(
                "Your fields were kept; submit again once the server is available.".to_string()
            ),
            VouchrError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            VouchrError::InvalidUrl { .. } => Some(
                "Endpoint URLs must be absolute http:// or https:// URLs.".to_string()
            ),
            VouchrError::Command { .. } => Some(
                "Type 'help' to see the available commands.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for VouchrError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            VouchrError::MalformedResponse {
                message: error.to_string(),
            }
        } else if let Some(status) = error.status() {
            VouchrError::Server {
                status: status.as_u16(),
            }
        } else {
            VouchrError::Transport {
                message: error.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for VouchrError {
    fn from(error: url::ParseError) -> Self {
        VouchrError::InvalidUrl {
            url: error.to_string(),
        }
    }
}

impl From<regex::Error> for VouchrError {
    fn from(error: regex::Error) -> Self {
        VouchrError::Pattern {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for VouchrError {
    fn from(error: toml::de::Error) -> Self {
        VouchrError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VouchrError>;
