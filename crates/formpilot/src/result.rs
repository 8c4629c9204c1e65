//! Result and error types for formpilot.

use thiserror::Error;

/// Result type for formpilot operations
pub type FormResult<T> = Result<T, FormError>;

/// Classification of a failed field interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Target not visible or not enabled when an action required it
    ElementNotInteractable,
    /// Value outside the vocabulary of a single/multi-choice field
    InvalidChoice,
    /// Dropdown option absent within the wait budget
    OptionNotFound,
    /// Initial page load failed
    NavigationFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ElementNotInteractable => "ElementNotInteractable",
            Self::InvalidChoice => "InvalidChoice",
            Self::OptionNotFound => "OptionNotFound",
            Self::NavigationFailure => "NavigationFailure",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in formpilot
#[derive(Debug, Error)]
pub enum FormError {
    /// Element hidden or disabled when an action required it
    #[error("Field '{field}' is not interactable: {message}")]
    ElementNotInteractable {
        /// Logical field name
        field: String,
        /// Error message
        message: String,
    },

    /// Value does not normalize to a known choice
    #[error("Invalid choice '{value}' for field '{field}'")]
    InvalidChoice {
        /// Logical field name
        field: String,
        /// Rejected value, as supplied
        value: String,
    },

    /// Dropdown option never became clickable
    #[error("Option '{option}' for field '{field}' not found within {ms}ms")]
    OptionNotFound {
        /// Logical field name
        field: String,
        /// Visible option text that was awaited
        option: String,
        /// Wait budget in milliseconds
        ms: u64,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationFailure {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No locator registered under the field name
    #[error("No locator registered for field '{field}'")]
    UnknownField {
        /// Logical field name
        field: String,
    },

    /// Nothing in the page matched the selector
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Rendered selector
        selector: String,
    },

    /// Element handle detached from the document
    #[error("Element {selector} is no longer attached to the page")]
    StaleElement {
        /// Rendered selector
        selector: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the awaited condition
        waited_for: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Browser driver error
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FormError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Field-interaction kind, for the four failures a form operation reports
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::ElementNotInteractable { .. } => Some(ErrorKind::ElementNotInteractable),
            Self::InvalidChoice { .. } => Some(ErrorKind::InvalidChoice),
            Self::OptionNotFound { .. } => Some(ErrorKind::OptionNotFound),
            Self::NavigationFailure { .. } => Some(ErrorKind::NavigationFailure),
            _ => None,
        }
    }

    /// Logical field the failure is tagged with, if any
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ElementNotInteractable { field, .. }
            | Self::InvalidChoice { field, .. }
            | Self::OptionNotFound { field, .. }
            | Self::UnknownField { field } => Some(field),
            _ => None,
        }
    }

    /// Whether a wait should keep polling after this failure
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::StaleElement { .. }
        )
    }
}
