//! Log subscriber setup for test binaries.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "formpilot=info";

/// Configuration for log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Route output through the test harness capture
    pub test_writer: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
            test_writer: true,
        }
    }
}

impl TracingConfig {
    /// Create a new config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set filter directives
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enable JSON output
    #[must_use]
    pub const fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Write to stdout directly instead of the test capture
    #[must_use]
    pub const fn with_stdout(mut self) -> Self {
        self.test_writer = false;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter))
    }
}

/// Install a global subscriber.
///
/// Returns `false` when one is already installed, so every test may call it.
pub fn init_tracing(config: &TracingConfig) -> bool {
    let filter = config.env_filter();
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match (config.json, config.test_writer) {
        (true, true) => registry
            .with(fmt::layer().json().with_test_writer())
            .try_init(),
        (true, false) => registry.with(fmt::layer().json()).try_init(),
        (false, true) => registry.with(fmt::layer().with_test_writer()).try_init(),
        (false, false) => registry.with(fmt::layer()).try_init(),
    };
    installed.is_ok()
}
