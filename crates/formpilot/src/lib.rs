//! Formpilot: declarative form interaction for browser tests
//!
//! A [`FormModel`] maps logical form fields to the UI actions that set them,
//! driven through a [`LocatorTable`] and a bounded wait on every located
//! element. It ships with the locator table of the DemoQA practice
//! registration form and runs against a real Chromium (`ChromiumDriver`,
//! feature `browser`) or the in-memory [`MockDriver`].
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌─────────────┐    ┌────────────┐
//! │ FormData   │───►│ FormModel  │───►│ FormDriver  │───►│ Chromium   │
//! │ (caller)   │    │ + FormPage │    │ (trait)     │    │ / Mock     │
//! └────────────┘    └────────────┘    └─────────────┘    └────────────┘
//!                         │                  ▲
//!                         ▼                  │
//!                   ┌────────────┐    ┌─────────────┐
//!                   │ Waiter     │    │ Fixture     │──► ArtifactSink
//!                   └────────────┘    └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> formpilot::FormResult<()> {
//! use formpilot::{fields, FormData, FormModel, MockDriver};
//!
//! let driver = MockDriver::new();
//! let form = FormModel::demoqa(&driver);
//! form.open().await?;
//! form.fill_form(&FormData::new().with_first_name("Jane").with_last_name("Smith")).await?;
//! form.set_text(fields::MOBILE, "9876543210").await?;
//! form.submit().await?;
//! assert!(form.is_confirmation_visible().await);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc)]
mod browser;
mod driver;
#[allow(clippy::missing_errors_doc)]
mod fixture;
#[allow(clippy::missing_errors_doc)]
mod form;
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod locator;
#[allow(clippy::missing_errors_doc)]
mod page_object;
mod result;
mod script;

/// In-memory practice form driver for tests
#[allow(clippy::missing_errors_doc, clippy::too_many_lines)]
pub mod mock;

/// Log subscriber setup
pub mod tracing_support;

/// Bounded waits
#[allow(clippy::missing_errors_doc)]
pub mod wait;

pub use browser::{
    SessionConfig, ENV_ARTIFACTS_DIR, ENV_CHROMIUM_PATH, ENV_ENDPOINT, ENV_HEADLESS,
    ENV_TIMEOUT_MS,
};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumElement};
pub use driver::{FormDriver, Key};
pub use fixture::{
    ArtifactSink, Artifacts, DirectoryArtifactSink, Fixture, MemoryArtifactSink, HTML_FILE,
    LOG_FILE, SCREENSHOT_FILE,
};
pub use form::{CheckMode, ConfirmationStatus, FormData, FormModel, DEFAULT_GENDER};
pub use locator::{
    choice_input_key, choice_key, css_string, xpath_literal, By, FieldLocator, LocatorEntry,
    LocatorTable, Strategy, INPUT_SUFFIX, PLACEHOLDER,
};
pub use mock::MockDriver;
pub use page_object::{
    fields, FormPage, FormPageBuilder, PageObject, DEFAULT_SETTLE_TIMEOUT_MS, DEMOQA_URL,
};
pub use result::{ErrorKind, FormError, FormResult};
pub use tracing_support::{init_tracing, TracingConfig};
pub use wait::{WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
