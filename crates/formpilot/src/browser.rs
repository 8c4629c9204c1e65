//! Browser sessions.
//!
//! [`SessionConfig`] selects where the browser runs: a remote CDP endpoint
//! when `endpoint` is set, a locally launched Chromium otherwise. With the
//! `browser` feature, `ChromiumDriver` implements [`crate::FormDriver`]
//! over chromiumoxide.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::result::{FormError, FormResult};
use crate::wait::DEFAULT_TIMEOUT_MS;

/// Remote CDP endpoint, e.g. `ws://grid:9222/devtools/browser/<id>`
pub const ENV_ENDPOINT: &str = "FORMPILOT_ENDPOINT";
/// `true`/`false` headless switch for local launches
pub const ENV_HEADLESS: &str = "FORMPILOT_HEADLESS";
/// Chromium binary for local launches
pub const ENV_CHROMIUM_PATH: &str = "FORMPILOT_CHROMIUM_PATH";
/// Wait budget in milliseconds
pub const ENV_TIMEOUT_MS: &str = "FORMPILOT_TIMEOUT_MS";
/// Directory artifacts are written to
pub const ENV_ARTIFACTS_DIR: &str = "FORMPILOT_ARTIFACTS_DIR";

/// Browser session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Remote CDP endpoint; `None` launches a local browser
    pub endpoint: Option<String>,
    /// Run in headless mode
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Wait budget for element lookups
    pub timeout_ms: u64,
    /// Where teardown artifacts are written
    pub artifacts_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            headless: true,
            chromium_path: None,
            viewport_width: 1920,
            viewport_height: 1080,
            sandbox: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            artifacts_dir: PathBuf::from("target/formpilot-artifacts"),
        }
    }
}

impl SessionConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `FORMPILOT_*` environment variables
    pub fn from_env() -> FormResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FormResult<Self> {
        let mut config = Self::default();
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            config.endpoint = Some(endpoint);
        }
        if let Some(headless) = lookup(ENV_HEADLESS) {
            config.headless = parse_flag(ENV_HEADLESS, &headless)?;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH) {
            config.chromium_path = Some(PathBuf::from(path));
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = timeout.trim().parse().map_err(|_| {
                FormError::config(format!("{ENV_TIMEOUT_MS} must be milliseconds, got '{timeout}'"))
            })?;
        }
        if let Some(dir) = lookup(ENV_ARTIFACTS_DIR) {
            config.artifacts_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Parse a config from YAML
    pub fn from_yaml(yaml: &str) -> FormResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Attach to a remote endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the wait budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Whether the session attaches to a remote browser
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.endpoint.is_some()
    }
}

fn parse_flag(key: &str, value: &str) -> FormResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FormError::config(format!(
            "{key} must be true or false, got '{value}'"
        ))),
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening, clippy::missing_errors_doc)]
mod cdp {
    use super::{FormError, FormResult, SessionConfig};
    use crate::driver::{FormDriver, Key};
    use crate::locator::By;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
    use chromiumoxide::element::Element as CdpElement;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tracing::{debug, info};

    const CLEAR_JS: &str = "function() { \
        const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(this), 'value'); \
        if (setter && setter.set) { setter.set.call(this, ''); } else { this.value = ''; } \
        this.dispatchEvent(new Event('input', { bubbles: true })); \
        this.dispatchEvent(new Event('change', { bubbles: true })); }";
    const SELECT_ALL_JS: &str =
        "function() { this.focus(); if (typeof this.select === 'function') { this.select(); } }";
    const VALUE_JS: &str = "function() { return this.value === undefined ? '' : String(this.value); }";
    const DISPLAYED_JS: &str = "function() { \
        const r = this.getBoundingClientRect(); const s = getComputedStyle(this); \
        return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }";
    const ENABLED_JS: &str = "function() { \
        const cls = String(this.className || ''); \
        return !this.disabled && this.getAttribute('aria-disabled') !== 'true' \
            && !cls.includes('is-disabled') && !this.querySelector('[class*=\"is-disabled\"]'); }";
    const SELECTED_JS: &str = "function() { return !!this.checked; }";

    /// Element handle with the selector it was found by
    #[derive(Debug)]
    pub struct ChromiumElement {
        inner: CdpElement,
        selector: String,
    }

    /// [`FormDriver`] over a chromiumoxide CDP session
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: Arc<Mutex<CdpBrowser>>,
        page: CdpPage,
        console: Arc<Mutex<Vec<String>>>,
        handle: tokio::task::JoinHandle<()>,
        console_handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumDriver {
        /// Attach to `config.endpoint`, or launch a local Chromium when unset
        pub async fn connect(config: &SessionConfig) -> FormResult<Self> {
            let (browser, mut handler) = match config.endpoint {
                Some(ref endpoint) => {
                    info!("Connecting to remote browser");
                    CdpBrowser::connect(endpoint.clone())
                        .await
                        .map_err(|e| FormError::driver(format!("connect failed: {e}")))?
                }
                None => {
                    info!(headless = config.headless, "Launching local browser");
                    CdpBrowser::launch(launch_config(config)?)
                        .await
                        .map_err(|e| FormError::driver(format!("launch failed: {e}")))?
                }
            };

            // Spawn handler task
            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| FormError::driver(e.to_string()))?;

            let console = Arc::new(Mutex::new(Vec::new()));
            let mut events = page
                .event_listener::<EventConsoleApiCalled>()
                .await
                .map_err(|e| FormError::driver(e.to_string()))?;
            let sink = Arc::clone(&console);
            let console_handle = tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let args: Vec<String> = event
                        .args
                        .iter()
                        .map(|arg| {
                            arg.value
                                .as_ref()
                                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                                .or_else(|| arg.description.clone())
                                .unwrap_or_default()
                        })
                        .collect();
                    sink.lock()
                        .await
                        .push(format!("[{:?}] {}", event.r#type, args.join(" ")));
                }
            });

            Ok(Self {
                browser: Arc::new(Mutex::new(browser)),
                page,
                console,
                handle,
                console_handle,
            })
        }

        async fn call(&self, element: &ChromiumElement, function: &str) -> FormResult<serde_json::Value> {
            let returned = element
                .inner
                .call_js_fn(function, false)
                .await
                .map_err(|e| element_error(&element.selector, &e))?;
            Ok(returned.result.value.unwrap_or(serde_json::Value::Null))
        }

        async fn call_bool(&self, element: &ChromiumElement, function: &str) -> FormResult<bool> {
            Ok(self.call(element, function).await?.as_bool().unwrap_or(false))
        }

        async fn lookup(&self, by: &By) -> FormResult<Vec<ChromiumElement>> {
            let selector = by.to_string();
            let found = match by.to_css() {
                Some(css) => self.page.find_elements(css).await,
                None => match by {
                    By::XPath(expr) => self.page.find_xpaths(expr.as_str()).await,
                    _ => Ok(Vec::new()),
                },
            };
            // A missing match surfaces as an empty list or a node-lookup error.
            let found = match found {
                Ok(found) => found,
                Err(e) if is_missing_node(&e.to_string()) => Vec::new(),
                Err(e) => return Err(FormError::driver(e.to_string())),
            };
            Ok(found
                .into_iter()
                .map(|inner| ChromiumElement {
                    inner,
                    selector: selector.clone(),
                })
                .collect())
        }
    }

    fn launch_config(config: &SessionConfig) -> FormResult<CdpConfig> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(Duration::from_millis(config.timeout_ms.max(1_000)));

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(FormError::config)
    }

    fn is_missing_node(message: &str) -> bool {
        let message = message.to_ascii_lowercase();
        message.contains("could not find node") || message.contains("no node with given id")
    }

    fn element_error(selector: &str, e: &chromiumoxide::error::CdpError) -> FormError {
        let message = e.to_string();
        if is_missing_node(&message) || message.to_ascii_lowercase().contains("not attached") {
            FormError::StaleElement {
                selector: selector.to_string(),
            }
        } else {
            FormError::driver(format!("{selector}: {message}"))
        }
    }

    #[async_trait]
    impl FormDriver for ChromiumDriver {
        type Element = ChromiumElement;

        async fn navigate(&self, url: &str) -> FormResult<()> {
            debug!(url, "navigate");
            let _ = self
                .page
                .goto(url)
                .await
                .map_err(|e| FormError::NavigationFailure {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn find_element(&self, by: &By) -> FormResult<ChromiumElement> {
            self.lookup(by)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| FormError::ElementNotFound {
                    selector: by.to_string(),
                })
        }

        async fn find_elements(&self, by: &By) -> FormResult<Vec<ChromiumElement>> {
            self.lookup(by).await
        }

        async fn click(&self, element: &ChromiumElement) -> FormResult<()> {
            let _ = element
                .inner
                .click()
                .await
                .map_err(|e| element_error(&element.selector, &e))?;
            Ok(())
        }

        async fn clear(&self, element: &ChromiumElement) -> FormResult<()> {
            let _ = self.call(element, CLEAR_JS).await?;
            Ok(())
        }

        async fn send_keys(&self, element: &ChromiumElement, text: &str) -> FormResult<()> {
            let _ = element
                .inner
                .focus()
                .await
                .map_err(|e| element_error(&element.selector, &e))?;
            let _ = element
                .inner
                .type_str(text)
                .await
                .map_err(|e| element_error(&element.selector, &e))?;
            Ok(())
        }

        async fn press_key(&self, element: &ChromiumElement, key: Key) -> FormResult<()> {
            let _ = element
                .inner
                .press_key(key.as_str())
                .await
                .map_err(|e| element_error(&element.selector, &e))?;
            Ok(())
        }

        async fn select_all(&self, element: &ChromiumElement) -> FormResult<()> {
            let _ = self.call(element, SELECT_ALL_JS).await?;
            Ok(())
        }

        async fn scroll_into_view(&self, element: &ChromiumElement) -> FormResult<()> {
            let _ = element
                .inner
                .scroll_into_view()
                .await
                .map_err(|e| element_error(&element.selector, &e))?;
            Ok(())
        }

        async fn text(&self, element: &ChromiumElement) -> FormResult<String> {
            Ok(element
                .inner
                .inner_text()
                .await
                .map_err(|e| element_error(&element.selector, &e))?
                .unwrap_or_default())
        }

        async fn value(&self, element: &ChromiumElement) -> FormResult<String> {
            Ok(self
                .call(element, VALUE_JS)
                .await?
                .as_str()
                .unwrap_or_default()
                .to_string())
        }

        async fn is_displayed(&self, element: &ChromiumElement) -> FormResult<bool> {
            self.call_bool(element, DISPLAYED_JS).await
        }

        async fn is_enabled(&self, element: &ChromiumElement) -> FormResult<bool> {
            self.call_bool(element, ENABLED_JS).await
        }

        async fn is_selected(&self, element: &ChromiumElement) -> FormResult<bool> {
            self.call_bool(element, SELECTED_JS).await
        }

        async fn execute_script(&self, script: &str) -> FormResult<serde_json::Value> {
            let result = self
                .page
                .evaluate(script)
                .await
                .map_err(|e| FormError::Script {
                    message: e.to_string(),
                })?;
            Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
        }

        async fn screenshot(&self) -> FormResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot = self
                .page
                .execute(params)
                .await
                .map_err(|e| FormError::driver(format!("screenshot failed: {e}")))?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| FormError::driver(format!("screenshot decode failed: {e}")))
        }

        async fn page_source(&self) -> FormResult<String> {
            self.page
                .content()
                .await
                .map_err(|e| FormError::driver(e.to_string()))
        }

        async fn console_logs(&self) -> FormResult<Vec<String>> {
            Ok(self.console.lock().await.clone())
        }

        async fn quit(&self) -> FormResult<()> {
            info!("Closing browser session");
            self.console_handle.abort();
            let result = self.browser.lock().await.close().await;
            self.handle.abort();
            result
                .map(|_| ())
                .map_err(|e| FormError::driver(format!("close failed: {e}")))
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, ChromiumElement};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    mod session_config_tests {
        use super::*;

        #[test]
        fn test_defaults_launch_locally() {
            let config = SessionConfig::default();
            assert!(!config.is_remote());
            assert!(config.headless);
            assert_eq!((config.viewport_width, config.viewport_height), (1920, 1080));
            assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        }

        #[test]
        fn test_env_selects_remote() {
            let config = SessionConfig::from_lookup(lookup(&[
                (ENV_ENDPOINT, "ws://user:key@grid.example:9222/devtools/browser/abc"),
                (ENV_TIMEOUT_MS, "2500"),
                (ENV_HEADLESS, "false"),
                (ENV_ARTIFACTS_DIR, "/tmp/artifacts"),
            ]))
            .unwrap();
            assert!(config.is_remote());
            assert!(!config.headless);
            assert_eq!(config.timeout_ms, 2500);
            assert_eq!(config.artifacts_dir, PathBuf::from("/tmp/artifacts"));
        }

        #[test]
        fn test_blank_endpoint_is_local() {
            let config = SessionConfig::from_lookup(lookup(&[(ENV_ENDPOINT, "  ")])).unwrap();
            assert!(!config.is_remote());
        }

        #[test]
        fn test_env_rejects_bad_values() {
            let err = SessionConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "soon")])).unwrap_err();
            assert!(matches!(err, FormError::Config { .. }));
            assert!(SessionConfig::from_lookup(lookup(&[(ENV_HEADLESS, "maybe")])).is_err());
        }

        #[test]
        fn test_yaml_partial() {
            let config = SessionConfig::from_yaml("sandbox: false\nchromium_path: /usr/bin/chromium\n").unwrap();
            assert!(!config.sandbox);
            assert_eq!(config.chromium_path, Some(PathBuf::from("/usr/bin/chromium")));
            assert!(config.headless);
        }

        #[test]
        fn test_builder() {
            let config = SessionConfig::new()
                .with_endpoint("ws://localhost:9222")
                .with_viewport(1280, 720)
                .with_no_sandbox()
                .with_timeout(500)
                .with_artifacts_dir("out");
            assert_eq!(config.endpoint.as_deref(), Some("ws://localhost:9222"));
            assert_eq!(config.viewport_width, 1280);
            assert!(!config.sandbox);
            assert_eq!(config.timeout_ms, 500);
        }
    }
}
