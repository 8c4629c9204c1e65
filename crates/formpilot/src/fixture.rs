//! Per-test session fixture and teardown artifacts.
//!
//! A [`Fixture`] owns the driver of one test. Teardown always runs: it
//! captures the browser console log, a screenshot and the page HTML, hands
//! them to an [`ArtifactSink`], then ends the session.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::driver::FormDriver;
use crate::result::FormResult;

/// Log file name inside an artifact directory
pub const LOG_FILE: &str = "browser.log";
/// Screenshot file name inside an artifact directory
pub const SCREENSHOT_FILE: &str = "screenshot.png";
/// HTML file name inside an artifact directory
pub const HTML_FILE: &str = "page.html";

/// Diagnostics captured at teardown. Parts that could not be captured are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    /// Browser console messages
    pub logs: Vec<String>,
    /// PNG screenshot
    pub screenshot: Vec<u8>,
    /// Page HTML source
    pub html: String,
}

impl Artifacts {
    /// Capture whatever the driver can still provide
    pub async fn capture<D: FormDriver>(driver: &D) -> Self {
        let logs = driver.console_logs().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not capture browser logs");
            Vec::new()
        });
        let screenshot = driver.screenshot().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not capture screenshot");
            Vec::new()
        });
        let html = driver.page_source().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not capture page source");
            String::new()
        });
        Self {
            logs,
            screenshot,
            html,
        }
    }

    /// Check if nothing was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty() && self.screenshot.is_empty() && self.html.is_empty()
    }
}

/// Consumer of teardown artifacts
pub trait ArtifactSink {
    /// Store the artifacts of the test `name`
    fn attach(&mut self, name: &str, artifacts: &Artifacts) -> FormResult<()>;
}

/// Keeps artifacts in memory
#[derive(Debug, Default)]
pub struct MemoryArtifactSink {
    /// Attached artifacts, by test name, in attach order
    pub attached: Vec<(String, Artifacts)>,
}

impl MemoryArtifactSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactSink for MemoryArtifactSink {
    fn attach(&mut self, name: &str, artifacts: &Artifacts) -> FormResult<()> {
        self.attached.push((name.to_string(), artifacts.clone()));
        Ok(())
    }
}

/// Writes `<root>/<name>/{browser.log,screenshot.png,page.html}`
#[derive(Debug, Clone)]
pub struct DirectoryArtifactSink {
    root: PathBuf,
}

impl DirectoryArtifactSink {
    /// Create a sink rooted at `root`; the directory is created on first attach
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the artifacts of `name` are written to
    #[must_use]
    pub fn dir_for(&self, name: &str) -> PathBuf {
        let safe: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(safe)
    }
}

impl ArtifactSink for DirectoryArtifactSink {
    fn attach(&mut self, name: &str, artifacts: &Artifacts) -> FormResult<()> {
        let dir = self.dir_for(name);
        std::fs::create_dir_all(&dir)?;

        let captured_at = chrono::Utc::now().to_rfc3339();
        let mut log = format!("# {name} captured at {captured_at}\n");
        for line in &artifacts.logs {
            log.push_str(line);
            log.push('\n');
        }
        std::fs::write(dir.join(LOG_FILE), log)?;
        if !artifacts.screenshot.is_empty() {
            std::fs::write(dir.join(SCREENSHOT_FILE), &artifacts.screenshot)?;
        }
        std::fs::write(dir.join(HTML_FILE), &artifacts.html)?;
        info!(test = name, dir = %dir.display(), "Artifacts written");
        Ok(())
    }
}

/// Owns the driver of one test
#[derive(Debug)]
pub struct Fixture<D: FormDriver> {
    driver: D,
}

impl<D: FormDriver> Fixture<D> {
    /// Wrap a connected driver
    #[must_use]
    pub const fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Driver for the test body
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Capture artifacts, hand them to `sink`, then quit the session.
    ///
    /// Capture failures are logged and leave the artifact empty. Quitting
    /// happens even when the sink fails.
    ///
    /// # Errors
    ///
    /// The sink's error, else the driver's quit error.
    pub async fn teardown<S: ArtifactSink + ?Sized>(self, sink: &mut S, name: &str) -> FormResult<()> {
        let artifacts = Artifacts::capture(&self.driver).await;
        let attached = sink.attach(name, &artifacts);
        if let Err(ref e) = attached {
            warn!(test = name, error = %e, "Artifact sink failed");
        }
        let quit = self.driver.quit().await;
        attached.and(quit)
    }

    /// Run `body` against the driver and always tear down afterwards.
    ///
    /// A panicking body (a failed assertion) is torn down too, then the
    /// panic resumes.
    ///
    /// # Errors
    ///
    /// The body's error if it failed, otherwise any teardown error.
    pub async fn run<S, F>(self, sink: &mut S, name: &str, body: F) -> FormResult<()>
    where
        S: ArtifactSink + ?Sized,
        F: for<'a> FnOnce(&'a D) -> BoxFuture<'a, FormResult<()>>,
    {
        info!(test = name, "Running");
        let outcome = AssertUnwindSafe(body(&self.driver)).catch_unwind().await;
        match outcome {
            Ok(Err(ref e)) => warn!(test = name, error = %e, "Test body failed"),
            Err(_) => warn!(test = name, "Test body panicked"),
            Ok(Ok(())) => {}
        }
        let teardown = self.teardown(sink, name).await;
        match outcome {
            Err(panic) => std::panic::resume_unwind(panic),
            Ok(Err(e)) => Err(e),
            Ok(Ok(())) => teardown,
        }
    }
}
