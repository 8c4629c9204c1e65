//! FormDriver - abstract browser automation trait
//!
//! Everything the form model does to a page goes through this trait, so the
//! same model runs against a real browser (`ChromiumDriver`, feature
//! `browser`) or the in-memory [`crate::MockDriver`].
//!
//! Methods take `&self`: a driver wraps one live session whose state lives
//! in the browser, not in the handle.

use async_trait::async_trait;

use crate::locator::By;
use crate::result::FormResult;

/// Non-text keys sent to a focused element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Commit key (closes pickers, turns text into tags)
    Enter,
}

impl Key {
    /// DOM `KeyboardEvent.key` name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "Enter",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract driver trait for browser automation
///
/// # Implementations
///
/// - `ChromiumDriver` - chromiumoxide over CDP, local or remote
/// - `MockDriver` - in-memory practice form for unit testing
#[async_trait]
pub trait FormDriver: Send + Sync {
    /// Handle to one element of the current page
    type Element: Send + Sync;

    /// Navigate to URL
    async fn navigate(&self, url: &str) -> FormResult<()>;

    /// First element matching `by`
    ///
    /// Returns [`crate::FormError::ElementNotFound`] when nothing matches.
    async fn find_element(&self, by: &By) -> FormResult<Self::Element>;

    /// All elements matching `by`, in document order
    async fn find_elements(&self, by: &By) -> FormResult<Vec<Self::Element>>;

    /// Click element
    async fn click(&self, element: &Self::Element) -> FormResult<()>;

    /// Clear the value of an input element
    async fn clear(&self, element: &Self::Element) -> FormResult<()>;

    /// Type text into element
    async fn send_keys(&self, element: &Self::Element, text: &str) -> FormResult<()>;

    /// Press a single key on element
    async fn press_key(&self, element: &Self::Element, key: Key) -> FormResult<()>;

    /// Select all text of an input element
    async fn select_all(&self, element: &Self::Element) -> FormResult<()>;

    /// Scroll element into the viewport
    async fn scroll_into_view(&self, element: &Self::Element) -> FormResult<()>;

    /// Rendered text of element
    async fn text(&self, element: &Self::Element) -> FormResult<String>;

    /// Current `value` property of an input element
    async fn value(&self, element: &Self::Element) -> FormResult<String>;

    /// Whether element is rendered and visible
    async fn is_displayed(&self, element: &Self::Element) -> FormResult<bool>;

    /// Whether element accepts input
    async fn is_enabled(&self, element: &Self::Element) -> FormResult<bool>;

    /// Whether a checkbox/radio/option element is checked
    async fn is_selected(&self, element: &Self::Element) -> FormResult<bool>;

    /// Execute JavaScript in page context
    async fn execute_script(&self, script: &str) -> FormResult<serde_json::Value>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> FormResult<Vec<u8>>;

    /// Serialized HTML of the current document
    async fn page_source(&self) -> FormResult<String>;

    /// Console messages captured since the session started
    async fn console_logs(&self) -> FormResult<Vec<String>>;

    /// End the browser session
    async fn quit(&self) -> FormResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::Enter.as_str(), "Enter");
        assert_eq!(Key::Enter.to_string(), "Enter");
    }
}
