//! Page scripts the form model evaluates through [`crate::FormDriver::execute_script`].
//!
//! Selectors are embedded as JSON string literals, which are valid
//! JavaScript string literals, so any selector text is safe to pass.

/// Evaluates to the document's `readyState`
pub const READY_STATE: &str = "document.readyState";

/// Evaluates to the number of elements matching `css`
#[must_use]
pub fn count_elements(css: &str) -> String {
    format!("document.querySelectorAll({}).length", js_string(css))
}

/// Removes every element matching `css`; a no-op when none match
#[must_use]
pub fn remove_elements(css: &str) -> String {
    format!(
        "document.querySelectorAll({}).forEach(e => e.remove())",
        js_string(css)
    )
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_script() {
        assert_eq!(
            remove_elements("#fixedban"),
            r##"document.querySelectorAll("#fixedban").forEach(e => e.remove())"##
        );
    }

    #[test]
    fn test_selector_is_escaped() {
        assert_eq!(
            count_elements(r#"label[for="x"]"#),
            r#"document.querySelectorAll("label[for=\"x\"]").length"#
        );
    }
}
