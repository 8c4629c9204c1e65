//! Declarative locator table.
//!
//! Each logical field of a form maps to exactly one [`FieldLocator`]: a
//! lookup [`Strategy`] plus a selector template. Templates may carry the
//! `{value}` placeholder for dynamic selectors such as dropdown options.
//!
//! Choice fields register one locator per value under `<field>.<value>`
//! (`gender.male`, `hobbies.sports`); the registered keys are the field's
//! vocabulary. The backing input of a choice lives under
//! `<field>.<value>.input`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::result::{FormError, FormResult};

/// Placeholder substituted by [`FieldLocator::resolve`]
pub const PLACEHOLDER: &str = "{value}";

/// Suffix of the locator for a choice's backing input
pub const INPUT_SUFFIX: &str = "input";

/// How a selector is interpreted when looking an element up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Element `id` attribute
    #[serde(alias = "by_id")]
    Id,
    /// CSS selector
    #[serde(alias = "css")]
    CssSelector,
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath,
    /// Single class name
    ClassName,
}

/// A resolved, concrete element query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum By {
    /// Element `id` attribute
    Id(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// Single class name
    ClassName(String),
}

impl By {
    /// Create a CSS query
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an id query
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create an XPath query
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a class-name query
    #[must_use]
    pub fn class_name(name: impl Into<String>) -> Self {
        Self::ClassName(name.into())
    }

    /// Equivalent CSS selector, or `None` for XPath queries
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(format!("[id={}]", css_string(id))),
            Self::Css(css) => Some(css.clone()),
            Self::ClassName(class) => Some(format!("[class~={}]", css_string(class))),
            Self::XPath(_) => None,
        }
    }
}

impl std::fmt::Display for By {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(s) => write!(f, "id={s}"),
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::ClassName(s) => write!(f, "class={s}"),
        }
    }
}

/// How to find the element backing one logical field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLocator {
    /// Logical field name, unique per table
    pub field_name: String,
    /// Lookup strategy
    pub strategy: Strategy,
    /// Selector, optionally containing [`PLACEHOLDER`]
    pub selector_template: String,
}

impl FieldLocator {
    /// Create a locator
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        strategy: Strategy,
        selector_template: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            strategy,
            selector_template: selector_template.into(),
        }
    }

    /// Locator by element id
    #[must_use]
    pub fn id(field_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(field_name, Strategy::Id, id)
    }

    /// Locator by CSS selector
    #[must_use]
    pub fn css(field_name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(field_name, Strategy::CssSelector, selector)
    }

    /// Locator by XPath
    #[must_use]
    pub fn xpath(field_name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(field_name, Strategy::XPath, expr)
    }

    /// Locator by class name
    #[must_use]
    pub fn class_name(field_name: impl Into<String>, class: impl Into<String>) -> Self {
        Self::new(field_name, Strategy::ClassName, class)
    }

    /// Whether the template expects a substitution value
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.selector_template.contains(PLACEHOLDER)
    }

    /// Query for a template without placeholder
    #[must_use]
    pub fn by(&self) -> By {
        self.build(self.selector_template.clone())
    }

    /// Substitute `value` into the template.
    ///
    /// XPath and CSS templates receive `value` as a quoted string literal of
    /// their own language, so the placeholder is written bare:
    /// `//div[text()={value}]`, `label[for={value}]`. Id and class-name
    /// templates receive the raw value.
    #[must_use]
    pub fn resolve(&self, value: &str) -> By {
        let literal = match self.strategy {
            Strategy::XPath => xpath_literal(value),
            Strategy::CssSelector => css_string(value),
            Strategy::Id | Strategy::ClassName => value.to_string(),
        };
        self.build(self.selector_template.replace(PLACEHOLDER, &literal))
    }

    fn build(&self, selector: String) -> By {
        match self.strategy {
            Strategy::Id => By::Id(selector),
            Strategy::CssSelector => By::Css(selector),
            Strategy::XPath => By::XPath(selector),
            Strategy::ClassName => By::ClassName(selector),
        }
    }
}

/// Quote `value` as an XPath 1.0 string literal.
///
/// XPath has no escape syntax, so a value holding both quote kinds is
/// split into a `concat()` of single-quoted parts and `"'"`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Quote `value` as a double-quoted CSS string
#[must_use]
pub fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Serialized form of one table entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorEntry {
    /// Lookup strategy
    pub strategy: Strategy,
    /// Selector template
    pub selector: String,
}

/// Registry of field locators, keyed by unique field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, LocatorEntry>",
    into = "BTreeMap<String, LocatorEntry>"
)]
pub struct LocatorTable {
    locators: BTreeMap<String, FieldLocator>,
}

impl LocatorTable {
    /// Build a table, rejecting duplicate field names
    pub fn new(locators: impl IntoIterator<Item = FieldLocator>) -> FormResult<Self> {
        let mut table = Self::default();
        for locator in locators {
            table.register(locator)?;
        }
        Ok(table)
    }

    /// Add a locator. A field name may only be registered once.
    pub fn register(&mut self, locator: FieldLocator) -> FormResult<()> {
        if locator.field_name.is_empty() {
            return Err(FormError::config("locator field name must not be empty"));
        }
        if self.locators.contains_key(&locator.field_name) {
            return Err(FormError::config(format!(
                "duplicate locator for field '{}'",
                locator.field_name
            )));
        }
        let _ = self
            .locators
            .insert(locator.field_name.clone(), locator);
        Ok(())
    }

    /// Add or replace a locator, returning the one it replaced
    pub fn insert(&mut self, locator: FieldLocator) -> Option<FieldLocator> {
        self.locators.insert(locator.field_name.clone(), locator)
    }

    /// Look up the locator of a field
    pub fn get(&self, field: &str) -> FormResult<&FieldLocator> {
        self.locators
            .get(field)
            .ok_or_else(|| FormError::UnknownField {
                field: field.to_string(),
            })
    }

    /// Check whether a field is registered
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.locators.contains_key(field)
    }

    /// Registered values of a choice field, in key order.
    ///
    /// A value counts only when both its label and its backing input are
    /// registered, so read-back keys such as `<field>.value` are not choices.
    #[must_use]
    pub fn choices(&self, field: &str) -> Vec<&str> {
        let prefix = format!("{field}.");
        self.locators
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('.'))
            .filter(|rest| self.contains(&choice_input_key(field, rest)))
            .collect()
    }

    /// Number of registered locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Iterate over locators in field-name order
    pub fn iter(&self) -> impl Iterator<Item = &FieldLocator> {
        self.locators.values()
    }
}

/// Key of the locator for one value of a choice field
#[must_use]
pub fn choice_key(field: &str, choice: &str) -> String {
    format!("{field}.{choice}")
}

/// Key of the locator for a choice's backing input
#[must_use]
pub fn choice_input_key(field: &str, choice: &str) -> String {
    format!("{field}.{choice}.{INPUT_SUFFIX}")
}

impl TryFrom<BTreeMap<String, LocatorEntry>> for LocatorTable {
    type Error = FormError;

    fn try_from(entries: BTreeMap<String, LocatorEntry>) -> FormResult<Self> {
        Self::new(
            entries
                .into_iter()
                .map(|(name, e)| FieldLocator::new(name, e.strategy, e.selector)),
        )
    }
}

impl From<LocatorTable> for BTreeMap<String, LocatorEntry> {
    fn from(table: LocatorTable) -> Self {
        table
            .locators
            .into_iter()
            .map(|(name, l)| {
                (
                    name,
                    LocatorEntry {
                        strategy: l.strategy,
                        selector: l.selector_template,
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_static_locators() {
            assert_eq!(
                FieldLocator::id("first_name", "firstName").by(),
                By::id("firstName")
            );
            assert_eq!(
                FieldLocator::class_name("confirmation", "modal-content").by(),
                By::class_name("modal-content")
            );
        }

        #[test]
        fn test_xpath_option_template() {
            let option = FieldLocator::xpath("dropdown_option", "//div[text()={value}]");
            assert!(option.is_template());
            assert_eq!(
                option.resolve("Haryana"),
                By::xpath("//div[text()='Haryana']")
            );
        }

        #[test]
        fn test_xpath_value_with_apostrophe() {
            let option = FieldLocator::xpath("dropdown_option", "//div[text()={value}]");
            assert_eq!(
                option.resolve("Jammu's"),
                By::xpath("//div[text()=\"Jammu's\"]")
            );
        }

        #[test]
        fn test_css_template_quotes_value() {
            let label = FieldLocator::css("label", "label[for={value}]");
            assert_eq!(
                label.resolve("gender-radio-1"),
                By::css("label[for=\"gender-radio-1\"]")
            );
        }

        #[test]
        fn test_xpath_literal_mixed_quotes() {
            assert_eq!(
                xpath_literal(r#"a'b"c"#),
                r#"concat('a', "'", 'b"c')"#
            );
        }

        #[test]
        fn test_by_to_css() {
            assert_eq!(By::id("city").to_css().unwrap(), "[id=\"city\"]");
            assert_eq!(
                By::class_name("modal-content").to_css().unwrap(),
                "[class~=\"modal-content\"]"
            );
            assert!(By::xpath("//div").to_css().is_none());
        }

        #[test]
        fn test_by_display() {
            assert_eq!(By::id("submit").to_string(), "id=submit");
            assert_eq!(By::xpath("//div").to_string(), "xpath=//div");
        }
    }

    mod table_tests {
        use super::*;

        fn sample() -> LocatorTable {
            LocatorTable::new([
                FieldLocator::id("first_name", "firstName"),
                FieldLocator::css("gender.male", "label[for='gender-radio-1']"),
                FieldLocator::css("gender.female", "label[for='gender-radio-2']"),
                FieldLocator::id("gender.male.input", "gender-radio-1"),
                FieldLocator::id("gender.female.input", "gender-radio-2"),
            ])
            .unwrap()
        }

        #[test]
        fn test_duplicate_field_rejected() {
            let err = LocatorTable::new([
                FieldLocator::id("email", "userEmail"),
                FieldLocator::id("email", "otherEmail"),
            ])
            .unwrap_err();
            assert!(matches!(err, FormError::Config { .. }));
        }

        #[test]
        fn test_empty_field_name_rejected() {
            assert!(LocatorTable::new([FieldLocator::id("", "x")]).is_err());
        }

        #[test]
        fn test_insert_replaces() {
            let mut table = sample();
            let old = table.insert(FieldLocator::id("first_name", "fname"));
            assert_eq!(old.unwrap().selector_template, "firstName");
            assert_eq!(table.get("first_name").unwrap().by(), By::id("fname"));
            assert_eq!(table.len(), 5);
        }

        #[test]
        fn test_unknown_field() {
            let err = sample().get("nickname").unwrap_err();
            assert_eq!(err.field(), Some("nickname"));
        }

        #[test]
        fn test_choices_exclude_inputs() {
            let table = sample();
            assert_eq!(table.choices("gender"), vec!["female", "male"]);
            assert!(table.choices("hobbies").is_empty());
        }

        #[test]
        fn test_choices_need_backing_input() {
            let table = LocatorTable::new([
                FieldLocator::id("state", "state"),
                FieldLocator::xpath("state.value", "//div[@id='state']//div"),
                FieldLocator::css("subjects.tags", ".chip"),
                FieldLocator::css("plan.pro", "label[for='pro']"),
            ])
            .unwrap();
            assert!(table.choices("state").is_empty());
            assert!(table.choices("subjects").is_empty());
            assert!(table.choices("plan").is_empty());
        }

        #[test]
        fn test_choice_keys() {
            assert_eq!(choice_key("hobbies", "music"), "hobbies.music");
            assert_eq!(choice_input_key("hobbies", "music"), "hobbies.music.input");
        }

        #[test]
        fn test_yaml_roundtrip_keeps_entries() {
            let yaml = serde_yaml_ng::to_string(&sample()).unwrap();
            assert!(yaml.contains("first_name"));
            assert!(yaml.contains("css_selector"));
            let back: LocatorTable = serde_yaml_ng::from_str(&yaml).unwrap();
            assert_eq!(back, sample());
        }

        #[test]
        fn test_yaml_strategy_aliases() {
            let yaml = "state:\n  strategy: id\n  selector: state\noption:\n  strategy: xpath\n  selector: //div[text()={value}]\n";
            let table: LocatorTable = serde_yaml_ng::from_str(yaml).unwrap();
            assert_eq!(table.get("option").unwrap().strategy, Strategy::XPath);
            assert_eq!(table.len(), 2);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn xpath_literal_is_quoted(value in "[a-zA-Z0-9 '\"]{0,24}") {
                let lit = xpath_literal(&value);
                if value.contains('\'') && value.contains('"') {
                    prop_assert!(lit.starts_with("concat("));
                } else {
                    let quote = lit.chars().next().unwrap();
                    prop_assert!(quote == '\'' || quote == '"');
                    prop_assert!(lit.ends_with(quote));
                    prop_assert_eq!(&lit[1..lit.len() - 1], value.as_str());
                }
            }

            #[test]
            fn resolve_leaves_no_placeholder(value in "[a-zA-Z ]{0,16}") {
                let option = FieldLocator::xpath("dropdown_option", "//div[text()={value}]");
                let By::XPath(expr) = option.resolve(&value) else {
                    panic!("xpath strategy must resolve to xpath");
                };
                prop_assert!(!expr.contains(PLACEHOLDER));
            }
        }
    }
}
