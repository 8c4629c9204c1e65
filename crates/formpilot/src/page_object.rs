//! Page objects: where a form lives and how its fields are found.
//!
//! A [`FormPage`] bundles the form URL, the overlay elements to strip after
//! load, and the [`LocatorTable`]. The table encodes a third-party page's
//! DOM, so it can be loaded from YAML instead of the built-in
//! [`FormPage::demoqa`] defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::locator::{choice_input_key, choice_key, FieldLocator, LocatorTable};
use crate::result::{FormError, FormResult};

/// URL of the DemoQA practice form
pub const DEMOQA_URL: &str = "https://demoqa.com/automation-practice-form";

/// Default budget for the post-navigation settle wait (2 seconds)
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 2_000;

/// Field names the form model understands
pub mod fields {
    /// First name text field
    pub const FIRST_NAME: &str = "first_name";
    /// Last name text field
    pub const LAST_NAME: &str = "last_name";
    /// Email text field
    pub const EMAIL: &str = "email";
    /// Gender radio group
    pub const GENDER: &str = "gender";
    /// Mobile number text field
    pub const MOBILE: &str = "mobile";
    /// Date-of-birth picker input
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    /// Subjects tag input
    pub const SUBJECTS: &str = "subjects";
    /// Hobbies checkbox group
    pub const HOBBIES: &str = "hobbies";
    /// Current address text area
    pub const CURRENT_ADDRESS: &str = "current_address";
    /// State searchable dropdown
    pub const STATE: &str = "state";
    /// City searchable dropdown
    pub const CITY: &str = "city";
    /// Submit button
    pub const SUBMIT: &str = "submit";
    /// Post-submit confirmation surface
    pub const CONFIRMATION: &str = "confirmation";
    /// Option of any open searchable dropdown, templated on its text
    pub const DROPDOWN_OPTION: &str = "dropdown_option";

    /// Key of a dropdown's displayed single value
    #[must_use]
    pub fn value_of(field: &str) -> String {
        format!("{field}.value")
    }

    /// Key of a tag field's chip labels
    #[must_use]
    pub fn tags_of(field: &str) -> String {
        format!("{field}.tags")
    }
}

/// Trait for page objects
///
/// A page object knows where its page lives and how long the page may take
/// to become ready for interaction.
pub trait PageObject {
    /// URL of the page
    fn url_pattern(&self) -> &str;

    /// Budget in milliseconds for the page to settle after navigation
    fn load_timeout_ms(&self) -> u64 {
        DEFAULT_SETTLE_TIMEOUT_MS
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A form page: URL, obscuring overlays and locator table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPage {
    /// Fixed URL the form is served from
    pub url: String,
    /// CSS selectors of elements removed after load
    #[serde(default)]
    pub overlays: Vec<String>,
    /// Budget for the post-navigation settle wait
    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,
    /// Field locators
    pub locators: LocatorTable,
}

const fn default_settle_timeout_ms() -> u64 {
    DEFAULT_SETTLE_TIMEOUT_MS
}

impl FormPage {
    /// The DemoQA practice registration form
    #[must_use]
    pub fn demoqa() -> Self {
        let mut builder = FormPageBuilder::new()
            .with_url(DEMOQA_URL)
            .with_overlay("#fixedban")
            .with_overlay("footer")
            .with_locator(FieldLocator::id(fields::FIRST_NAME, "firstName"))
            .with_locator(FieldLocator::id(fields::LAST_NAME, "lastName"))
            .with_locator(FieldLocator::id(fields::EMAIL, "userEmail"))
            .with_locator(FieldLocator::id(fields::MOBILE, "userNumber"))
            .with_locator(FieldLocator::id(fields::DATE_OF_BIRTH, "dateOfBirthInput"))
            .with_locator(FieldLocator::id(fields::SUBJECTS, "subjectsInput"))
            .with_locator(FieldLocator::css(
                fields::tags_of(fields::SUBJECTS),
                ".subjects-auto-complete__multi-value__label",
            ))
            .with_locator(FieldLocator::id(fields::CURRENT_ADDRESS, "currentAddress"))
            .with_locator(FieldLocator::id(fields::STATE, "state"))
            .with_locator(FieldLocator::id(fields::CITY, "city"))
            .with_locator(FieldLocator::xpath(
                fields::DROPDOWN_OPTION,
                "//div[text()={value}]",
            ))
            .with_locator(FieldLocator::id(fields::SUBMIT, "submit"))
            .with_locator(FieldLocator::class_name(
                fields::CONFIRMATION,
                "modal-content",
            ));

        for dropdown in [fields::STATE, fields::CITY] {
            builder = builder.with_locator(FieldLocator::xpath(
                fields::value_of(dropdown),
                format!("//div[@id='{dropdown}']//div[contains(@class, 'singleValue')]"),
            ));
        }

        for (n, gender) in ["male", "female"].iter().enumerate() {
            builder = builder.with_choice(fields::GENDER, gender, &format!("gender-radio-{}", n + 1));
        }
        for (n, hobby) in ["sports", "reading", "music"].iter().enumerate() {
            builder =
                builder.with_choice(fields::HOBBIES, hobby, &format!("hobbies-checkbox-{}", n + 1));
        }

        builder.build()
    }

    /// Parse a page definition from YAML
    pub fn from_yaml(yaml: &str) -> FormResult<Self> {
        let page: Self = serde_yaml_ng::from_str(yaml)?;
        page.validate()?;
        Ok(page)
    }

    /// Load a page definition from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> FormResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serialize the page definition as YAML
    pub fn to_yaml(&self) -> FormResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check the definition is usable
    pub fn validate(&self) -> FormResult<()> {
        if self.url.trim().is_empty() {
            return Err(FormError::config("form page url must not be empty"));
        }
        if let Ok(option) = self.locators.get(fields::DROPDOWN_OPTION) {
            if !option.is_template() {
                return Err(FormError::config(format!(
                    "'{}' locator must contain the {} placeholder",
                    fields::DROPDOWN_OPTION,
                    crate::locator::PLACEHOLDER
                )));
            }
        }
        Ok(())
    }
}

impl PageObject for FormPage {
    fn url_pattern(&self) -> &str {
        &self.url
    }

    fn load_timeout_ms(&self) -> u64 {
        self.settle_timeout_ms
    }

    fn page_name(&self) -> &str {
        "FormPage"
    }
}

impl Default for FormPage {
    fn default() -> Self {
        Self::demoqa()
    }
}

/// Builder for form pages
#[derive(Debug, Clone)]
pub struct FormPageBuilder {
    url: String,
    overlays: Vec<String>,
    settle_timeout_ms: u64,
    locators: LocatorTable,
}

impl Default for FormPageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormPageBuilder {
    /// Create a new form page builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: String::new(),
            overlays: Vec::new(),
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            locators: LocatorTable::default(),
        }
    }

    /// Set the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Add an overlay to remove after load
    #[must_use]
    pub fn with_overlay(mut self, css: impl Into<String>) -> Self {
        self.overlays.push(css.into());
        self
    }

    /// Set the settle wait budget
    #[must_use]
    pub const fn with_settle_timeout(mut self, timeout_ms: u64) -> Self {
        self.settle_timeout_ms = timeout_ms;
        self
    }

    /// Add a locator, replacing one with the same field name
    #[must_use]
    pub fn with_locator(mut self, locator: FieldLocator) -> Self {
        let _ = self.locators.insert(locator);
        self
    }

    /// Add one value of a label-driven choice field whose input has `input_id`
    #[must_use]
    pub fn with_choice(self, field: &str, choice: &str, input_id: &str) -> Self {
        self.with_locator(FieldLocator::css(
            choice_key(field, choice),
            format!("label[for='{input_id}']"),
        ))
        .with_locator(FieldLocator::id(choice_input_key(field, choice), input_id))
    }

    /// Build the page
    #[must_use]
    pub fn build(self) -> FormPage {
        FormPage {
            url: self.url,
            overlays: self.overlays,
            settle_timeout_ms: self.settle_timeout_ms,
            locators: self.locators,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::{By, Strategy};

    mod demoqa_tests {
        use super::*;

        #[test]
        fn test_demoqa_field_ids() {
            let page = FormPage::demoqa();
            let ids = [
                (fields::FIRST_NAME, "firstName"),
                (fields::LAST_NAME, "lastName"),
                (fields::EMAIL, "userEmail"),
                (fields::MOBILE, "userNumber"),
                (fields::DATE_OF_BIRTH, "dateOfBirthInput"),
                (fields::SUBJECTS, "subjectsInput"),
                (fields::CURRENT_ADDRESS, "currentAddress"),
                (fields::STATE, "state"),
                (fields::CITY, "city"),
                (fields::SUBMIT, "submit"),
            ];
            for (field, id) in ids {
                assert_eq!(page.locators.get(field).unwrap().by(), By::id(id), "{field}");
            }
        }

        #[test]
        fn test_demoqa_vocabularies() {
            let page = FormPage::demoqa();
            assert_eq!(page.locators.choices(fields::GENDER), vec!["female", "male"]);
            assert_eq!(
                page.locators.choices(fields::HOBBIES),
                vec!["music", "reading", "sports"]
            );
        }

        #[test]
        fn test_demoqa_choice_labels() {
            let page = FormPage::demoqa();
            assert_eq!(
                page.locators.get("gender.female").unwrap().by(),
                By::css("label[for='gender-radio-2']")
            );
            assert_eq!(
                page.locators.get("hobbies.music.input").unwrap().by(),
                By::id("hobbies-checkbox-3")
            );
        }

        #[test]
        fn test_demoqa_confirmation_and_overlays() {
            let page = FormPage::demoqa();
            let confirmation = page.locators.get(fields::CONFIRMATION).unwrap();
            assert_eq!(confirmation.strategy, Strategy::ClassName);
            assert_eq!(page.overlays, vec!["#fixedban", "footer"]);
            assert_eq!(page.url, DEMOQA_URL);
            assert!(page.validate().is_ok());
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_yaml_roundtrip() {
            let page = FormPage::demoqa();
            let yaml = page.to_yaml().unwrap();
            assert_eq!(FormPage::from_yaml(&yaml).unwrap(), page);
        }

        #[test]
        fn test_yaml_defaults() {
            let yaml = "url: http://localhost:8080/form\nlocators:\n  first_name:\n    strategy: id\n    selector: fname\n";
            let page = FormPage::from_yaml(yaml).unwrap();
            assert!(page.overlays.is_empty());
            assert_eq!(page.settle_timeout_ms, DEFAULT_SETTLE_TIMEOUT_MS);
            assert_eq!(page.locators.len(), 1);
        }

        #[test]
        fn test_yaml_rejects_untemplated_option() {
            let yaml = "url: http://localhost/\nlocators:\n  dropdown_option:\n    strategy: xpath\n    selector: //div\n";
            let err = FormPage::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, FormError::Config { .. }));
        }

        #[test]
        fn test_yaml_rejects_empty_url() {
            let yaml = "url: ''\nlocators: {}\n";
            assert!(FormPage::from_yaml(yaml).is_err());
        }

        #[test]
        fn test_from_yaml_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("page.yaml");
            std::fs::write(&path, FormPage::demoqa().to_yaml().unwrap()).unwrap();
            let page = FormPage::from_yaml_file(&path).unwrap();
            assert!(page.locators.contains(fields::CONFIRMATION));
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_builder_basic() {
            let page = FormPageBuilder::new()
                .with_url("/register")
                .with_settle_timeout(50)
                .with_choice("plan", "pro", "plan-2")
                .build();
            assert_eq!(page.url, "/register");
            assert_eq!(page.settle_timeout_ms, 50);
            assert_eq!(page.locators.choices("plan"), vec!["pro"]);
        }

        #[test]
        fn test_page_object_impl() {
            let page = FormPageBuilder::new()
                .with_url("/signup")
                .with_settle_timeout(750)
                .build();
            assert_eq!(page.url_pattern(), "/signup");
            assert_eq!(page.load_timeout_ms(), 750);
            assert_eq!(page.page_name(), "FormPage");
        }

        #[test]
        fn test_default_is_demoqa() {
            assert_eq!(FormPage::default(), FormPage::demoqa());
        }
    }
}
