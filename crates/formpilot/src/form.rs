//! FormModel - declarative form interaction
//!
//! Translates a logical field name and value into the UI actions that set
//! the field on the page: locate through the [`LocatorTable`], wait for the
//! element to become visible (and enabled, when typing or clicking), then
//! clear, type, click or commit.
//!
//! Every located element goes through the same bounded wait. Actions are
//! attempted exactly once and failures propagate unchanged, except in
//! [`FormModel::confirmation_status`], which reports them as a value.
//!
//! [`LocatorTable`]: crate::LocatorTable

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::driver::{FormDriver, Key};
use crate::locator::{choice_input_key, choice_key, By};
use crate::page_object::{fields, FormPage, PageObject};
use crate::result::{FormError, FormResult};
use crate::script;
use crate::wait::{wait_until, WaitOptions, Waiter};

/// Gender chosen by [`FormModel::fill_form`] when none is given
pub const DEFAULT_GENDER: &str = "male";

// =============================================================================
// FORM DATA
// =============================================================================

/// Values for one fill of the practice form.
///
/// Absent text fields are filled with `""`; absent gender falls back to
/// [`DEFAULT_GENDER`]; every other absent field is left untouched.
/// Unknown keys are ignored when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormData {
    /// First name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Gender choice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Mobile number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    /// Date of birth, e.g. `15 Jan 1990`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Subjects, tagged in order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
    /// Hobbies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hobbies: Option<Vec<String>>,
    /// Current address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_address: Option<String>,
    /// State dropdown option
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// City dropdown option
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl FormData {
    /// Create empty form data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse form data from YAML
    pub fn from_yaml(yaml: &str) -> FormResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Parse form data from JSON
    pub fn from_json(json: &str) -> FormResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set first name
    #[must_use]
    pub fn with_first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    /// Set last name
    #[must_use]
    pub fn with_last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    /// Set email
    #[must_use]
    pub fn with_email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Set gender
    #[must_use]
    pub fn with_gender(mut self, value: impl Into<String>) -> Self {
        self.gender = Some(value.into());
        self
    }

    /// Set mobile number
    #[must_use]
    pub fn with_mobile(mut self, value: impl Into<String>) -> Self {
        self.mobile = Some(value.into());
        self
    }

    /// Set date of birth
    #[must_use]
    pub fn with_date_of_birth(mut self, value: impl Into<String>) -> Self {
        self.date_of_birth = Some(value.into());
        self
    }

    /// Set subjects
    #[must_use]
    pub fn with_subjects<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set hobbies
    #[must_use]
    pub fn with_hobbies<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hobbies = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set current address
    #[must_use]
    pub fn with_current_address(mut self, value: impl Into<String>) -> Self {
        self.current_address = Some(value.into());
        self
    }

    /// Set state
    #[must_use]
    pub fn with_state(mut self, value: impl Into<String>) -> Self {
        self.state = Some(value.into());
        self
    }

    /// Set city
    #[must_use]
    pub fn with_city(mut self, value: impl Into<String>) -> Self {
        self.city = Some(value.into());
        self
    }
}

// =============================================================================
// CONFIRMATION
// =============================================================================

/// Whether the post-submit confirmation appeared
#[derive(Debug)]
pub enum ConfirmationStatus {
    /// Confirmation became visible within the budget
    Visible,
    /// Nothing visible before the budget elapsed
    TimedOut,
    /// The check itself failed
    Error(FormError),
}

impl ConfirmationStatus {
    /// Check if the confirmation is visible
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Visible)
    }

    /// Check if the wait ran out
    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    /// Failure that ended the check, if any
    #[must_use]
    pub const fn error(&self) -> Option<&FormError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// How a multi-choice selection treats already-checked values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// Click every value once; checked values are unchecked again
    #[default]
    Toggle,
    /// Click only values that are not checked yet
    Ensure,
}

// =============================================================================
// FORM MODEL
// =============================================================================

/// Field-level operations on one open form page
#[derive(Debug)]
pub struct FormModel<'d, D: FormDriver> {
    driver: &'d D,
    page: FormPage,
    waiter: Waiter,
}

impl<'d, D: FormDriver> FormModel<'d, D> {
    /// Create a model for `page` driven by `driver`
    #[must_use]
    pub fn new(driver: &'d D, page: FormPage) -> Self {
        Self {
            driver,
            page,
            waiter: Waiter::new(),
        }
    }

    /// Create a model for the DemoQA practice form
    #[must_use]
    pub fn demoqa(driver: &'d D) -> Self {
        Self::new(driver, FormPage::demoqa())
    }

    /// Set the wait budget used for every located element
    #[must_use]
    pub const fn with_wait(mut self, options: WaitOptions) -> Self {
        self.waiter = Waiter::with_options(options);
        self
    }

    /// Page definition
    #[must_use]
    pub const fn page(&self) -> &FormPage {
        &self.page
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &'d D {
        self.driver
    }

    /// Wait budget in milliseconds
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.waiter.options().timeout_ms
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Navigate to the form and strip the overlays that intercept clicks.
    ///
    /// After navigation the page gets `settle_timeout_ms` to finish loading
    /// and render its overlays; a page that does not settle in time is not
    /// an error. Overlays that are already gone are skipped.
    ///
    /// # Errors
    ///
    /// [`FormError::NavigationFailure`] when the page cannot be loaded.
    pub async fn open(&self) -> FormResult<()> {
        let url = self.page.url_pattern();
        info!(page = self.page.page_name(), url, "Opening form");
        self.driver
            .navigate(url)
            .await
            .map_err(|e| match e {
                FormError::NavigationFailure { .. } => e,
                other => FormError::NavigationFailure {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })?;
        self.settle().await?;
        self.remove_overlays().await
    }

    async fn settle(&self) -> FormResult<()> {
        let driver = self.driver;
        let overlays = &self.page.overlays;
        let settled = wait_until("page to settle", self.page.load_timeout_ms(), move || async move {
            let state = driver.execute_script(script::READY_STATE).await?;
            if state.as_str() != Some("complete") {
                return Ok(false);
            }
            for css in overlays {
                let count = driver.execute_script(&script::count_elements(css)).await?;
                if count.as_u64().unwrap_or(0) == 0 {
                    return Ok(false);
                }
            }
            Ok(true)
        })
        .await;
        match settled {
            Err(FormError::Timeout { ms, .. }) => {
                debug!(ms, "Page did not settle, continuing");
                Ok(())
            }
            other => other,
        }
    }

    async fn remove_overlays(&self) -> FormResult<()> {
        for css in &self.page.overlays {
            debug!(overlay = %css, "Removing overlay");
            let _ = self
                .driver
                .execute_script(&script::remove_elements(css))
                .await?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Field setters
    // -------------------------------------------------------------------------

    /// Replace the content of a text field with `value`.
    ///
    /// An empty `value` leaves the field cleared.
    ///
    /// # Errors
    ///
    /// [`FormError::ElementNotInteractable`] when the field is not visible and
    /// enabled within the budget.
    pub async fn set_text(&self, field: &str, value: &str) -> FormResult<()> {
        info!(field, "Setting text");
        let by = self.page.locators.get(field)?.by();
        let element = self.interactable(field, &by).await?;
        self.driver.clear(&element).await?;
        if !value.is_empty() {
            debug!(field, %by, "Typing");
            self.driver.send_keys(&element, value).await?;
        }
        Ok(())
    }

    /// Click the label of one value of an exclusive-choice field.
    ///
    /// `choice` is matched case-insensitively, ignoring surrounding
    /// whitespace.
    ///
    /// # Errors
    ///
    /// [`FormError::InvalidChoice`] before any UI action when `choice` is not
    /// a registered value of `field`.
    pub async fn select_single_choice(&self, field: &str, choice: &str) -> FormResult<()> {
        info!(field, choice, "Selecting single choice");
        let choice = self.resolve_choice(field, choice)?;
        self.click_choice(field, &choice).await
    }

    /// Type a date into a picker field and commit it with Enter.
    ///
    /// The text is sent as given; the picker decides what it accepts.
    pub async fn set_date(&self, field: &str, value: &str) -> FormResult<()> {
        info!(field, value, "Setting date");
        let by = self.page.locators.get(field)?.by();
        let element = self.interactable(field, &by).await?;
        self.driver.click(&element).await?;
        self.driver.select_all(&element).await?;
        self.driver.send_keys(&element, value).await?;
        self.driver.press_key(&element, Key::Enter).await
    }

    /// Turn each value into a tag, in order. Values are not deduplicated.
    pub async fn add_tagged_values<S: AsRef<str>>(&self, field: &str, values: &[S]) -> FormResult<()> {
        info!(field, count = values.len(), "Adding tags");
        let by = self.page.locators.get(field)?.by();
        for value in values {
            let value = value.as_ref();
            let element = self.interactable(field, &by).await?;
            debug!(field, value, "Committing tag");
            self.driver.send_keys(&element, value).await?;
            self.driver.press_key(&element, Key::Enter).await?;
        }
        Ok(())
    }

    /// Click the label of each value once.
    ///
    /// A value that is already checked gets unchecked; use
    /// [`Self::ensure_multiple_choice`] to only check. Processing stops at the
    /// first unknown value, leaving earlier clicks in place.
    ///
    /// # Errors
    ///
    /// [`FormError::InvalidChoice`] for the first value that is not a
    /// registered value of `field`.
    pub async fn select_multiple_choice<S: AsRef<str>>(
        &self,
        field: &str,
        values: &[S],
    ) -> FormResult<()> {
        self.select_choices(field, values, CheckMode::Toggle).await
    }

    /// Make sure each value ends up checked, clicking only unchecked ones
    pub async fn ensure_multiple_choice<S: AsRef<str>>(
        &self,
        field: &str,
        values: &[S],
    ) -> FormResult<()> {
        self.select_choices(field, values, CheckMode::Ensure).await
    }

    /// Select values of a multi-choice field with explicit [`CheckMode`]
    pub async fn select_choices<S: AsRef<str>>(
        &self,
        field: &str,
        values: &[S],
        mode: CheckMode,
    ) -> FormResult<()> {
        info!(field, count = values.len(), ?mode, "Selecting choices");
        for value in values {
            let choice = self.resolve_choice(field, value.as_ref())?;
            if mode == CheckMode::Ensure && self.choice_checked(field, &choice).await? {
                debug!(field, choice = %choice, "Already checked");
                continue;
            }
            self.click_choice(field, &choice).await?;
        }
        Ok(())
    }

    /// Open a searchable dropdown and click the option showing `option`.
    ///
    /// # Errors
    ///
    /// [`FormError::OptionNotFound`] when no option with exactly that text
    /// becomes clickable within the budget.
    pub async fn select_from_searchable_dropdown(&self, field: &str, option: &str) -> FormResult<()> {
        info!(field, option, "Selecting dropdown option");
        let control = self.page.locators.get(field)?.by();
        let element = self.interactable(field, &control).await?;
        self.driver.click(&element).await?;

        let by = self.page.locators.get(fields::DROPDOWN_OPTION)?.resolve(option);
        let element = self
            .wait_for(&by, true)
            .await
            .map_err(|e| match e {
                FormError::Timeout { ms, .. } => FormError::OptionNotFound {
                    field: field.to_string(),
                    option: option.to_string(),
                    ms,
                },
                other => other,
            })?;
        debug!(field, %by, "Clicking option");
        self.driver.click(&element).await
    }

    /// Scroll the submit control into view and click it.
    ///
    /// Whether the submission was accepted is checked separately with
    /// [`Self::confirmation_status`].
    pub async fn submit(&self) -> FormResult<()> {
        info!("Submitting form");
        let by = self.page.locators.get(fields::SUBMIT)?.by();
        let element = self.interactable(fields::SUBMIT, &by).await?;
        self.driver.scroll_into_view(&element).await?;
        self.driver.click(&element).await
    }

    /// Fill every field of the practice form from `data`.
    ///
    /// Fields are set in page order, which state then city depends on:
    /// first name, last name, email, gender, mobile, date of birth,
    /// subjects, hobbies, current address, state, city.
    pub async fn fill_form(&self, data: &FormData) -> FormResult<()> {
        info!("Filling form");
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        self.set_text(fields::FIRST_NAME, &text(&data.first_name)).await?;
        self.set_text(fields::LAST_NAME, &text(&data.last_name)).await?;
        self.set_text(fields::EMAIL, &text(&data.email)).await?;
        self.select_single_choice(
            fields::GENDER,
            data.gender.as_deref().unwrap_or(DEFAULT_GENDER),
        )
        .await?;
        self.set_text(fields::MOBILE, &text(&data.mobile)).await?;
        if let Some(ref date) = data.date_of_birth {
            self.set_date(fields::DATE_OF_BIRTH, date).await?;
        }
        if let Some(ref subjects) = data.subjects {
            self.add_tagged_values(fields::SUBJECTS, subjects.as_slice())
                .await?;
        }
        if let Some(ref hobbies) = data.hobbies {
            self.select_multiple_choice(fields::HOBBIES, hobbies.as_slice())
                .await?;
        }
        self.set_text(fields::CURRENT_ADDRESS, &text(&data.current_address))
            .await?;
        if let Some(ref state) = data.state {
            self.select_from_searchable_dropdown(fields::STATE, state)
                .await?;
        }
        if let Some(ref city) = data.city {
            self.select_from_searchable_dropdown(fields::CITY, city).await?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Confirmation
    // -------------------------------------------------------------------------

    /// Whether the confirmation surface becomes visible within the budget
    pub async fn is_confirmation_visible(&self) -> bool {
        self.confirmation_status().await.is_visible()
    }

    /// Wait for the confirmation surface, reporting why it did not appear
    pub async fn confirmation_status(&self) -> ConfirmationStatus {
        let by = match self.page.locators.get(fields::CONFIRMATION) {
            Ok(locator) => locator.by(),
            Err(e) => return ConfirmationStatus::Error(e),
        };
        match self.wait_for(&by, false).await {
            Ok(_) => {
                info!("Confirmation visible");
                ConfirmationStatus::Visible
            }
            Err(FormError::Timeout { ms, .. }) => {
                info!(ms, "Confirmation not visible");
                ConfirmationStatus::TimedOut
            }
            Err(e) => {
                warn!(error = %e, "Confirmation check failed");
                ConfirmationStatus::Error(e)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Read-back
    // -------------------------------------------------------------------------

    /// Current value of a text field
    pub async fn text_value(&self, field: &str) -> FormResult<String> {
        let by = self.page.locators.get(field)?.by();
        let element = self.wait_present(&by).await?;
        self.driver.value(&element).await
    }

    /// Whether one value of a choice field is checked
    pub async fn is_choice_selected(&self, field: &str, choice: &str) -> FormResult<bool> {
        let choice = self.resolve_choice(field, choice)?;
        self.choice_checked(field, &choice).await
    }

    /// Value a searchable dropdown displays
    pub async fn selected_option(&self, field: &str) -> FormResult<String> {
        let by = self.page.locators.get(&fields::value_of(field))?.by();
        let element = self.wait_present(&by).await?;
        self.driver.text(&element).await
    }

    /// Labels of the tags of a tag field, in order
    pub async fn tags(&self, field: &str) -> FormResult<Vec<String>> {
        let by = self.page.locators.get(&fields::tags_of(field))?.by();
        let mut labels = Vec::new();
        for element in self.driver.find_elements(&by).await? {
            labels.push(self.driver.text(&element).await?);
        }
        Ok(labels)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn resolve_choice(&self, field: &str, choice: &str) -> FormResult<String> {
        let vocabulary = self.page.locators.choices(field);
        if vocabulary.is_empty() {
            return Err(FormError::UnknownField {
                field: field.to_string(),
            });
        }
        let normalized = choice.trim().to_lowercase();
        if vocabulary.contains(&normalized.as_str()) {
            Ok(normalized)
        } else {
            Err(FormError::InvalidChoice {
                field: field.to_string(),
                value: choice.to_string(),
            })
        }
    }

    async fn click_choice(&self, field: &str, choice: &str) -> FormResult<()> {
        let by = self.page.locators.get(&choice_key(field, choice))?.by();
        let element = self.interactable(field, &by).await?;
        debug!(field, choice, %by, "Clicking label");
        self.driver.click(&element).await
    }

    async fn choice_checked(&self, field: &str, choice: &str) -> FormResult<bool> {
        let by = self
            .page
            .locators
            .get(&choice_input_key(field, choice))?
            .by();
        let element = self.wait_present(&by).await?;
        self.driver.is_selected(&element).await
    }

    /// Visible and enabled element for an action on `field`
    async fn interactable(&self, field: &str, by: &By) -> FormResult<D::Element> {
        self.wait_for(by, true).await.map_err(|e| match e {
            FormError::Timeout { ms, .. } => FormError::ElementNotInteractable {
                field: field.to_string(),
                message: format!("{by} not visible and enabled within {ms}ms"),
            },
            other => other,
        })
    }

    /// Poll until `by` matches a displayed element, enabled too if asked
    async fn wait_for(&self, by: &By, enabled: bool) -> FormResult<D::Element> {
        let driver = self.driver;
        let waited_for = format!("{by} to be visible");
        let found = self
            .waiter
            .until(&waited_for, move || async move {
                let element = driver.find_element(by).await?;
                if !driver.is_displayed(&element).await? {
                    return Ok(None);
                }
                if enabled && !driver.is_enabled(&element).await? {
                    return Ok(None);
                }
                Ok(Some(element))
            })
            .await?;
        debug!(
            %by,
            attempts = found.attempts,
            elapsed_ms = found.elapsed.as_millis() as u64,
            "Located"
        );
        Ok(found.value)
    }

    /// Poll until `by` matches any element, visible or not
    async fn wait_present(&self, by: &By) -> FormResult<D::Element> {
        let driver = self.driver;
        let found = self
            .waiter
            .until(&format!("{by} to exist"), move || async move {
                driver.find_element(by).await.map(Some)
            })
            .await?;
        Ok(found.value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use crate::page_object::FormPageBuilder;

    fn quick() -> WaitOptions {
        WaitOptions::new().with_timeout(150).with_poll_interval(5)
    }

    async fn opened(driver: &MockDriver) -> FormModel<'_, MockDriver> {
        let form = FormModel::demoqa(driver).with_wait(quick());
        form.open().await.unwrap();
        form
    }

    mod form_data_tests {
        use super::*;

        #[test]
        fn test_yaml_ignores_unknown_keys() {
            let data = FormData::from_yaml("first_name: Jane\nnickname: JJ\nhobbies: [music]\n").unwrap();
            assert_eq!(data.first_name.as_deref(), Some("Jane"));
            assert_eq!(data.hobbies, Some(vec!["music".to_string()]));
            assert!(data.city.is_none());
        }

        #[test]
        fn test_builder_and_json() {
            let data = FormData::new().with_state("NCR").with_subjects(["Maths"]);
            let json = serde_json::to_string(&data).unwrap();
            assert_eq!(json, r#"{"subjects":["Maths"],"state":"NCR"}"#);
            assert_eq!(FormData::from_json(&json).unwrap(), data);
        }
    }

    mod open_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_removes_overlays() {
            let driver = MockDriver::new();
            let _form = opened(&driver).await;
            assert!(!driver.has_overlays());
            assert!(driver.was_called("navigate:https://demoqa.com"));
        }

        #[tokio::test]
        async fn test_open_twice_is_harmless() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            form.remove_overlays().await.unwrap();
            assert!(!driver.has_overlays());
        }

        #[tokio::test]
        async fn test_open_navigation_failure() {
            let driver = MockDriver::new().with_navigation_error("net::ERR_NAME_NOT_RESOLVED");
            let form = FormModel::demoqa(&driver);
            let err = form.open().await.unwrap_err();
            assert_eq!(err.kind(), Some(crate::ErrorKind::NavigationFailure));
        }

        #[tokio::test]
        async fn test_settle_timeout_is_not_an_error() {
            let driver = MockDriver::new();
            let page = FormPageBuilder::new()
                .with_url("https://demoqa.com/automation-practice-form")
                .with_overlay("#never-rendered")
                .with_settle_timeout(30)
                .build();
            let form = FormModel::new(&driver, page);
            assert!(form.open().await.is_ok());
        }
    }

    mod field_tests {
        use super::*;

        #[tokio::test]
        async fn test_set_text_replaces_value() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            form.set_text(fields::FIRST_NAME, "Jane").await.unwrap();
            form.set_text(fields::FIRST_NAME, "John").await.unwrap();
            assert_eq!(form.text_value(fields::FIRST_NAME).await.unwrap(), "John");
            form.set_text(fields::FIRST_NAME, "").await.unwrap();
            assert_eq!(form.text_value(fields::FIRST_NAME).await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_set_text_disabled_field() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            assert!(driver.disable("lastName"));
            let err = form.set_text(fields::LAST_NAME, "Smith").await.unwrap_err();
            assert_eq!(err.kind(), Some(crate::ErrorKind::ElementNotInteractable));
            assert_eq!(err.field(), Some(fields::LAST_NAME));
        }

        #[tokio::test]
        async fn test_unknown_field() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            let err = form.set_text("nickname", "JJ").await.unwrap_err();
            assert!(matches!(err, FormError::UnknownField { .. }));
        }

        #[tokio::test]
        async fn test_invalid_choice_performs_no_action() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            let clicks = driver.history().iter().filter(|c| c.starts_with("click")).count();
            let err = form.select_single_choice(fields::GENDER, "other").await.unwrap_err();
            assert!(matches!(err, FormError::InvalidChoice { ref value, .. } if value == "other"));
            let after = driver.history().iter().filter(|c| c.starts_with("click")).count();
            assert_eq!(clicks, after);
        }

        #[tokio::test]
        async fn test_read_back_keys_are_not_choices() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            let clicks = driver.history().iter().filter(|c| c.starts_with("click")).count();
            for (field, value) in [(fields::SUBJECTS, "tags"), (fields::STATE, "value")] {
                let err = form.select_single_choice(field, value).await.unwrap_err();
                assert!(matches!(err, FormError::UnknownField { .. }), "{field}: {err:?}");
                assert!(form.is_choice_selected(field, value).await.is_err());
            }
            let err = form
                .select_multiple_choice(fields::HOBBIES, &["input"])
                .await
                .unwrap_err();
            assert!(matches!(err, FormError::InvalidChoice { .. }));
            let after = driver.history().iter().filter(|c| c.starts_with("click")).count();
            assert_eq!(clicks, after);
        }

        #[tokio::test]
        async fn test_set_date_commits() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            form.set_date(fields::DATE_OF_BIRTH, "15 Jan 1990").await.unwrap();
            assert_eq!(form.text_value(fields::DATE_OF_BIRTH).await.unwrap(), "15 Jan 1990");
            assert!(driver.was_called("press_key:#dateOfBirthInput:Enter"));
        }

        #[tokio::test]
        async fn test_ensure_multiple_choice_is_idempotent() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            form.ensure_multiple_choice(fields::HOBBIES, &["sports"]).await.unwrap();
            form.ensure_multiple_choice(fields::HOBBIES, &["sports", "music"])
                .await
                .unwrap();
            assert!(form.is_choice_selected(fields::HOBBIES, "sports").await.unwrap());
            assert!(form.is_choice_selected(fields::HOBBIES, "music").await.unwrap());
            assert!(!form.is_choice_selected(fields::HOBBIES, "reading").await.unwrap());
        }

        #[tokio::test]
        async fn test_multiple_choice_stops_at_first_invalid() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            let err = form
                .select_multiple_choice(fields::HOBBIES, &["sports", "chess", "music"])
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Some(crate::ErrorKind::InvalidChoice));
            assert!(driver.is_checked("hobbies-checkbox-1"));
            assert!(!driver.is_checked("hobbies-checkbox-3"));
        }

        #[tokio::test]
        async fn test_dropdown_waits_for_late_options() {
            let driver = MockDriver::new().with_option_delay(3);
            let form = opened(&driver).await;
            form.select_from_searchable_dropdown(fields::STATE, "Uttar Pradesh")
                .await
                .unwrap();
            assert_eq!(form.selected_option(fields::STATE).await.unwrap(), "Uttar Pradesh");
        }
    }

    mod confirmation_tests {
        use super::*;

        #[tokio::test]
        async fn test_timed_out_without_submit() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            let status = form.confirmation_status().await;
            assert!(status.is_timed_out());
            assert!(status.error().is_none());
            assert!(!form.is_confirmation_visible().await);
        }

        #[tokio::test]
        async fn test_error_after_session_closed() {
            let driver = MockDriver::new();
            let form = opened(&driver).await;
            driver.quit().await.unwrap();
            let status = form.confirmation_status().await;
            assert!(matches!(status.error(), Some(FormError::Driver { .. })));
            assert!(!status.is_visible());
        }

        #[tokio::test]
        async fn test_missing_confirmation_locator() {
            let driver = MockDriver::new();
            let page = FormPageBuilder::new().with_url("about:blank").build();
            let form = FormModel::new(&driver, page).with_wait(quick());
            let status = form.confirmation_status().await;
            assert!(matches!(status, ConfirmationStatus::Error(FormError::UnknownField { .. })));
        }
    }
}
