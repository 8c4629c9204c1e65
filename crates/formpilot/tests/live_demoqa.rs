//! Live DemoQA scenarios.
//!
//! Need network access and a Chromium, local or at `FORMPILOT_ENDPOINT`:
//!
//! ```text
//! cargo test -p formpilot --features browser --test live_demoqa -- --ignored
//! ```
//!
//! Artifacts of every run land in `FORMPILOT_ARTIFACTS_DIR`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use formpilot::{
    fields, init_tracing, ChromiumDriver, DirectoryArtifactSink, Fixture, FormData, FormModel,
    FormResult, SessionConfig, TracingConfig, WaitOptions,
};
use futures::FutureExt;

async fn live<F>(name: &str, body: F)
where
    F: for<'a> FnOnce(FormModel<'a, ChromiumDriver>) -> futures::future::BoxFuture<'a, FormResult<()>>,
{
    let _ = init_tracing(&TracingConfig::new());
    let config = SessionConfig::from_env().unwrap();
    let mut sink = DirectoryArtifactSink::new(&config.artifacts_dir);
    let wait = WaitOptions::new().with_timeout(config.timeout_ms);
    let driver = ChromiumDriver::connect(&config).await.unwrap();
    Fixture::new(driver)
        .run(&mut sink, name, move |driver| {
            body(FormModel::demoqa(driver).with_wait(wait))
        })
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "needs a browser and network access"]
async fn fill_basic_fields() {
    live("fill_basic_fields", |form| {
        async move {
            form.open().await?;
            form.set_text(fields::FIRST_NAME, "John").await?;
            form.set_text(fields::LAST_NAME, "Doe").await?;
            form.set_text(fields::EMAIL, "john.doe@example.com").await?;
            form.select_single_choice(fields::GENDER, "male").await?;
            form.set_text(fields::MOBILE, "1234567890").await?;
            assert_eq!(form.text_value(fields::FIRST_NAME).await?, "John");
            assert_eq!(form.text_value(fields::LAST_NAME).await?, "Doe");
            assert_eq!(form.text_value(fields::EMAIL).await?, "john.doe@example.com");
            Ok(())
        }
        .boxed()
    })
    .await;
}

#[tokio::test]
#[ignore = "needs a browser and network access"]
async fn fill_complete_form() {
    live("fill_complete_form", |form| {
        async move {
            form.open().await?;
            let data = FormData::new()
                .with_first_name("Jane")
                .with_last_name("Smith")
                .with_email("jane.smith@test.com")
                .with_gender("female")
                .with_mobile("9876543210")
                .with_date_of_birth("15 Jan 1990")
                .with_subjects(["Maths", "Physics"])
                .with_hobbies(["reading", "music"])
                .with_current_address("123 Main Street, Apartment 4B")
                .with_state("NCR")
                .with_city("Delhi");
            form.fill_form(&data).await?;
            assert_eq!(form.text_value(fields::FIRST_NAME).await?, "Jane");
            assert_eq!(form.text_value(fields::EMAIL).await?, "jane.smith@test.com");
            assert_eq!(form.text_value(fields::MOBILE).await?, "9876543210");
            Ok(())
        }
        .boxed()
    })
    .await;
}

#[tokio::test]
#[ignore = "needs a browser and network access"]
async fn select_hobbies() {
    live("select_hobbies", |form| {
        async move {
            form.open().await?;
            form.select_multiple_choice(fields::HOBBIES, &["sports", "reading", "music"])
                .await?;
            for hobby in ["sports", "reading", "music"] {
                assert!(form.is_choice_selected(fields::HOBBIES, hobby).await?, "{hobby}");
            }
            Ok(())
        }
        .boxed()
    })
    .await;
}

#[tokio::test]
#[ignore = "needs a browser and network access"]
async fn fill_and_submit_form() {
    live("fill_and_submit_form", |form| {
        async move {
            form.open().await?;
            let data = FormData::new()
                .with_first_name("Test")
                .with_last_name("User")
                .with_email("test.user@example.com")
                .with_gender("male")
                .with_mobile("5555555555")
                .with_current_address("456 Test Avenue");
            form.fill_form(&data).await?;
            form.submit().await?;
            let status = form.confirmation_status().await;
            assert!(status.is_visible(), "{status:?}");
            Ok(())
        }
        .boxed()
    })
    .await;
}

#[tokio::test]
#[ignore = "needs a browser and network access"]
async fn state_and_city_selection() {
    live("state_and_city_selection", |form| {
        async move {
            form.open().await?;
            form.select_from_searchable_dropdown(fields::STATE, "Haryana")
                .await?;
            form.select_from_searchable_dropdown(fields::CITY, "Karnal")
                .await?;
            assert_eq!(form.selected_option(fields::STATE).await?, "Haryana");
            assert_eq!(form.selected_option(fields::CITY).await?, "Karnal");
            Ok(())
        }
        .boxed()
    })
    .await;
}
