//! Registration wizard driven through the portal's HTTP surface.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use qrvotify_core::registration::StepGate;
use qrvotify_integration_tests::{MultipartBody, TestPortal};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const REGISTER_PATH: &str = "/api/voters/register";

fn personal_details() -> MultipartBody {
    MultipartBody::new()
        .text("fullName", "Asha Verma")
        .text("dob", "1990-05-15")
        .text("gender", "Female")
        .text("fatherHusbandName", "Ravi Verma")
}

fn address_and_documents() -> MultipartBody {
    MultipartBody::new()
        .text("voterId", "ABC1234567")
        .text("houseNo", "12")
        .text("street", "MG Road")
        .text("city", "Pune")
        .text("state", "Maharashtra")
        .text("pinCode", "411001")
        .file("documents.voterIdCard", "voter.png", "image/png", b"\x89PNG voter")
        .file("documents.aadharCard", "aadhar.pdf", "application/pdf", b"%PDF aadhar")
}

fn contact_and_security(password: &str, confirm: &str) -> MultipartBody {
    MultipartBody::new()
        .text("password", password)
        .text("confirmPassword", confirm)
        .text("email", "asha@example.in")
        .text("mobile", "9876543210")
}

/// Walk the wizard to step 3 with valid step 1 and step 2 inputs.
async fn fill_first_two_steps(portal: &mut TestPortal) {
    let response = portal
        .post_multipart("/create-user", personal_details().action("next"))
        .await;
    assert_eq!(response.redirect_target(), "/create-user");

    let response = portal
        .post_multipart("/create-user", address_and_documents().action("next"))
        .await;
    assert_eq!(response.redirect_target(), "/create-user");

    let page = portal.get("/create-user").await;
    assert!(page.body.contains("Step 3 of 3"), "{}", page.body);
}

#[tokio::test]
async fn test_wizard_starts_on_personal_details() {
    let mut portal = TestPortal::start().await;

    let page = portal.get("/create-user").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Step 1 of 3"));
    assert!(page.body.contains("name=\"fullName\""));
    assert!(!page.body.contains("value=\"back\""));
    // Nothing typed yet, nothing flagged yet.
    assert!(!page.body.contains("Full Name is required"));
}

#[tokio::test]
async fn test_next_advances_without_valid_input_when_ungated() {
    let mut portal = TestPortal::start().await;

    let response = portal
        .post_multipart("/create-user", MultipartBody::new().action("next"))
        .await;
    assert_eq!(response.redirect_target(), "/create-user");

    let page = portal.get("/create-user").await;
    assert!(page.body.contains("Step 2 of 3"));
}

#[tokio::test]
async fn test_back_on_first_step_stays_put() {
    let mut portal = TestPortal::start().await;

    portal
        .post_multipart("/create-user", personal_details().action("back"))
        .await;

    let page = portal.get("/create-user").await;
    assert!(page.body.contains("Step 1 of 3"));
    assert!(page.body.contains("value=\"Asha Verma\""));
}

#[tokio::test]
async fn test_back_keeps_entered_values() {
    let mut portal = TestPortal::start().await;
    fill_first_two_steps(&mut portal).await;

    portal
        .post_multipart("/create-user", MultipartBody::new().action("back"))
        .await;
    let page = portal.get("/create-user").await;
    assert!(page.body.contains("Step 2 of 3"));
    assert!(page.body.contains("value=\"ABC1234567\""));
    assert!(page.body.contains("Uploaded: voter.png"));
    assert!(page.body.contains("Uploaded: aadhar.pdf"));
}

#[tokio::test]
async fn test_block_gate_refuses_next_with_errors() {
    let mut portal = TestPortal::start_with(StepGate::BlockOnErrors, |_| {}).await;

    let response = portal
        .post_multipart(
            "/create-user",
            MultipartBody::new().text("dob", "1990-05-15").action("next"),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Step 1 of 3"));
    assert!(response.body.contains("Please correct the highlighted fields"));
    assert!(response.body.contains("Full Name is required"));

    // Errors on later steps do not hold back step 1.
    let response = portal
        .post_multipart("/create-user", personal_details().action("next"))
        .await;
    assert_eq!(response.redirect_target(), "/create-user");
    let page = portal.get("/create-user").await;
    assert!(page.body.contains("Step 2 of 3"));
}

#[tokio::test]
async fn test_password_mismatch_blocks_submit() {
    let mut portal = TestPortal::start().await;
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&portal.api)
        .await;

    fill_first_two_steps(&mut portal).await;
    let response = portal
        .post_multipart(
            "/create-user",
            contact_and_security("correct horse", "correct h0rse").action("submit"),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Passwords do not match"));
    assert!(response.body.contains("Please correct the highlighted fields before submitting."));
    assert!(!response.body.contains("Submitting..."));
}

#[tokio::test]
async fn test_submit_before_final_step_is_refused() {
    let mut portal = TestPortal::start().await;

    let response = portal
        .post_multipart("/create-user", personal_details().action("submit"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("Complete every step before submitting."));
}

#[tokio::test]
async fn test_full_registration_disables_submit_in_flight_and_discards_draft() {
    let mut portal = TestPortal::start().await;
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&portal.api)
        .await;

    fill_first_two_steps(&mut portal).await;

    let mut tab = portal.new_tab();
    let submit = tokio::spawn(async move {
        tab.post_multipart(
            "/create-user",
            contact_and_security("correct horse", "correct horse").action("submit"),
        )
        .await
    });

    // While the voter API is still working the page shows a disabled button.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let page = portal.get("/create-user").await;
    assert!(page.body.contains("Submitting..."), "{}", page.body);
    assert!(page.body.contains("data-submit disabled"));

    let response = submit.await.unwrap();
    assert_eq!(response.redirect_target(), "/?registered=1");

    let home = portal.get("/?registered=1").await;
    assert!(home.body.contains("Registration submitted."));

    // The draft is gone: a new wizard starts empty on step 1.
    let page = portal.get("/create-user").await;
    assert!(page.body.contains("Step 1 of 3"));
    assert!(!page.body.contains("Asha Verma"));

    let requests = portal.api.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests.first().unwrap().body);
    assert!(body.contains("name=\"fullName\""));
    assert!(body.contains("Asha Verma"));
    assert!(body.contains("filename=\"aadhar.pdf\""));
    assert!(body.contains("name=\"age\""));
}

#[tokio::test]
async fn test_failed_submit_reenables_button_and_allows_retry() {
    let mut portal = TestPortal::start().await;
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .up_to_n_times(1)
        .mount(&portal.api)
        .await;
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(ResponseTemplate::new(201))
        .mount(&portal.api)
        .await;

    fill_first_two_steps(&mut portal).await;

    let response = portal
        .post_multipart(
            "/create-user",
            contact_and_security("correct horse", "correct horse").action("submit"),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body.contains("Registration failed. Please try again."));
    assert!(!response.body.contains("Submitting..."));
    assert!(!response.body.contains("database unavailable"));

    // Passwords are not echoed back; blank inputs keep the stored ones.
    let response = portal
        .post_multipart("/create-user", contact_and_security("", "").action("submit"))
        .await;
    assert_eq!(response.redirect_target(), "/?registered=1");
}

#[tokio::test]
async fn test_wizard_is_frozen_while_submit_is_in_flight() {
    let mut portal = TestPortal::start().await;
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&portal.api)
        .await;

    fill_first_two_steps(&mut portal).await;

    let mut tab = portal.new_tab();
    let submit = tokio::spawn(async move {
        tab.post_multipart(
            "/create-user",
            contact_and_security("correct horse", "correct horse").action("submit"),
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    let response = portal
        .post_multipart(
            "/create-user",
            MultipartBody::new()
                .text("email", "changed@x.io")
                .action("back"),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(response.body.contains("Your registration is already being submitted."));

    // The failure lands on step 3 where its message is drawn.
    let response = submit.await.unwrap();
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body.contains("Step 3 of 3"));
    assert!(response.body.contains("Registration failed. Please try again."));
    assert!(response.body.contains("value=\"asha@example.in\""));
    assert!(!response.body.contains("changed@x.io"));
}
