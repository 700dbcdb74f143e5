//! Election officer finder.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use qrvotify_integration_tests::TestPortal;

#[tokio::test]
async fn test_lists_every_officer_and_the_documents() {
    let mut portal = TestPortal::start().await;

    let page = portal.get("/find-officer").await;
    assert_eq!(page.status, StatusCode::OK);
    for name in ["Officer A", "Officer B", "Officer C"] {
        assert!(page.body.contains(name), "{name} missing");
    }
    assert!(page.body.contains("<strong>PAN Card</strong> - Softcopy (Optional)</li>"));
    assert!(page.body.contains("(Mandatory)"));
}

#[tokio::test]
async fn test_filters_by_location() {
    let mut portal = TestPortal::start().await;

    let page = portal.get("/find-officer?location=kolkata").await;
    assert!(page.body.contains("Officer C"));
    assert!(!page.body.contains("Officer A"));
    assert!(page.body.contains("value=\"kolkata\""));

    let page = portal.get("/find-officer?location=Chennai").await;
    assert!(page.body.contains("No officers found for this location."));
}
