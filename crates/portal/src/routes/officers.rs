//! Election officer finder.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Query, response::IntoResponse};
use qrvotify_core::officers::{self, Officer, RequiredDocument};
use serde::Deserialize;

use crate::filters;
use crate::middleware::OptionalSession;

/// Query parameters for the officer list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OfficerQuery {
    pub location: String,
}

/// Officer finder template.
#[derive(Template, WebTemplate)]
#[template(path = "find_officer.html")]
pub struct FindOfficerTemplate {
    pub current_voter: Option<String>,
    pub location: String,
    pub officers: Vec<&'static Officer>,
    pub documents: &'static [RequiredDocument],
}

/// List officers, filtered by `?location=`.
pub async fn find_officer(
    OptionalSession(voter): OptionalSession,
    Query(query): Query<OfficerQuery>,
) -> impl IntoResponse {
    FindOfficerTemplate {
        current_voter: voter.map(|v| v.display_name),
        officers: officers::by_location(officers::OFFICERS, &query.location),
        location: query.location,
        documents: officers::REQUIRED_DOCUMENTS,
    }
}
