//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use qrvotify_core::TimeLeft;
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalSession;
use crate::services::Election;
use crate::state::AppState;

/// Query parameters of the landing page.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Set to `1` after a successful registration.
    pub registered: Option<u8>,
}

/// An upcoming election with its countdown.
#[derive(Debug, Clone)]
pub struct ElectionCard {
    pub name: String,
    pub date: String,
    /// RFC 3339 start of the election day, read by the countdown script.
    pub starts_at: String,
    pub left: TimeLeft,
}

impl ElectionCard {
    fn new(election: &Election, now: DateTime<Utc>) -> Self {
        let starts_at = election.date.and_time(chrono::NaiveTime::MIN).and_utc();
        Self {
            name: election.name.clone(),
            date: election.date.format("%d %B %Y").to_string(),
            starts_at: starts_at.to_rfc3339(),
            left: TimeLeft::until(starts_at, now),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_voter: Option<String>,
    pub registered: bool,
    pub elections: Vec<ElectionCard>,
}

/// Display the home page.
///
/// A voter API outage leaves the election list empty rather than failing
/// the page.
#[instrument(skip(state, voter))]
pub async fn home(
    State(state): State<AppState>,
    OptionalSession(voter): OptionalSession,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let elections = match state.api().upcoming_elections().await {
        Ok(elections) => elections,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch upcoming elections");
            Vec::new()
        }
    };

    let now = Utc::now();
    HomeTemplate {
        current_voter: voter.map(|v| v.display_name),
        registered: query.registered == Some(1),
        elections: elections
            .iter()
            .map(|election| ElectionCard::new(election, now))
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    #[test]
    fn test_election_card_countdown() {
        let election = Election {
            name: "Municipal Election".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 21).unwrap(),
        };
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 18, 30, 0).unwrap();

        let card = ElectionCard::new(&election, now);
        assert_eq!(card.date, "21 October 2026");
        assert_eq!(card.starts_at, "2026-10-21T00:00:00+00:00");
        assert_eq!(card.left.days, 1);
        assert_eq!(card.left.hours, 5);
        assert_eq!(card.left.minutes, 30);
    }

    #[test]
    fn test_past_election_counts_zero() {
        let election = Election {
            name: "By-election".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        assert!(ElectionCard::new(&election, now).left.is_over());
    }
}
