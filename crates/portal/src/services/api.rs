//! Voter API client.
//!
//! The portal owns no persistent data: registrations, logins, OTPs, profile
//! changes and the election calendar all live behind this HTTP API. Upcoming elections are
//! cached for 5 minutes using `moka`.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;
use qrvotify_core::registration::{Attachment, Field, FileSlot, RegistrationDraft};
use qrvotify_core::MobileNumber;
use qrvotify_core::login::LoginMethod;
use qrvotify_core::profile::{EditRequest, PasswordChange};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::VoterApiConfig;

/// How long the election calendar is cached.
const ELECTIONS_TTL: Duration = Duration::from_secs(5 * 60);

const ELECTIONS_KEY: &str = "upcoming-elections";

/// Errors that can occur when talking to the voter API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body encoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether the API rejected the caller's credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

/// Credentials posted to `/auth/login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub method: LoginMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<String>,
}

/// Successful `/auth/login` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub voter_id: Option<String>,
}

/// An entry of the election calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Serialize)]
struct OtpRequest<'a> {
    mobile: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

/// Voter API client.
///
/// Cheap to clone; the HTTP connection pool and cache are shared.
#[derive(Clone)]
pub struct VoterApiClient {
    inner: Arc<VoterApiClientInner>,
}

struct VoterApiClientInner {
    client: reqwest::Client,
    base_url: String,
    elections: Cache<&'static str, Vec<Election>>,
}

impl VoterApiClient {
    /// Create a new voter API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &VoterApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.token {
            let auth_value = format!("Bearer {}", token.expose_secret());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| ApiError::Parse(format!("Invalid API token format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let elections = Cache::builder()
            .max_capacity(1)
            .time_to_live(ELECTIONS_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(VoterApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                elections,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Submit a completed registration as `multipart/form-data`.
    ///
    /// Not retried; a failure is reported to the voter, who may submit again.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API responds with a non-2xx
    /// status.
    #[instrument(skip(self, draft))]
    pub async fn submit_registration(&self, draft: &RegistrationDraft) -> Result<(), ApiError> {
        let form = registration_form(draft)?;

        let response = self
            .inner
            .client
            .post(self.url("voters/register"))
            .multipart(form)
            .send()
            .await?;

        ensure_success(response).await?;
        debug!("Registration accepted");
        Ok(())
    }

    /// Exchange credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api { status: 401, .. }` for rejected credentials,
    /// other variants for transport or server failures.
    #[instrument(skip(self, request), fields(method = request.method.as_str()))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("auth/login"))
            .json(request)
            .send()
            .await?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Ask the API to text a one-time password to `mobile`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API responds with a non-2xx
    /// status.
    #[instrument(skip(self, mobile), fields(mobile = %mobile.masked()))]
    pub async fn request_otp(&self, mobile: &MobileNumber) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("auth/otp"))
            .json(&OtpRequest {
                mobile: mobile.as_str(),
            })
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    /// Change the logged-in voter's password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` when the API refuses the change (for example a
    /// wrong old password), other variants for transport failures.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        access_token: &str,
        change: &PasswordChange,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("profile/change-password"))
            .bearer_auth(access_token)
            .json(&ChangePasswordRequest {
                old_password: &change.old_password,
                new_password: &change.new_password,
            })
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    /// File a profile edit request for review.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API responds with a non-2xx
    /// status.
    #[instrument(skip_all)]
    pub async fn submit_edit_request(
        &self,
        access_token: &str,
        request: &EditRequest,
        supporting_doc: Option<&Attachment>,
    ) -> Result<(), ApiError> {
        let mut form = Form::new()
            .text("fullName", request.full_name.clone())
            .text("address", request.address.clone())
            .text("editReason", request.edit_reason.clone())
            .text("additionalNotes", request.additional_notes.clone());
        if let Some(file) = supporting_doc {
            form = form.part("supportingDocs", file_part(file)?);
        }

        let response = self
            .inner
            .client
            .post(self.url("profile/edit-request"))
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await?;

        ensure_success(response).await?;
        debug!("Edit request accepted");
        Ok(())
    }

    /// The election calendar. Cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response is not a list of
    /// elections. Failures are not cached.
    #[instrument(skip(self))]
    pub async fn upcoming_elections(&self) -> Result<Vec<Election>, ApiError> {
        if let Some(elections) = self.inner.elections.get(ELECTIONS_KEY).await {
            debug!("Cache hit for upcoming elections");
            return Ok(elections);
        }

        let response = self
            .inner
            .client
            .get(self.url("upcoming-elections"))
            .send()
            .await?;

        let elections: Vec<Election> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        self.inner
            .elections
            .insert(ELECTIONS_KEY, elections.clone())
            .await;

        Ok(elections)
    }
}

/// Turn a non-2xx response into `ApiError::Api`.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Build the multipart body: one text part per field, one file part per upload.
fn registration_form(draft: &RegistrationDraft) -> Result<Form, ApiError> {
    let mut form = Form::new();

    for field in Field::ALL {
        let value = match field {
            Field::Password => draft.password().expose_secret().to_string(),
            Field::ConfirmPassword => draft.confirm_password().expose_secret().to_string(),
            _ => draft.display(field).to_string(),
        };
        form = form.text(field.name(), value);
    }

    if let Some(age) = draft.age() {
        form = form.text("age", age.to_string());
    }

    for slot in FileSlot::ALL {
        let Some(file) = draft.file(slot) else {
            continue;
        };
        form = form.part(slot.name(), file_part(file)?);
    }

    Ok(form)
}

fn file_part(file: &Attachment) -> Result<Part, ApiError> {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match &file.content_type {
        Some(content_type) => Ok(part.mime_str(content_type)?),
        None => Ok(part),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use qrvotify_core::registration::DocumentSlot;
    use url::Url;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer, token: Option<&str>) -> VoterApiClient {
        let config = VoterApiConfig {
            base_url: Url::parse(&format!("{}/api", server.uri())).unwrap(),
            token: token.map(|t| secrecy::SecretString::from(t.to_string())),
            timeout: Duration::from_secs(5),
        };
        VoterApiClient::new(&config).unwrap()
    }

    fn filled_draft() -> RegistrationDraft {
        let mut draft = RegistrationDraft::new();
        draft.set_field(Field::FullName, "Asha Rao");
        draft.set_field(Field::Dob, "1990-05-17");
        draft.set_field(Field::Password, "hunter2hunter2");
        draft.set_field(Field::ConfirmPassword, "hunter2hunter2");
        draft.set_file(
            FileSlot::Document(DocumentSlot::VoterIdCard),
            Attachment::new("voter.png", Some("image/png".to_string()), vec![1, 2, 3]),
        );
        draft
    }

    #[tokio::test]
    async fn test_submit_registration_posts_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/voters/register"))
            .and(header("authorization", "Bearer tok_live"))
            .and(body_string_contains("name=\"fullName\""))
            .and(body_string_contains("Asha Rao"))
            .and(body_string_contains("name=\"age\""))
            .and(body_string_contains("name=\"documents.voterIdCard\"; filename=\"voter.png\""))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("tok_live"));
        client.submit_registration(&filled_draft()).await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_registration_maps_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/voters/register"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .submit_registration(&filled_draft())
            .await
            .unwrap_err();
        assert!(
            matches!(err, ApiError::Api { status: 500, ref message } if message == "database down")
        );
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(serde_json::json!({
                "method": "voterId",
                "voterId": "V123",
                "password": "pw",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "abc",
                "name": "Asha",
            })))
            .mount(&server)
            .await;

        let request = LoginRequest {
            method: LoginMethod::VoterId,
            voter_id: Some("V123".to_string()),
            password: Some("pw".to_string()),
            mobile: None,
            otp: None,
            captcha_token: None,
        };
        let response = client_for(&server, None).login(&request).await.unwrap();
        assert_eq!(response.token, "abc");
        assert_eq!(response.name.as_deref(), Some("Asha"));
        assert!(response.voter_id.is_none());
    }

    #[tokio::test]
    async fn test_login_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let request = LoginRequest {
            method: LoginMethod::Mobile,
            voter_id: None,
            password: None,
            mobile: Some("9876543210".to_string()),
            otp: Some("123456".to_string()),
            captcha_token: None,
        };
        let err = client_for(&server, None).login(&request).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_request_otp() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/otp"))
            .and(body_json(serde_json::json!({ "mobile": "9876543210" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mobile = MobileNumber::parse("9876543210").unwrap();
        client_for(&server, None).request_otp(&mobile).await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_uses_voter_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/profile/change-password"))
            .and(header("authorization", "Bearer voter-token"))
            .and(body_json(serde_json::json!({
                "oldPassword": "old-pass",
                "newPassword": "n3w-pass",
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let change = PasswordChange {
            old_password: "old-pass".to_string(),
            new_password: "n3w-pass".to_string(),
            confirm_new_password: "n3w-pass".to_string(),
        };
        client_for(&server, Some("tok_live"))
            .change_password("voter-token", &change)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_change_password_refused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/profile/change-password"))
            .respond_with(ResponseTemplate::new(403).set_body_string("wrong password"))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .change_password("voter-token", &PasswordChange::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_edit_request_posts_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/profile/edit-request"))
            .and(header("authorization", "Bearer voter-token"))
            .and(body_string_contains("name=\"editReason\""))
            .and(body_string_contains("Moved house"))
            .and(body_string_contains("name=\"supportingDocs\"; filename=\"bill.pdf\""))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let request = EditRequest {
            address: "14 MG Road, Pune".to_string(),
            edit_reason: "Moved house".to_string(),
            ..EditRequest::default()
        };
        let doc = Attachment::new("bill.pdf", Some("application/pdf".to_string()), vec![7]);
        client_for(&server, None)
            .submit_edit_request("voter-token", &request, Some(&doc))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upcoming_elections_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/upcoming-elections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "General Election", "date": "2027-04-11" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let first = client.upcoming_elections().await.unwrap();
        let second = client.upcoming_elections().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].name, "General Election");
        assert_eq!(first[0].date, NaiveDate::from_ymd_opt(2027, 4, 11).unwrap());
    }

    #[tokio::test]
    async fn test_upcoming_elections_bad_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/upcoming-elections"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .upcoming_elections()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
