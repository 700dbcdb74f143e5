//! End-to-end test harness for the QRVotify portal.
//!
//! Drives the real portal router in-process with `tower::ServiceExt::oneshot`
//! against a `wiremock` stand-in for the voter API. A [`Browser`] carries
//! the session cookie between requests like a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qrvotify-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use qrvotify_core::registration::StepGate;
use qrvotify_portal::config::{PortalConfig, VoterApiConfig};
use qrvotify_portal::state::AppState;
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

/// Peer address the test browsers connect from.
const CLIENT_ADDR: ([u8; 4], u16) = ([198, 51, 100, 23], 52100);

/// Portal configuration pointing at `api_uri`.
#[must_use]
pub fn test_config(api_uri: &str, step_gate: StepGate) -> PortalConfig {
    PortalConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        api: VoterApiConfig {
            base_url: Url::parse(&format!("{api_uri}/api")).unwrap(),
            token: None,
            timeout: Duration::from_secs(5),
        },
        recaptcha_site_key: None,
        session_timeout: Duration::from_secs(10 * 60),
        draft_idle_timeout: Duration::from_secs(30 * 60),
        max_upload_bytes: 10 * 1024 * 1024,
        step_gate,
        trust_proxy_headers: false,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Assert a redirect and return its target.
    #[must_use]
    pub fn redirect_target(&self) -> &str {
        assert!(
            self.status.is_redirection(),
            "expected redirect, got {}: {}",
            self.status,
            self.body
        );
        self.location.as_deref().unwrap()
    }
}

/// One browser: the portal router plus a cookie jar.
#[derive(Clone)]
pub struct Browser {
    router: Router,
    cookie: Option<String>,
}

impl Browser {
    /// Send a request with the stored cookie, then remember any new one.
    pub async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let mut builder = builder.extension(ConnectInfo(SocketAddr::from(CLIENT_ADDR)));
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let location = headers
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            location,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    /// POST a `multipart/form-data` body.
    pub async fn post_multipart(&mut self, uri: &str, form: MultipartBody) -> TestResponse {
        let (content_type, body) = form.finish();
        self.send(
            Request::post(uri).header(header::CONTENT_TYPE, content_type),
            Body::from(body),
        )
        .await
    }
}

/// A portal wired to a mock voter API, seen through one browser.
pub struct TestPortal {
    pub api: MockServer,
    browser: Browser,
}

impl TestPortal {
    /// Start a mock voter API and a portal wired to it.
    pub async fn start() -> Self {
        Self::start_with(StepGate::Ungated, |_| {}).await
    }

    /// Like [`start`](Self::start) with a step gate and config tweaks.
    pub async fn start_with(step_gate: StepGate, tweak: impl FnOnce(&mut PortalConfig)) -> Self {
        let api = MockServer::start().await;
        let mut config = test_config(&api.uri(), step_gate);
        tweak(&mut config);
        let router = qrvotify_portal::app(AppState::new(config).unwrap());
        Self {
            api,
            browser: Browser {
                router,
                cookie: None,
            },
        }
    }

    /// Another tab of the same browser, sharing the current session cookie.
    #[must_use]
    pub fn new_tab(&self) -> Browser {
        self.browser.clone()
    }

    /// A different browser with no cookies.
    #[must_use]
    pub fn other_browser(&self) -> Browser {
        Browser {
            router: self.browser.router.clone(),
            cookie: None,
        }
    }
}

impl Deref for TestPortal {
    type Target = Browser;

    fn deref(&self) -> &Browser {
        &self.browser
    }
}

impl DerefMut for TestPortal {
    fn deref_mut(&mut self) -> &mut Browser {
        &mut self.browser
    }
}

/// Percent-encode a form value.
fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                char::from(b).to_string()
            }
            b' ' => "+".to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

const BOUNDARY: &str = "qrvotify-test-boundary";

/// Builder for a browser-like multipart body.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Set the wizard action.
    #[must_use]
    pub fn action(self, action: &str) -> Self {
        self.text("action", action)
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_form_values() {
        assert_eq!(encode("V12 3"), "V12+3");
        assert_eq!(encode("a@b.co"), "a%40b.co");
    }

    #[test]
    fn test_multipart_body_layout() {
        let (content_type, body) = MultipartBody::new().text("fullName", "Asha").finish();
        let body = String::from_utf8(body).unwrap();
        assert!(content_type.ends_with(BOUNDARY));
        assert!(body.contains("name=\"fullName\"\r\n\r\nAsha\r\n"));
        assert!(body.ends_with(&format!("--{BOUNDARY}--\r\n")));
    }
}
