//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. The only loosening is
//! for reCAPTCHA on the login page and the camera on the QR scanner.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Path of the page allowed to use the camera.
const SCANNER_PATH: &str = "/scan-qr";

/// CSP shared by every page.
///
/// reCAPTCHA loads its script from `www.google.com`/`www.gstatic.com` and
/// renders its challenge in a `www.google.com` frame.
const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'none'; \
     script-src 'self' https://www.google.com/recaptcha/ https://www.gstatic.com/recaptcha/; \
     style-src 'self'; \
     font-src 'self'; \
     img-src 'self' data: blob:; \
     media-src 'self' blob:; \
     connect-src 'self'; \
     frame-src https://www.google.com/recaptcha/ https://recaptcha.google.com/recaptcha/; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

const PERMISSIONS_POLICY_BASE: &str = "accelerometer=(), \
     autoplay=(), \
     browsing-topics=(), \
     display-capture=(), \
     geolocation=(), \
     gyroscope=(), \
     magnetometer=(), \
     microphone=(), \
     payment=(), \
     usb=()";

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: no-referrer` - Zero referrer leakage
/// - `Content-Security-Policy` - Self-only, plus reCAPTCHA
/// - `Permissions-Policy` - Deny sensitive features; camera only on the scanner
/// - `Cache-Control: no-store, max-age=0` - Prevent caching voter data
/// - `Cross-Origin-Opener-Policy: same-origin` - Process isolation
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let camera_allowed = request.uri().path() == SCANNER_PATH;

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );

    let camera = if camera_allowed { "camera=(self)" } else { "camera=()" };
    if let Ok(value) = HeaderValue::from_str(&format!("{PERMISSIONS_POLICY_BASE}, {camera}")) {
        headers.insert(HeaderName::from_static("permissions-policy"), value);
    }

    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}
