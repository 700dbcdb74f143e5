//! Login form rules and OTP resend cooldown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::FieldErrors;
use crate::types::{MobileError, MobileNumber};

/// Seconds a voter has to wait before requesting another OTP.
pub const OTP_RESEND_SECONDS: i64 = 60;

/// How the voter proves who they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoginMethod {
    /// Voter ID and password.
    #[default]
    #[serde(rename = "voterId")]
    VoterId,
    /// Mobile number and one-time password.
    #[serde(rename = "mobile")]
    Mobile,
}

impl LoginMethod {
    /// Query-string value selecting this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VoterId => "voterId",
            Self::Mobile => "mobile",
        }
    }
}

/// Raw login form input.
#[derive(Debug, Clone, Default)]
pub struct LoginInput {
    pub method: LoginMethod,
    pub voter_id: String,
    pub password: String,
    pub mobile: String,
    pub otp: String,
    pub captcha_token: String,
}

/// Validate a login attempt.
///
/// The captcha is only checked when the portal has a reCAPTCHA site key
/// configured; the backend verifies the token itself. Mobile logins need an
/// OTP to have been requested for the same number.
#[must_use]
pub fn validate_login(
    input: &LoginInput,
    captcha_required: bool,
    otp_requested_for: Option<&str>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match input.method {
        LoginMethod::VoterId => {
            if input.voter_id.trim().is_empty() {
                errors.insert("voterId", "Voter ID is required");
            }
            if input.password.is_empty() {
                errors.insert("password", "Password is required");
            }
        }
        LoginMethod::Mobile => {
            if let Err(message) = check_mobile(&input.mobile) {
                errors.insert("mobile", message);
            } else if otp_requested_for != Some(input.mobile.as_str()) {
                errors.insert("otp", "Request an OTP for this number first");
            }
            if !errors.contains("otp") && input.otp.trim().is_empty() {
                errors.insert("otp", "OTP is required");
            }
        }
    }

    if captcha_required && input.captcha_token.is_empty() {
        errors.insert("captcha", "Please complete the captcha");
    }

    errors
}

/// Validate the mobile number of an OTP request.
///
/// # Errors
///
/// Returns the message to show next to the mobile input.
pub fn check_mobile(mobile: &str) -> Result<MobileNumber, &'static str> {
    MobileNumber::parse(mobile).map_err(|e| match e {
        MobileError::Empty => "Mobile number is required",
        MobileError::InvalidFormat => "Valid mobile number is required",
    })
}

/// Record of the last OTP sent in this browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpCooldown {
    pub mobile: MobileNumber,
    pub sent_at: DateTime<Utc>,
}

impl OtpCooldown {
    #[must_use]
    pub const fn new(mobile: MobileNumber, sent_at: DateTime<Utc>) -> Self {
        Self { mobile, sent_at }
    }

    /// Whole seconds left before another OTP may be requested, never negative.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        let elapsed = (now - self.sent_at).num_seconds();
        (OTP_RESEND_SECONDS - elapsed).clamp(0, OTP_RESEND_SECONDS)
    }

    /// Whether a resend is still blocked.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn voter_id_input() -> LoginInput {
        LoginInput {
            method: LoginMethod::VoterId,
            voter_id: "V123456789".to_string(),
            password: "secret".to_string(),
            captcha_token: "token".to_string(),
            ..LoginInput::default()
        }
    }

    fn mobile_input() -> LoginInput {
        LoginInput {
            method: LoginMethod::Mobile,
            mobile: "9876543210".to_string(),
            otp: "123456".to_string(),
            captcha_token: "token".to_string(),
            ..LoginInput::default()
        }
    }

    #[test]
    fn test_voter_id_login_valid() {
        assert!(validate_login(&voter_id_input(), true, None).is_empty());
    }

    #[test]
    fn test_voter_id_login_requires_fields() {
        let input = LoginInput::default();
        let errors = validate_login(&input, false, None);
        assert_eq!(errors.get("voterId"), Some("Voter ID is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
        assert!(!errors.contains("captcha"));
    }

    #[test]
    fn test_captcha_only_when_required() {
        let input = LoginInput {
            captcha_token: String::new(),
            ..voter_id_input()
        };
        assert!(validate_login(&input, false, None).is_empty());
        assert_eq!(
            validate_login(&input, true, None).get("captcha"),
            Some("Please complete the captcha")
        );
    }

    #[test]
    fn test_mobile_login_needs_requested_otp() {
        let input = mobile_input();
        assert!(validate_login(&input, true, Some("9876543210")).is_empty());
        assert_eq!(
            validate_login(&input, true, None).get("otp"),
            Some("Request an OTP for this number first")
        );
        assert!(validate_login(&input, true, Some("1111111111")).contains("otp"));
    }

    #[test]
    fn test_mobile_login_requires_otp_value() {
        let input = LoginInput {
            otp: "  ".to_string(),
            ..mobile_input()
        };
        assert_eq!(
            validate_login(&input, true, Some("9876543210")).get("otp"),
            Some("OTP is required")
        );
    }

    #[test]
    fn test_check_mobile_messages() {
        assert_eq!(check_mobile("").unwrap_err(), "Mobile number is required");
        assert_eq!(
            check_mobile("12345").unwrap_err(),
            "Valid mobile number is required"
        );
        assert!(check_mobile("9876543210").is_ok());
    }

    #[test]
    fn test_otp_cooldown_counts_down() {
        let sent_at = Utc::now();
        let cooldown = OtpCooldown::new(MobileNumber::parse("9876543210").unwrap(), sent_at);

        assert_eq!(cooldown.remaining_secs(sent_at), 60);
        assert_eq!(cooldown.remaining_secs(sent_at + Duration::seconds(15)), 45);
        assert!(cooldown.is_active(sent_at + Duration::seconds(59)));
        assert_eq!(cooldown.remaining_secs(sent_at + Duration::seconds(60)), 0);
        assert!(!cooldown.is_active(sent_at + Duration::seconds(600)));
    }

    #[test]
    fn test_otp_cooldown_ignores_clock_skew() {
        let sent_at = Utc::now();
        let cooldown = OtpCooldown::new(MobileNumber::parse("9876543210").unwrap(), sent_at);
        assert_eq!(cooldown.remaining_secs(sent_at - Duration::seconds(30)), 60);
    }
}
