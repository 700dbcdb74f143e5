//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Zero-pads a countdown component to two digits.
///
/// Usage in templates: `{{ left.hours|two_digits }}`
#[askama::filter_fn]
pub fn two_digits(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("{value:0>2}"))
}
