//! Voter ID card rendering.
//!
//! The card carries the voter's name, voter ID and a QR code of the plain
//! voter ID, the same text the scanner page reads back.

use askama::Template;
use qrcode::QrCode;
use qrcode::render::svg;
use qrcode::types::QrError;
use thiserror::Error;

use crate::models::SessionContext;

/// Side of the rendered QR code, in pixels.
const QR_SIZE: u32 = 160;

/// Errors that can occur while rendering a card.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("QR encoding failed: {0}")]
    Qr(#[from] QrError),

    #[error("Card template failed: {0}")]
    Render(#[from] askama::Error),
}

/// The downloadable card.
#[derive(Template)]
#[template(path = "voter_card.svg", escape = "html")]
struct VoterCardTemplate<'a> {
    display_name: &'a str,
    voter_id: &'a str,
    qr_svg: &'a str,
}

/// QR code of `voter_id` as an `<svg>` element, ready to inline.
///
/// # Errors
///
/// Returns error if the text does not fit in a QR code.
pub fn qr_svg(voter_id: &str) -> Result<String, CardError> {
    let document = QrCode::new(voter_id.as_bytes())?
        .render::<svg::Color<'_>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    // Drop the XML declaration so the element can sit inside other markup.
    Ok(document
        .find("<svg")
        .and_then(|start| document.get(start..))
        .unwrap_or(&document)
        .to_string())
}

/// Standalone SVG document of the voter's card.
///
/// # Errors
///
/// Returns error if the QR code or the card template cannot be rendered.
pub fn card_svg(voter: &SessionContext) -> Result<String, CardError> {
    let qr = qr_svg(&voter.voter_id)?;
    let card = VoterCardTemplate {
        display_name: &voter.display_name,
        voter_id: &voter.voter_id,
        qr_svg: &qr,
    };
    Ok(card.render()?)
}

/// Download name for a voter's card.
#[must_use]
pub fn card_file_name(voter_id: &str) -> String {
    let safe: String = voter_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    format!("Voter_ID_Card_{safe}.svg")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_qr_svg_is_an_inline_element() {
        let svg = qr_svg("ABC1234567").unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_card_escapes_name() {
        let voter = SessionContext::new("ABC1234567", "Asha <Verma> & Co", "tok", Utc::now());
        let card = card_svg(&voter).unwrap();
        assert!(card.starts_with("<?xml"));
        assert!(card.contains("Asha &lt;Verma&gt; &amp; Co"));
        assert!(card.contains("ABC1234567"));
        assert_eq!(card.matches("<svg").count(), 2);
    }

    #[test]
    fn test_card_file_name_is_header_safe() {
        assert_eq!(card_file_name("ABC1234567"), "Voter_ID_Card_ABC1234567.svg");
        assert_eq!(card_file_name("AB\"C/12;3"), "Voter_ID_Card_ABC123.svg");
    }
}
