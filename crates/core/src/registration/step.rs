//! Wizard steps.

use serde::{Deserialize, Serialize};

use crate::registration::draft::Field;

/// One of the three registration steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Step {
    /// Step 1: personal details.
    #[default]
    Personal,
    /// Step 2: address, identifiers and document uploads.
    AddressAndId,
    /// Step 3: contact details and password. The only step that can submit.
    ContactAndSecurity,
}

impl Step {
    pub const COUNT: u8 = 3;

    /// 1-based step number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Personal => 1,
            Self::AddressAndId => 2,
            Self::ContactAndSecurity => 3,
        }
    }

    /// The following step; the last step stays put.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Personal => Self::AddressAndId,
            Self::AddressAndId | Self::ContactAndSecurity => Self::ContactAndSecurity,
        }
    }

    /// The preceding step; the first step stays put.
    #[must_use]
    pub const fn back(self) -> Self {
        match self {
            Self::Personal | Self::AddressAndId => Self::Personal,
            Self::ContactAndSecurity => Self::AddressAndId,
        }
    }

    #[must_use]
    pub const fn is_first(self) -> bool {
        matches!(self, Self::Personal)
    }

    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::ContactAndSecurity)
    }

    /// Heading shown above the step's inputs.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Personal => "Personal Details",
            Self::AddressAndId => "Address & Identification",
            Self::ContactAndSecurity => "Contact & Security",
        }
    }

    /// Completion percentage for the progress bar (`step / 3`).
    #[must_use]
    pub const fn progress_percent(self) -> u8 {
        self.number() * 100 / Self::COUNT
    }

    /// Text fields rendered on this step.
    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::Personal => &[
                Field::FullName,
                Field::Dob,
                Field::Gender,
                Field::FatherHusbandName,
            ],
            Self::AddressAndId => &[
                Field::VoterId,
                Field::HouseNo,
                Field::Street,
                Field::Locality,
                Field::City,
                Field::District,
                Field::State,
                Field::PinCode,
                Field::AadharNumber,
                Field::PanCardNumber,
            ],
            Self::ContactAndSecurity => &[
                Field::Password,
                Field::ConfirmPassword,
                Field::Email,
                Field::Mobile,
            ],
        }
    }

    /// Error keys owned by this step, used when "Next" is gated.
    #[must_use]
    pub const fn error_keys(self) -> &'static [&'static str] {
        match self {
            Self::Personal => &["fullName", "dob", "age", "gender"],
            Self::AddressAndId => &["voterIdCard", "aadharCard"],
            Self::ContactAndSecurity => &["password", "confirmPassword", "email", "mobile"],
        }
    }
}
