//! Registration draft (the field store).
//!
//! Holds every answer the voter has given so far. Text fields are addressed
//! by [`Field`], uploads by [`FileSlot`]. Both use the form's wire names so
//! the web layer can map inputs without a lookup table of its own.

use chrono::{Datelike, Local, NaiveDate};
use secrecy::{ExposeSecret, SecretString};

/// A text field of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Dob,
    Gender,
    FatherHusbandName,
    VoterId,
    HouseNo,
    Street,
    Locality,
    City,
    District,
    State,
    PinCode,
    AadharNumber,
    PanCardNumber,
    Mobile,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    /// Every settable field. `age` is derived and deliberately absent.
    pub const ALL: [Self; 18] = [
        Self::FullName,
        Self::Dob,
        Self::Gender,
        Self::FatherHusbandName,
        Self::VoterId,
        Self::HouseNo,
        Self::Street,
        Self::Locality,
        Self::City,
        Self::District,
        Self::State,
        Self::PinCode,
        Self::AadharNumber,
        Self::PanCardNumber,
        Self::Mobile,
        Self::Email,
        Self::Password,
        Self::ConfirmPassword,
    ];

    /// The form's wire name for this field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Dob => "dob",
            Self::Gender => "gender",
            Self::FatherHusbandName => "fatherHusbandName",
            Self::VoterId => "voterId",
            Self::HouseNo => "houseNo",
            Self::Street => "street",
            Self::Locality => "locality",
            Self::City => "city",
            Self::District => "district",
            Self::State => "state",
            Self::PinCode => "pinCode",
            Self::AadharNumber => "aadharNumber",
            Self::PanCardNumber => "panCardNumber",
            Self::Mobile => "mobile",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        }
    }

    /// Look a field up by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// Whether the value must never be echoed back or logged.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::ConfirmPassword)
    }
}

/// One of the named document uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSlot {
    /// Voter identity card. Mandatory.
    VoterIdCard,
    /// National ID (Aadhar) card. Mandatory.
    AadharCard,
    /// Secondary (PAN) card. Optional.
    PanCard,
}

impl DocumentSlot {
    pub const ALL: [Self; 3] = [Self::VoterIdCard, Self::AadharCard, Self::PanCard];

    /// Key of the slot inside the `documents` sub-map.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::VoterIdCard => "voterIdCard",
            Self::AadharCard => "aadharCard",
            Self::PanCard => "panCard",
        }
    }

    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::PanCard)
    }
}

/// Where an uploaded file goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSlot {
    ProfilePicture,
    Document(DocumentSlot),
}

impl FileSlot {
    pub const ALL: [Self; 4] = [
        Self::ProfilePicture,
        Self::Document(DocumentSlot::VoterIdCard),
        Self::Document(DocumentSlot::AadharCard),
        Self::Document(DocumentSlot::PanCard),
    ];

    /// The form's wire name, e.g. `documents.aadharCard`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProfilePicture => "profilePicture",
            Self::Document(DocumentSlot::VoterIdCard) => "documents.voterIdCard",
            Self::Document(DocumentSlot::AadharCard) => "documents.aadharCard",
            Self::Document(DocumentSlot::PanCard) => "documents.panCard",
        }
    }

    /// Look a slot up by wire name. Nested names address the documents map.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "profilePicture" {
            return Some(Self::ProfilePicture);
        }
        let key = name.strip_prefix("documents.")?;
        DocumentSlot::ALL
            .into_iter()
            .find(|slot| slot.key() == key)
            .map(Self::Document)
    }
}

/// An uploaded file, kept as an opaque blob.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The `documents` sub-map.
#[derive(Debug, Clone, Default)]
pub struct Documents {
    pub voter_id_card: Option<Attachment>,
    pub aadhar_card: Option<Attachment>,
    pub pan_card: Option<Attachment>,
}

impl Documents {
    #[must_use]
    pub const fn get(&self, slot: DocumentSlot) -> Option<&Attachment> {
        match slot {
            DocumentSlot::VoterIdCard => self.voter_id_card.as_ref(),
            DocumentSlot::AadharCard => self.aadhar_card.as_ref(),
            DocumentSlot::PanCard => self.pan_card.as_ref(),
        }
    }

    const fn slot_mut(&mut self, slot: DocumentSlot) -> &mut Option<Attachment> {
        match slot {
            DocumentSlot::VoterIdCard => &mut self.voter_id_card,
            DocumentSlot::AadharCard => &mut self.aadhar_card,
            DocumentSlot::PanCard => &mut self.pan_card,
        }
    }
}

/// Derive an age from a `YYYY-MM-DD` date of birth.
///
/// Age is the difference between calendar years, ignoring month and day.
/// Returns `None` when the date does not parse.
#[must_use]
pub fn derive_age(dob: &str, today: NaiveDate) -> Option<i32> {
    let birth = NaiveDate::parse_from_str(dob.trim(), "%Y-%m-%d").ok()?;
    Some(today.year() - birth.year())
}

/// An in-progress voter registration.
///
/// Mutated only through [`set_field`](Self::set_field) and
/// [`set_file`](Self::set_file) so the derived age can never drift from the
/// date of birth.
#[derive(Debug, Clone)]
pub struct RegistrationDraft {
    full_name: String,
    dob: String,
    age: Option<i32>,
    gender: String,
    father_husband_name: String,
    voter_id: String,
    house_no: String,
    street: String,
    locality: String,
    city: String,
    district: String,
    state: String,
    pin_code: String,
    aadhar_number: String,
    pan_card_number: String,
    mobile: String,
    email: String,
    password: SecretString,
    confirm_password: SecretString,
    profile_picture: Option<Attachment>,
    documents: Documents,
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            dob: String::new(),
            age: None,
            gender: String::new(),
            father_husband_name: String::new(),
            voter_id: String::new(),
            house_no: String::new(),
            street: String::new(),
            locality: String::new(),
            city: String::new(),
            district: String::new(),
            state: String::new(),
            pin_code: String::new(),
            aadhar_number: String::new(),
            pan_card_number: String::new(),
            mobile: String::new(),
            email: String::new(),
            password: SecretString::from(String::new()),
            confirm_password: SecretString::from(String::new()),
            profile_picture: None,
            documents: Documents::default(),
        }
    }
}

impl RegistrationDraft {
    /// An empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one field's value, using today's local date for the age.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.set_field_on(field, value, Local::now().date_naive());
    }

    /// Replace one field's value.
    ///
    /// Setting the date of birth recomputes the age against `today`; a blank
    /// or unparseable date clears it.
    pub fn set_field_on(&mut self, field: Field, value: impl Into<String>, today: NaiveDate) {
        let value = value.into();
        match field {
            Field::Password => self.password = SecretString::from(value),
            Field::ConfirmPassword => self.confirm_password = SecretString::from(value),
            Field::Dob => {
                self.age = derive_age(&value, today);
                self.dob = value;
            }
            _ => {
                if let Some(slot) = self.text_mut(field) {
                    *slot = value;
                }
            }
        }
    }

    /// Replace one attachment.
    pub fn set_file(&mut self, slot: FileSlot, file: Attachment) {
        match slot {
            FileSlot::ProfilePicture => self.profile_picture = Some(file),
            FileSlot::Document(document) => *self.documents.slot_mut(document) = Some(file),
        }
    }

    /// The current value of a non-secret field. Secret fields return `None`.
    #[must_use]
    pub fn value(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::FullName => &self.full_name,
            Field::Dob => &self.dob,
            Field::Gender => &self.gender,
            Field::FatherHusbandName => &self.father_husband_name,
            Field::VoterId => &self.voter_id,
            Field::HouseNo => &self.house_no,
            Field::Street => &self.street,
            Field::Locality => &self.locality,
            Field::City => &self.city,
            Field::District => &self.district,
            Field::State => &self.state,
            Field::PinCode => &self.pin_code,
            Field::AadharNumber => &self.aadhar_number,
            Field::PanCardNumber => &self.pan_card_number,
            Field::Mobile => &self.mobile,
            Field::Email => &self.email,
            Field::Password | Field::ConfirmPassword => return None,
        };
        Some(value.as_str())
    }

    /// Value of a non-secret field for display, empty for secret fields.
    #[must_use]
    pub fn display(&self, field: Field) -> &str {
        self.value(field).unwrap_or_default()
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let slot = match field {
            Field::FullName => &mut self.full_name,
            Field::Gender => &mut self.gender,
            Field::FatherHusbandName => &mut self.father_husband_name,
            Field::VoterId => &mut self.voter_id,
            Field::HouseNo => &mut self.house_no,
            Field::Street => &mut self.street,
            Field::Locality => &mut self.locality,
            Field::City => &mut self.city,
            Field::District => &mut self.district,
            Field::State => &mut self.state,
            Field::PinCode => &mut self.pin_code,
            Field::AadharNumber => &mut self.aadhar_number,
            Field::PanCardNumber => &mut self.pan_card_number,
            Field::Mobile => &mut self.mobile,
            Field::Email => &mut self.email,
            Field::Dob | Field::Password | Field::ConfirmPassword => return None,
        };
        Some(slot)
    }

    /// Age derived from the date of birth.
    #[must_use]
    pub const fn age(&self) -> Option<i32> {
        self.age
    }

    #[must_use]
    pub const fn password(&self) -> &SecretString {
        &self.password
    }

    #[must_use]
    pub const fn confirm_password(&self) -> &SecretString {
        &self.confirm_password
    }

    /// Whether password and confirmation are identical.
    #[must_use]
    pub fn passwords_match(&self) -> bool {
        self.password.expose_secret() == self.confirm_password.expose_secret()
    }

    /// The attachment in a slot, if one was uploaded.
    #[must_use]
    pub const fn file(&self, slot: FileSlot) -> Option<&Attachment> {
        match slot {
            FileSlot::ProfilePicture => self.profile_picture.as_ref(),
            FileSlot::Document(document) => self.documents.get(document),
        }
    }

    #[must_use]
    pub const fn documents(&self) -> &Documents {
        &self.documents
    }
}
