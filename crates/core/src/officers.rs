//! Election officer directory and the documents voters bring along.

/// An election officer voters can contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Officer {
    pub name: &'static str,
    pub location: &'static str,
    pub contact: &'static str,
}

/// A document needed for registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredDocument {
    pub name: &'static str,
    pub format: &'static str,
    pub mandatory: bool,
}

pub const OFFICERS: &[Officer] = &[
    Officer {
        name: "Officer A",
        location: "Delhi, India",
        contact: "9876543210",
    },
    Officer {
        name: "Officer B",
        location: "Mumbai, India",
        contact: "8765432109",
    },
    Officer {
        name: "Officer C",
        location: "Kolkata, India",
        contact: "7654321098",
    },
];

pub const REQUIRED_DOCUMENTS: &[RequiredDocument] = &[
    RequiredDocument {
        name: "Voter ID Card",
        format: "Hardcopy & Softcopy",
        mandatory: true,
    },
    RequiredDocument {
        name: "Aadhaar Card",
        format: "Hardcopy & Softcopy",
        mandatory: true,
    },
    RequiredDocument {
        name: "PAN Card",
        format: "Softcopy (Optional)",
        mandatory: false,
    },
    RequiredDocument {
        name: "Profile Picture",
        format: "Softcopy (JPEG/PNG)",
        mandatory: true,
    },
];

/// Officers whose location contains `query`, ignoring case.
///
/// A blank query matches everyone.
#[must_use]
pub fn by_location<'a>(officers: &'a [Officer], query: &str) -> Vec<&'a Officer> {
    let query = query.trim().to_lowercase();
    officers
        .iter()
        .filter(|officer| officer.location.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(officers: &[&Officer]) -> Vec<&'static str> {
        officers.iter().map(|o| o.name).collect()
    }

    #[test]
    fn test_blank_query_lists_everyone() {
        assert_eq!(by_location(OFFICERS, "  ").len(), OFFICERS.len());
    }

    #[test]
    fn test_location_match_ignores_case() {
        assert_eq!(names(&by_location(OFFICERS, "mUMBAI")), ["Officer B"]);
        assert_eq!(by_location(OFFICERS, "india").len(), 3);
    }

    #[test]
    fn test_unknown_location() {
        assert!(by_location(OFFICERS, "Chennai").is_empty());
    }

    #[test]
    fn test_pan_card_is_optional() {
        let optional: Vec<_> = REQUIRED_DOCUMENTS
            .iter()
            .filter(|doc| !doc.mandatory)
            .map(|doc| doc.name)
            .collect();
        assert_eq!(optional, ["PAN Card"]);
    }
}
