//! Reading status of a book.
//!
//! The variant is the identity in Rust code. On the wire and in text only the
//! display label is a valid status; the symbolic key names the variant but is
//! never accepted as a status value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookStatus {
    #[serde(rename = "Steht an")]
    Planned,
    #[serde(rename = "Lesend")]
    Reading,
    #[serde(rename = "Gelesen")]
    Read,
}

/// Symbolic key to display label, in declaration order.
pub const BOOK_STATUS: [(&str, &str); 3] = [
    (BookStatus::Planned.key(), BookStatus::Planned.label()),
    (BookStatus::Reading.key(), BookStatus::Reading.label()),
    (BookStatus::Read.key(), BookStatus::Read.label()),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("unknown book status '{0}'; expected one of: Steht an, Lesend, Gelesen")]
    Unknown(String),
    #[error("unknown book status key '{0}'; expected one of: PLANNED, READING, READ")]
    UnknownKey(String),
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [BookStatus::Planned, BookStatus::Reading, BookStatus::Read];

    pub const fn key(self) -> &'static str {
        match self {
            BookStatus::Planned => "PLANNED",
            BookStatus::Reading => "READING",
            BookStatus::Read => "READ",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            BookStatus::Planned => "Steht an",
            BookStatus::Reading => "Lesend",
            BookStatus::Read => "Gelesen",
        }
    }

    /// Match the display label exactly.
    pub fn from_label(label: &str) -> Result<Self, StatusError> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == label)
            .ok_or_else(|| StatusError::Unknown(label.to_string()))
    }

    /// Match the symbolic key exactly. Keys identify variants in settings and
    /// listings; they are not status values.
    pub fn from_key(key: &str) -> Result<Self, StatusError> {
        Self::ALL
            .into_iter()
            .find(|status| status.key() == key)
            .ok_or_else(|| StatusError::UnknownKey(key.to_string()))
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BookStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Text that is guaranteed to be one of the three status labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StatusLabel(BookStatus);

impl StatusLabel {
    /// Parse display text. Symbolic keys are not labels and are rejected.
    pub fn parse(text: &str) -> Result<Self, StatusError> {
        BookStatus::from_label(text).map(StatusLabel)
    }

    pub fn as_str(&self) -> &'static str {
        self.0.label()
    }

    pub fn status(&self) -> BookStatus {
        self.0
    }
}

impl From<BookStatus> for StatusLabel {
    fn from(status: BookStatus) -> Self {
        StatusLabel(status)
    }
}

impl From<StatusLabel> for String {
    fn from(label: StatusLabel) -> Self {
        label.as_str().to_string()
    }
}

impl TryFrom<String> for StatusLabel {
    type Error = StatusError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::parse(&text)
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn labels_are_fixed_non_empty_and_distinct() {
        assert_eq!(
            BOOK_STATUS,
            [
                ("PLANNED", "Steht an"),
                ("READING", "Lesend"),
                ("READ", "Gelesen")
            ]
        );

        let labels: HashSet<_> = BOOK_STATUS.iter().map(|(_, label)| *label).collect();
        assert_eq!(labels.len(), 3);
        assert!(labels.iter().all(|label| !label.is_empty()));
    }

    #[test]
    fn parses_labels_and_looks_up_keys() {
        for status in BookStatus::ALL {
            assert_eq!(status.label().parse::<BookStatus>(), Ok(status));
            assert_eq!(BookStatus::from_key(status.key()), Ok(status));
        }
    }

    #[test]
    fn rejects_anything_else() {
        for text in [
            "In Progress",
            "gelesen",
            "read",
            "",
            " Lesend",
            "Steht  an",
            "PLANNED",
            "READING",
            "READ",
        ] {
            assert_eq!(
                text.parse::<BookStatus>(),
                Err(StatusError::Unknown(text.to_string())),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn wire_form_is_the_label() {
        assert_eq!(serde_json::to_string(&BookStatus::Reading).unwrap(), "\"Lesend\"");

        let planned: BookStatus = serde_json::from_str("\"Steht an\"").unwrap();
        assert_eq!(planned, BookStatus::Planned);

        for text in ["\"PLANNED\"", "\"Planned\"", "\"READ\""] {
            assert!(serde_json::from_str::<BookStatus>(text).is_err(), "{text} should not deserialize");
        }
    }

    #[test]
    fn every_status_survives_its_own_wire_form() {
        for status in BookStatus::ALL {
            let text = serde_json::to_string(&status).unwrap();
            assert_eq!(serde_json::from_str::<BookStatus>(&text).unwrap(), status);
            assert_eq!(status.to_string().parse::<BookStatus>(), Ok(status));
        }
    }

    #[test]
    fn error_messages_name_what_is_accepted() {
        let label_err = "READ".parse::<BookStatus>().unwrap_err();
        assert_eq!(
            label_err.to_string(),
            "unknown book status 'READ'; expected one of: Steht an, Lesend, Gelesen"
        );
        assert_eq!(
            BookStatus::from_key("Gelesen"),
            Err(StatusError::UnknownKey("Gelesen".to_string()))
        );
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(BookStatus::Read.to_string(), "Gelesen");
    }

    #[test]
    fn status_label_only_holds_labels() {
        let label = StatusLabel::parse("Lesend").unwrap();
        assert_eq!(label.status(), BookStatus::Reading);
        assert_eq!(label.as_str(), "Lesend");

        assert!(StatusLabel::parse("READING").is_err());
        assert!(serde_json::from_str::<StatusLabel>("\"In Progress\"").is_err());
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"Lesend\"");
    }
}
