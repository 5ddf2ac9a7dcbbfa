//! Turns untyped JSON into a book record, reporting every field that does
//! not conform instead of stopping at the first one.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};
use shelf_kernel::StatusPolicy;

use super::models::{Book, RawBook};
use super::status::BookStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    NotAnObject,
    Required,
    InvalidType,
    UnknownStatus,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::NotAnObject => "not_an_object",
            ViolationKind::Required => "required",
            ViolationKind::InvalidType => "invalid_type",
            ViolationKind::UnknownStatus => "unknown_status",
        }
    }
}

/// One non-conforming field. `$` names the document itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    #[serde(rename = "error")]
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn to_detail(&self) -> Value {
        json!({ "field": self.field, "error": self.kind.as_str() })
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind.as_str())
    }
}

/// A record that passed the check, in the shape its policy calls for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Checked {
    Book(Book),
    Raw(RawBook),
}

/// Check `value` against the record shape selected by `policy`.
pub fn check(value: &Value, policy: StatusPolicy) -> Result<Checked, Vec<Violation>> {
    let raw = check_record(value, policy)?;
    match policy {
        StatusPolicy::FreeText => Ok(Checked::Raw(raw)),
        StatusPolicy::Strict => Book::try_from(raw)
            .map(Checked::Book)
            .map_err(|_| vec![Violation::new("status", ViolationKind::UnknownStatus)]),
    }
}

/// Strict check: `status` must be a known reading status.
pub fn check_book(value: &Value) -> Result<Book, Vec<Violation>> {
    let raw = check_record(value, StatusPolicy::Strict)?;
    Book::try_from(raw).map_err(|_| vec![Violation::new("status", ViolationKind::UnknownStatus)])
}

/// Check the field set and types. Under [`StatusPolicy::Strict`] the status
/// text must also be one of the three display labels; it is kept verbatim
/// either way.
///
/// Unknown fields are ignored and an explicit `null` on an optional field
/// counts as absent.
pub fn check_record(value: &Value, policy: StatusPolicy) -> Result<RawBook, Vec<Violation>> {
    let Some(object) = value.as_object() else {
        return Err(vec![Violation::new("$", ViolationKind::NotAnObject)]);
    };

    let mut violations = Vec::new();

    let id = required(object, "id", Value::as_u64, &mut violations);
    let title = required(object, "title", as_string, &mut violations);
    let author = required(object, "author", as_string, &mut violations);
    let release_year = required(object, "releaseYear", as_i32, &mut violations);
    let status = required(object, "status", as_string, &mut violations);
    let rating = required(object, "rating", Value::as_f64, &mut violations);
    let isbn = optional(object, "isbn", &mut violations);
    let cover_url = optional(object, "coverUrl", &mut violations);

    if policy == StatusPolicy::Strict {
        if let Some(text) = &status {
            if BookStatus::from_label(text).is_err() {
                violations.push(Violation::new("status", ViolationKind::UnknownStatus));
            }
        }
    }

    match (id, title, author, release_year, status, rating) {
        (Some(id), Some(title), Some(author), Some(release_year), Some(status), Some(rating))
            if violations.is_empty() =>
        {
            let mut record = RawBook::new(id, title, author, release_year, status, rating);
            record.set_isbn(isbn);
            record.set_cover_url(cover_url);
            Ok(record)
        }
        _ => Err(violations),
    }
}

fn required<T>(
    object: &Map<String, Value>,
    field: &str,
    extract: impl Fn(&Value) -> Option<T>,
    violations: &mut Vec<Violation>,
) -> Option<T> {
    match object.get(field) {
        None | Some(Value::Null) => {
            violations.push(Violation::new(field, ViolationKind::Required));
            None
        }
        Some(value) => {
            let extracted = extract(value);
            if extracted.is_none() {
                violations.push(Violation::new(field, ViolationKind::InvalidType));
            }
            extracted
        }
    }
}

fn optional(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            violations.push(Violation::new(field, ViolationKind::InvalidType));
            None
        }
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn as_i32(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}
