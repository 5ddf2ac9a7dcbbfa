use std::fmt;

use serde::{Deserialize, Serialize};

use super::status::{BookStatus, StatusError};

/// Identity of a book record. Assigned by whoever owns the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for BookId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the reading list, generic over how `status` is held.
///
/// `id` has no setter: a record keeps its identity for life. `isbn` and
/// `cover_url` distinguish absent (`None`, omitted on the wire) from empty
/// text (`Some("")`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord<S> {
    id: BookId,
    title: String,
    author: String,
    release_year: i32,
    status: S,
    rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover_url: Option<String>,
}

/// A book whose status is one of the known reading statuses.
pub type Book = BookRecord<BookStatus>;

/// A book whose status is free text.
pub type RawBook = BookRecord<String>;

impl<S> BookRecord<S> {
    pub fn new(
        id: u64,
        title: impl Into<String>,
        author: impl Into<String>,
        release_year: i32,
        status: S,
        rating: f64,
    ) -> Self {
        Self {
            id: BookId(id),
            title: title.into(),
            author: author.into(),
            release_year,
            status,
            rating,
            isbn: None,
            cover_url: None,
        }
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn release_year(&self) -> i32 {
        self.release_year
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_release_year(&mut self, release_year: i32) {
        self.release_year = release_year;
    }

    pub fn set_status(&mut self, status: S) {
        self.status = status;
    }

    pub fn set_rating(&mut self, rating: f64) {
        self.rating = rating;
    }

    pub fn set_isbn(&mut self, isbn: Option<String>) {
        self.isbn = isbn;
    }

    pub fn set_cover_url(&mut self, cover_url: Option<String>) {
        self.cover_url = cover_url;
    }

    /// Two values are the same record when their ids match, whatever else
    /// has changed in between.
    pub fn same_record<T>(&self, other: &BookRecord<T>) -> bool {
        self.id == other.id
    }

    /// Convert the status, keeping every other field.
    pub fn map_status<T>(self, f: impl FnOnce(S) -> T) -> BookRecord<T> {
        BookRecord {
            id: self.id,
            title: self.title,
            author: self.author,
            release_year: self.release_year,
            status: f(self.status),
            rating: self.rating,
            isbn: self.isbn,
            cover_url: self.cover_url,
        }
    }

    pub fn try_map_status<T, E>(self, f: impl FnOnce(S) -> Result<T, E>) -> Result<BookRecord<T>, E> {
        Ok(BookRecord {
            id: self.id,
            title: self.title,
            author: self.author,
            release_year: self.release_year,
            status: f(self.status)?,
            rating: self.rating,
            isbn: self.isbn,
            cover_url: self.cover_url,
        })
    }
}

impl TryFrom<RawBook> for Book {
    type Error = StatusError;

    fn try_from(raw: RawBook) -> Result<Self, Self::Error> {
        raw.try_map_status(|text| text.parse())
    }
}

/// Free-text records carry the display label, as stored by earlier clients.
impl From<Book> for RawBook {
    fn from(book: Book) -> Self {
        book.map_status(|status| status.label().to_string())
    }
}
