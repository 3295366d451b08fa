//! Book records and the raw Open Library payloads they are built from.
//!
//! `BookRecord` is the only thing persisted. The `Raw*` types mirror just the
//! fields of the subject listing that the builder reads; everything else in
//! the API response is ignored.

use crate::catalog::identity::{BookId, Pages};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const NO_EDITORIAL: &str = "No Editorial Info";

/// One cached book as stored and rendered.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub editorial: String,
    pub pages: Pages,
}

impl BookRecord {
    /// Text used for list entries: `"<title> by <author>"`.
    pub fn label(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }
}

/// Body of `GET /subjects/<subject>.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct SubjectListing {
    pub works: Vec<RawWork>,
}

/// A work entry in the subject listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawWork {
    #[serde(default)]
    pub cover_edition_key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<RawAuthor>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

impl RawWork {
    /// Edition key when present and non-empty.
    pub fn edition_key(&self) -> Option<&str> {
        self.cover_edition_key
            .as_deref()
            .filter(|key| !key.is_empty())
    }

    /// Edition key, or the synthetic id for this listing position.
    pub fn book_id(&self, index: usize) -> BookId {
        match self.edition_key() {
            Some(key) => BookId(key.to_string()),
            None => BookId::synthetic(index),
        }
    }

    /// Name of the first listed author, or `"Unknown"` when there is none.
    /// An empty name is kept as listed.
    pub fn first_author(&self) -> String {
        self.authors
            .first()
            .and_then(|author| author.name.as_deref())
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_string()
    }
}

/// Publisher and page count pulled from the per-edition lookup.
///
/// Both fields are optional; an empty value means the lookup was skipped,
/// failed, or the edition simply has no such data.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EditionDetail {
    pub publisher: Option<String>,
    pub pages: Option<u64>,
}

impl EditionDetail {
    pub fn editorial(&self) -> String {
        self.publisher
            .clone()
            .unwrap_or_else(|| NO_EDITORIAL.to_string())
    }

    pub fn pages(&self) -> Pages {
        match self.pages {
            Some(count) => Pages::Count(count),
            None => Pages::not_available(),
        }
    }
}
