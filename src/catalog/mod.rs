//! Book catalog wiring.
//!
//! `model` and `identity` describe the cached records and the raw listing they
//! come from, `builder` turns a listing into the ten-book catalog, and
//! `repository` is the local store the catalog is kept in.

pub mod builder;
pub mod identity;
pub mod model;
pub mod repository;

pub use builder::{
    CATALOG_SIZE, MAX_TITLE_CHARS, build_catalog, refresh_catalog, select_records, title_length,
};
pub use identity::{BookId, PAGES_NOT_AVAILABLE, Pages};
pub use model::{
    BookRecord, EditionDetail, NO_EDITORIAL, RawAuthor, RawWork, SubjectListing, UNKNOWN_AUTHOR,
};
pub use repository::{BookStore, FileStore, MemoryStore, STORE_KEY};
