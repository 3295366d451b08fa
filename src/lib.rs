//! Shared library for the bookcache client.
//!
//! The crate fetches fiction titles from Open Library, keeps ten of them in a
//! local key/value file, and renders list, detail and edit views over that
//! cache. The binary is a thin shell around [`run_page`]; everything it does
//! is reachable from here so tests can drive it with an in-memory store and a
//! scripted catalog source.

pub mod catalog;
pub mod pages;
pub mod remote;
pub mod runtime;
pub mod views;

pub use catalog::{
    BookId, BookRecord, BookStore, CATALOG_SIZE, EditionDetail, FileStore, MAX_TITLE_CHARS,
    MemoryStore, NO_EDITORIAL, PAGES_NOT_AVAILABLE, Pages, RawAuthor, RawWork, STORE_KEY,
    UNKNOWN_AUTHOR, build_catalog, refresh_catalog, select_records, title_length,
};
pub use pages::{PageMode, PageOutcome, PageRequest, run_page};
pub use remote::{CatalogSource, DEFAULT_API_BASE, OpenLibraryClient};
pub use runtime::{Overrides, Settings, init_logging};
pub use views::{
    Alert, DetailView, EditFields, EditForm, EditOutcome, ListEntry, ListView, delete_book,
    detail_view, edit_prefill, list_view, submit_edit,
};

