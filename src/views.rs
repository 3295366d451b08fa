//! List, detail and edit views over the cached catalog.
//!
//! Each operation reads the store fresh; edits and deletes write the whole
//! list back. Views are plain data so the binary can print them as text or
//! JSON.

use crate::catalog::{BookId, BookRecord, BookStore, Pages};
use crate::pages::PageMode;
use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Serialize;
use std::fmt;

pub const NO_DATA_MESSAGE: &str = "No book data available. Please reload the app.";
pub const NOT_FOUND_MESSAGE: &str = "Book not found!";
pub const UPDATED_MESSAGE: &str = "Book details updated!";

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ListEntry {
    pub id: BookId,
    pub label: String,
    pub detail_link: String,
    pub edit_link: String,
}

impl ListEntry {
    fn for_book(book: &BookRecord) -> Self {
        Self {
            id: book.id.clone(),
            label: book.label(),
            detail_link: format!("item.html?id={}", book.id),
            edit_link: format!("edit.html?id={}", book.id),
        }
    }
}

/// Every cached book in stored order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ListView {
    pub entries: Vec<ListEntry>,
}

pub fn list_view<B: BookStore + ?Sized>(store: &B) -> ListView {
    ListView {
        entries: store.get().iter().map(ListEntry::for_book).collect(),
    }
}

/// Result of looking a book up for the detail page.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailView {
    Found { book: BookRecord },
    NoData { message: String },
    NotFound { message: String },
}

pub fn detail_view<B: BookStore + ?Sized>(store: &B, id: &BookId) -> DetailView {
    let books = store.get();
    if let Some(book) = books.iter().find(|book| &book.id == id) {
        return DetailView::Found { book: book.clone() };
    }
    if books.is_empty() {
        DetailView::NoData {
            message: NO_DATA_MESSAGE.to_string(),
        }
    } else {
        DetailView::NotFound {
            message: NOT_FOUND_MESSAGE.to_string(),
        }
    }
}

/// The four editable fields, as the edit form holds them.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EditForm {
    pub title: String,
    pub author: String,
    pub editorial: String,
    pub pages: String,
}

impl EditForm {
    pub fn prefilled(book: &BookRecord) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            editorial: book.editorial.clone(),
            pages: book.pages.to_string(),
        }
    }

    /// Form with the given fields overwritten.
    pub fn with_changes(mut self, changes: &EditFields) -> Self {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(author) = &changes.author {
            self.author = author.clone();
        }
        if let Some(editorial) = &changes.editorial {
            self.editorial = editorial.clone();
        }
        if let Some(pages) = &changes.pages {
            self.pages = pages.clone();
        }
        self
    }
}

/// Field values typed into the edit form; `None` leaves a field as shown.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EditFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub editorial: Option<String>,
    pub pages: Option<String>,
}

impl EditFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.editorial.is_none()
            && self.pages.is_none()
    }
}

/// User-facing message followed by navigation to another page.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Alert {
    pub message: String,
    pub redirect: PageMode,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditOutcome {
    Form { id: BookId, form: EditForm },
    Abort { alert: Alert },
}

/// Pre-fill the edit form, or send the user back to the list.
pub fn edit_prefill<B: BookStore + ?Sized>(store: &B, id: &BookId) -> EditOutcome {
    match store.get().iter().find(|book| &book.id == id) {
        Some(book) => EditOutcome::Form {
            id: id.clone(),
            form: EditForm::prefilled(book),
        },
        None => EditOutcome::Abort {
            alert: Alert {
                message: NOT_FOUND_MESSAGE.to_string(),
                redirect: PageMode::List,
            },
        },
    }
}

/// Save the form over the matching record.
///
/// Only the four form fields of records with `id` change; the list is
/// written back in the same order even when nothing matched.
pub fn submit_edit<B: BookStore + ?Sized>(
    store: &B,
    id: &BookId,
    form: &EditForm,
) -> Result<Alert> {
    let books: Vec<BookRecord> = store
        .get()
        .into_iter()
        .map(|book| {
            if &book.id == id {
                BookRecord {
                    id: book.id,
                    title: form.title.clone(),
                    author: form.author.clone(),
                    editorial: form.editorial.clone(),
                    pages: Pages::Text(form.pages.clone()),
                }
            } else {
                book
            }
        })
        .collect();
    store.set(&books).context("saving edited book")?;
    debug!("saved edits for {id}");
    Ok(Alert {
        message: UPDATED_MESSAGE.to_string(),
        redirect: PageMode::List,
    })
}

/// Remove every record with `id` and return the refreshed list.
///
/// The catalog must already be stored.
pub fn delete_book<B: BookStore + ?Sized>(store: &B, id: &BookId) -> Result<ListView> {
    let books = store
        .load()?
        .ok_or_else(|| anyhow!("no catalog stored; load the list page first"))?;
    let before = books.len();
    let remaining: Vec<BookRecord> = books.into_iter().filter(|book| &book.id != id).collect();
    store.set(&remaining).context("saving catalog after delete")?;
    debug!("deleted {} record(s) for {id}", before - remaining.len());
    Ok(list_view(store))
}

impl fmt::Display for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "{}\t{}\t[{}] [{}]",
                entry.id, entry.label, entry.detail_link, entry.edit_link
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailView::Found { book } => {
                writeln!(f, "{}", book.title)?;
                writeln!(f, "Author: {}", book.author)?;
                writeln!(f, "Editorial: {}", book.editorial)?;
                writeln!(f, "Pages: {}", book.pages)
            }
            DetailView::NoData { message } | DetailView::NotFound { message } => {
                writeln!(f, "{message}")
            }
        }
    }
}

impl fmt::Display for EditForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "title: {}", self.title)?;
        writeln!(f, "author: {}", self.author)?;
        writeln!(f, "editorial: {}", self.editorial)?;
        writeln!(f, "pages: {}", self.pages)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        writeln!(f, "-> {}", self.redirect.as_str())
    }
}

impl fmt::Display for EditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOutcome::Form { form, .. } => fmt::Display::fmt(form, f),
            EditOutcome::Abort { alert } => fmt::Display::fmt(alert, f),
        }
    }
}
