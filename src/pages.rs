//! Page dispatch.
//!
//! A page mode is chosen up front (from the command line) instead of being
//! inferred from what is on screen. `run_page` fires exactly one branch per
//! request: the list page rebuilds the catalog, the others only read and
//! rewrite the cache.

use crate::catalog::{BookId, BookStore, refresh_catalog};
use crate::remote::CatalogSource;
use crate::views::{
    Alert, DetailView, EditFields, EditOutcome, ListView, delete_book, detail_view,
    edit_prefill, list_view, submit_edit,
};
use anyhow::{Result, bail};
use log::error;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMode {
    /// Fetch a fresh catalog and list it.
    List,
    /// Show or save the edit form for one book.
    Edit,
    /// Show one book.
    Detail,
    /// Remove one book, then list what is left.
    Delete,
}

impl PageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageMode::List => "list",
            PageMode::Edit => "edit",
            PageMode::Detail => "detail",
            PageMode::Delete => "delete",
        }
    }

    /// Modes that act on a single book.
    pub fn takes_id(&self) -> bool {
        !matches!(self, PageMode::List)
    }

    pub fn all() -> [PageMode; 4] {
        [
            PageMode::List,
            PageMode::Edit,
            PageMode::Detail,
            PageMode::Delete,
        ]
    }
}

impl TryFrom<&str> for PageMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "list" => Ok(PageMode::List),
            "edit" => Ok(PageMode::Edit),
            "detail" => Ok(PageMode::Detail),
            "delete" => Ok(PageMode::Delete),
            other => bail!("Unknown page: {other}"),
        }
    }
}

impl fmt::Display for PageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PageMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// One page load: the mode, the `id` query value, and any edited fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub mode: PageMode,
    pub id: Option<BookId>,
    pub edits: EditFields,
}

impl PageRequest {
    pub fn new(mode: PageMode) -> Self {
        Self {
            mode,
            id: None,
            edits: EditFields::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<BookId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_edits(mut self, edits: EditFields) -> Self {
        self.edits = edits;
        self
    }

    /// Requested id; an absent one matches no book.
    fn target(&self) -> BookId {
        self.id.clone().unwrap_or_default()
    }
}

/// What a page load produced.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageOutcome {
    List { view: ListView },
    Detail { view: DetailView },
    Edit { view: EditOutcome },
    Alert { alert: Alert },
    /// The list page could not fetch a catalog; the cache was left alone.
    Nothing,
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageOutcome::List { view } => fmt::Display::fmt(view, f),
            PageOutcome::Detail { view } => fmt::Display::fmt(view, f),
            PageOutcome::Edit { view } => fmt::Display::fmt(view, f),
            PageOutcome::Alert { alert } => fmt::Display::fmt(alert, f),
            PageOutcome::Nothing => Ok(()),
        }
    }
}

/// Run one page load against `source` and `store`.
///
/// Only store write failures and deleting from an empty cache are returned as
/// errors; a failed catalog fetch is logged and yields `PageOutcome::Nothing`.
pub async fn run_page<S, B>(request: &PageRequest, source: &S, store: &B) -> Result<PageOutcome>
where
    S: CatalogSource,
    B: BookStore + ?Sized,
{
    match request.mode {
        PageMode::List => match refresh_catalog(source, store).await {
            Ok(_) => Ok(PageOutcome::List {
                view: list_view(store),
            }),
            Err(err) => {
                error!("Error fetching books: {err:#}");
                Ok(PageOutcome::Nothing)
            }
        },
        PageMode::Edit => {
            let id = request.target();
            let prefill = edit_prefill(store, &id);
            match prefill {
                EditOutcome::Form { form, .. } if !request.edits.is_empty() => {
                    let submitted = form.with_changes(&request.edits);
                    let alert = submit_edit(store, &id, &submitted)?;
                    Ok(PageOutcome::Alert { alert })
                }
                view => Ok(PageOutcome::Edit { view }),
            }
        }
        PageMode::Detail => Ok(PageOutcome::Detail {
            view: detail_view(store, &request.target()),
        }),
        PageMode::Delete => Ok(PageOutcome::List {
            view: delete_book(store, &request.target())?,
        }),
    }
}
