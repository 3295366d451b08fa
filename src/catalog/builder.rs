//! Builds the ten-book catalog from the subject listing.
//!
//! Every listed work gets an edition lookup, issued together and joined before
//! selection. Works with titles longer than `MAX_TITLE_CHARS` are dropped; if
//! that leaves fewer than `CATALOG_SIZE` books, the filtered set is thrown away
//! and the first `CATALOG_SIZE` raw works are used instead, without edition
//! data.

use crate::catalog::identity::Pages;
use crate::catalog::model::{BookRecord, EditionDetail, NO_EDITORIAL, RawWork};
use crate::catalog::repository::BookStore;
use crate::remote::CatalogSource;
use anyhow::{Context, Result};
use futures_util::future::join_all;
use log::{debug, info};

/// Number of books kept in the cache.
pub const CATALOG_SIZE: usize = 10;
/// Longest title accepted by the filtered pass, in UTF-16 code units.
pub const MAX_TITLE_CHARS: usize = 20;

/// Fetch the listing plus edition details and select the catalog.
pub async fn build_catalog<S: CatalogSource>(source: &S) -> Result<Vec<BookRecord>> {
    let works = source
        .fetch_subject_works()
        .await
        .context("fetching subject listing")?;
    debug!("subject listing returned {} works", works.len());

    let details = join_all(
        works
            .iter()
            .map(|work| source.fetch_work_detail(work.edition_key())),
    )
    .await;

    Ok(select_records(&works, &details))
}

/// Build, then replace the stored catalog with the result.
///
/// Nothing is written when the listing cannot be fetched.
pub async fn refresh_catalog<S, B>(source: &S, store: &B) -> Result<Vec<BookRecord>>
where
    S: CatalogSource,
    B: BookStore + ?Sized,
{
    let books = build_catalog(source).await?;
    store.set(&books).context("storing catalog")?;
    info!("cached {} books", books.len());
    Ok(books)
}

/// Selection policy over already-fetched data.
///
/// `details[i]` belongs to `works[i]`; missing entries count as empty.
pub fn select_records(works: &[RawWork], details: &[EditionDetail]) -> Vec<BookRecord> {
    let empty = EditionDetail::default();
    let mut books: Vec<BookRecord> = works
        .iter()
        .enumerate()
        .filter_map(|(index, work)| {
            let detail = details.get(index).unwrap_or(&empty);
            candidate(index, work, detail)
        })
        .collect();

    if books.len() < CATALOG_SIZE {
        debug!(
            "only {} short titles, using the first {CATALOG_SIZE} works as listed",
            books.len()
        );
        books = works
            .iter()
            .take(CATALOG_SIZE)
            .enumerate()
            .map(|(index, work)| unfiltered(index, work))
            .collect();
    }

    books.truncate(CATALOG_SIZE);
    books
}

fn candidate(index: usize, work: &RawWork, detail: &EditionDetail) -> Option<BookRecord> {
    let title = work
        .title
        .as_deref()
        .filter(|title| title_length(title) <= MAX_TITLE_CHARS)?;
    Some(BookRecord {
        id: work.book_id(index),
        title: title.to_string(),
        author: work.first_author(),
        editorial: detail.editorial(),
        pages: detail.pages(),
    })
}

/// Title length as browsers measure it: characters outside the BMP count
/// twice.
pub fn title_length(title: &str) -> usize {
    title.encode_utf16().count()
}

fn unfiltered(index: usize, work: &RawWork) -> BookRecord {
    BookRecord {
        id: work.book_id(index),
        title: work.title.clone().unwrap_or_default(),
        author: work.first_author(),
        editorial: NO_EDITORIAL.to_string(),
        pages: Pages::not_available(),
    }
}
