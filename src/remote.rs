//! Open Library client.
//!
//! Two read-only calls: the fiction subject listing, and a per-edition lookup
//! for publisher and page count. The listing fails loudly; edition lookups are
//! best effort and collapse every failure into an empty `EditionDetail`.

use crate::catalog::model::{EditionDetail, RawWork, SubjectListing};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::Value;
use std::time::{Duration, Instant};

pub const DEFAULT_API_BASE: &str = "https://openlibrary.org";
pub const SUBJECT: &str = "fiction";
/// Number of works requested from the subject listing.
pub const SUBJECT_LIMIT: usize = 50;

/// Source of raw catalog data the builder pulls from.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Raw work entries of the subject listing.
    async fn fetch_subject_works(&self) -> Result<Vec<RawWork>>;

    /// Publisher and page count for one edition.
    ///
    /// A missing or empty key returns an empty detail without any request.
    /// Implementations never fail: a lookup that cannot be completed is an
    /// empty detail.
    async fn fetch_work_detail(&self, edition_key: Option<&str>) -> EditionDetail;
}

/// HTTP client for the public Open Library API.
#[derive(Clone, Debug)]
pub struct OpenLibraryClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl OpenLibraryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Client with an optional per-request timeout. Without one, a hung
    /// request waits indefinitely.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("bookcache/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn subject_url(&self) -> String {
        format!(
            "{}/subjects/{SUBJECT}.json?limit={SUBJECT_LIMIT}",
            self.base_url
        )
    }

    pub fn detail_url(&self, edition_key: &str) -> String {
        format!(
            "{}/api/books?bibkeys=OLID:{edition_key}&format=json&jscmd=data",
            self.base_url
        )
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let start = Instant::now();
        debug!("GET {url}");
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?
            .error_for_status()
            .with_context(|| format!("unexpected status from {url}"))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        debug!(
            "GET {url} -> {} bytes in {}ms",
            body.len(),
            start.elapsed().as_millis()
        );
        Ok(body.to_vec())
    }

    async fn try_fetch_detail(&self, edition_key: &str) -> Result<EditionDetail> {
        let body = self.get_bytes(&self.detail_url(edition_key)).await?;
        let data: Value =
            serde_json::from_slice(&body).context("edition lookup is not valid JSON")?;
        Ok(parse_edition_detail(&data, edition_key))
    }
}

impl CatalogSource for OpenLibraryClient {
    async fn fetch_subject_works(&self) -> Result<Vec<RawWork>> {
        let body = self.get_bytes(&self.subject_url()).await?;
        parse_subject_listing(&body)
    }

    async fn fetch_work_detail(&self, edition_key: Option<&str>) -> EditionDetail {
        let Some(key) = edition_key.filter(|key| !key.is_empty()) else {
            return EditionDetail::default();
        };
        match self.try_fetch_detail(key).await {
            Ok(detail) => detail,
            Err(err) => {
                warn!("no details for edition {key}: {err:#}");
                EditionDetail::default()
            }
        }
    }
}

/// Parse the subject listing body into its work entries.
pub fn parse_subject_listing(body: &[u8]) -> Result<Vec<RawWork>> {
    let listing: SubjectListing =
        serde_json::from_slice(body).context("subject listing is not a works payload")?;
    Ok(listing.works)
}

/// Pull publisher and page count for `edition_key` out of a `jscmd=data`
/// response. Missing entries, empty names and zero page counts count as
/// absent.
pub fn parse_edition_detail(data: &Value, edition_key: &str) -> EditionDetail {
    let Some(book) = data.get(format!("OLID:{edition_key}")) else {
        return EditionDetail::default();
    };
    let publisher = book
        .get("publishers")
        .and_then(|publishers| publishers.get(0))
        .and_then(|first| first.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let pages = book
        .get("number_of_pages")
        .and_then(Value::as_u64)
        .filter(|count| *count > 0);
    EditionDetail { publisher, pages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn urls_match_open_library_endpoints() {
        let client = OpenLibraryClient::new("https://openlibrary.org/").unwrap();
        assert_eq!(
            client.subject_url(),
            "https://openlibrary.org/subjects/fiction.json?limit=50"
        );
        assert_eq!(
            client.detail_url("OL7353617M"),
            "https://openlibrary.org/api/books?bibkeys=OLID:OL7353617M&format=json&jscmd=data"
        );
    }

    #[test]
    fn listing_requires_works_array() {
        let works = parse_subject_listing(
            br#"{"name": "fiction", "works": [{"title": "Emma", "cover_edition_key": "OL1M"}]}"#,
        )
        .unwrap();
        assert_eq!(works.len(), 1);
        assert_eq!(works[0].title.as_deref(), Some("Emma"));

        assert!(parse_subject_listing(br#"{"name": "fiction"}"#).is_err());
        assert!(parse_subject_listing(b"<html>busy</html>").is_err());
    }

    #[test]
    fn edition_detail_reads_first_publisher_and_pages() {
        let data = json!({
            "OLID:OL1M": {
                "publishers": [{"name": "Penguin"}, {"name": "Other"}],
                "number_of_pages": 352
            }
        });
        let detail = parse_edition_detail(&data, "OL1M");
        assert_eq!(detail.publisher.as_deref(), Some("Penguin"));
        assert_eq!(detail.pages, Some(352));
    }

    #[test]
    fn edition_detail_missing_entry_is_empty() {
        let data = json!({});
        assert_eq!(parse_edition_detail(&data, "OL1M"), EditionDetail::default());

        let partial = json!({"OLID:OL1M": {"publishers": [], "number_of_pages": 0}});
        assert_eq!(
            parse_edition_detail(&partial, "OL1M"),
            EditionDetail::default()
        );
    }

    #[tokio::test]
    async fn empty_key_skips_the_request() {
        // Unroutable base: any request would fail, but none is made.
        let client = OpenLibraryClient::new("http://127.0.0.1:9").unwrap();
        assert_eq!(client.fetch_work_detail(None).await, EditionDetail::default());
        assert_eq!(
            client.fetch_work_detail(Some("")).await,
            EditionDetail::default()
        );
    }

    #[tokio::test]
    async fn failed_lookup_is_swallowed() {
        let client = OpenLibraryClient::new("http://127.0.0.1:9").unwrap();
        let detail = client.fetch_work_detail(Some("OL1M")).await;
        assert_eq!(detail.editorial(), "No Editorial Info");
        assert_eq!(detail.pages, None);
    }
}
