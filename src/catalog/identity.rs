use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Placeholder shown when neither the listing nor the edition lookup knows the
/// page count.
pub const PAGES_NOT_AVAILABLE: &str = "Not Available";

/// Identifier of a cached book.
///
/// Normally the Open Library edition key (`OL123M`); works without one get a
/// synthetic `OL<index>M` derived from their position in the listing.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub String);

impl BookId {
    /// Synthetic id for the work at `index` in the raw listing.
    pub fn synthetic(index: usize) -> Self {
        BookId(format!("OL{index}M"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        BookId(value.to_string())
    }
}

/// Page count of a cached book.
///
/// Edition lookups produce numbers while the edit form and the fallback
/// literal produce text, so both shapes are kept as-is in the store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Pages {
    Count(u64),
    Text(String),
}

impl Pages {
    pub fn not_available() -> Self {
        Pages::Text(PAGES_NOT_AVAILABLE.to_string())
    }
}

impl fmt::Display for Pages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pages::Count(count) => write!(f, "{count}"),
            Pages::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for Pages {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Pages::Count(count) => serializer.serialize_u64(*count),
            Pages::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for Pages {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(number) => match number.as_u64() {
                Some(count) => Pages::Count(count),
                None => Pages::Text(number.to_string()),
            },
            Value::String(text) => Pages::Text(text),
            Value::Null => Pages::not_available(),
            other => Pages::Text(other.to_string()),
        })
    }
}
