//! Chart cache model and store trait.
//!
//! Two collections back the cache:
//!
//! - `natal_charts` - keyed by the birth fingerprint, written once, never expires
//! - `daily_charts` - keyed by natal key plus reference date, valid for that date only
//!
//! A [`CacheDocument`] stores each top-level bundle field as its own JSON
//! string so that a single oversized field is visible in isolation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::{self, Debug};

use crate::error::{ChartError, Result};
use crate::zodiac::round_to;

/// Number of hex characters kept from the SHA-256 digest.
const KEY_HEX_LEN: usize = 16;

/// Which tier a cache document belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    /// Birth-invariant data.
    Natal,
    /// Data valid for one reference date.
    Daily,
}

impl CacheCategory {
    /// Collection name in the backing store.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Natal => "natal_charts",
            Self::Daily => "daily_charts",
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Birth fingerprint recorded alongside a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BirthFingerprint {
    /// Local birth date.
    pub birth_date: NaiveDate,
    /// Local birth time.
    pub birth_time: NaiveTime,
    /// Latitude rounded to four decimals.
    pub latitude: f64,
    /// Longitude rounded to four decimals.
    pub longitude: f64,
}

impl BirthFingerprint {
    /// Creates a fingerprint, rounding coordinates to four decimals.
    #[must_use]
    pub fn new(birth_date: NaiveDate, birth_time: NaiveTime, latitude: f64, longitude: f64) -> Self {
        Self {
            birth_date,
            birth_time,
            latitude: round_to(latitude, 4),
            longitude: round_to(longitude, 4),
        }
    }

    /// Content hash of the fingerprint, used as the natal document key.
    #[must_use]
    pub fn natal_key(&self) -> String {
        short_sha256(&format!(
            "{}|{}|{:.4}|{:.4}",
            self.birth_date,
            self.birth_time.format("%H:%M:%S"),
            self.latitude,
            self.longitude
        ))
    }
}

/// Key of the daily document for a natal key and reference date.
#[must_use]
pub fn daily_key(natal_key: &str, reference_date: NaiveDate) -> String {
    short_sha256(&format!("{natal_key}|{reference_date}"))
}

fn short_sha256(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(KEY_HEX_LEN);
    hex
}

/// One stored document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    /// Content-hash key.
    pub key: String,
    /// Tier.
    pub category: CacheCategory,
    /// Top-level bundle fields, each serialized as a JSON string.
    pub fields: BTreeMap<String, String>,
    /// When the document was first written.
    pub created_at: DateTime<Utc>,
    /// Birth fingerprint the document was derived from.
    pub birth: BirthFingerprint,
    /// Reference date, daily documents only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
    /// Natal key the daily document depends on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natal_key: Option<String>,
}

impl CacheDocument {
    /// Builds a natal document from any struct-shaped bundle.
    ///
    /// # Errors
    /// Returns an error if the bundle does not serialize to a JSON object.
    pub fn natal<T: Serialize>(key: String, birth: BirthFingerprint, bundle: &T) -> Result<Self> {
        Ok(Self {
            key,
            category: CacheCategory::Natal,
            fields: split_fields(bundle)?,
            created_at: Utc::now(),
            birth,
            reference_date: None,
            natal_key: None,
        })
    }

    /// Builds a daily document from any struct-shaped bundle.
    ///
    /// # Errors
    /// Returns an error if the bundle does not serialize to a JSON object.
    pub fn daily<T: Serialize>(
        key: String,
        natal_key: String,
        reference_date: NaiveDate,
        birth: BirthFingerprint,
        bundle: &T,
    ) -> Result<Self> {
        Ok(Self {
            key,
            category: CacheCategory::Daily,
            fields: split_fields(bundle)?,
            created_at: Utc::now(),
            birth,
            reference_date: Some(reference_date),
            natal_key: Some(natal_key),
        })
    }

    /// Reassembles the stored fields into a bundle.
    ///
    /// # Errors
    /// Returns [`ChartError::Serialization`] if a field is missing or malformed.
    pub fn bundle<T: DeserializeOwned>(&self) -> Result<T> {
        let mut object = serde_json::Map::with_capacity(self.fields.len());
        for (name, json) in &self.fields {
            object.insert(name.clone(), serde_json::from_str(json)?);
        }
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }

    /// Approximate stored size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.fields.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Returns `true` when this daily document is valid for `date`.
    #[must_use]
    pub fn is_valid_for(&self, date: NaiveDate) -> bool {
        match self.category {
            CacheCategory::Natal => true,
            CacheCategory::Daily => self.reference_date == Some(date),
        }
    }
}

fn split_fields<T: Serialize>(bundle: &T) -> Result<BTreeMap<String, String>> {
    match serde_json::to_value(bundle)? {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| Ok((k, serde_json::to_string(&v)?)))
            .collect(),
        other => Err(ChartError::Cache(format!(
            "Bundle must serialize to an object, got {}",
            json_kind(&other)
        ))),
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Trait for persisting chart documents.
///
/// Implementations can store documents in various backends (SQLite,
/// in-memory, a remote document service, etc.).
#[async_trait]
pub trait ChartStore: Send + Sync + Debug {
    /// Retrieves a document.
    ///
    /// Returns `Ok(Some(doc))` if stored, `Ok(None)` if not.
    async fn get(&self, category: CacheCategory, key: &str) -> Result<Option<CacheDocument>>;

    /// Stores a document.
    ///
    /// Natal documents are insert-if-absent; daily documents replace.
    async fn put(&self, document: &CacheDocument) -> Result<()>;

    /// Removes daily documents whose reference date is before `cutoff`.
    ///
    /// Returns the number of documents removed.
    async fn remove_daily_before(&self, cutoff: NaiveDate) -> Result<usize>;

    /// Clears all stored documents.
    async fn clear(&self) -> Result<()>;
}
