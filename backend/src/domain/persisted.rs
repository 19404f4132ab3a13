//! Versioned persisted layout shared by the desk managers.
//!
//! Every stored document is wrapped in an envelope:
//!
//! ```json
//! { "version": 1, "data": <payload> }
//! ```
//!
//! Decoding distinguishes corrupt documents from documents written by a newer
//! schema. Neither is fatal during hydration: the owning manager falls back to
//! its defaults and the failure is recorded in a [`HydrationReport`].

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::ports::{KeyValueStore, StoreError, StoreKey};

/// Schema version written into every envelope.
pub const SCHEMA_VERSION: u64 = 1;

/// Why a stored document could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The envelope or its payload has the wrong shape.
    Corrupt {
        /// Decoder error text.
        message: String,
    },
    /// The envelope was written by an unknown schema version.
    UnsupportedVersion {
        /// Version this build reads.
        expected: u64,
        /// Version found in the store.
        found: u64,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupt { message } => write!(f, "corrupt document: {message}"),
            Self::UnsupportedVersion { expected, found } => {
                write!(f, "unsupported schema version {found} (expected {expected})")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Wrap `data` in the current envelope.
pub fn encode<T: Serialize>(data: &T) -> Result<Value, serde_json::Error> {
    Ok(json!({ "version": SCHEMA_VERSION, "data": serde_json::to_value(data)? }))
}

/// Unwrap and deserialise an envelope.
///
/// # Examples
/// ```
/// use complaint_desk::domain::persisted::{DecodeError, decode};
/// use serde_json::json;
///
/// let theme: String = decode(json!({ "version": 1, "data": "dark" })).unwrap();
/// assert_eq!(theme, "dark");
/// assert_eq!(
///     decode::<String>(json!({ "version": 7, "data": "dark" })),
///     Err(DecodeError::UnsupportedVersion { expected: 1, found: 7 })
/// );
/// ```
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    let Value::Object(mut envelope) = value else {
        return Err(DecodeError::Corrupt {
            message: "expected an envelope object".to_owned(),
        });
    };
    let found = envelope
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| DecodeError::Corrupt {
            message: "missing numeric version".to_owned(),
        })?;
    if found != SCHEMA_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            expected: SCHEMA_VERSION,
            found,
        });
    }
    let data = envelope.remove("data").ok_or_else(|| DecodeError::Corrupt {
        message: "missing data".to_owned(),
    })?;
    serde_json::from_value(data).map_err(|err| DecodeError::Corrupt {
        message: err.to_string(),
    })
}

/// Category of a hydration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationIssueKind {
    /// The store could not be read.
    LoadFailed {
        /// Store error text.
        message: String,
    },
    /// The stored document was malformed.
    Corrupt {
        /// Decoder error text.
        message: String,
    },
    /// The stored document uses an unknown schema version.
    UnsupportedVersion {
        /// Version this build reads.
        expected: u64,
        /// Version found in the store.
        found: u64,
    },
    /// Defaults were seeded but could not be written back.
    SeedNotPersisted {
        /// Store error text.
        message: String,
    },
}

impl From<DecodeError> for HydrationIssueKind {
    fn from(value: DecodeError) -> Self {
        match value {
            DecodeError::Corrupt { message } => Self::Corrupt { message },
            DecodeError::UnsupportedVersion { expected, found } => {
                Self::UnsupportedVersion { expected, found }
            }
        }
    }
}

impl From<StoreError> for HydrationIssueKind {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Corrupt { message, .. } => Self::Corrupt { message },
            StoreError::Backend { message } => Self::LoadFailed { message },
        }
    }
}

/// One key that could not be hydrated as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationIssue {
    /// Key that failed.
    pub key: StoreKey,
    /// What went wrong with it.
    pub kind: HydrationIssueKind,
}

/// Failures recovered from while hydrating the desk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
    issues: Vec<HydrationIssue>,
}

impl HydrationReport {
    /// Whether every key hydrated cleanly.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Recorded issues, in hydration order.
    pub fn issues(&self) -> &[HydrationIssue] {
        &self.issues
    }

    /// Issue recorded for `key`, if any.
    pub fn issue_for(&self, key: StoreKey) -> Option<&HydrationIssueKind> {
        self.issues
            .iter()
            .find(|issue| issue.key == key)
            .map(|issue| &issue.kind)
    }

    pub(crate) fn record(&mut self, key: StoreKey, kind: impl Into<HydrationIssueKind>) {
        let kind = kind.into();
        warn!(key = %key, issue = ?kind, "hydration fell back to defaults");
        self.issues.push(HydrationIssue { key, kind });
    }
}

/// Outcome of reading one key during hydration.
#[derive(Debug)]
pub(crate) enum Hydrated<T> {
    Absent,
    Loaded(T),
    Recovered,
}

/// Read and decode `key`, recording any failure in `report`.
pub(crate) async fn hydrate_key<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: StoreKey,
    report: &mut HydrationReport,
) -> Hydrated<T> {
    match store.load(key).await {
        Ok(None) => Hydrated::Absent,
        Ok(Some(value)) => match decode(value) {
            Ok(data) => Hydrated::Loaded(data),
            Err(err) => {
                report.record(key, err);
                Hydrated::Recovered
            }
        },
        Err(err) => {
            report.record(key, err);
            Hydrated::Recovered
        }
    }
}

fn map_store_error(key: StoreKey, error: StoreError) -> Error {
    Error::service_unavailable(format!("could not persist {key}: {error}"))
}

/// Encode and save `data` under `key`.
pub(crate) async fn persist<T: Serialize>(
    store: &dyn KeyValueStore,
    key: StoreKey,
    data: &T,
) -> Result<(), Error> {
    let value = encode(data)
        .map_err(|err| Error::internal(format!("failed to encode {key}: {err}")))?;
    store
        .save(key, &value)
        .await
        .map_err(|err| map_store_error(key, err))?;
    debug!(key = %key, "persisted");
    Ok(())
}

/// Delete `key` from the store.
pub(crate) async fn forget(store: &dyn KeyValueStore, key: StoreKey) -> Result<(), Error> {
    store
        .remove(key)
        .await
        .map_err(|err| map_store_error(key, err))?;
    debug!(key = %key, "removed");
    Ok(())
}
