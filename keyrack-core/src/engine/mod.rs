//! The secure-storage engine boundary.
//!
//! The store never talks to the platform's secure storage directly; it goes
//! through [`SecureEngine`], a trait exposing the store's five primitives:
//! query-for-one, query-for-all, add, update, and delete. Each primitive
//! reports an [`EngineStatus`] and, for the queries, an optional typed
//! payload.
//!
//! Everything crossing the boundary is typed. Queries are [`Query`] values,
//! results are [`RawAttributes`] — an explicit tagged structure standing in
//! for whatever string-keyed dictionary the native store uses. The one
//! platform quirk that leaks through, an identifying key returned either as
//! text or as raw UTF-8 bytes, is modeled once as [`KeyAttr`] and resolved to
//! text before entry decoding sees it.
//!
//! Engines differ in what they accept; [`EngineCapabilities`] declares the
//! accepted protection levels and optional write fields so the store can omit
//! what a target does not support instead of branching on platform identity.
//!
//! [`MemoryEngine`] is the in-memory reference engine, published for unit and
//! integration testing.

pub mod memory;
mod status;

pub use memory::MemoryEngine;
pub use status::EngineStatus;

use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;

use crate::entry::SecretBytes;
use crate::store::Protection;

/// How many matching records a query asks the engine to consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchLimit {
    /// Stop at the first matching record.
    #[default]
    One,
    /// Consider every matching record.
    All,
}

/// A match query against the engine's generic-password records.
///
/// Every query the store builds carries the store's namespace, and the
/// sharing group when one is configured. The generic-password item class is
/// implicit in the trait: an engine stores nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Service namespace the records belong to.
    pub namespace: String,
    /// Cross-application sharing group, when the store is configured with one.
    pub sharing_group: Option<String>,
    /// Identifying key; `None` makes the query namespace-wide.
    pub key: Option<String>,
    /// Whether the reply should carry the matched record's attributes.
    pub return_attributes: bool,
    /// Whether the reply should carry the matched record's secret bytes.
    pub return_secret: bool,
    /// How many matching records the engine should consider.
    pub limit: MatchLimit,
}

/// The identifying key attribute in whichever representation the platform
/// produced.
///
/// Some targets hand the key back as text, others as the raw bytes it was
/// stored as. The choice is resolved here, once, instead of being re-checked
/// wherever attributes are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAttr {
    /// The key came back as text.
    Text(String),
    /// The key came back as raw bytes expected to hold UTF-8.
    Bytes(Vec<u8>),
}

impl KeyAttr {
    /// Resolves the attribute to text.
    ///
    /// Returns `None` when the bytes form does not hold valid UTF-8.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
        }
    }
}

/// One record's attributes as returned by the engine.
///
/// Absent fields stay `None`; the store decides which absences matter when it
/// decodes an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAttributes {
    /// Identifying key, in whichever representation the platform produced.
    pub key: Option<KeyAttr>,
    /// When the record was added to the store.
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last modified.
    pub modified_at: Option<DateTime<Utc>>,
    /// Account name attached to the record.
    pub account: Option<String>,
    /// Free-form description attached to the record.
    pub description: Option<String>,
    /// Display label attached to the record.
    pub label: Option<String>,
    /// Notes attached to the record.
    pub notes: Option<String>,
    /// Secret payload, present when the query asked for it.
    pub secret: Option<SecretBytes>,
    /// Whether the record replicates across the owner's devices.
    pub synchronizable: Option<bool>,
}

impl RawAttributes {
    /// Returns `true` when no field is set at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.key.is_none()
            && self.created_at.is_none()
            && self.modified_at.is_none()
            && self.account.is_none()
            && self.description.is_none()
            && self.label.is_none()
            && self.notes.is_none()
            && self.secret.is_none()
            && self.synchronizable.is_none()
    }
}

/// Replacement attribute values for an update, or the value portion of an add.
///
/// Metadata fields are plain strings; the store writes an empty string for a
/// metadata field its entry does not carry, so an update always replaces the
/// full metadata set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteAttributes {
    /// Account name; empty when the entry has none.
    pub account: String,
    /// Free-form description; empty when the entry has none.
    pub description: String,
    /// Display label; empty when the entry has none.
    pub label: String,
    /// Notes; empty when the entry has none.
    pub notes: String,
    /// Secret payload to store, if any.
    pub secret: Option<SecretBytes>,
    /// Sync flag; `None` when the engine lacks the capability and the field
    /// must stay out of the write entirely.
    pub synchronizable: Option<bool>,
}

/// A full add request: the identifying query extended with the protection
/// level and the new record's attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    /// Single-key query identifying the record to create.
    pub query: Query,
    /// Protection level stamped on the new record.
    pub protection: Protection,
    /// Attribute values for the new record.
    pub attributes: WriteAttributes,
}

/// Status-plus-payload reply from a query primitive.
#[derive(Debug, Clone)]
pub struct EngineReply<T> {
    /// Status the engine reported.
    pub status: EngineStatus,
    /// Result payload; `None` when the engine produced nothing usable, even
    /// on a success status.
    pub payload: Option<T>,
}

impl<T> EngineReply<T> {
    /// A reply carrying a status and no payload.
    #[must_use]
    pub const fn status_only(status: EngineStatus) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    /// A successful reply carrying a payload.
    #[must_use]
    pub const fn success(payload: T) -> Self {
        Self {
            status: EngineStatus::SUCCESS,
            payload: Some(payload),
        }
    }
}

/// What a concrete engine accepts.
///
/// The store reads this once at construction: it validates the configured
/// protection level against `protection_levels`, omits the sync flag from
/// writes unless `synchronizable` is set, and adds an explicit all-matches
/// limit to namespace-wide deletes when `delete_needs_match_all` demands it.
#[derive(Debug, Clone)]
pub struct EngineCapabilities {
    /// Protection levels this engine accepts.
    pub protection_levels: Vec<Protection>,
    /// Whether the sync flag may be written.
    pub synchronizable: bool,
    /// Whether a namespace-wide delete must ask for all matches explicitly to
    /// remove more than one record.
    pub delete_needs_match_all: bool,
}

impl EngineCapabilities {
    /// Capabilities accepting every protection level, with sync support and
    /// no delete quirk.
    #[must_use]
    pub fn all() -> Self {
        Self {
            protection_levels: Protection::iter().collect(),
            synchronizable: true,
            delete_needs_match_all: false,
        }
    }

    /// Returns whether `protection` is in the accepted set.
    #[must_use]
    pub fn accepts_protection(&self, protection: Protection) -> bool {
        self.protection_levels.contains(&protection)
    }
}

/// The secure-storage engine the store performs CRUD against.
///
/// Implementations are opaque key/attribute stores: they hold
/// generic-password records, match them against [`Query`] values, and report
/// outcomes as [`EngineStatus`] codes. Statuses are data, not errors — the
/// store classifies them. An implementation must return
/// [`EngineStatus::ITEM_NOT_FOUND`] for queries and deletes that match
/// nothing, and [`EngineStatus::DUPLICATE_ITEM`] for an add whose key already
/// exists; everything else is engine-specific and passes through to the
/// caller verbatim.
pub trait SecureEngine: Send + Sync {
    /// Declares the accepted configuration surface of this engine.
    fn capabilities(&self) -> EngineCapabilities;

    /// Looks up the first record matching `query`.
    ///
    /// The payload is present only when the status is success, the query
    /// asked for attributes, and the record could be rendered as
    /// [`RawAttributes`]; a success with no payload means "nothing usable".
    fn query_one(&self, query: &Query) -> EngineReply<RawAttributes>;

    /// Looks up every record matching `query`, in the engine's own order.
    ///
    /// The order is whatever the engine provides; callers must not assume it
    /// is sorted.
    fn query_all(&self, query: &Query) -> EngineReply<Vec<RawAttributes>>;

    /// Creates the record described by `request`.
    fn add(&self, request: &AddRequest) -> EngineStatus;

    /// Replaces the attribute values of the records matching `query`.
    fn update(&self, query: &Query, attributes: &WriteAttributes) -> EngineStatus;

    /// Deletes the records matching `query`, honoring the query's match
    /// limit.
    fn delete(&self, query: &Query) -> EngineStatus;
}

impl<E: SecureEngine + ?Sized> SecureEngine for &E {
    fn capabilities(&self) -> EngineCapabilities {
        (**self).capabilities()
    }

    fn query_one(&self, query: &Query) -> EngineReply<RawAttributes> {
        (**self).query_one(query)
    }

    fn query_all(&self, query: &Query) -> EngineReply<Vec<RawAttributes>> {
        (**self).query_all(query)
    }

    fn add(&self, request: &AddRequest) -> EngineStatus {
        (**self).add(request)
    }

    fn update(&self, query: &Query, attributes: &WriteAttributes) -> EngineStatus {
        (**self).update(query, attributes)
    }

    fn delete(&self, query: &Query) -> EngineStatus {
        (**self).delete(query)
    }
}

impl<E: SecureEngine + ?Sized> SecureEngine for std::sync::Arc<E> {
    fn capabilities(&self) -> EngineCapabilities {
        (**self).capabilities()
    }

    fn query_one(&self, query: &Query) -> EngineReply<RawAttributes> {
        (**self).query_one(query)
    }

    fn query_all(&self, query: &Query) -> EngineReply<Vec<RawAttributes>> {
        (**self).query_all(query)
    }

    fn add(&self, request: &AddRequest) -> EngineStatus {
        (**self).add(request)
    }

    fn update(&self, query: &Query, attributes: &WriteAttributes) -> EngineStatus {
        (**self).update(query, attributes)
    }

    fn delete(&self, query: &Query) -> EngineStatus {
        (**self).delete(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_attr_resolves_text_and_bytes() {
        assert_eq!(KeyAttr::Text("key1".to_owned()).as_text(), Some("key1"));
        assert_eq!(KeyAttr::Bytes(b"key1".to_vec()).as_text(), Some("key1"));
        assert_eq!(KeyAttr::Bytes(vec![0xFF, 0xFE]).as_text(), None);
    }

    #[test]
    fn raw_attributes_default_is_empty() {
        let attrs = RawAttributes::default();
        assert!(attrs.is_empty());

        let attrs = RawAttributes {
            notes: Some("note".to_owned()),
            ..RawAttributes::default()
        };
        assert!(!attrs.is_empty());
    }

    #[test]
    fn capabilities_all_accepts_every_level() {
        let capabilities = EngineCapabilities::all();
        for level in Protection::iter() {
            assert!(capabilities.accepts_protection(level));
        }
    }

    #[test]
    fn restricted_capabilities_reject_unlisted_levels() {
        let capabilities = EngineCapabilities {
            protection_levels: vec![Protection::WhenUnlocked],
            synchronizable: false,
            delete_needs_match_all: false,
        };
        assert!(capabilities.accepts_protection(Protection::WhenUnlocked));
        assert!(!capabilities.accepts_protection(Protection::Always));
    }
}
