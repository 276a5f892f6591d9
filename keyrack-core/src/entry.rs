//! The secret record: one named credential with metadata.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::engine::{KeyAttr, RawAttributes};
use crate::error::EntryError;

/// Secret payload bytes.
///
/// Zeroized on drop. The `Debug` representation reveals only the length so a
/// payload can never leak through logs or assertion output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    /// Wraps raw bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes(<{} bytes redacted>)", self.0.len())
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// One named secret record with metadata.
///
/// The key and the two timestamps form the record's immutable identity: the
/// key is fixed at construction, and the timestamps reflect what the engine
/// recorded (or "now" for a freshly minted entry that has not been persisted
/// yet). Metadata, the secret payload, and the sync flag are plain public
/// fields the caller decorates before persisting.
///
/// Entries are never mutated by the store. A store write reads the entry's
/// fields; a store read builds a new entry from the engine's attributes.
#[derive(Debug, Clone)]
pub struct SecretEntry {
    key: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    /// Account name for this record, if any.
    pub account: Option<String>,
    /// Free-form description, if any.
    pub description: Option<String>,
    /// Display label, if any.
    pub label: Option<String>,
    /// Notes attached to the record, if any.
    pub notes: Option<String>,
    /// Secret payload, if any. Store reads leave this unset unless the secret
    /// was explicitly requested.
    pub secret: Option<SecretBytes>,
    /// Whether the engine should replicate this record across the owner's
    /// devices. Defaults to `false`.
    pub synchronizable: bool,
}

impl SecretEntry {
    /// Creates a fresh entry with the given key and both timestamps set to
    /// now.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::InvalidKey`] when the key is empty or
    /// whitespace-only after trimming.
    pub fn new(key: impl Into<String>) -> Result<Self, EntryError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(EntryError::InvalidKey);
        }
        let now = Utc::now();
        Ok(Self {
            key,
            created_at: now,
            modified_at: now,
            account: None,
            description: None,
            label: None,
            notes: None,
            secret: None,
            synchronizable: false,
        })
    }

    /// Reconstructs an entry from an engine attribute set.
    ///
    /// The identifying key may arrive as text or as raw UTF-8 bytes; both
    /// forms are accepted. Every other field is optional — absence leaves the
    /// entry field unset (or `false` for the sync flag) and no validation is
    /// applied to metadata contents.
    ///
    /// # Errors
    ///
    /// - [`EntryError::EmptyAttributes`] when the set carries no fields.
    /// - [`EntryError::InvalidKey`] when the key attribute is absent, not
    ///   decodable as text, or empty/whitespace-only.
    /// - [`EntryError::MissingCreationTimestamp`] /
    ///   [`EntryError::MissingModificationTimestamp`] when those attributes
    ///   are absent.
    pub fn from_raw_attributes(attrs: RawAttributes) -> Result<Self, EntryError> {
        if attrs.is_empty() {
            return Err(EntryError::EmptyAttributes);
        }
        let key = match attrs.key.as_ref().and_then(KeyAttr::as_text) {
            Some(text) if !text.trim().is_empty() => text.to_owned(),
            _ => return Err(EntryError::InvalidKey),
        };
        let created_at = attrs.created_at.ok_or(EntryError::MissingCreationTimestamp)?;
        let modified_at = attrs
            .modified_at
            .ok_or(EntryError::MissingModificationTimestamp)?;
        Ok(Self {
            key,
            created_at,
            modified_at,
            account: attrs.account,
            description: attrs.description,
            label: attrs.label,
            notes: attrs.notes,
            secret: attrs.secret,
            synchronizable: attrs.synchronizable.unwrap_or(false),
        })
    }

    /// The identifying key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// When the record was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the record was last modified.
    #[must_use]
    pub const fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

/// Entry equality compares the key, account, description, and label only —
/// two entries are "the same logical credential" even when their notes,
/// secret bytes, sync flag, or timestamps differ. An absent field equals an
/// absent field; absent and present differ.
impl PartialEq for SecretEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.account == other.account
            && self.description == other.description
            && self.label == other.label
    }
}

impl Eq for SecretEntry {}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use test_case::test_case;

    use super::*;

    fn full_attrs() -> RawAttributes {
        RawAttributes {
            key: Some(KeyAttr::Bytes(b"key1".to_vec())),
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            modified_at: Some(Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap()),
            account: Some("account1".to_owned()),
            description: Some("a description".to_owned()),
            label: Some("label1".to_owned()),
            notes: Some("some notes".to_owned()),
            secret: Some(SecretBytes::from(b"the data".as_slice())),
            synchronizable: Some(true),
        }
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "spaces")]
    #[test_case(" \r\n\t  "; "mixed whitespace")]
    fn new_rejects_blank_keys(key: &str) {
        assert_eq!(SecretEntry::new(key).unwrap_err(), EntryError::InvalidKey);
    }

    #[test]
    fn new_sets_identity() {
        let entry = SecretEntry::new("key1").unwrap();
        assert_eq!(entry.key(), "key1");
        assert_eq!(entry.created_at(), entry.modified_at());
        assert!(entry.account.is_none());
        assert!(entry.secret.is_none());
        assert!(!entry.synchronizable);
    }

    #[test]
    fn decode_rejects_empty_attribute_set() {
        let err = SecretEntry::from_raw_attributes(RawAttributes::default()).unwrap_err();
        assert_eq!(err, EntryError::EmptyAttributes);
    }

    #[test]
    fn decode_rejects_missing_key() {
        let attrs = RawAttributes {
            key: None,
            ..full_attrs()
        };
        let err = SecretEntry::from_raw_attributes(attrs).unwrap_err();
        assert_eq!(err, EntryError::InvalidKey);
    }

    #[test_case(KeyAttr::Text(" \r\n\t  ".to_owned()); "whitespace text")]
    #[test_case(KeyAttr::Bytes(b" \r\n\t  ".to_vec()); "whitespace bytes")]
    #[test_case(KeyAttr::Bytes(vec![0xC0, 0xAF]); "invalid utf8 bytes")]
    fn decode_rejects_unusable_keys(key: KeyAttr) {
        let attrs = RawAttributes {
            key: Some(key),
            ..full_attrs()
        };
        let err = SecretEntry::from_raw_attributes(attrs).unwrap_err();
        assert_eq!(err, EntryError::InvalidKey);
    }

    #[test]
    fn decode_rejects_missing_timestamps() {
        let attrs = RawAttributes {
            created_at: None,
            ..full_attrs()
        };
        let err = SecretEntry::from_raw_attributes(attrs).unwrap_err();
        assert_eq!(err, EntryError::MissingCreationTimestamp);

        let attrs = RawAttributes {
            modified_at: None,
            ..full_attrs()
        };
        let err = SecretEntry::from_raw_attributes(attrs).unwrap_err();
        assert_eq!(err, EntryError::MissingModificationTimestamp);
    }

    #[test]
    fn decode_accepts_both_key_forms() {
        let from_bytes = SecretEntry::from_raw_attributes(full_attrs()).unwrap();
        assert_eq!(from_bytes.key(), "key1");

        let attrs = RawAttributes {
            key: Some(KeyAttr::Text("key1".to_owned())),
            ..full_attrs()
        };
        let from_text = SecretEntry::from_raw_attributes(attrs).unwrap();
        assert_eq!(from_text.key(), "key1");
        assert_eq!(from_bytes, from_text);
    }

    #[test]
    fn decode_takes_timestamps_verbatim() {
        let entry = SecretEntry::from_raw_attributes(full_attrs()).unwrap();
        assert_eq!(
            entry.created_at(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            entry.modified_at(),
            Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap()
        );
        assert_eq!(entry.account.as_deref(), Some("account1"));
        assert_eq!(entry.notes.as_deref(), Some("some notes"));
        assert_eq!(
            entry.secret.as_ref().map(SecretBytes::as_bytes),
            Some(b"the data".as_slice())
        );
        assert!(entry.synchronizable);
    }

    #[test]
    fn decode_leaves_absent_fields_unset() {
        let attrs = RawAttributes {
            account: None,
            description: None,
            label: None,
            notes: None,
            secret: None,
            synchronizable: None,
            ..full_attrs()
        };
        let entry = SecretEntry::from_raw_attributes(attrs).unwrap();
        assert!(entry.account.is_none());
        assert!(entry.secret.is_none());
        assert!(!entry.synchronizable);
    }

    #[test]
    fn equality_ignores_notes_secret_sync_and_timestamps() {
        let mut a = SecretEntry::new("key1").unwrap();
        a.account = Some("account1".to_owned());
        a.label = Some("label1".to_owned());
        a.notes = Some("notes a".to_owned());
        a.secret = Some(SecretBytes::from(b"secret a".as_slice()));

        let b = SecretEntry::from_raw_attributes(RawAttributes {
            key: Some(KeyAttr::Text("key1".to_owned())),
            account: Some("account1".to_owned()),
            label: Some("label1".to_owned()),
            notes: Some("entirely different notes".to_owned()),
            secret: None,
            synchronizable: Some(true),
            description: None,
            ..full_attrs()
        })
        .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn equality_compares_key_account_description_label() {
        let base = SecretEntry::new("key1").unwrap();

        let mut other = base.clone();
        other.account = Some("account1".to_owned());
        // one absent, one present
        assert_ne!(base, other);

        let different_key = SecretEntry::new("key2").unwrap();
        assert_ne!(base, different_key);

        let mut left = base.clone();
        let mut right = base.clone();
        left.description = Some("x".to_owned());
        right.description = Some("y".to_owned());
        assert_ne!(left, right);

        // both absent counts as equal
        assert_eq!(base, base.clone());
    }

    #[test]
    fn secret_bytes_debug_is_redacted() {
        let secret = SecretBytes::from(b"hunter2".as_slice());
        let rendered = format!("{secret:?}");
        assert_eq!(rendered, "SecretBytes(<7 bytes redacted>)");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn secret_bytes_compare_by_contents() {
        let a = SecretBytes::from(b"same".as_slice());
        let b = SecretBytes::new(b"same".to_vec());
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        assert!(!a.is_empty());
        assert_ne!(a, SecretBytes::from(b"other".as_slice()));
    }
}
