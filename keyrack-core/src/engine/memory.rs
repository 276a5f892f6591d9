//! In-memory engine for testing.
//!
//! This implementation is NOT a secure store — records live in plain process
//! memory. It exists to exercise the store facade in unit and integration
//! tests without a platform keychain, and it mimics the observable behavior
//! of one: namespace/sharing-group partitioning, insertion-order enumeration,
//! duplicate-item and not-found statuses, engine-stamped timestamps, and the
//! quirk where a namespace-wide delete removes a single record unless the
//! query asks for all matches. Metadata written as empty strings reads back
//! as absent, so entries with unset fields round-trip unchanged.

// Test-support code; lock poisoning is a panic, not an error to surface.
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::significant_drop_tightening)]

use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};

use crate::entry::SecretBytes;
use crate::store::Protection;

use super::{
    AddRequest, EngineCapabilities, EngineReply, EngineStatus, KeyAttr, MatchLimit, Query,
    RawAttributes, SecureEngine, WriteAttributes,
};

/// One stored generic-password record.
#[derive(Debug, Clone)]
struct StoredRecord {
    namespace: String,
    sharing_group: Option<String>,
    key: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    account: String,
    description: String,
    label: String,
    notes: String,
    secret: Option<SecretBytes>,
    synchronizable: Option<bool>,
    protection: Protection,
}

impl StoredRecord {
    fn matches(&self, query: &Query) -> bool {
        self.namespace == query.namespace
            && self.sharing_group == query.sharing_group
            && query.key.as_deref().is_none_or(|key| key == self.key)
    }

    fn to_attributes(&self, query: &Query) -> RawAttributes {
        RawAttributes {
            // Handed back as bytes, the way platforms with the key-as-data
            // quirk return it; decoding exercises the text resolution path.
            key: Some(KeyAttr::Bytes(self.key.clone().into_bytes())),
            created_at: Some(self.created_at),
            modified_at: Some(self.modified_at),
            account: Self::non_empty(&self.account),
            description: Self::non_empty(&self.description),
            label: Self::non_empty(&self.label),
            notes: Self::non_empty(&self.notes),
            secret: if query.return_secret {
                self.secret.clone()
            } else {
                None
            },
            synchronizable: self.synchronizable,
        }
    }

    /// Metadata the store writes as empty strings reads back as absent, so an
    /// entry with unset fields round-trips to an equal entry.
    fn non_empty(value: &str) -> Option<String> {
        if value.is_empty() {
            None
        } else {
            Some(value.to_owned())
        }
    }

    fn apply(&mut self, attributes: &WriteAttributes) {
        self.account = attributes.account.clone();
        self.description = attributes.description.clone();
        self.label = attributes.label.clone();
        self.notes = attributes.notes.clone();
        self.secret = attributes.secret.clone();
        if let Some(sync) = attributes.synchronizable {
            self.synchronizable = Some(sync);
        }
        self.modified_at = Utc::now();
    }
}

/// In-memory reference engine.
///
/// Thread-safe; records are kept in insertion order, which is the order
/// query-for-all replies enumerate them in. By default it accepts every
/// protection level, supports the sync flag, and declares the
/// match-all-delete quirk so the store's quirk path gets exercised.
#[derive(Debug)]
pub struct MemoryEngine {
    records: RwLock<Vec<StoredRecord>>,
    injected: Mutex<Option<EngineStatus>>,
    capabilities: EngineCapabilities,
}

impl MemoryEngine {
    /// Creates an empty engine with the default capability set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(EngineCapabilities {
            delete_needs_match_all: true,
            ..EngineCapabilities::all()
        })
    }

    /// Creates an empty engine declaring `capabilities`, for exercising
    /// restricted targets.
    #[must_use]
    pub fn with_capabilities(capabilities: EngineCapabilities) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            injected: Mutex::new(None),
            capabilities,
        }
    }

    /// Number of stored records, across all namespaces.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Removes every record.
    pub fn clear(&self) {
        self.records.write().unwrap().clear();
    }

    /// Makes the next primitive call report `status` without touching the
    /// records. One-shot; the call after that behaves normally again.
    pub fn fail_next(&self, status: EngineStatus) {
        *self.injected.lock().unwrap() = Some(status);
    }

    /// Protection level stamped on the record stored under `key`, if any.
    #[must_use]
    pub fn protection_of(&self, key: &str) -> Option<Protection> {
        self.records
            .read()
            .unwrap()
            .iter()
            .find(|record| record.key == key)
            .map(|record| record.protection)
    }

    fn take_injected(&self) -> Option<EngineStatus> {
        self.injected.lock().unwrap().take()
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureEngine for MemoryEngine {
    fn capabilities(&self) -> EngineCapabilities {
        self.capabilities.clone()
    }

    fn query_one(&self, query: &Query) -> EngineReply<RawAttributes> {
        if let Some(status) = self.take_injected() {
            return EngineReply::status_only(status);
        }
        let records = self.records.read().unwrap();
        records.iter().find(|record| record.matches(query)).map_or(
            EngineReply::status_only(EngineStatus::ITEM_NOT_FOUND),
            |record| EngineReply {
                status: EngineStatus::SUCCESS,
                payload: query.return_attributes.then(|| record.to_attributes(query)),
            },
        )
    }

    fn query_all(&self, query: &Query) -> EngineReply<Vec<RawAttributes>> {
        if let Some(status) = self.take_injected() {
            return EngineReply::status_only(status);
        }
        let records = self.records.read().unwrap();
        let items: Vec<RawAttributes> = records
            .iter()
            .filter(|record| record.matches(query))
            .map(|record| record.to_attributes(query))
            .collect();
        if items.is_empty() {
            EngineReply::status_only(EngineStatus::ITEM_NOT_FOUND)
        } else {
            EngineReply::success(items)
        }
    }

    fn add(&self, request: &AddRequest) -> EngineStatus {
        if let Some(status) = self.take_injected() {
            return status;
        }
        let Some(key) = request.query.key.clone() else {
            return EngineStatus::INVALID_PARAMETER;
        };
        let mut records = self.records.write().unwrap();
        if records.iter().any(|record| record.matches(&request.query)) {
            return EngineStatus::DUPLICATE_ITEM;
        }
        let now = Utc::now();
        records.push(StoredRecord {
            namespace: request.query.namespace.clone(),
            sharing_group: request.query.sharing_group.clone(),
            key,
            created_at: now,
            modified_at: now,
            account: request.attributes.account.clone(),
            description: request.attributes.description.clone(),
            label: request.attributes.label.clone(),
            notes: request.attributes.notes.clone(),
            secret: request.attributes.secret.clone(),
            synchronizable: request.attributes.synchronizable,
            protection: request.protection,
        });
        EngineStatus::SUCCESS
    }

    fn update(&self, query: &Query, attributes: &WriteAttributes) -> EngineStatus {
        if let Some(status) = self.take_injected() {
            return status;
        }
        let mut records = self.records.write().unwrap();
        let mut touched = false;
        for record in records.iter_mut().filter(|record| record.matches(query)) {
            record.apply(attributes);
            touched = true;
        }
        if touched {
            EngineStatus::SUCCESS
        } else {
            EngineStatus::ITEM_NOT_FOUND
        }
    }

    fn delete(&self, query: &Query) -> EngineStatus {
        if let Some(status) = self.take_injected() {
            return status;
        }
        let mut records = self.records.write().unwrap();
        match query.limit {
            MatchLimit::All => {
                let before = records.len();
                records.retain(|record| !record.matches(query));
                if records.len() == before {
                    EngineStatus::ITEM_NOT_FOUND
                } else {
                    EngineStatus::SUCCESS
                }
            }
            MatchLimit::One => records
                .iter()
                .position(|record| record.matches(query))
                .map_or(EngineStatus::ITEM_NOT_FOUND, |index| {
                    records.remove(index);
                    EngineStatus::SUCCESS
                }),
        }
    }
}
