//! The store facade: typed CRUD against the secure-storage engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::engine::{
    AddRequest, EngineCapabilities, EngineReply, MatchLimit, Query, SecureEngine, WriteAttributes,
};
use crate::entry::SecretEntry;
use crate::error::{StoreError, StoreResult};

/// Policy governing when a stored secret is accessible.
///
/// The wire names are the camel-case forms (`"whenUnlocked"`,
/// `"afterFirstUnlockThisDeviceOnly"`, ...), both for parsing and for serde.
/// A deployment target may accept only a subset of these; the accepted subset
/// is declared by the engine's capability set, and store construction
/// validates against it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Protection {
    /// Accessible after the first unlock following a restart.
    AfterFirstUnlock,
    /// Accessible after the first unlock; never leaves this device.
    AfterFirstUnlockThisDeviceOnly,
    /// Always accessible.
    Always,
    /// Accessible only while the device has a passcode set; never leaves this
    /// device.
    WhenPasscodeSetThisDeviceOnly,
    /// Always accessible; never leaves this device.
    AlwaysThisDeviceOnly,
    /// Accessible while the device is unlocked.
    WhenUnlocked,
    /// Accessible while the device is unlocked; never leaves this device.
    #[default]
    WhenUnlockedThisDeviceOnly,
}

impl Protection {
    /// Parses a camel-case wire name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidProtectionLevel`] carrying the offending
    /// name when it matches no level.
    pub fn from_name(name: &str) -> StoreResult<Self> {
        name.parse()
            .map_err(|_| StoreError::InvalidProtectionLevel(name.to_owned()))
    }
}

/// Connection parameters shared read-only by every operation of a store.
///
/// Immutable once the store is constructed. Validation happens at
/// [`SecretStore::new`], where the engine's capability set is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    namespace: String,
    sharing_group: Option<String>,
    protection: Protection,
}

impl StoreConfig {
    /// Configuration for `namespace` — typically an application identifier —
    /// with no sharing group and the default protection level.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            sharing_group: None,
            protection: Protection::default(),
        }
    }

    /// Sets the cross-application sharing group.
    #[must_use]
    pub fn with_sharing_group(mut self, group: impl Into<String>) -> Self {
        self.sharing_group = Some(group.into());
        self
    }

    /// Sets the protection level stamped on newly added records.
    #[must_use]
    pub const fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }

    /// The service namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The sharing group, if configured.
    #[must_use]
    pub fn sharing_group(&self) -> Option<&str> {
        self.sharing_group.as_deref()
    }

    /// The protection level for newly added records.
    #[must_use]
    pub const fn protection(&self) -> Protection {
        self.protection
    }
}

/// Stateless facade performing CRUD against a secure-storage engine.
///
/// The store holds its validated configuration and the engine, nothing else.
/// Operations are synchronous, issue no retries, and take no locks;
/// concurrent access to the same namespace is governed entirely by the
/// engine's own guarantees. Callers construct and own store instances and
/// pass them where needed — there is no process-wide instance.
///
/// # Example
///
/// ```
/// use keyrack_core::{MemoryEngine, SecretEntry, SecretStore, StoreConfig};
///
/// let store = SecretStore::new(MemoryEngine::new(), StoreConfig::new("com.example.demo"))?;
///
/// let mut entry = SecretEntry::new("api-token")?;
/// entry.account = Some("ci".to_owned());
/// entry.secret = Some(b"hunter2".as_slice().into());
/// store.set(&entry)?;
///
/// let found = store.find("api-token", true)?.expect("just stored");
/// assert_eq!(found, entry);
/// # Ok::<(), keyrack_core::StoreError>(())
/// ```
#[derive(Debug)]
pub struct SecretStore<E: SecureEngine> {
    config: StoreConfig,
    capabilities: EngineCapabilities,
    engine: E,
}

impl<E: SecureEngine> SecretStore<E> {
    /// Creates a store over `engine`, validating `config` once.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidNamespace`] — namespace empty or
    ///   whitespace-only.
    /// - [`StoreError::InvalidSharingGroup`] — sharing group present but
    ///   empty or whitespace-only.
    /// - [`StoreError::InvalidProtectionLevel`] — configured level not in the
    ///   engine's accepted set.
    pub fn new(engine: E, config: StoreConfig) -> StoreResult<Self> {
        if config.namespace.trim().is_empty() {
            return Err(StoreError::InvalidNamespace);
        }
        if let Some(group) = &config.sharing_group {
            if group.trim().is_empty() {
                return Err(StoreError::InvalidSharingGroup);
            }
        }
        let capabilities = engine.capabilities();
        if !capabilities.accepts_protection(config.protection) {
            return Err(StoreError::InvalidProtectionLevel(
                config.protection.to_string(),
            ));
        }
        Ok(Self {
            config,
            capabilities,
            engine,
        })
    }

    /// The store's validated configuration.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Every query starts from the namespace (and sharing group, when
    /// configured); operations adjust the rest.
    fn base_query(&self) -> Query {
        Query {
            namespace: self.config.namespace.clone(),
            sharing_group: self.config.sharing_group.clone(),
            key: None,
            return_attributes: false,
            return_secret: false,
            limit: MatchLimit::One,
        }
    }

    fn key_query(&self, key: &str) -> Query {
        let mut query = self.base_query();
        query.key = Some(key.to_owned());
        query
    }

    /// Returns the entry stored under `key`, or `None` when there is none.
    ///
    /// The secret payload is fetched only when `include_secret` is set;
    /// leaving it off makes retrieval cheaper. A success reply whose payload
    /// cannot be rendered as attributes counts as "nothing usable found" and
    /// also returns `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] for any status other than success or
    /// not-found, and propagates entry decoding failures.
    pub fn find(&self, key: &str, include_secret: bool) -> StoreResult<Option<SecretEntry>> {
        let mut query = self.key_query(key);
        query.return_attributes = true;
        query.return_secret = include_secret;
        let reply = self.engine.query_one(&query);
        debug!(operation = "find", key, status = %reply.status, "engine replied");
        match reply {
            EngineReply {
                status,
                payload: Some(attrs),
            } if status.is_success() => Ok(Some(SecretEntry::from_raw_attributes(attrs)?)),
            EngineReply { status, .. } if status.is_success() || status.is_not_found() => Ok(None),
            EngineReply { status, .. } => Err(StoreError::Engine(status)),
        }
    }

    /// Returns whether an entry is stored under `key`.
    ///
    /// The probe requests neither attributes nor secret data.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] for any status other than success or
    /// not-found.
    pub fn exists(&self, key: &str) -> StoreResult<bool> {
        let query = self.key_query(key);
        let reply = self.engine.query_one(&query);
        debug!(operation = "exists", key, status = %reply.status, "engine replied");
        if reply.status.is_success() {
            Ok(true)
        } else if reply.status.is_not_found() {
            Ok(false)
        } else {
            Err(StoreError::Engine(reply.status))
        }
    }

    /// Writes `entry` to the store, updating the record under its key when
    /// one exists and adding it otherwise.
    ///
    /// Metadata fields the entry does not carry are written as empty strings,
    /// so an update replaces the full metadata set. The sync flag is written
    /// only on engines that support it, and a fresh add is stamped with the
    /// configured protection level.
    ///
    /// The existence probe and the write are two separate engine calls, not
    /// an atomic upsert: a concurrent writer on the same namespace can make
    /// the second call report duplicate-item (add raced an insert) or
    /// not-found (update raced a delete). Either status is surfaced verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] for any non-success write status, or
    /// for a failing existence probe.
    pub fn set(&self, entry: &SecretEntry) -> StoreResult<()> {
        let query = self.key_query(entry.key());
        let attributes = WriteAttributes {
            account: entry.account.clone().unwrap_or_default(),
            description: entry.description.clone().unwrap_or_default(),
            label: entry.label.clone().unwrap_or_default(),
            notes: entry.notes.clone().unwrap_or_default(),
            secret: entry.secret.clone(),
            synchronizable: self
                .capabilities
                .synchronizable
                .then_some(entry.synchronizable),
        };
        let status = if self.exists(entry.key())? {
            self.engine.update(&query, &attributes)
        } else {
            let request = AddRequest {
                query,
                protection: self.config.protection,
                attributes,
            };
            self.engine.add(&request)
        };
        debug!(operation = "set", key = entry.key(), status = %status, "engine replied");
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Engine(status))
        }
    }

    /// Returns every entry in the store's namespace, in the engine's own
    /// order, or `None` when the namespace is empty.
    ///
    /// An empty namespace is always `None`, never an empty vector. The
    /// secret payloads are fetched only when `include_secret` is set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] for any status other than success or
    /// not-found. A single malformed record aborts the whole call with the
    /// entry decoding failure.
    pub fn find_all(&self, include_secret: bool) -> StoreResult<Option<Vec<SecretEntry>>> {
        let mut query = self.base_query();
        query.return_attributes = true;
        query.return_secret = include_secret;
        query.limit = MatchLimit::All;
        let reply = self.engine.query_all(&query);
        debug!(operation = "find_all", status = %reply.status, "engine replied");
        match reply {
            EngineReply {
                status,
                payload: Some(items),
            } if status.is_success() => {
                let entries = items
                    .into_iter()
                    .map(SecretEntry::from_raw_attributes)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(entries))
            }
            EngineReply { status, .. } if status.is_success() || status.is_not_found() => Ok(None),
            EngineReply { status, .. } => Err(StoreError::Engine(status)),
        }
    }

    /// Removes the entry stored under `key`.
    ///
    /// Removing an absent key is not an error; the operation is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] for any status other than success or
    /// not-found.
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        let query = self.key_query(key);
        let status = self.engine.delete(&query);
        debug!(operation = "remove", key, status = %status, "engine replied");
        if status.is_success() || status.is_not_found() {
            Ok(())
        } else {
            Err(StoreError::Engine(status))
        }
    }

    /// Removes every entry in the store's namespace.
    ///
    /// On engines whose delete primitive would otherwise stop at one record,
    /// the query carries an explicit all-matches limit. Removing from an
    /// empty namespace is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] for any status other than success or
    /// not-found.
    pub fn remove_all(&self) -> StoreResult<()> {
        let mut query = self.base_query();
        if self.capabilities.delete_needs_match_all {
            query.limit = MatchLimit::All;
        }
        let status = self.engine.delete(&query);
        debug!(operation = "remove_all", status = %status, "engine replied");
        if status.is_success() || status.is_not_found() {
            Ok(())
        } else {
            Err(StoreError::Engine(status))
        }
    }
}
