//! Typed facade over a platform generic-password keychain.
//!
//! Callers create, look up, enumerate, update, and delete named secret
//! records without ever touching the native store's query/result dictionary
//! format.
//!
//! # Architecture
//!
//! Three pieces:
//!
//! 1. [`SecretEntry`] — an immutable-identity record mirroring one stored
//!    item: key, timestamps, optional metadata, optional secret payload.
//!
//! 2. [`SecretStore`] — a stateless facade holding the validated connection
//!    parameters (namespace, optional sharing group, default protection
//!    level). It translates typed operations into primitive calls and decodes
//!    results back into entries.
//!
//! 3. [`SecureEngine`] — the trait boundary to the platform's secure storage:
//!    five primitives, each reporting a status code and, for queries, an
//!    optional typed payload. [`MemoryEngine`] implements it in memory for
//!    testing.
//!
//! "Not found" is never an error: lookups return `None` or `false` and
//! deletes of absent records succeed. Validation failures and unexpected
//! engine statuses surface as [`StoreError`].
//!
//! # Example
//!
//! ```
//! use keyrack_core::{MemoryEngine, Protection, SecretEntry, SecretStore, StoreConfig};
//!
//! let config = StoreConfig::new("com.example.app")
//!     .with_protection(Protection::WhenUnlockedThisDeviceOnly);
//! let store = SecretStore::new(MemoryEngine::new(), config)?;
//!
//! let mut entry = SecretEntry::new("api-token")?;
//! entry.account = Some("ci".to_owned());
//! entry.secret = Some(b"hunter2".as_slice().into());
//! store.set(&entry)?;
//!
//! assert!(store.exists("api-token")?);
//! let found = store.find("api-token", true)?.expect("just stored");
//! assert_eq!(
//!     found.secret.as_ref().map(|secret| secret.as_bytes()),
//!     Some(b"hunter2".as_slice())
//! );
//!
//! store.remove("api-token")?;
//! assert!(store.find_all(false)?.is_none());
//! # Ok::<(), keyrack_core::StoreError>(())
//! ```

pub mod engine;
mod entry;
mod error;
mod store;

pub use engine::{EngineStatus, MemoryEngine, SecureEngine};
pub use entry::{SecretBytes, SecretEntry};
pub use error::{EntryError, StoreError, StoreResult};
pub use store::{Protection, SecretStore, StoreConfig};
