//! Declutter Core Library
//!
//! This crate provides the engine behind the Declutter element remover: the
//! user picks elements on a page, the engine derives a durable selector for
//! each one, persists the selectors per domain and keeps matching elements
//! hidden as the page mutates.
//!
//! # Architecture
//!
//! Nothing in here touches a concrete DOM or a concrete key-value store. The
//! [`Document`] trait describes the handful of DOM queries the engine needs and
//! [`Storage`] describes the persisted store. The wasm bindings implement both
//! on top of `web-sys` and `chrome.storage.local`; the `html` feature provides
//! a headless [`HtmlDocument`] built on `scraper`.
//!
//! All engine state is synchronous. Every mutation of the rule set returns a
//! [`Flush`] which the caller commits to storage at its own asynchronous
//! boundary.
//!
//! # Modules
//!
//! - `types`: rules, descriptions and the forbidden sentinels
//! - `dom`: the document abstraction
//! - `selector`: durable selector derivation
//! - `describe`: human-readable rule descriptions
//! - `storage`: persistence adapter, export and import
//! - `store`: the per-domain rule store
//! - `applier`: hiding and restoring matched elements
//! - `reconciler`: re-applying rules to inserted subtrees
//! - `controller`: the selection state machine
//! - `session`: one execution context wired together
//! - `coordinator`: host-process messaging
//! - `host`: action icon state for the host process
//! - `config`: runtime configuration

pub mod applier;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod describe;
pub mod dom;
pub mod host;
pub mod reconciler;
pub mod selector;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(feature = "html")]
pub mod html;

#[cfg(all(test, feature = "html"))]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::RemoverConfig;
pub use controller::{Command, Handled, Key, Selection};
pub use coordinator::{dispatch, HostNotice, HostRequest, HostResponse};
pub use dom::{DomError, Document, HostLink, Panel};
pub use host::{is_restricted_url, ActionState};
pub use reconciler::{MutationSource, Reconciler, WatchState};
pub use selector::derive_selector;
pub use session::{resolve_domain_key, EventOutcome, FrameRole, Session};
pub use storage::{export_store, import_store, ImportError, MemoryStorage, Storage, StorageError};
pub use store::{Flush, Loaded, RuleError, RuleStore};
pub use types::{Description, Rule};

#[cfg(feature = "html")]
pub use html::HtmlDocument;
