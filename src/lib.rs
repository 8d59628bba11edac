//! # Recombinant
//!
//! Backend for an LLM chat plugin: browse GitHub and GitLab repositories on
//! behalf of a user, and keep per-user projects and files under plan-based
//! quotas. Usable as a standalone binary or as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! recombinant = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use recombinant::auth::StoreIdentityProvider;
//! use recombinant::config::ProviderConfig;
//! use recombinant::quota::PlanTable;
//! use recombinant::server::{AppState, create_router};
//! use recombinant::store::{SqliteStore, Store};
//! use recombinant::vcs::VcsConnector;
//!
//! let store = SqliteStore::new("./data/recombinant.db").unwrap();
//! store.initialize().unwrap();
//! let store: Arc<dyn Store> = Arc::new(store);
//!
//! let state = Arc::new(AppState {
//!     identity: Arc::new(StoreIdentityProvider::new(store.clone())),
//!     store,
//!     vcs: VcsConnector::new(&ProviderConfig::default()).unwrap(),
//!     plans: PlanTable::default(),
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the admin CLI module. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod quota;
pub mod server;
pub mod store;
pub mod types;
pub mod vcs;
