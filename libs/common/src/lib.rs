//! Common library for the publish intake
//!
//! This crate provides shared functionality used by the intake services,
//! including the persisted preference store, layered configuration and
//! error handling.
//!
//! ```rust,no_run
//! use common::config::IntakeConfig;
//! use common::preferences::{FilePreferenceStore, PreferenceStore, USER_OPTIMIZE_KEY};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IntakeConfig::from_env()?;
//!     let store = FilePreferenceStore::new(&config.preferences_path);
//!     store.set_bool(USER_OPTIMIZE_KEY, true).await?;
//!     println!("Optimize: {:?}", store.get_bool(USER_OPTIMIZE_KEY).await?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod preferences;

pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
