//! Configuration module for subflow.
//!
//! This module is split into two sub-modules:
//! - `types`: settings struct, provider ids, and the cache scope triple
//! - `io`: settings file load/save

pub mod io;
pub mod types;

pub use io::{load_settings, save_settings, settings_path};
pub use types::{ProviderConfig, ProviderId, Scope, Settings};
