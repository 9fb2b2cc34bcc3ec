//! Configuration for Hearth
//!
//! - Path resolution for settings, data, credentials and the audit log
//! - Persisted user settings

pub mod paths;
pub mod settings;

pub use paths::HearthPaths;
pub use settings::Settings;
