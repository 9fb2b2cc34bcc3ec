//! Path management for Hearth
//!
//! ## Path Resolution Order
//!
//! 1. `HEARTH_DATA_DIR` environment variable (if set)
//! 2. The platform data directory from `directories`
//!    (e.g. `~/.local/share/hearth` on Linux)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{HearthError, HearthResult};
use crate::models::HouseholdId;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "HEARTH_DATA_DIR";

/// Every file location Hearth uses
#[derive(Debug, Clone)]
pub struct HearthPaths {
    base_dir: PathBuf,
}

impl HearthPaths {
    /// Resolve the base directory from the environment or the platform
    /// default.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no home directory can be found.
    pub fn new() -> HearthResult<Self> {
        if let Some(custom) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_base_dir(custom));
        }

        let dirs = ProjectDirs::from("", "", "hearth").ok_or_else(|| {
            HearthError::Config("Could not determine a home directory".into())
        })?;
        Ok(Self::with_base_dir(dirs.data_dir()))
    }

    /// Use an explicit base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding one store file per household
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Password hashes of local accounts
    pub fn credentials_file(&self) -> PathBuf {
        self.base_dir.join("credentials.json")
    }

    /// The signed-in user, kept between CLI invocations
    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join("session.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Document store file for one household
    pub fn household_file(&self, household: HouseholdId) -> PathBuf {
        self.data_dir().join(format!("household-{}.json", household.key()))
    }

    /// Create the base and data directories
    pub fn ensure_directories(&self) -> HearthResult<()> {
        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| HearthError::Io(format!("Failed to create data directory: {}", e)))
    }

    /// Whether `hearth init` has run here
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_under_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = HearthPaths::with_base_dir(temp_dir.path());
        let household = HouseholdId::new();

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("settings.json"));
        assert_eq!(
            paths.household_file(household),
            temp_dir
                .path()
                .join("data")
                .join(format!("household-{}.json", household.key()))
        );
    }

    #[test]
    fn test_ensure_directories_and_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let paths = HearthPaths::with_base_dir(temp_dir.path().join("nested"));

        assert!(!paths.is_initialized());
        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().is_dir());
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(DATA_DIR_ENV, temp_dir.path());

        let paths = HearthPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        std::env::remove_var(DATA_DIR_ENV);
    }
}
