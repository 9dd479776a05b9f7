//! Configuration module for traceit
//!
//! Handles locating, loading and validating settings from YAML files and
//! environment variables.

mod settings;

pub use settings::*;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "TRACEIT_CONFIG";

/// Settings together with the file they came from
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// `None` when running on defaults
    pub path: Option<PathBuf>,
}

/// Load settings from an explicit path or the usual locations
///
/// Lookup order: explicit path, `TRACEIT_CONFIG`, `./config.yaml`,
/// `~/.trace/config.yaml`. An explicit path that does not exist is an error;
/// missing default locations just fall through to built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<LoadedSettings> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
        return load_from(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return load_from(&path);
        }
    }

    for path in default_locations() {
        if path.exists() {
            return load_from(&path);
        }
    }

    let mut settings = Settings::default();
    settings.merge_env();
    settings.validate()?;
    Ok(LoadedSettings {
        settings,
        path: None,
    })
}

fn load_from(path: &Path) -> Result<LoadedSettings> {
    let mut settings = Settings::from_file(path)?;
    settings.merge_env();
    settings.validate()?;
    Ok(LoadedSettings {
        settings,
        path: Some(path.to_path_buf()),
    })
}

/// Default config file locations, in lookup order
pub fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config.yaml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".trace").join("config.yaml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "afs:\n  root_path: /custom/afs/path").unwrap();

        let loaded = load(Some(file.path())).unwrap();
        assert_eq!(loaded.settings.afs.root_path, "/custom/afs/path");
        assert_eq!(loaded.path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(load(Some(Path::new("/nonexistent/traceit/config.yaml"))).is_err());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "afs: [unclosed").unwrap();
        assert!(load(Some(file.path())).is_err());
    }
}
