use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use entigen_generate::GenerateOptions;
use entigen_generate::output::write_bytes_atomic;

/// Default settings file name, looked up in the working directory.
pub const SETTINGS_FILE: &str = "entigen.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Project settings as stored in `entigen.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub out_dir: PathBuf,
    pub db_name: String,
    pub generate_routes: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        let defaults = GenerateOptions::default();
        Self {
            out_dir: defaults.out_dir,
            db_name: defaults.db_name,
            generate_routes: defaults.generate_routes,
        }
    }
}

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub out_dir: Option<PathBuf>,
    pub db_name: Option<String>,
    pub no_routes: bool,
}

impl ProjectSettings {
    /// A relative `out_dir` is taken relative to the settings file.
    fn anchored_at(mut self, settings_path: &Path) -> Self {
        if self.out_dir.is_relative() {
            if let Some(parent) = settings_path.parent() {
                if !parent.as_os_str().is_empty() {
                    self.out_dir = parent.join(&self.out_dir);
                }
            }
        }
        self
    }

    pub fn into_options(self, overrides: Overrides) -> GenerateOptions {
        GenerateOptions {
            out_dir: overrides.out_dir.unwrap_or(self.out_dir),
            db_name: overrides.db_name.unwrap_or(self.db_name),
            generate_routes: self.generate_routes && !overrides.no_routes,
        }
    }
}

/// Read settings from `path`, falling back to defaults when it is absent.
pub fn load_settings(path: &Path) -> Result<ProjectSettings, SettingsError> {
    if !path.exists() {
        return Ok(ProjectSettings::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let settings: ProjectSettings =
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(settings.anchored_at(path))
}

/// Write default settings to `path` unless a file is already there.
///
/// Returns `true` when a new file was written.
pub async fn init_settings(path: &Path) -> Result<bool, SettingsError> {
    if path.exists() {
        return Ok(false);
    }

    let encoded = toml::to_string_pretty(&ProjectSettings::default())?;
    write_bytes_atomic(path, encoded.as_bytes())
        .await
        .map_err(|source| SettingsError::Write {
            path: path.display().to_string(),
            source,
        })?;
    Ok(true)
}
