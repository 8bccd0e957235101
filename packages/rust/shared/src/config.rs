//! Application configuration for Unsloppable.
//!
//! User config lives at `~/.unsloppable/unsloppable.toml`.
//! CLI flags and `UNSLOPPABLE_*` env vars override config file values,
//! which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnsloppableError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "unsloppable.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".unsloppable";

/// Env var overriding the input directory.
pub const INPUT_DIR_ENV: &str = "UNSLOPPABLE_INPUT_DIR";

/// Env var overriding the output directory.
pub const OUTPUT_DIR_ENV: &str = "UNSLOPPABLE_OUTPUT_DIR";

// ---------------------------------------------------------------------------
// Config structs (matching unsloppable.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the per-company analysis files.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Directory the site is generated into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_input_dir() -> String {
    "analyses".into()
}
fn default_output_dir() -> String {
    "docs".into()
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration, merged from config file + CLI flags/env.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directory holding the per-company analysis files.
    pub input_dir: PathBuf,
    /// Directory the site is generated into.
    pub output_dir: PathBuf,
}

impl BuildConfig {
    /// Merge overrides on top of the file config and validate the result.
    pub fn resolve(
        config: &AppConfig,
        input_override: Option<&Path>,
        output_override: Option<&Path>,
    ) -> Result<Self> {
        let input_dir = match input_override {
            Some(p) => p.to_path_buf(),
            None => expand_home(&config.paths.input_dir)?,
        };
        let output_dir = match output_override {
            Some(p) => p.to_path_buf(),
            None => expand_home(&config.paths.output_dir)?,
        };

        let resolved = Self {
            input_dir,
            output_dir,
        };
        resolved.validate()?;
        Ok(resolved)
    }

    /// Reject configurations that cannot produce a site.
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(UnsloppableError::config("input directory must not be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(UnsloppableError::config("output directory must not be empty"));
        }
        if normalize_path(&self.input_dir) == normalize_path(&self.output_dir) {
            return Err(UnsloppableError::config(format!(
                "output directory {} must differ from the input directory",
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            input_dir: PathBuf::from(&config.paths.input_dir),
            output_dir: PathBuf::from(&config.paths.output_dir),
        }
    }
}

/// Absolute, lexically normalized form of `path` (`.` dropped, `..` applied).
/// Symlinks are not resolved.
fn normalize_path(path: &Path) -> PathBuf {
    use std::path::Component;

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or_else(|| {
                UnsloppableError::config("could not determine home directory")
            })?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.unsloppable/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| UnsloppableError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.unsloppable/unsloppable.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| UnsloppableError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        UnsloppableError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_at(&config_dir()?)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_at(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| UnsloppableError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| UnsloppableError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| UnsloppableError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
