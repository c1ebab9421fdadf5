//! Layered configuration loading and saving.
//!
//! Sources are applied lowest priority first:
//!
//! 1. built-in defaults
//! 2. `$CONFIG_DIR/shelf-match/config.toml` (user-wide)
//! 3. `shelf-match.toml` in the working directory
//! 4. `shelf-match.local.toml` in the working directory
//! 5. an explicit `--config` file
//! 6. `SHELF_MATCH_*` environment variables, with `__` between section and key
//!    (`SHELF_MATCH_MATCHING__THRESHOLD=85`)
//!
//! Command-line flags are applied on top by the binary.
//!
//! # Configuration File Format
//!
//! ```toml
//! [input]
//! csv_path = "goodreads_library_export.csv"
//! bookshelf = "to-read"
//!
//! [output]
//! path = "output"
//! format = "markdown"
//!
//! [matching]
//! threshold = 90
//! use_isbn = true
//! require_author_match = false
//!
//! [matching.weights]
//! ratio = 0.15
//! partial_ratio = 0.20
//! token_sort_ratio = 0.25
//! token_set_ratio = 0.40
//!
//! [parallel]
//! enabled = true
//! workers = 5
//! delay_ms = 100
//! single_flight = false
//!
//! [display]
//! show_progress = true
//! color = true
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use super::{Config, ConfigError};

const ENV_PREFIX: &str = "SHELF_MATCH";
const APP_DIR: &str = "shelf-match";
const PROJECT_FILE: &str = "shelf-match.toml";
const LOCAL_FILE: &str = "shelf-match.local.toml";

/// Locate the user-wide config file, if one exists
pub fn find_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join(APP_DIR).join("config.toml");
    path.is_file().then_some(path)
}

/// Load configuration relative to the current working directory
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(e.to_string()))?;
    load_config_from(&cwd, explicit)
}

/// Load configuration with project files resolved against `dir`
///
/// Missing optional files are skipped; a missing explicit file is an error.
/// The result is validated before it is returned.
pub fn load_config_from(dir: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(user_file) = find_config_file() {
        tracing::debug!("Using user config file: {}", user_file.display());
        builder = builder.add_source(config::File::from(user_file).required(false));
    }

    builder = builder
        .add_source(config::File::from(dir.join(PROJECT_FILE)).required(false))
        .add_source(config::File::from(dir.join(LOCAL_FILE)).required(false));

    if let Some(path) = explicit {
        tracing::info!("Using config file: {}", path.display());
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
    }
    std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
}
