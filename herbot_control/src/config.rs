//! Rig configuration loading for the binary.

use herbot_common::config::{ConfigError, ConfigLoader, RigConfig};
use herbot_common::consts::DEFAULT_CONFIG_PATH;
use std::path::Path;
use tracing::info;

/// Load and validate the rig configuration.
///
/// An explicit path must exist. Without one, `herbot.toml` in the working
/// directory is used when present and built-in defaults otherwise.
pub fn load_rig_config(path: Option<&Path>) -> Result<RigConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            RigConfig::load(path)?
        }
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            match RigConfig::load(default) {
                Ok(config) => {
                    info!("Loaded configuration from {DEFAULT_CONFIG_PATH}");
                    config
                }
                Err(ConfigError::FileNotFound) => {
                    info!("No {DEFAULT_CONFIG_PATH} found; using built-in defaults");
                    RigConfig::default()
                }
                Err(e) => return Err(e),
            }
        }
    };
    config.validate()?;
    Ok(config)
}
