/*
 * Operator-level settings of the installation: where the content descriptor
 * lives, where exported galleries and the session snapshot go, and how far a
 * finger has to travel before a touch becomes a drag.
 *
 * Settings are stored as `config.json` in the app's local config directory.
 * The trait-based approach (`ConfigManagerOperations`) keeps the app logic and
 * tests independent of the file system. A missing file means defaults.
 */
use super::path_utils;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_CATALOG_PATH: &str = "data/works.json";
pub const DEFAULT_TOUCH_DRAG_THRESHOLD: f32 = 6.0;

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoProjectDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration file format error: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine project directory for configuration")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog_path: PathBuf,
    pub export_dir: PathBuf,
    // None: the platform's local data directory for the app.
    pub session_store_dir: Option<PathBuf>,
    pub touch_drag_threshold: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            export_dir: PathBuf::from("."),
            session_store_dir: None,
            touch_drag_threshold: DEFAULT_TOUCH_DRAG_THRESHOLD,
        }
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_config(&self, app_name: &str) -> Result<Option<AppConfig>>;
    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()>;
}

pub struct CoreConfigManager {}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {}
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn read_config_file(file_path: &Path) -> Result<Option<AppConfig>> {
    if !file_path.exists() {
        log::debug!("CoreConfigManager: Config file {file_path:?} does not exist.");
        return Ok(None);
    }
    let reader = BufReader::new(File::open(file_path)?);
    let config: AppConfig = serde_json::from_reader(reader)?;
    log::debug!("CoreConfigManager: Loaded config from {file_path:?}.");
    Ok(Some(config))
}

fn write_config_file(file_path: &Path, config: &AppConfig) -> Result<()> {
    let serialized = serde_json::to_string_pretty(config)?;
    fs::write(file_path, serialized)?;
    log::debug!("CoreConfigManager: Saved config to {file_path:?}.");
    Ok(())
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config(&self, app_name: &str) -> Result<Option<AppConfig>> {
        log::trace!("CoreConfigManager: Loading config for app '{app_name}'");
        let config_dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(ConfigError::NoProjectDirectory)?;
        read_config_file(&config_dir.join(CONFIG_FILENAME))
    }

    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()> {
        log::trace!("CoreConfigManager: Saving config for app '{app_name}'");
        let config_dir = path_utils::get_base_app_config_local_dir(app_name)
            .ok_or(ConfigError::NoProjectDirectory)?;
        write_config_file(&config_dir.join(CONFIG_FILENAME), config)
    }
}

/*
 * Loads the config, falling back to defaults when it is absent or unusable.
 * On first run the defaults are written out so there is a file to edit. A
 * broken config file is left in place and must not keep the installation
 * from starting.
 */
pub fn load_or_default(manager: &dyn ConfigManagerOperations, app_name: &str) -> AppConfig {
    match manager.load_config(app_name) {
        Ok(Some(config)) => config,
        Ok(None) => {
            let defaults = AppConfig::default();
            if let Err(e) = manager.save_config(app_name, &defaults) {
                log::warn!("CoreConfigManager: Could not write default config: {e}");
            }
            defaults
        }
        Err(e) => {
            log::warn!("CoreConfigManager: Using default configuration: {e}");
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    // Test helper that keeps the config in a given directory instead of the user's.
    struct TestConfigManager {
        mock_config_dir: PathBuf,
    }

    impl ConfigManagerOperations for TestConfigManager {
        fn load_config(&self, _app_name: &str) -> Result<Option<AppConfig>> {
            read_config_file(&self.mock_config_dir.join(CONFIG_FILENAME))
        }

        fn save_config(&self, _app_name: &str, config: &AppConfig) -> Result<()> {
            write_config_file(&self.mock_config_dir.join(CONFIG_FILENAME), config)
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempdir().unwrap();
        let manager = TestConfigManager {
            mock_config_dir: dir.path().to_path_buf(),
        };
        let config = AppConfig {
            catalog_path: PathBuf::from("/srv/kiosk/works.json"),
            export_dir: PathBuf::from("/srv/kiosk/exports"),
            session_store_dir: Some(PathBuf::from("/srv/kiosk/state")),
            touch_drag_threshold: 12.0,
        };

        manager.save_config("AnyApp", &config).unwrap();
        assert_eq!(manager.load_config("AnyApp").unwrap(), Some(config));
    }

    #[test]
    fn test_missing_config_is_none_and_defaults() {
        let dir = tempdir().unwrap();
        let manager = TestConfigManager {
            mock_config_dir: dir.path().to_path_buf(),
        };
        assert_eq!(manager.load_config("AnyApp").unwrap(), None);
        assert_eq!(load_or_default(&manager, "AnyApp"), AppConfig::default());
        // First run leaves the defaults behind.
        assert_eq!(
            manager.load_config("AnyApp").unwrap(),
            Some(AppConfig::default())
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{ "catalog_path": "content/works.json" }"#,
        )
        .unwrap();
        let manager = TestConfigManager {
            mock_config_dir: dir.path().to_path_buf(),
        };
        let config = load_or_default(&manager, "AnyApp");
        assert_eq!(config.catalog_path, PathBuf::from("content/works.json"));
        assert_eq!(config.touch_drag_threshold, DEFAULT_TOUCH_DRAG_THRESHOLD);
    }

    #[test]
    fn test_corrupt_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "{ not json").unwrap();
        let manager = TestConfigManager {
            mock_config_dir: dir.path().to_path_buf(),
        };
        assert!(matches!(
            manager.load_config("AnyApp"),
            Err(ConfigError::Serde(_))
        ));
        assert_eq!(load_or_default(&manager, "AnyApp"), AppConfig::default());
        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap(),
            "{ not json"
        );
    }
}
