//! Settings loader.
//!
//! Settings come from an optional YAML file, then environment variables
//! (including a `.env` file in the working directory). Command-line options
//! are applied on top by [`super::MigrationConfig::resolve`].

use crate::error::{ConfigError, MigrateError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::settings::Settings;

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = ".tfstate-mv.yaml";

/// Application directory under the user's configuration directory.
const APP_CONFIG_DIR: &str = "tfstate-mv";

/// Settings file name under [`APP_CONFIG_DIR`].
const APP_CONFIG_FILE: &str = "config.yaml";

/// Environment variable overriding the Terraform executable.
pub const ENV_TERRAFORM_BIN: &str = "TFSTATE_MV_TERRAFORM_BIN";

/// Environment variable overriding state locking.
pub const ENV_LOCK: &str = "TFSTATE_MV_LOCK";

/// Environment variable overriding the concurrency limit.
pub const ENV_CONCURRENCY: &str = "TFSTATE_MV_CONCURRENCY";

/// Loader for migration settings.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Base path for the settings file and `.env` lookups.
    base_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for settings and `.env` lookups.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads settings from `explicit` if given, otherwise from the first
    /// settings file found, otherwise defaults. Environment overrides are
    /// applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, a file cannot be
    /// parsed, or an environment override is malformed.
    pub fn load(&self, explicit: Option<&Path>) -> Result<Settings> {
        let mut settings = match explicit {
            Some(path) => self.load_file(path)?,
            None => match self.find_settings_file() {
                Some(path) => self.load_file(&path)?,
                None => {
                    debug!("No settings file found, using defaults");
                    Settings::default()
                }
            },
        };

        self.load_dotenv()?;
        apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;

        Ok(settings)
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        info!("Loading settings from: {}", path.display());

        if !path.exists() {
            return Err(MigrateError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::parse(
                format!("Failed to read file: {e}"),
                Some(path.display().to_string()),
            )
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<Settings> {
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_yaml::from_str(content).map_err(|e| {
            MigrateError::Config(ConfigError::parse(
                format!("YAML parse error: {e}"),
                source.map(|p| p.display().to_string()),
            ))
        })
    }

    /// Finds the settings file: first in the base directory, then in the
    /// user's configuration directory.
    #[must_use]
    pub fn find_settings_file(&self) -> Option<PathBuf> {
        let local = self.base_dir().join(SETTINGS_FILE);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_CONFIG_DIR).join(APP_CONFIG_FILE))
            .filter(|path| path.exists())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self.base_dir().join(".env");

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                ConfigError::parse(
                    format!("Failed to load .env file: {e}"),
                    Some(env_path.display().to_string()),
                )
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    fn base_dir(&self) -> PathBuf {
        self.base_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Applies environment overrides read through `lookup` onto `settings`.
///
/// # Errors
///
/// Returns an error if a boolean or numeric variable cannot be parsed.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(bin) = lookup(ENV_TERRAFORM_BIN).filter(|v| !v.is_empty()) {
        debug!("Overriding terraform_bin from environment");
        settings.terraform_bin = Some(PathBuf::from(bin));
    }

    if let Some(lock) = lookup(ENV_LOCK) {
        debug!("Overriding lock from environment");
        settings.lock = Some(parse_bool(ENV_LOCK, &lock)?);
    }

    if let Some(concurrency) = lookup(ENV_CONCURRENCY) {
        debug!("Overriding concurrency from environment");
        let value = concurrency.trim().parse::<usize>().map_err(|e| {
            ConfigError::parse(format!("{ENV_CONCURRENCY}='{concurrency}': {e}"), None)
        })?;
        settings.concurrency = Some(value);
    }

    Ok(())
}

/// Parses a boolean the way command-line flags accept them.
fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MigrateError::Config(ConfigError::parse(
            format!("{name}='{value}' is not a boolean"),
            None,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_parse_settings() {
        let yaml = r"
terraform_bin: /usr/local/bin/terraform
working_dir: infra/prod
lock: false
concurrency: 4
";
        let settings = ConfigLoader::new().parse_yaml(yaml, None).unwrap();

        assert_eq!(settings.terraform_bin, Some(PathBuf::from("/usr/local/bin/terraform")));
        assert_eq!(settings.working_dir, Some(PathBuf::from("infra/prod")));
        assert_eq!(settings.lock, Some(false));
        assert_eq!(settings.concurrency, Some(4));
    }

    #[test]
    fn test_parse_empty_settings() {
        let settings = ConfigLoader::new().parse_yaml("\n", None).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ConfigLoader::new().parse_yaml("threads: 4\n", None);
        assert!(matches!(
            result,
            Err(MigrateError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_load_file_from_base_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "concurrency: 6\n").unwrap();

        let loader = ConfigLoader::new().with_base_path(dir.path());
        let found = loader.find_settings_file().unwrap();
        let settings = loader.load_file(found).unwrap();

        assert_eq!(settings.concurrency, Some(6));
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ConfigLoader::new().load_file(dir.path().join("missing.yaml"));

        assert!(matches!(
            result,
            Err(MigrateError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings {
            concurrency: Some(2),
            ..Settings::default()
        };

        apply_env_overrides(
            &mut settings,
            env(&[
                (ENV_TERRAFORM_BIN, "tofu"),
                (ENV_LOCK, "false"),
                (ENV_CONCURRENCY, "10"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.terraform_bin, Some(PathBuf::from("tofu")));
        assert_eq!(settings.lock, Some(false));
        assert_eq!(settings.concurrency, Some(10));
    }

    #[test]
    fn test_env_overrides_absent() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_env_values() {
        let mut settings = Settings::default();
        assert!(apply_env_overrides(&mut settings, env(&[(ENV_LOCK, "sometimes")])).is_err());
        assert!(apply_env_overrides(&mut settings, env(&[(ENV_CONCURRENCY, "-1")])).is_err());
    }

    #[test]
    fn test_parse_bool_forms() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
    }
}
