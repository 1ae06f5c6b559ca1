//! Configuration file parsing for rotalog
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::{OpenMode, RotationConfig, When};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file structure (rotalog.toml/yaml/json)
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
}

/// Single destination as written in a config file.
///
/// Numeric fields are signed so that negative values are reported as
/// config errors instead of opaque parse failures.
#[derive(Debug, Deserialize)]
pub struct DestinationConfig {
    pub name: String,
    pub path: String,
    pub mode: Option<OpenMode>,
    pub max_bytes: Option<i64>,
    pub backup_count: Option<i64>,
    pub when: Option<String>,
    pub interval: Option<i64>,
    #[serde(default)]
    pub utc: bool,
    pub header: Option<String>,
    #[serde(default)]
    pub delay: bool,
}

impl ConfigFile {
    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => Ok(toml::from_str(content)?),
            ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
            ConfigFormat::Json => Ok(serde_json::from_str(content)?),
        }
    }

    /// Find and load config file from a directory
    pub fn find_and_load(dir: &Path) -> Result<(Self, PathBuf)> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            if path.exists() {
                let config = Self::load(&path)?;
                return Ok((config, path));
            }
        }
        Err(Error::ConfigError(format!(
            "No config file found in {}. Expected one of: {:?}",
            dir.display(),
            CONFIG_FILES
        )))
    }

    /// Pick a destination by name, or the first one when no name is given
    pub fn destination(&self, name: Option<&str>) -> Result<&DestinationConfig> {
        match name {
            Some(name) => self
                .destinations
                .iter()
                .find(|d| d.name == name)
                .ok_or_else(|| Error::DestinationNotFound(name.to_string())),
            None => self
                .destinations
                .first()
                .ok_or_else(|| Error::config("Config file declares no destinations")),
        }
    }
}

impl DestinationConfig {
    /// Convert to a validated RotationConfig, resolving relative paths against `base_dir`
    pub fn to_rotation_config(&self, base_dir: &Path) -> Result<RotationConfig> {
        let path = Path::new(&self.path);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        };

        let mode = self.mode.unwrap_or_default();
        let when = match &self.when {
            Some(w) => w.parse::<When>()?,
            None => DEFAULT_WHEN.parse::<When>()?,
        };

        let max_bytes = non_negative("max_bytes", self.max_bytes)?.unwrap_or(DEFAULT_MAX_BYTES);
        let backup_count = match non_negative("backup_count", self.backup_count)? {
            Some(n) => usize::try_from(n)
                .map_err(|_| Error::config(format!("backup_count out of range: {}", n)))?,
            None => DEFAULT_BACKUP_COUNT,
        };
        let interval = match non_negative("interval", self.interval)? {
            Some(n) => u32::try_from(n)
                .map_err(|_| Error::config(format!("interval out of range: {}", n)))?,
            None => DEFAULT_INTERVAL,
        };

        let config = RotationConfig {
            path,
            mode,
            max_bytes,
            backup_count,
            when,
            interval,
            utc: self.utc,
            header: self.header.clone(),
            delay: self.delay,
        };
        config.validate()?;
        Ok(config)
    }
}

fn non_negative(field: &str, value: Option<i64>) -> Result<Option<u64>> {
    match value {
        Some(v) if v < 0 => Err(Error::config(format!(
            "{} must not be negative (got {})",
            field, v
        ))),
        Some(v) => Ok(Some(v as u64)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn destination(name: &str) -> DestinationConfig {
        DestinationConfig {
            name: name.to_string(),
            path: format!("{}.log", name),
            mode: None,
            max_bytes: None,
            backup_count: None,
            when: None,
            interval: None,
            utc: false,
            header: None,
            delay: false,
        }
    }

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("YAML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_config_parse_toml() {
        let config_content = r#"
[[destinations]]
name = "api"
path = "logs/api.log"
max_bytes = 1048576
backup_count = 5
when = "midnight"
interval = 1
header = "ts,level,message"

[[destinations]]
name = "audit"
path = "/var/log/audit.log"
backup_count = 0
mode = "truncate"
utc = true
delay = true
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.destinations.len(), 2);
        assert_eq!(config.destinations[0].name, "api");
        assert_eq!(config.destinations[0].max_bytes, Some(1048576));
        assert_eq!(config.destinations[0].when, Some("midnight".to_string()));
        assert!(config.destinations[1].utc);
        assert!(config.destinations[1].delay);
        assert_eq!(config.destinations[0].mode, None);
        assert_eq!(config.destinations[1].mode, Some(OpenMode::Truncate));
    }

    #[test]
    fn test_config_parse_yaml() {
        let config_content = r##"
destinations:
  - name: web
    path: web.log
    when: W0
    interval: 1
    header: "# web access log"
"##;
        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        let dest = config.destination(Some("web")).unwrap();
        let rotation = dest.to_rotation_config(Path::new("/srv")).unwrap();
        assert_eq!(rotation.path, PathBuf::from("/srv/web.log"));
        assert_eq!(rotation.when, When::Weekday(0));
        assert_eq!(rotation.header, Some("# web access log".to_string()));
    }

    #[test]
    fn test_config_parse_json() {
        let config_content = r#"
{
    "destinations": [
        { "name": "worker", "path": "worker.log", "max_bytes": 50, "backup_count": 2 }
    ]
}
"#;
        let config = ConfigFile::parse(config_content, ConfigFormat::Json).unwrap();
        let rotation = config
            .destination(None)
            .unwrap()
            .to_rotation_config(Path::new("/tmp"))
            .unwrap();
        assert_eq!(rotation.max_bytes, 50);
        assert_eq!(rotation.backup_count, 2);
        assert_eq!(rotation.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn test_config_not_found() {
        let result = ConfigFile::load(Path::new("/nonexistent/rotalog.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound(_))));
    }

    #[test]
    fn test_find_and_load() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("rotalog.toml"),
            "[[destinations]]\nname = \"a\"\npath = \"a.log\"\n",
        )
        .unwrap();

        let (config, path) = ConfigFile::find_and_load(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("rotalog.toml"));
        assert_eq!(config.destinations[0].name, "a");
    }

    #[test]
    fn test_find_and_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ConfigFile::find_and_load(dir.path()),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_destination_not_found() {
        let config = ConfigFile {
            destinations: vec![destination("api")],
        };
        assert!(matches!(
            config.destination(Some("web")),
            Err(Error::DestinationNotFound(_))
        ));
    }

    #[test]
    fn test_defaults_applied() {
        let rotation = destination("api").to_rotation_config(Path::new("/srv")).unwrap();
        assert_eq!(rotation.max_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(rotation.backup_count, DEFAULT_BACKUP_COUNT);
        assert_eq!(rotation.when, When::Days);
        assert_eq!(rotation.interval, DEFAULT_INTERVAL);
        assert_eq!(rotation.mode, OpenMode::Append);
    }

    #[test]
    fn test_negative_values_rejected() {
        let mut dest = destination("api");
        dest.max_bytes = Some(-1);
        let err = dest.to_rotation_config(Path::new("/")).unwrap_err();
        assert_eq!(err.to_string(), "Config error: max_bytes must not be negative (got -1)");

        let mut dest = destination("api");
        dest.backup_count = Some(-3);
        assert!(matches!(
            dest.to_rotation_config(Path::new("/")),
            Err(Error::ConfigError(_))
        ));

        let mut dest = destination("api");
        dest.interval = Some(-7);
        assert!(matches!(
            dest.to_rotation_config(Path::new("/")),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_when_rejected() {
        let mut dest = destination("api");
        dest.when = Some("W9".to_string());
        assert!(matches!(
            dest.to_rotation_config(Path::new("/")),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let err = ConfigFile::parse(
            "destinations:\n  - name: api\n    path: api.log\n    mode: rw\n",
            ConfigFormat::Yaml,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid open mode"));
    }
}
