use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use charlens_core::ConverterConfig;

const CONFIG_FILE: &str = "config.json";

/// `<config dir>/charlens/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("charlens").join(CONFIG_FILE))
}

/// Loads converter limits. An explicit path must exist; the default path is
/// optional and silently skipped when missing.
pub fn load(explicit: Option<&Path>) -> Result<ConverterConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.is_file() => path,
            _ => {
                tracing::debug!("no config file, using defaults");
                return Ok(ConverterConfig::default());
            }
        },
    };

    let raw = fs::read_to_string(&path).with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ConverterConfig =
        serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))?;
    config.validate()?;
    tracing::debug!(?config, path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"char_limit": 12}}"#).unwrap();
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.char_limit, 12);
        assert_eq!(config.overall_byte_limit, ConverterConfig::default().overall_byte_limit);
    }

    #[test]
    fn rejects_invalid_limits() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"overall_byte_limit": 0}}"#).unwrap();
        assert!(load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("absent.json"))).is_err());
    }
}
