pub mod init;
mod schema;

pub use init::{export_reference_data, write_default_config, write_file_atomic};
pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::reference::{validate_reference, ReferenceData};
use crate::scoring::validate_scoring;
use crate::storage::validate_storage;

/// Get the config directory path (~/.config/lead-type/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("lead-type"))
        .unwrap_or_else(|| PathBuf::from(".lead-type"))
}

/// Get the default config file path (~/.config/lead-type/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   and falls back to built-in defaults when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(
            "No config at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Validate every section of the config.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_scoring(&config.scoring()) {
        errors.extend(e);
    }
    if let Err(e) = validate_storage(&config.storage()) {
        errors.extend(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Load reference data from `data_dir`, or the bundled data when unset.
/// Soft defects are logged, structural ones are errors.
pub fn load_reference_data(config: &Config) -> Result<Arc<ReferenceData>> {
    let data = match &config.data_dir {
        Some(dir) => ReferenceData::load_dir(dir)?,
        None => ReferenceData::builtin()?,
    };

    if let Err(problems) = validate_reference(&data) {
        for problem in problems {
            tracing::warn!("Reference data: {}", problem);
        }
    }

    Ok(Arc::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("missing.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "scoring:\n  threshold: 5.0\n").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.scoring().effective_threshold(), 5.0);
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "scoring: [unclosed").unwrap();

        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_validate_config_collects_sections() {
        let yaml = r#"
scoring:
  threshold: 9
storage:
  history_limit: 0
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("scoring.threshold"));
        assert!(errors[1].starts_with("storage.history_limit"));
    }

    #[test]
    fn test_load_reference_data_builtin_and_dir() {
        let builtin = load_reference_data(&Config::default()).unwrap();
        assert_eq!(builtin.questions.len(), 18);

        let dir = tempfile::tempdir().unwrap();
        export_reference_data(dir.path(), false).unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let loaded = load_reference_data(&config).unwrap();
        assert_eq!(loaded.questions.len(), builtin.questions.len());
    }
}
