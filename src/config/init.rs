use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};
use crate::reference::builtin_files;
use crate::scoring::ScoringConfig;
use crate::storage::config::{DEFAULT_HISTORY_EXPIRY, DEFAULT_HISTORY_LIMIT, DEFAULT_SESSION_TTL};
use crate::storage::StorageConfig;

/// Config written by `lead-type init`: every default spelled out
fn default_config() -> Config {
    Config {
        data_dir: None,
        scoring: Some(ScoringConfig::default()),
        storage: Some(StorageConfig {
            dir: None,
            session_ttl: Some(DEFAULT_SESSION_TTL.to_string()),
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            history_expiry: Some(DEFAULT_HISTORY_EXPIRY.to_string()),
            quota_bytes: None,
        }),
    }
}

/// Write `contents` to `path` atomically, creating parent directories
pub fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}

/// Write the default config file. Refuses to overwrite unless `force`.
///
/// Returns the path written.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    let yaml = serde_saphyr::to_string(&default_config())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    write_file_atomic(&config_path, yaml.as_bytes())?;
    tracing::debug!("Config written to {}", config_path.display());

    Ok(config_path)
}

/// Copy the bundled reference data into `dir` so it can be edited and
/// pointed to with `data_dir`. Existing files are kept unless `force`.
///
/// Returns the files written.
pub fn export_reference_data(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (name, contents) in builtin_files() {
        let path = dir.join(name);
        if path.exists() && !force {
            tracing::warn!("Keeping existing {}", path.display());
            continue;
        }
        write_file_atomic(&path, contents.as_bytes())?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, validate_config};

    #[test]
    fn test_default_config_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let written = write_default_config(Some(path.clone()), false).unwrap();
        assert_eq!(written, path);

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config, default_config());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_existing_config_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "scoring:\n  threshold: 5.0\n").unwrap();

        let err = write_default_config(Some(path.clone()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("5.0"));

        write_default_config(Some(path.clone()), true).unwrap();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.scoring().effective_threshold(), 4.5);
    }

    #[test]
    fn test_export_reference_data_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("types.yaml"), "custom").unwrap();

        let written = export_reference_data(dir.path(), false).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("types.yaml")).unwrap(),
            "custom"
        );

        let written = export_reference_data(dir.path(), true).unwrap();
        assert_eq!(written.len(), 3);
    }
}
