//! Configuration loading for the CLI.
//! Reads an explicit path, else AMARANTOS_CONFIG, else ./amarantos.toml,
//! else falls back to built-in defaults.

use amarantos_common::EngineConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "amarantos.toml";
pub const CONFIG_ENV_VAR: &str = "AMARANTOS_CONFIG";

/// Resolve which config file to read, if any.
fn resolve_path(explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        if !path.exists() {
            anyhow::bail!(
                "Config file not found: {} (from {})",
                path.display(),
                CONFIG_ENV_VAR
            );
        }
        return Ok(Some(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    Ok(default.exists().then_some(default))
}

/// Load and validate the engine configuration.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match resolve_path(explicit)? {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            EngineConfig::from_path(&path)?
        }
        None => {
            debug!("No config file found; using defaults");
            EngineConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_explicit_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "ranking:\n  percentile: 0.25\n  max_per_domain: 2\n").unwrap();
        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.ranking.percentile, 0.25);
        assert_eq!(config.ranking.max_per_domain, Some(2));
    }

    #[test]
    fn test_invalid_values_rejected_on_load() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[ranking]\npercentile = 1.5\n").unwrap();
        assert!(load(Some(file.path())).is_err());
    }

    // The only test that touches the environment; the others pass explicit
    // paths, which take precedence.
    #[test]
    fn test_env_var_resolution() {
        let mut env_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(env_file, "[ranking]\npercentile = 0.2\n").unwrap();
        let mut explicit = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(explicit, "[ranking]\npercentile = 0.4\n").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, env_file.path());
        let from_env = load(None);
        let from_explicit = load(Some(explicit.path()));

        std::env::set_var(CONFIG_ENV_VAR, "/definitely/not/here.toml");
        let missing = load(None);
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(from_env.unwrap().ranking.percentile, 0.2);
        assert_eq!(from_explicit.unwrap().ranking.percentile, 0.4);
        let err = missing.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
        assert!(err.contains(CONFIG_ENV_VAR));
    }
}
