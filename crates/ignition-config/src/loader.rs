//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::IgnitionConfig;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<IgnitionConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<IgnitionConfig, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: IgnitionConfig = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Default config file location: `~/.config/ignition/ignition.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ignition").join("ignition.toml"))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.config`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.runtime.render_mount, "root");
    }

    #[test]
    fn test_load_basic_config() {
        let content = r#"
            [runtime]
            debug = true
            await_event_timeout_ms = 5000
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(config.runtime.debug);
        assert_eq!(config.runtime.await_event_timeout_ms, Some(5000));
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe { std::env::set_var("IGNITION_TEST_MOUNT", "app-root") };
        let content = r#"
            [runtime]
            render_mount = "${IGNITION_TEST_MOUNT}"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.runtime.render_mount, "app-root");
    }

    #[test]
    fn test_missing_env_var_errors() {
        let content = r#"
            [runtime]
            render_mount = "${IGNITION_DEFINITELY_UNSET}"
        "#;
        let result = ConfigLoader::load_str(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path() {
        let expanded = ConfigLoader::expand_path("~/.ignition");
        assert!(!expanded.starts_with('~'));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[runtime]").unwrap();
        writeln!(file, "debug = true").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert!(config.runtime.debug);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/ignition.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(result.is_err());
    }
}
