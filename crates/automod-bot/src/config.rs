//! Bot configuration

use automod_classifier::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Classification endpoint settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Enforcement settings
    #[serde(default)]
    pub enforcement: EnforcementConfig,

    /// Group configuration store
    #[serde(default)]
    pub store: StoreConfig,
}

impl BotConfig {
    /// Load configuration from file and CLI/environment overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config: Self = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(base_url) = &cli.base_url {
            config.classifier.base_url = base_url.clone();
        }
        if let Some(model) = &cli.model {
            config.classifier.model = model.clone();
        }
        if let Some(api_key) = &cli.api_key {
            config.classifier.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = cli.timeout {
            config.classifier = config.classifier.with_timeout(Duration::from_secs(timeout));
        }
        if let Some(store) = &cli.store {
            config.store.path = store.clone();
        }

        Ok(config)
    }
}

/// Enforcement configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Emoji added to controversial messages; unset keeps annotation log-only
    #[serde(default)]
    pub annotate_reaction: Option<String>,
}

/// Group configuration store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding group id -> enabled
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("automod_guilds.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> crate::Cli {
        let mut argv = vec!["automod", "--discord-token", "token"];
        argv.extend_from_slice(args);
        crate::Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = BotConfig::load("/nonexistent/automod.yaml", &cli(&[])).unwrap();

        assert_eq!(config.store.path, PathBuf::from("automod_guilds.json"));
        assert_eq!(config.classifier.timeout(), Duration::from_secs(20));
        assert_eq!(config.enforcement.annotate_reaction, None);
    }

    #[test]
    fn test_file_with_cli_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("automod.yaml");
        let yaml = concat!(
            "classifier:\n",
            "  base_url: http://file.example/v1\n",
            "  model: file-model\n",
            "  timeout_secs: 5\n",
            "enforcement:\n",
            "  annotate_reaction: \"👀\"\n",
        );
        std::fs::write(&path, yaml).unwrap();

        let config = BotConfig::load(
            path.to_str().unwrap(),
            &cli(&["--model", "cli-model", "--store", "/tmp/guilds.json"]),
        )
        .unwrap();

        assert_eq!(config.classifier.base_url, "http://file.example/v1");
        assert_eq!(config.classifier.model, "cli-model");
        assert_eq!(config.classifier.timeout_secs, 5);
        assert_eq!(config.enforcement.annotate_reaction.as_deref(), Some("👀"));
        assert_eq!(config.store.path, PathBuf::from("/tmp/guilds.json"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("automod.yaml");
        std::fs::write(&path, "classifier: [not, a, map]\n").unwrap();

        assert!(BotConfig::load(path.to_str().unwrap(), &cli(&[])).is_err());
    }
}
