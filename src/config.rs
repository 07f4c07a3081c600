use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::{error::ConfigError, Target};

pub const DEFAULT_BASE_URL: &str = "https://eapi.stalcraft.net";

#[derive(Clone, Deserialize)]
pub struct Config {
    pub api_key: String,
    pub region: String,
    pub item_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub auto_refresh: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

impl Config {
    /// Loads the config, picking YAML for `.yaml`/`.yml` files and JSON for everything else
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let raw = tokio::fs::read(path).await.map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );

        let config: Self = if is_yaml {
            serde_yaml::from_slice(&raw)?
        } else {
            serde_json::from_slice(&raw)?
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key is empty"));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::Invalid("region is empty"));
        }
        if self.item_id.trim().is_empty() {
            return Err(ConfigError::Invalid("item_id is empty"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid("refresh_interval_secs must be positive"));
        }
        Ok(())
    }

    pub fn target(&self) -> Target {
        Target::new(&self.region, &self.item_id)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("region", &self.region)
            .field("item_id", &self.item_id)
            .field("base_url", &self.base_url)
            .field("listen", &self.listen)
            .field("refresh_interval_secs", &self.refresh_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("auto_refresh", &self.auto_refresh)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn load_str(name: &str, content: &str) -> Result<Config, ConfigError> {
        let dir = std::env::temp_dir().join(format!("lotwatch-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();

        let result = Config::load(&path).await;
        std::fs::remove_file(&path).unwrap();
        result
    }

    #[tokio::test]
    async fn json_with_defaults() {
        let config = load_str(
            "defaults.json",
            r#"{"api_key": "secret", "region": "ru", "item_id": "y1q9"}"#,
        )
        .await
        .unwrap();

        assert_eq!(config.target(), Target::new("ru", "y1q9"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(!config.auto_refresh);
    }

    #[tokio::test]
    async fn yaml_overrides() {
        let config = load_str(
            "overrides.yaml",
            "api_key: secret\nregion: eu\nitem_id: 4q7p\nbase_url: http://127.0.0.1:9000\nrefresh_interval_secs: 30\nauto_refresh: true\n",
        )
        .await
        .unwrap();

        assert_eq!(config.target(), Target::new("eu", "4q7p"));
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert!(config.auto_refresh);
    }

    #[tokio::test]
    async fn missing_credential() {
        let result = load_str("missing.json", r#"{"region": "ru", "item_id": "y1q9"}"#).await;
        assert!(matches!(result, Err(ConfigError::Json(_))));

        let result = load_str(
            "empty.json",
            r#"{"api_key": " ", "region": "ru", "item_id": "y1q9"}"#,
        )
        .await;
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn missing_file() {
        let result = Config::load("/nonexistent/lotwatch/config.json").await;
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn debug_hides_api_key() {
        let config: Config = serde_json::from_str(
            r#"{"api_key": "very-secret", "region": "ru", "item_id": "y1q9"}"#,
        )
        .unwrap();

        let printed = format!("{:?}", config);
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("y1q9"));
    }
}
