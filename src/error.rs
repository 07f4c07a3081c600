use thiserror::Error;

/// Reasons a fetch cycle stopped before running out of pages
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Sending Request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Non Success status: {0}")]
    Status(reqwest::StatusCode),
    #[error("Reading Body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("Deserialize: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Problems loading the configuration, all of them fatal on startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Reading config file {path:?}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parsing YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}
