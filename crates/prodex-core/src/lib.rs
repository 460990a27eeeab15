pub mod app_config;
pub mod category;
pub mod config;
pub mod sites;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use category::{CategoryDetect, KeywordCategoryDetector};
pub use config::{load_app_config, load_app_config_from_env};
pub use sites::{load_sites, FieldSelectors, SiteDescriptor, SitesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
