pub mod aggregate;
pub mod app_config;
pub mod assortment;
pub mod brands;
pub mod config;
pub mod dashboard;
pub mod synth;

use thiserror::Error;

pub use app_config::{AnalyzerConfig, AppConfig, Environment};
pub use assortment::{
    saturating_total, Category, CompetitorData, GroundingSource, PriceBucket, StyleCountData,
};
pub use brands::{load_brands, seed_records, BrandSeed, BrandsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use dashboard::{
    filter_by_name, Action, Dashboard, DashboardError, DashboardSnapshot, RefreshStatus,
    RefreshTicket, ViewMode,
};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown price bucket: {0}")]
    UnknownPriceBucket(String),

    #[error("unknown view mode: {0}")]
    UnknownViewMode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[source] serde_yaml::Error),

    #[error("brand config validation failed: {0}")]
    Validation(String),
}
