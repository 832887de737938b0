use serde::Deserialize;
use std::path::PathBuf;

use crate::services::clustering::ClusterSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the CSV tables loaded at startup
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of user clusters
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,

    /// Seed for centroid initialisation
    #[serde(default = "default_cluster_seed")]
    pub cluster_seed: u64,

    #[serde(default = "default_cluster_max_iter")]
    pub cluster_max_iter: usize,

    #[serde(default = "default_cluster_tolerance")]
    pub cluster_tolerance: f64,

    /// Seed for picking a city among cluster candidates.
    /// Unset means fresh entropy per process.
    #[serde(default)]
    pub recommendation_seed: Option<u64>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_n_clusters() -> usize {
    20
}

fn default_cluster_seed() -> u64 {
    42
}

fn default_cluster_max_iter() -> usize {
    300
}

fn default_cluster_tolerance() -> f64 {
    1e-4
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cluster_settings(&self) -> ClusterSettings {
        ClusterSettings {
            n_clusters: self.n_clusters,
            seed: self.cluster_seed,
            max_iter: self.cluster_max_iter,
            tolerance: self.cluster_tolerance,
        }
    }
}
