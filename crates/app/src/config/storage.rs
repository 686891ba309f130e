//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Durable client state settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding the persisted cart and session
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = ".storefront")]
    pub data_dir: PathBuf,
}
