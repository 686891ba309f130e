//! Backend Config

use clap::Args;

/// Commerce backend settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Backend base URL, including any path prefix
    #[arg(long, env = "STOREFRONT_API_URL", default_value = "http://localhost:3000/api")]
    pub api_url: String,
}
