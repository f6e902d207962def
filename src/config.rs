use serde::Deserialize;

use crate::error::Result;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base IRI of this server, without a trailing slash.
    pub base_url: String,
    /// Fixed window size for collection pages.
    pub page_size: usize,
    /// Answer incoming Follow requests with a synthetic Accept.
    pub auto_accept_follows: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            page_size: 10,
            auto_accept_follows: true,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        let config = toml::from_str(text).map_err(anyhow::Error::from)?;
        Ok(config)
    }
}
