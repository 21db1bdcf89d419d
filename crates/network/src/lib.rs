//! Remote coin list sources.

use std::time::Duration;

use async_trait::async_trait;
use coinlist_core::model::Coin;
use reqwest::{Client, ClientBuilder, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_COINS_URL: &str = "https://37656be98b8f42ae8348e4da3ee3193f.api.mockbin.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("client error: {0}")]
    Client(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("bad status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
}

/// Something that can produce the full coin list in one call.
#[async_trait]
pub trait CoinSource {
    async fn fetch_coins(&self) -> Result<Vec<Coin>, NetworkError>;
}

#[derive(Clone, Debug)]
pub struct HttpSourceOptions {
    pub url: String,
    pub timeout: Duration,
}

impl Default for HttpSourceOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_COINS_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// GETs a JSON array of coins from a single URL.
#[derive(Debug, Clone)]
pub struct HttpCoinSource {
    client: Client,
    url: String,
}

impl HttpCoinSource {
    pub fn new(options: HttpSourceOptions) -> Result<Self, NetworkError> {
        let client = ClientBuilder::new()
            .timeout(options.timeout)
            .build()
            .map_err(|e| NetworkError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: options.url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CoinSource for HttpCoinSource {
    async fn fetch_coins(&self) -> Result<Vec<Coin>, NetworkError> {
        debug!(url = %self.url, "fetching coin list");
        let resp = self.client.get(&self.url).send().await.map_err(|e| {
            warn!("Failed to fetch coins: {:?}", e);
            NetworkError::Transport(e.to_string())
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            warn!("Failed to fetch coins, invalid body: {:?}", e);
            NetworkError::Transport(e.to_string())
        })?;
        if status != StatusCode::OK {
            warn!("Failed to fetch coins, bad status code: {:?}, {}", status, &body);
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let coins: Vec<Coin> = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to fetch coins, invalid json: {:?}", e);
            NetworkError::Decode(e.to_string())
        })?;
        debug!(count = coins.len(), "coin list fetched");
        Ok(coins)
    }
}
