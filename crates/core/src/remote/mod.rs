pub mod alpha_vantage;
pub mod dto;

pub use alpha_vantage::AlphaVantageClient;

use crate::parser::ParseError;
use dto::CompanyInfoDto;
use thiserror::Error;

/// Failure of a remote call, classified the way screens need to react to it.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered with a non-2xx status.
    #[error("stock api HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Connectivity, timeout or body read failure.
    #[error("stock api request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("stock api payload is malformed: {0}")]
    MalformedInput(#[from] ParseError),

    #[error("stock api JSON is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Transport(_) => "transport",
            Self::MalformedInput(_) | Self::Decode(_) => "malformed",
        }
    }
}

/// Remote financial-data API. CSV endpoints hand back the raw payload for the parsers.
#[async_trait::async_trait]
pub trait StockApi: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn get_listings(&self) -> Result<Vec<u8>, RemoteError>;

    async fn get_intraday_info(&self, symbol: &str) -> Result<Vec<u8>, RemoteError>;

    async fn get_company_info(&self, symbol: &str) -> Result<CompanyInfoDto, RemoteError>;
}
