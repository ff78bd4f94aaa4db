use super::dto::CompanyInfoDto;
use super::{RemoteError, StockApi};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::time::Duration;

const QUERY_PATH: &str = "/query";
const INTRADAY_INTERVAL: &str = "60min";

/// HTTP client for Alpha Vantage style `query?function=...` endpoints.
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build stock api http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_api_key()?;
        Self::new(
            settings.stock_api_base_url.clone(),
            api_key,
            settings.stock_api_timeout,
        )
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), QUERY_PATH)
    }

    async fn fetch(&self, params: &[(&str, &str)]) -> Result<reqwest::Response, RemoteError> {
        let function = params
            .iter()
            .find(|(k, _)| *k == "function")
            .map(|(_, v)| *v)
            .unwrap_or_default();

        let res = self
            .http
            .get(self.url())
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(function, http_status = %status, "stock api HTTP error");
            return Err(RemoteError::Http { status, body });
        }

        tracing::debug!(function, http_status = %status, "stock api response");
        Ok(res)
    }

    async fn fetch_bytes(&self, params: &[(&str, &str)]) -> Result<Vec<u8>, RemoteError> {
        let res = self.fetch(params).await?;
        let bytes = res.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl StockApi for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn get_listings(&self) -> Result<Vec<u8>, RemoteError> {
        self.fetch_bytes(&[("function", "LISTING_STATUS")]).await
    }

    async fn get_intraday_info(&self, symbol: &str) -> Result<Vec<u8>, RemoteError> {
        self.fetch_bytes(&[
            ("function", "TIME_SERIES_INTRADAY"),
            ("symbol", symbol),
            ("interval", INTRADAY_INTERVAL),
            ("datatype", "csv"),
        ])
        .await
    }

    async fn get_company_info(&self, symbol: &str) -> Result<CompanyInfoDto, RemoteError> {
        let res = self
            .fetch(&[("function", "OVERVIEW"), ("symbol", symbol)])
            .await?;
        let text = res.text().await?;
        Ok(serde_json::from_str::<CompanyInfoDto>(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> AlphaVantageClient {
        AlphaVantageClient::new(server.base_url(), "demo", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn listings_request_carries_function_and_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "LISTING_STATUS")
                    .query_param("apikey", "demo");
                then.status(200)
                    .header("content-type", "text/csv")
                    .body("symbol,name,exchange\nAAPL,Apple Inc,NASDAQ\n");
            })
            .await;

        let body = client(&server).get_listings().await.unwrap();
        mock.assert_async().await;
        assert!(String::from_utf8(body).unwrap().contains("AAPL"));
    }

    #[tokio::test]
    async fn intraday_request_asks_for_hourly_csv() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "TIME_SERIES_INTRADAY")
                    .query_param("symbol", "IBM")
                    .query_param("interval", "60min")
                    .query_param("datatype", "csv");
                then.status(200).body("timestamp,close\n");
            })
            .await;

        client(&server).get_intraday_info("IBM").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn company_info_decodes_overview() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/query")
                    .query_param("function", "OVERVIEW")
                    .query_param("symbol", "IBM");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"Symbol":"IBM","Name":"International Business Machines","Industry":"COMPUTER"}"#);
            })
            .await;

        let dto = client(&server).get_company_info("IBM").await.unwrap();
        assert_eq!(dto.symbol.as_deref(), Some("IBM"));
        assert_eq!(dto.industry.as_deref(), Some("COMPUTER"));
        assert!(dto.country.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query");
                then.status(404).body("not found");
            })
            .await;

        let err = client(&server).get_listings().await.unwrap_err();
        match err {
            RemoteError::Http { status, body } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(body, "not found");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_overview_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/query");
                then.status(200).body("<html>rate limited</html>");
            })
            .await;

        let err = client(&server).get_company_info("IBM").await.unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client =
            AlphaVantageClient::new("http://127.0.0.1:9", "demo", Duration::from_secs(2)).unwrap();
        let err = client.get_listings().await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
