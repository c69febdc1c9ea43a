use std::time::Duration;

use async_trait::async_trait;
use farelane_core::{FlightSearchClient, SearchRequest, TransportError};
use farelane_store::app_config::BackendConfig;
use serde_json::Value;

const USER_AGENT: &str = concat!("farelane/", env!("CARGO_PKG_VERSION"));

/// Flight-search backend over HTTP: `POST {base_url}/flights/search`.
pub struct HttpFlightSearchClient {
    http_client: reqwest::Client,
    search_url: String,
}

impl HttpFlightSearchClient {
    pub fn new(config: &BackendConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            search_url: format!("{}/flights/search", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl FlightSearchClient for HttpFlightSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<Value, TransportError> {
        tracing::debug!(
            url = %self.search_url,
            origin = %request.origin_code,
            destination = %request.destination_code,
            date = %request.departure_date,
            limit = request.limit,
            "Querying flight search backend"
        );

        let response = self
            .http_client
            .post(&self.search_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Error envelopes still carry a message worth showing.
            if let Ok(body) = response.json::<Value>().await {
                if body.get("status").is_some_and(Value::is_boolean) {
                    return Ok(body);
                }
            }
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
