//! HTTP client for talking to mesad.

use anyhow::{anyhow, Result};
use mesa_core::{AuditEntry, NewTicket, SystemReport, Ticket};
use serde_json::Value;

/// Default daemon address
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:7787";

/// Client for the mesad HTTP API
pub struct DeskClient {
    base_url: String,
    http: reqwest::Client,
}

impl DeskClient {
    /// Resolve the server URL: --server flag, then $MESA_SERVER, then the
    /// default local daemon.
    pub fn new(server: Option<String>) -> Self {
        let base_url = server
            .or_else(|| std::env::var("MESA_SERVER").ok())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// File a new solicitud, returning its tracking number
    pub async fn create(&self, new: &NewTicket) -> Result<String> {
        let response = self
            .send(self.http.post(format!("{}/v1/tickets", self.base_url)).json(new))
            .await?;
        let value = Self::into_value(response).await?;

        value
            .get("tracking_number")
            .and_then(|t| t.as_str())
            .map(String::from)
            .ok_or_else(|| anyhow!("No tracking number in response"))
    }

    /// Update status and response of an existing ticket
    pub async fn update(&self, tracking: &str, status: &str, response_text: &str) -> Result<String> {
        let body = serde_json::json!({ "status": status, "response": response_text });
        let response = self
            .send(
                self.http
                    .put(format!("{}/v1/tickets/{}", self.base_url, tracking))
                    .json(&body),
            )
            .await?;
        let value = Self::into_value(response).await?;

        value
            .get("tracking_number")
            .and_then(|t| t.as_str())
            .map(String::from)
            .ok_or_else(|| anyhow!("No tracking number in response"))
    }

    /// Fetch one ticket
    pub async fn get(&self, tracking: &str) -> Result<Ticket> {
        let response = self
            .send(self.http.get(format!("{}/v1/tickets/{}", self.base_url, tracking)))
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch every ticket
    pub async fn get_all(&self) -> Result<Vec<Ticket>> {
        let response = self
            .send(self.http.get(format!("{}/v1/tickets", self.base_url)))
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch the system-wide metrics report
    pub async fn report(&self) -> Result<SystemReport> {
        let response = self
            .send(self.http.get(format!("{}/v1/report", self.base_url)))
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch the audit trail
    pub async fn audit(&self) -> Result<Vec<AuditEntry>> {
        let response = self
            .send(self.http.get(format!("{}/v1/audit", self.base_url)))
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch daemon health
    pub async fn health(&self) -> Result<Value> {
        let response = self
            .send(self.http.get(format!("{}/v1/health", self.base_url)))
            .await?;
        Self::into_value(response).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request.send().await.map_err(|e| {
            anyhow!(
                "Cannot reach mesad at {}: {}\n\n\
                 Is the daemon running? Start it with:\n\
                 mesad",
                self.base_url,
                e
            )
        })
    }

    /// Surface the daemon's failure payload as an error
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| format!("daemon returned {}", status));

        Err(anyhow!(message))
    }

    async fn into_value(response: reqwest::Response) -> Result<Value> {
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_server_wins() {
        let client = DeskClient::new(Some("http://10.0.0.5:9000/".to_string()));
        assert_eq!(client.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn test_default_server() {
        // Only meaningful when $MESA_SERVER is unset, as in CI.
        if std::env::var("MESA_SERVER").is_err() {
            let client = DeskClient::new(None);
            assert_eq!(client.base_url, DEFAULT_SERVER);
        }
    }
}
