//! Client for a hosted browser provider's session API.

use std::time::Duration;

use serde::Deserialize;

use crate::error::BrowserError;

/// A freshly created hosted session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedSession {
    pub id: String,
    /// CDP WebSocket URL to attach to.
    pub connect_url: String,
}

/// Creates hosted browser sessions over REST.
pub struct HostedSessionClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    project_id: String,
}

impl HostedSessionClient {
    pub fn new(api_url: &str, api_key: &str, project_id: &str) -> Result<Self, BrowserError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            project_id: project_id.to_string(),
        })
    }

    /// `POST {api_url}/v1/sessions` and return the session's connect URL.
    pub async fn create_session(&self) -> Result<HostedSession, BrowserError> {
        let endpoint = format!("{}/v1/sessions", self.api_url);
        let body = serde_json::json!({ "projectId": self.project_id });

        let resp = self
            .client
            .post(&endpoint)
            .header("X-BB-API-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserError::RemoteSession {
                status: status.as_u16(),
                message,
            });
        }

        let session: HostedSession = resp.json().await?;
        tracing::debug!(session_id = %session.id, "Hosted browser session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_response_uses_camel_case() {
        let body = r#"{
            "id": "sess_123",
            "connectUrl": "wss://connect.example.com/?sessionId=sess_123",
            "status": "RUNNING"
        }"#;
        let session: HostedSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.id, "sess_123");
        assert_eq!(
            session.connect_url,
            "wss://connect.example.com/?sessionId=sess_123"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed_from_api_url() {
        let client = HostedSessionClient::new("https://api.example.com/", "k", "p").unwrap();
        assert_eq!(client.api_url, "https://api.example.com");
    }
}
