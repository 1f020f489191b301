//! Blocking HTTP client for the HabitFlow REST API

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::wire::{
    HabitPayload, HealthResponse, RemoteEntry, RemoteHabit, RemoteInsight, RemoteRecommendation,
    TrackPayload, UserPayload,
};
use super::RemoteService;
use crate::config::RemoteSettings;
use crate::error::RemoteError;

/// Connection settings for [`HttpRemote`]
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the API, without a trailing slash
    pub base_url: String,
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl From<&RemoteSettings> for RemoteConfig {
    fn from(settings: &RemoteSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

pub struct HttpRemote {
    config: RemoteConfig,
    client: Client,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("habitflow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let response = self.client.get(self.url(path)).send()?;
        Self::handle_response(response)
    }

    fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<(), RemoteError> {
        let response = self.client.post(self.url(path)).json(body).send()?;
        Self::handle_response::<serde_json::Value>(response).map(|_| ())
    }

    fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(RemoteError::Unavailable);
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RemoteError::Server {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json()?)
    }
}

impl RemoteService for HttpRemote {
    fn health(&self) -> Result<(), RemoteError> {
        let health: HealthResponse = self.get("/health")?;
        if health.status == "healthy" {
            Ok(())
        } else {
            Err(RemoteError::InvalidResponse(format!(
                "unexpected health status '{}'",
                health.status
            )))
        }
    }

    fn create_user(&self, user: &UserPayload) -> Result<(), RemoteError> {
        self.post("/users", user)
    }

    fn create_habit(&self, habit: &HabitPayload) -> Result<(), RemoteError> {
        self.post("/habits", habit)
    }

    fn track_entry(&self, entry: &TrackPayload) -> Result<(), RemoteError> {
        self.post("/habits/track", entry)
    }

    fn insights(&self, user_id: &str) -> Result<Vec<RemoteInsight>, RemoteError> {
        self.get(&format!("/insights/{}", user_id))
    }

    fn recommendations(&self, user_id: &str) -> Result<RemoteRecommendation, RemoteError> {
        self.get(&format!("/recommendations/{}", user_id))
    }

    fn habits(&self, user_id: &str) -> Result<Vec<RemoteHabit>, RemoteError> {
        self.get(&format!("/habits/{}", user_id))
    }

    fn entries(&self, user_id: &str, days: u32) -> Result<Vec<RemoteEntry>, RemoteError> {
        self.get(&format!("/entries/{}?days={}", user_id, days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings() {
        let settings = RemoteSettings {
            base_url: "http://api.local:8000/".to_string(),
            timeout_secs: 3,
            ..Default::default()
        };
        let config = RemoteConfig::from(&settings);
        assert_eq!(config.base_url, "http://api.local:8000");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_unreachable_server_is_an_error() {
        // port 9 (discard) on localhost is not expected to serve HTTP
        let remote = HttpRemote::new(RemoteConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(remote.url("/health"), "http://127.0.0.1:9/health");
        assert!(remote.health().is_err());
    }
}
