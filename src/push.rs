use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A device endpoint that wants day-boundary reminders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEndpoint {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PushEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: None,
        }
    }
}

/// Aggregate result of one broadcast fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub delivered: usize,
    pub failed: usize,
}

/// An endpoint that reports itself permanently gone gets dropped from the
/// registry during the broadcast that discovered it.
fn is_gone(status: StatusCode) -> bool {
    status == StatusCode::GONE
}

/// Registry of subscribed endpoints plus the HTTP client that delivers to
/// them. Delivery is fire-and-forget from the engine's point of view;
/// nothing here touches task state.
pub struct PushRegistry {
    endpoints: Vec<PushEndpoint>,
    http: Client,
}

impl PushRegistry {
    pub fn new() -> Result<Self, String> {
        let http = Client::builder()
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            endpoints: Vec::new(),
            http,
        })
    }

    /// Restore a registry from its endpoints file. Missing file means no
    /// subscriptions yet.
    pub fn load(path: &Path) -> Result<Self, String> {
        let mut registry = Self::new()?;
        if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            registry.endpoints = serde_json::from_str(&raw)
                .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
        }
        Ok(registry)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(&self.endpoints)
            .map_err(|e| format!("Failed to serialize endpoints: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    pub fn endpoints(&self) -> &[PushEndpoint] {
        &self.endpoints
    }

    /// Register an endpoint. Duplicate urls are kept once.
    pub fn subscribe(&mut self, endpoint: PushEndpoint) -> bool {
        if self.endpoints.iter().any(|e| e.url == endpoint.url) {
            return false;
        }
        self.endpoints.push(endpoint);
        true
    }

    pub fn unsubscribe(&mut self, url: &str) -> bool {
        let before = self.endpoints.len();
        self.endpoints.retain(|e| e.url != url);
        self.endpoints.len() != before
    }

    /// Deliver `message` to every endpoint concurrently and report the
    /// counts. Broadcasting to an empty registry is an error, not a silent
    /// zero. Endpoints answering 410 Gone are deregistered.
    pub async fn broadcast(&mut self, message: &str) -> Result<BroadcastOutcome, String> {
        if self.endpoints.is_empty() {
            return Err("No devices subscribed".to_string());
        }

        let payload = serde_json::json!({
            "title": "Daily Lock",
            "body": message,
        });

        let sends = self.endpoints.iter().map(|ep| {
            let http = &self.http;
            let payload = &payload;
            let url = ep.url.clone();
            async move {
                let result = http.post(&url).json(payload).send().await;
                (url, result)
            }
        });

        let mut outcome = BroadcastOutcome::default();
        let mut gone = Vec::new();
        for (url, result) in join_all(sends).await {
            match result {
                Ok(resp) if resp.status().is_success() => outcome.delivered += 1,
                Ok(resp) => {
                    outcome.failed += 1;
                    log::warn!("Push to {} returned {}", url, resp.status());
                    if is_gone(resp.status()) {
                        gone.push(url);
                    }
                }
                Err(e) => {
                    outcome.failed += 1;
                    log::warn!("Push to {} failed: {}", url, e);
                }
            }
        }
        self.endpoints.retain(|ep| !gone.contains(&ep.url));

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_dedups_by_url() {
        let mut reg = PushRegistry::new().unwrap();
        assert!(reg.subscribe(PushEndpoint::new("https://push.example/a")));
        assert!(!reg.subscribe(PushEndpoint::new("https://push.example/a")));
        assert!(reg.subscribe(PushEndpoint::new("https://push.example/b")));
        assert_eq!(reg.endpoints().len(), 2);
    }

    #[test]
    fn unsubscribe_reports_whether_anything_was_removed() {
        let mut reg = PushRegistry::new().unwrap();
        reg.subscribe(PushEndpoint::new("https://push.example/a"));
        assert!(reg.unsubscribe("https://push.example/a"));
        assert!(!reg.unsubscribe("https://push.example/a"));
        assert!(reg.endpoints().is_empty());
    }

    #[tokio::test]
    async fn broadcast_with_no_endpoints_is_an_error() {
        let mut reg = PushRegistry::new().unwrap();
        assert!(reg.broadcast("Evening ritual time").await.is_err());
    }

    #[test]
    fn registry_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoints.json");

        let mut reg = PushRegistry::new().unwrap();
        reg.subscribe(PushEndpoint::new("https://push.example/a"));
        reg.save(&path).unwrap();

        let loaded = PushRegistry::load(&path).unwrap();
        assert_eq!(loaded.endpoints(), reg.endpoints());
    }

    #[test]
    fn load_without_a_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reg = PushRegistry::load(&dir.path().join("endpoints.json")).unwrap();
        assert!(reg.endpoints().is_empty());
    }

    #[test]
    fn only_gone_counts_as_permanently_dead() {
        assert!(is_gone(StatusCode::GONE));
        assert!(!is_gone(StatusCode::NOT_FOUND));
        assert!(!is_gone(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_gone(StatusCode::OK));
    }
}
