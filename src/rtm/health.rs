//! RTM health reporting shared by resources, tools and the dashboard.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::rtm::RtmClient;

/// Result of a health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub details: Map<String, Value>,
}

impl HealthStatus {
    /// `HEALTHY` or `UNHEALTHY`.
    pub fn label(&self) -> &'static str {
        if self.healthy {
            "HEALTHY"
        } else {
            "UNHEALTHY"
        }
    }
}

/// Check the API and, when it answers, record the server time in the details.
pub async fn check_health(client: &RtmClient) -> HealthStatus {
    let healthy = client.health_check().await;
    let mut details = Map::new();

    if healthy {
        match client.server_time().await {
            Ok(time) => {
                details.insert("serverTime".to_string(), Value::String(time));
            }
            Err(e) => warn!("Failed to get RTM server time: {}", e),
        }
    }

    HealthStatus { healthy, details }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_check_health_healthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("method", "rtm.test.echo"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"rsp": {"stat": "ok"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("method", "rtm.time.parse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rsp": {"stat": "ok", "time": {"$t": "2026-10-18T09:00:00Z"}}
            })))
            .mount(&server)
            .await;

        let client = RtmClient::with_base_url("k", "s", server.uri()).unwrap();
        let status = check_health(&client).await;

        assert!(status.healthy);
        assert_eq!(status.label(), "HEALTHY");
        assert_eq!(status.details["serverTime"], "2026-10-18T09:00:00Z");
    }

    #[tokio::test]
    async fn test_check_health_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rsp": {"stat": "fail", "err": {"code": "105", "msg": "Service currently unavailable"}}
            })))
            .mount(&server)
            .await;

        let client = RtmClient::with_base_url("k", "s", server.uri()).unwrap();
        let status = check_health(&client).await;

        assert!(!status.healthy);
        assert_eq!(status.label(), "UNHEALTHY");
        assert!(status.details.is_empty());
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus {
            healthy: false,
            details: Map::new(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, json!({"healthy": false, "details": {}}));
    }
}
