//! RTM tools.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::mcp::handler::{success_result, ToolArguments, ToolHandler};
use crate::mcp::protocol::{Tool, ToolResult};
use crate::rtm::{check_health, RtmClient};

/// RTM health check tool.
pub struct RtmHealthCheckTool {
    client: Arc<RtmClient>,
}

impl RtmHealthCheckTool {
    pub fn new(client: Arc<RtmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for RtmHealthCheckTool {
    fn definition(&self) -> Tool {
        Tool {
            name: "rtm_health_check".to_string(),
            description: "Run a health check on the Remember The Milk API connection".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    async fn execute(&self, _args: ToolArguments) -> Result<ToolResult> {
        let status = check_health(&self.client).await;
        let details = serde_json::to_string_pretty(&status.details)?;

        Ok(success_result(format!(
            "RTM Health Check: {}\n\nDetails:\n{}",
            status.label(),
            details
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::handler::text_content;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_unhealthy_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = Arc::new(RtmClient::with_base_url("k", "s", server.uri()).unwrap());
        let result = RtmHealthCheckTool::new(client).execute(None).await.unwrap();

        assert!(!result.is_error);
        assert_eq!(
            result.content,
            vec![text_content("RTM Health Check: UNHEALTHY\n\nDetails:\n{}")]
        );
    }

    #[tokio::test]
    async fn test_healthy_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rsp": {"stat": "ok", "time": {"$t": "2026-10-18T09:00:00Z"}}
            })))
            .mount(&server)
            .await;

        let client = Arc::new(RtmClient::with_base_url("k", "s", server.uri()).unwrap());
        let result = RtmHealthCheckTool::new(client).execute(None).await.unwrap();

        let crate::mcp::protocol::ContentBlock::Text { text } = &result.content[0] else {
            panic!("Expected text content");
        };
        assert!(text.starts_with("RTM Health Check: HEALTHY\n\nDetails:\n"));
        assert!(text.contains("\"serverTime\": \"2026-10-18T09:00:00Z\""));
    }
}
