//! HTTP client for the Remember The Milk REST API.
//!
//! Every request is signed: parameters sorted by key, concatenated as
//! `secret + k1 + v1 + k2 + v2 ...`, MD5-hashed and sent as `api_sig`.

use md5::{Digest, Md5};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::RtmCredentials;
use crate::error::{Error, Result};
use crate::VERSION;

/// Production endpoint.
pub const RTM_BASE_URL: &str = "https://api.rememberthemilk.com/services/rest/";

fn user_agent() -> String {
    format!("create-mcp-server/{} (rust)", VERSION)
}

/// API client for Remember The Milk.
#[derive(Debug, Clone)]
pub struct RtmClient {
    client: Client,
    base_url: String,
    api_key: String,
    shared_secret: String,
}

impl RtmClient {
    /// Create a client against the production endpoint.
    pub fn new(api_key: impl Into<String>, shared_secret: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, shared_secret, RTM_BASE_URL)
    }

    /// Create a client against another endpoint.
    pub fn with_base_url(
        api_key: impl Into<String>,
        shared_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            shared_secret: shared_secret.into(),
        })
    }

    /// Create a client from configured credentials.
    pub fn from_credentials(credentials: &RtmCredentials) -> Result<Self> {
        Self::new(&credentials.api_key, &credentials.shared_secret)
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signature for `params`.
    pub fn sign(&self, params: &BTreeMap<String, String>) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.shared_secret.as_bytes());
        for (key, value) in params {
            hasher.update(key.as_bytes());
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Call `method` and return the `rsp` object.
    pub async fn request(&self, method: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut query: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        query.insert("method".to_string(), method.to_string());
        query.insert("api_key".to_string(), self.api_key.clone());
        query.insert("format".to_string(), "json".to_string());

        let signature = self.sign(&query);
        query.insert("api_sig".to_string(), signature);

        debug!("RTM request: {}", method);
        let response = self.client.get(&self.base_url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown");
            return Err(Error::Rtm(format!("{} {}", status.as_u16(), status_text)));
        }

        let mut body: Value = response
            .json()
            .await
            .map_err(|e| Error::Rtm(format!("Failed to parse response: {}", e)))?;
        let rsp = body
            .get_mut("rsp")
            .map(Value::take)
            .ok_or_else(|| Error::Rtm("Response has no rsp object".to_string()))?;

        if rsp.get("stat").and_then(Value::as_str) == Some("fail") {
            let err = rsp.get("err");
            let code = err
                .and_then(|e| e.get("code"))
                .map(value_text)
                .unwrap_or_default();
            let msg = err
                .and_then(|e| e.get("msg"))
                .map(value_text)
                .unwrap_or_default();
            return Err(Error::Rtm(format!("{} {}", code, msg)));
        }

        Ok(rsp)
    }

    /// `rtm.test.echo` round trip. Any failure counts as unhealthy.
    pub async fn health_check(&self) -> bool {
        match self.request("rtm.test.echo", &[("foo", "bar")]).await {
            Ok(rsp) => rsp.get("stat").and_then(Value::as_str) == Some("ok"),
            Err(e) => {
                warn!("Health check failed: {}", e);
                false
            }
        }
    }

    /// Current server time as reported by `rtm.time.parse`.
    pub async fn server_time(&self) -> Result<String> {
        let rsp = self.request("rtm.time.parse", &[("time", "now")]).await?;
        let time = rsp
            .get("time")
            .ok_or_else(|| Error::Rtm("Response has no time".to_string()))?;

        // JSON responses carry the text node as `$t`.
        match time {
            Value::String(s) => Ok(s.clone()),
            _ => time
                .get("$t")
                .or_else(|| time.get("time"))
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| Error::Rtm("Response has no time".to_string())),
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
