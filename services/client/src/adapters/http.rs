//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the OpenHands backend.
//! It implements the `BackendApi` port from the `core` crate using `reqwest`.
//!
//! Every request carries a JSON content type and a fixed timeout. Only
//! responses with a status of 500 or above are failures; 4xx responses are
//! handed back to the caller untouched.

use async_trait::async_trait;
use openhands_client_core::{
    domain::{ApiConfig, ApiResponse, CreatedConversation, FeatureFlags},
    ports::{BackendApi, PortError, PortResult},
};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    redirect::Policy,
    Method, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

use crate::config::{Config, Environment};

/// Backend REST paths.
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const CONFIG: &str = "/api/options/config";
    pub const CONVERSATIONS: &str = "/api/conversations";
    pub const MESSAGES: &str = "/api/messages";
}

const MAX_REDIRECTS: usize = 5;

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct FeatureFlagsRecord {
    #[serde(rename = "ENABLE_BILLING", default)]
    enable_billing: bool,
    #[serde(rename = "HIDE_LLM_SETTINGS", default)]
    hide_llm_settings: bool,
}

#[derive(Deserialize)]
struct ApiConfigRecord {
    #[serde(rename = "APP_MODE")]
    app_mode: String,
    #[serde(rename = "GITHUB_CLIENT_ID", default)]
    github_client_id: Option<String>,
    #[serde(rename = "POSTHOG_CLIENT_KEY", default)]
    posthog_client_key: Option<String>,
    #[serde(rename = "FEATURE_FLAGS", default)]
    feature_flags: Option<FeatureFlagsRecord>,
}
impl ApiConfigRecord {
    fn to_domain(self) -> ApiConfig {
        let feature_flags = self
            .feature_flags
            .map(|flags| FeatureFlags {
                enable_billing: flags.enable_billing,
                hide_llm_settings: flags.hide_llm_settings,
            })
            .unwrap_or_default();
        ApiConfig {
            app_mode: self.app_mode,
            github_client_id: self.github_client_id.unwrap_or_default(),
            posthog_client_key: self.posthog_client_key.unwrap_or_default(),
            feature_flags,
        }
    }
}

#[derive(Serialize)]
struct CreateConversationRecord<'a> {
    initial_user_msg: &'a str,
}

#[derive(Deserialize)]
struct CreatedConversationRecord {
    conversation_id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}
impl CreatedConversationRecord {
    fn to_domain(self) -> CreatedConversation {
        CreatedConversation {
            conversation_id: self.conversation_id,
            status: self.status.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `BackendApi` over JSON-over-HTTPS.
#[derive(Clone)]
pub struct HttpBackendAdapter {
    client: reqwest::Client,
    base_url: String,
    environment: Environment,
    timeout: Duration,
}

impl HttpBackendAdapter {
    /// Creates a new `HttpBackendAdapter` bound to `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        environment: Environment,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            environment,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.api_base_url.clone(),
            config.request_timeout,
            config.environment,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends one request. No retry, no backoff.
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> PortResult<ApiResponse> {
        let url = self.url(path);
        if self.is_development() {
            info!("API request: {} {}", method, url);
        }

        let mut request = self.client.request(method.clone(), &url);
        if let Some(json) = body {
            request = request.json(json);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.network_error(&method, &url, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.network_error(&method, &url, e))?;

        if status.as_u16() >= 500 {
            return Err(self.server_error(&method, &url, status, &text));
        }

        if self.is_development() {
            info!("API response: {} {}", status.as_u16(), url);
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body: parse_body(&text),
        })
    }

    fn network_error(&self, method: &Method, url: &str, err: reqwest::Error) -> PortError {
        let message = if err.is_timeout() {
            format!("timeout of {}ms exceeded", self.timeout.as_millis())
        } else if self.is_development() {
            err.to_string()
        } else {
            "Network Error".to_string()
        };
        if self.is_development() {
            error!("API request error: {} {}: {:?}", method, url, err);
        }
        PortError::Network(message)
    }

    /// Builds the error for a 5xx response. Outside development the backend's
    /// body is dropped and only `{message, status, status_text}` survive.
    fn server_error(&self, method: &Method, url: &str, status: StatusCode, body: &str) -> PortError {
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let mut message = format!("Request failed with status code {}", status.as_u16());
        if self.is_development() {
            error!("API response error: {} {} -> {} {}", method, url, status.as_u16(), body);
            if !body.trim().is_empty() {
                message = format!("{message}: {}", body.trim());
            }
        }
        PortError::Server {
            status: status.as_u16(),
            status_text,
            message,
        }
    }
}

/// JSON when the body parses, a JSON string otherwise, `null` when empty.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn decode<T: DeserializeOwned>(response: ApiResponse) -> PortResult<T> {
    let status = response.status;
    serde_json::from_value(response.body)
        .map_err(|e| PortError::Decode(format!("unexpected response body (status {status}): {e}")))
}

//=========================================================================================
// `BackendApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl BackendApi for HttpBackendAdapter {
    async fn check_health(&self) -> PortResult<String> {
        let response = self.get(endpoints::HEALTH).await?;
        Ok(match response.body {
            Value::String(payload) => payload,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    async fn get_config(&self) -> PortResult<ApiConfig> {
        let response = self.get(endpoints::CONFIG).await?;
        decode::<ApiConfigRecord>(response).map(ApiConfigRecord::to_domain)
    }

    async fn create_conversation(&self, initial_message: &str) -> PortResult<CreatedConversation> {
        if initial_message.trim().is_empty() {
            return Err(PortError::Validation(
                "initial message must not be empty".to_string(),
            ));
        }

        let payload = serde_json::to_value(CreateConversationRecord {
            initial_user_msg: initial_message,
        })
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self.post(endpoints::CONVERSATIONS, Some(payload)).await?;
        decode::<CreatedConversationRecord>(response).map(CreatedConversationRecord::to_domain)
    }

    async fn get(&self, path: &str) -> PortResult<ApiResponse> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> PortResult<ApiResponse> {
        self.send(Method::POST, path, body.as_ref()).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> PortResult<ApiResponse> {
        self.send(Method::PUT, path, body.as_ref()).await
    }

    async fn delete(&self, path: &str) -> PortResult<ApiResponse> {
        self.send(Method::DELETE, path, None).await
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;
