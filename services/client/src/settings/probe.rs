//! services/client/src/settings/probe.rs
//!
//! Read-only connectivity probe behind the settings screen: fetches the
//! backend configuration and checks the health endpoint.

use openhands_client_core::{domain::ApiConfig, ports::BackendApi};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// The payload a healthy backend returns from `/health`.
pub const HEALTHY_PAYLOAD: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Loading,
    Success,
    Error,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Loading => "loading",
            ProbeStatus::Success => "success",
            ProbeStatus::Error => "error",
        }
    }
}

/// What the settings screen renders from.
#[derive(Debug, Clone)]
pub struct ProbeState {
    pub status: ProbeStatus,
    /// Last config snapshot that loaded; replaced wholesale on re-fetch.
    pub config: Option<ApiConfig>,
    pub health_payload: Option<String>,
    pub last_error: Option<String>,
}

pub struct SettingsProbe {
    backend: Arc<dyn BackendApi>,
    backend_url: String,
    ws_url: Option<String>,
    state: ProbeState,
}

impl SettingsProbe {
    pub fn new(backend: Arc<dyn BackendApi>, backend_url: impl Into<String>) -> Self {
        Self {
            backend,
            backend_url: backend_url.into(),
            ws_url: None,
            state: ProbeState {
                status: ProbeStatus::Loading,
                config: None,
                health_payload: None,
                last_error: None,
            },
        }
    }

    /// Shows the reserved live-update endpoint in the report.
    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = Some(ws_url.into());
        self
    }

    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    /// Loads the backend config, then checks health.
    /// Success requires both.
    pub async fn mount(&mut self) -> ProbeStatus {
        self.state.status = ProbeStatus::Loading;
        self.state.last_error = None;

        let config_loaded = match self.backend.get_config().await {
            Ok(config) => {
                info!("Loaded backend config (mode: {}).", config.app_mode);
                self.state.config = Some(config);
                true
            }
            Err(e) => {
                warn!("Failed to load config: {}", e);
                self.state.last_error = Some(e.to_string());
                false
            }
        };
        let healthy = self.run_health_check().await;

        self.state.status = if config_loaded && healthy {
            ProbeStatus::Success
        } else {
            ProbeStatus::Error
        };
        self.state.status
    }

    /// Re-runs only the health check.
    pub async fn test_connection(&mut self) -> ProbeStatus {
        self.state.status = ProbeStatus::Loading;
        self.state.last_error = None;
        self.state.status = if self.run_health_check().await {
            ProbeStatus::Success
        } else {
            ProbeStatus::Error
        };
        self.state.status
    }

    async fn run_health_check(&mut self) -> bool {
        match self.backend.check_health().await {
            Ok(payload) => {
                let healthy = payload == HEALTHY_PAYLOAD;
                if !healthy {
                    warn!("Unexpected health payload: {:?}", payload);
                    self.state.last_error = Some(format!("unexpected health payload: {payload:?}"));
                }
                self.state.health_payload = Some(payload);
                healthy
            }
            Err(e) => {
                warn!("Connection test failed: {}", e);
                self.state.health_payload = None;
                self.state.last_error = Some(e.to_string());
                false
            }
        }
    }

    pub fn report(&self) -> SettingsReport {
        let config = self.state.config.as_ref();
        SettingsReport {
            backend_url: self.backend_url.clone(),
            ws_url: self.ws_url.clone(),
            status: self.state.status,
            app_mode: config.map(|c| c.app_mode.clone()),
            billing: config.map(|c| enabled_label(c.feature_flags.enable_billing)),
            llm_settings: config.map(|c| {
                if c.feature_flags.hide_llm_settings {
                    "Hidden"
                } else {
                    "Visible"
                }
            }),
            error: self.state.last_error.clone(),
        }
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "Enabled"
    } else {
        "Disabled"
    }
}

//=========================================================================================
// SettingsReport
//=========================================================================================

/// Human-readable view of the probe. Config-derived fields are `None` until a
/// config has loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsReport {
    pub backend_url: String,
    pub ws_url: Option<String>,
    pub status: ProbeStatus,
    pub app_mode: Option<String>,
    pub billing: Option<&'static str>,
    pub llm_settings: Option<&'static str>,
    pub error: Option<String>,
}

impl fmt::Display for SettingsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unknown = "unknown";
        writeln!(f, "Backend URL:   {}", self.backend_url)?;
        if let Some(ws_url) = &self.ws_url {
            writeln!(f, "WebSocket URL: {ws_url}")?;
        }
        writeln!(f, "Status:        {}", self.status.as_str())?;
        writeln!(f, "App mode:      {}", self.app_mode.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Billing:       {}", self.billing.unwrap_or(unknown))?;
        write!(f, "LLM settings:  {}", self.llm_settings.unwrap_or(unknown))?;
        if let Some(error) = &self.error {
            write!(f, "\nError:         {error}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "probe_test.rs"]
mod probe_test;
