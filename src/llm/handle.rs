use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::ModelConfig;
use crate::errors::{GatewayError, GatewayResult};
use crate::llm::provider::InferenceGateway;
use crate::llm::providers::openai_compatible::OpenAiCompatibleProvider;

enum GatewayState {
    NotReady(String),
    Ready(Arc<dyn InferenceGateway>),
}

/// Readiness as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GatewayStatus {
    Ready { name: String },
    NotReady { reason: String },
}

/// Shared, explicitly constructed handle to the inference backend.
///
/// Requests never wait on it: if no gateway is installed they are turned
/// away with [`GatewayError::GatewayUnavailable`].
pub struct GatewayHandle {
    state: RwLock<GatewayState>,
}

impl GatewayHandle {
    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(GatewayState::NotReady(reason.into())),
        }
    }

    pub fn ready(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self {
            state: RwLock::new(GatewayState::Ready(gateway)),
        }
    }

    /// Build the OpenAI-compatible gateway from config and install it. A bad
    /// config leaves the handle not-ready instead of failing startup.
    pub async fn connect(&self, cfg: &ModelConfig) {
        match OpenAiCompatibleProvider::from_config(cfg) {
            Ok(provider) => {
                tracing::info!(model = %cfg.model, api_base = %cfg.api_base, "inference gateway configured");
                self.install(Arc::new(provider)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "inference gateway not configured; requests will get 503");
                self.mark_unavailable(e.to_string()).await;
            }
        }
    }

    async fn install(&self, gateway: Arc<dyn InferenceGateway>) {
        tracing::info!(gateway = gateway.name(), "inference gateway installed");
        *self.state.write().await = GatewayState::Ready(gateway);
    }

    async fn mark_unavailable(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(reason = %reason, "inference gateway marked unavailable");
        *self.state.write().await = GatewayState::NotReady(reason);
    }

    pub async fn get(&self) -> GatewayResult<Arc<dyn InferenceGateway>> {
        match &*self.state.read().await {
            GatewayState::Ready(gateway) => Ok(Arc::clone(gateway)),
            GatewayState::NotReady(reason) => Err(GatewayError::GatewayUnavailable(reason.clone())),
        }
    }

    pub async fn status(&self) -> GatewayStatus {
        match &*self.state.read().await {
            GatewayState::Ready(gateway) => GatewayStatus::Ready { name: gateway.name().to_string() },
            GatewayState::NotReady(reason) => GatewayStatus::NotReady { reason: reason.clone() },
        }
    }
}
