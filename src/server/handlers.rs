use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use super::error::ApiError;
use super::AppState;
use crate::llm::handle::GatewayStatus;
use crate::pipeline::ResponseEnvelope;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub gateway: GatewayStatus,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let gateway = state.pipeline.gateway().status().await;
    let status = match gateway {
        GatewayStatus::Ready { .. } => "ok",
        GatewayStatus::NotReady { .. } => "degraded",
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        gateway,
    })
}

/// `POST /process_image`: multipart with an `instruction` text field and a
/// `file` screenshot field.
pub async fn process_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let mut instruction: Option<String> = None;
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("instruction") => {
                instruction = Some(field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?);
            }
            Some("file") => {
                let bytes = field.bytes().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
                file = Some(bytes.to_vec());
            }
            other => {
                tracing::debug!(field = ?other, "ignoring unknown multipart field");
            }
        }
    }

    let instruction = instruction.ok_or_else(|| ApiError::BadRequest("missing field `instruction`".into()))?;
    let file = file.ok_or_else(|| ApiError::BadRequest("missing field `file`".into()))?;

    let envelope = state.pipeline.process(&file, &instruction).await?;
    Ok(Json(envelope))
}
