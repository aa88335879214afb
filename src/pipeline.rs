/// One grounding request, end to end.
use std::io::Cursor;
use std::sync::Arc;

use serde::Serialize;

use crate::config::AppConfig;
use crate::errors::{GatewayError, GatewayResult};
use crate::grounding::parser::{self, ModelVariant};
use crate::grounding::prompt::{self, PromptProfile};
use crate::grounding::resize::ResizeLimits;
use crate::grounding::resolve;
use crate::grounding::script::{self, ScriptOptions};
use crate::grounding::types::{ActionSequence, TargetResolution};
use crate::llm::handle::GatewayHandle;
use crate::llm::types::ImagePayload;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub resize: ResizeLimits,
    pub coordinate_divisor: f64,
    pub variant: ModelVariant,
    pub profile: PromptProfile,
    pub language: String,
    pub script: ScriptOptions,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for PipelineSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            resize: cfg.resize.clone(),
            coordinate_divisor: cfg.model.coordinate_divisor,
            variant: cfg.model.variant,
            profile: cfg.prompt.profile,
            language: cfg.prompt.language.clone(),
            script: ScriptOptions {
                scale_factor: cfg.script.scale_factor,
                input_swap: cfg.script.input_swap,
            },
        }
    }
}

/// What the endpoint returns for every accepted request.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub request_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub original_width: u32,
    pub original_height: u32,
    pub resized_width: u32,
    pub resized_height: u32,
    pub raw_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    pub parsed_actions: ActionSequence,
    pub pyautogui_code: String,
    pub target: TargetResolution,
    pub actual_x: Option<u32>,
    pub actual_y: Option<u32>,
}

pub struct GroundingPipeline {
    gateway: Arc<GatewayHandle>,
    settings: PipelineSettings,
}

impl GroundingPipeline {
    pub fn new(gateway: Arc<GatewayHandle>, settings: PipelineSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn gateway(&self) -> &GatewayHandle {
        &self.gateway
    }

    pub async fn process(&self, image_bytes: &[u8], instruction: &str) -> GatewayResult<ResponseEnvelope> {
        let gateway = self.gateway.get().await?;
        let request_id = uuid::Uuid::new_v4();

        let image = decode_image(image_bytes)?;
        let (width, height) = (image.width, image.height);
        let resized = self.settings.resize.plan(height, width)?;
        tracing::info!(
            %request_id,
            width,
            height,
            resized_width = resized.width,
            resized_height = resized.height,
            "processing grounding request"
        );

        let prompt = prompt::build_with(self.settings.profile, &self.settings.language, instruction);
        let raw_output = gateway.generate(&prompt, &image).await?;
        tracing::debug!(%request_id, raw_output = %raw_output, "model output");

        let (thought, actions) = match parser::parse_response(
            &raw_output,
            self.settings.coordinate_divisor,
            resized.height,
            resized.width,
            self.settings.variant,
        ) {
            Ok(parsed) => (parsed.header.thought, parsed.actions),
            Err(e) => {
                tracing::warn!(%request_id, error = %e, "model output not decodable; returning raw text only");
                (parser::parse_header(&raw_output).thought, Vec::new())
            }
        };

        let resolved = resolve::resolve_all(&actions, width, height);
        let code = script::render_with(&resolved, width, height, &self.settings.script);
        let target = resolve::first_target(&resolved);
        let point = target.point();

        tracing::info!(%request_id, actions = actions.len(), resolution = ?target, "grounding request done");

        Ok(ResponseEnvelope {
            request_id,
            created_at: chrono::Utc::now(),
            original_width: width,
            original_height: height,
            resized_width: resized.width,
            resized_height: resized.height,
            raw_output,
            thought,
            parsed_actions: actions,
            pyautogui_code: code,
            target,
            actual_x: point.map(|p| p.x),
            actual_y: point.map(|p| p.y),
        })
    }
}

fn decode_image(bytes: &[u8]) -> GatewayResult<ImagePayload> {
    if bytes.is_empty() {
        return Err(GatewayError::InvalidImage("empty upload".into()));
    }
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| GatewayError::InvalidImage(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| GatewayError::InvalidImage("unrecognized image format".into()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| GatewayError::InvalidImage(e.to_string()))?;

    Ok(ImagePayload {
        bytes: bytes.to_vec(),
        mime: format.to_mime_type().to_string(),
        width,
        height,
    })
}
