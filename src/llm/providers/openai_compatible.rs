use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::config::ModelConfig;
use crate::errors::{GatewayError, GatewayResult};
use crate::llm::provider::InferenceGateway;
use crate::llm::sse_parser;
use crate::llm::types::{
    CallConfig, ChatMessage, ContentPart, ImagePayload, ImageUrl, StreamChunkKind,
};

/// Talks to any `/v1/chat/completions` server hosting the grounding model
/// (vLLM, TGI, a hosted UI-TARS endpoint, ...).
pub struct OpenAiCompatibleProvider {
    id: String,
    api_base: String,
    api_key: String,
    call: CallConfig,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(id: String, api_base: String, api_key: String, call: CallConfig, timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            id,
            api_base,
            api_key,
            call,
            client,
        })
    }

    pub fn from_config(cfg: &ModelConfig) -> GatewayResult<Self> {
        if cfg.api_base.trim().is_empty() {
            return Err(GatewayError::Config("[model].api_base is not set".into()));
        }
        if cfg.model.trim().is_empty() {
            return Err(GatewayError::Config("[model].model is not set".into()));
        }
        Self::new(
            cfg.model.clone(),
            cfg.api_base.clone(),
            cfg.api_key.clone().unwrap_or_default(),
            CallConfig {
                model: cfg.model.clone(),
                stream: cfg.stream,
                temperature: cfg.temperature,
                max_tokens: cfg.max_tokens,
            },
            Duration::from_secs(cfg.request_timeout_secs.max(1)),
        )
    }

    fn request_body(&self, prompt: &str, image: &ImagePayload) -> GatewayResult<serde_json::Value> {
        let messages = vec![ChatMessage {
            role: "user".into(),
            content: vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: image.data_url() },
                },
                ContentPart::Text { text: prompt.to_string() },
            ],
        }];
        Ok(serde_json::json!({
            "model": self.call.model,
            "messages": serde_json::to_value(&messages)?,
            "stream": self.call.stream,
            "temperature": self.call.temperature,
            "max_tokens": self.call.max_tokens,
        }))
    }
}

#[async_trait]
impl InferenceGateway for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn generate(&self, prompt: &str, image: &ImagePayload) -> GatewayResult<String> {
        let body = self.request_body(prompt, image)?;

        tracing::debug!(
            provider = %self.id,
            model = %self.call.model,
            stream = self.call.stream,
            prompt_len = prompt.len(),
            image_bytes = image.bytes.len(),
            mime = %image.mime,
            "sending grounding request"
        );

        let mut request = self.client.post(&self.api_base).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::LlmProvider(format!("{}: {}", status, err_body)));
        }

        if self.call.stream {
            self.handle_stream(response).await
        } else {
            self.handle_json(response).await
        }
    }
}

impl OpenAiCompatibleProvider {
    /// Accumulate an SSE stream into the full completion text.
    async fn handle_stream(&self, response: reqwest::Response) -> GatewayResult<String> {
        let mut byte_stream = response.bytes_stream();
        let mut line_buf: Vec<u8> = Vec::new();
        let mut content = String::new();
        let mut reasoning_len = 0usize;

        'stream: while let Some(result) = byte_stream.next().await {
            let bytes = result?;
            for &b in bytes.iter() {
                if b != b'\n' {
                    line_buf.push(b);
                    continue;
                }
                let line = String::from_utf8_lossy(&line_buf).trim().to_string();
                line_buf.clear();
                if line.is_empty() {
                    continue;
                }

                match sse_parser::parse_sse_line(&line) {
                    Ok(Some(chunk)) => match chunk.kind {
                        StreamChunkKind::Content => content.push_str(&chunk.content),
                        StreamChunkKind::Reasoning => reasoning_len += chunk.content.len(),
                        StreamChunkKind::Done => break 'stream,
                    },
                    Ok(None) => {}
                    Err(e) => {
                        tracing::debug!("SSE parse skipped: {e}");
                    }
                }
            }
        }

        tracing::info!(
            provider = %self.id,
            content_len = content.len(),
            reasoning_len,
            "grounding stream complete"
        );
        Ok(content)
    }

    async fn handle_json(&self, response: reqwest::Response) -> GatewayResult<String> {
        let json: serde_json::Value = response.json().await?;
        let content = extract_message_content(&json)?;
        tracing::info!(provider = %self.id, content_len = content.len(), "grounding response received");
        Ok(content)
    }
}

fn extract_message_content(json: &serde_json::Value) -> GatewayResult<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GatewayError::LlmProvider("response carried no message content".into()))
}
