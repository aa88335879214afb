use async_trait::async_trait;

use crate::errors::GatewayResult;
use crate::llm::types::ImagePayload;

/// The model behind the endpoint: screenshot + prompt in, completion text out.
///
/// Implementations own their own image preprocessing; it must agree with the
/// resize plan the parser is given.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Identifier used in logs and the health report.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, image: &ImagePayload) -> GatewayResult<String>;
}
