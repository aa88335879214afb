use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("absolute aspect ratio must be smaller than {max}, got {ratio}")]
    InvalidAspectRatio { ratio: f64, max: f64 },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Coordinate extraction error: {0}")]
    CoordinateExtraction(String),

    #[error("Inference gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("SSE parsing error: {0}")]
    SseParsing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl serde::Serialize for GatewayError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
