use thiserror::Error;

/// Failures at the edges of the tool: RPC payloads and settings files.
/// The picking and solving core itself has no error path.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid params for '{method}': {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Setting '{name}' must be finite and non-negative, got {value}")]
    InvalidSetting { name: &'static str, value: f32 },
}
