use serde::Deserialize;

/// Error body the post service may return alongside a non-success status.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(alias = "error")]
    pub message: String,
}
