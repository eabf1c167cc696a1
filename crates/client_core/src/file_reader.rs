//! Reads user-selected files into the `data:` URL form posts carry images in.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to read '{}': {source}", .path.display())]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[async_trait]
pub trait LocalFileReader: Send + Sync {
    async fn read_as_data_url(&self, path: &Path) -> Result<String, FileReadError>;
}

/// Reads the whole file and base64-encodes it. No size limit.
pub struct DataUrlFileReader;

#[async_trait]
impl LocalFileReader for DataUrlFileReader {
    async fn read_as_data_url(&self, path: &Path) -> Result<String, FileReadError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        Ok(encode_data_url(mime.essence_str(), &bytes))
    }
}

pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Splits a base64 `data:` URL into its MIME type and decoded bytes.
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime_type.to_string(), bytes))
}

/// Display name for an attached-file indicator.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
