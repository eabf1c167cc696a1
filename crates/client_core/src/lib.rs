use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Post, PostId},
    error::ApiError,
    protocol::PostPayload,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub mod config;
pub mod creation;
pub mod file_reader;
pub mod listing;

pub use config::{load_settings, ClientSettings, SettingsError};
pub use creation::CreationController;
pub use file_reader::{DataUrlFileReader, FileReadError, LocalFileReader};
pub use listing::{EditOutcome, EditSession, ListingController, ListingMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOperation {
    List,
    Create,
    Update,
    Delete,
}

impl fmt::Display for PostOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PostOperation::List => "list posts",
            PostOperation::Create => "create post",
            PostOperation::Update => "update post",
            PostOperation::Delete => "delete post",
        };
        f.write_str(name)
    }
}

/// A remote post operation failed.
///
/// Network failures, non-success statuses, and undecodable bodies all land
/// here; callers only learn which operation failed and why.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {message}")]
pub struct PostServiceError {
    pub operation: PostOperation,
    pub message: String,
}

impl PostServiceError {
    pub fn new(operation: PostOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    fn transport(operation: PostOperation, err: reqwest::Error) -> Self {
        Self::new(operation, err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Remote(#[from] PostServiceError),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    FileRead(#[from] FileReadError),
}

#[async_trait]
pub trait PostService: Send + Sync {
    async fn list_posts(&self) -> Result<Vec<Post>, PostServiceError>;
    /// Returns the created post when the service echoes one back.
    async fn create_post(&self, payload: &PostPayload) -> Result<Option<Post>, PostServiceError>;
    async fn update_post(
        &self,
        id: &PostId,
        payload: &PostPayload,
    ) -> Result<Option<Post>, PostServiceError>;
    async fn delete_post(&self, id: &PostId) -> Result<(), PostServiceError>;
}

/// `PostService` backed by the `/api/posts` REST collection.
pub struct HttpPostService {
    http: Client,
    base_url: Url,
}

impl HttpPostService {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.base_url()?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(
        &self,
        operation: PostOperation,
        id: Option<&PostId>,
    ) -> Result<Url, PostServiceError> {
        // The url crate resolves `.` and `..` segments, which would widen an
        // item request to the collection.
        if let Some(id) = id {
            if matches!(id.as_str(), "" | "." | "..") {
                return Err(PostServiceError::new(
                    operation,
                    format!("invalid post id '{id}'"),
                ));
            }
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                PostServiceError::new(
                    operation,
                    format!("base url '{}' cannot carry a path", self.base_url),
                )
            })?;
            segments.pop_if_empty().extend(["api", "posts"]);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }
}

async fn ensure_success(
    operation: PostOperation,
    res: Response,
) -> Result<Response, PostServiceError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiError>(&body)
        .map(|api_error| api_error.message)
        .unwrap_or(body);
    let message = if detail.trim().is_empty() {
        format!("status {status}")
    } else {
        format!("status {status}: {}", detail.trim())
    };
    Err(PostServiceError::new(operation, message))
}

async fn decode_echoed_post(operation: PostOperation, res: Response) -> Option<Post> {
    match res.json::<Post>().await {
        Ok(post) => Some(post),
        Err(err) => {
            debug!(%operation, "service response carried no decodable post: {err}");
            None
        }
    }
}

#[async_trait]
impl PostService for HttpPostService {
    async fn list_posts(&self) -> Result<Vec<Post>, PostServiceError> {
        let operation = PostOperation::List;
        let res = self
            .http
            .get(self.endpoint(operation, None)?)
            .send()
            .await
            .map_err(|err| PostServiceError::transport(operation, err))?;
        let res = ensure_success(operation, res).await?;
        res.json::<Vec<Post>>()
            .await
            .map_err(|err| PostServiceError::transport(operation, err))
    }

    async fn create_post(&self, payload: &PostPayload) -> Result<Option<Post>, PostServiceError> {
        let operation = PostOperation::Create;
        let res = self
            .http
            .post(self.endpoint(operation, None)?)
            .json(payload)
            .send()
            .await
            .map_err(|err| PostServiceError::transport(operation, err))?;
        let res = ensure_success(operation, res).await?;
        Ok(decode_echoed_post(operation, res).await)
    }

    async fn update_post(
        &self,
        id: &PostId,
        payload: &PostPayload,
    ) -> Result<Option<Post>, PostServiceError> {
        let operation = PostOperation::Update;
        let res = self
            .http
            .put(self.endpoint(operation, Some(id))?)
            .json(payload)
            .send()
            .await
            .map_err(|err| PostServiceError::transport(operation, err))?;
        let res = ensure_success(operation, res).await?;
        Ok(decode_echoed_post(operation, res).await)
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), PostServiceError> {
        let operation = PostOperation::Delete;
        let res = self
            .http
            .delete(self.endpoint(operation, Some(id))?)
            .send()
            .await
            .map_err(|err| PostServiceError::transport(operation, err))?;
        ensure_success(operation, res).await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[path = "tests/support.rs"]
pub mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
