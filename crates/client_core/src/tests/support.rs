//! In-memory doubles for the post service and file reader.

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use shared::{
    domain::{Post, PostId},
    protocol::PostPayload,
};
use tokio::sync::Mutex;

use crate::{
    file_reader::{encode_data_url, FileReadError, LocalFileReader},
    PostOperation, PostService, PostServiceError,
};

pub fn post(id: &str, title: &str, description: &str) -> Post {
    Post {
        id: PostId::new(id),
        title: title.to_string(),
        description: description.to_string(),
        image: None,
    }
}

/// In-memory post collection with a switchable failure mode.
pub struct TestPostService {
    posts: Mutex<Vec<Post>>,
    next_id: Mutex<u64>,
    fail_with: Mutex<Option<String>>,
    fail_on: Mutex<Option<(PostOperation, String)>>,
    calls: Mutex<Vec<PostOperation>>,
}

impl TestPostService {
    pub fn with_posts(posts: Vec<Post>) -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(posts.len() as u64 + 1),
            posts: Mutex::new(posts),
            fail_with: Mutex::new(None),
            fail_on: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::with_posts(Vec::new())
    }

    pub async fn fail_with(&self, err: impl Into<String>) {
        *self.fail_with.lock().await = Some(err.into());
    }

    /// Fails only `operation`; every other call goes through.
    pub async fn fail_on(&self, operation: PostOperation, err: impl Into<String>) {
        *self.fail_on.lock().await = Some((operation, err.into()));
    }

    pub async fn recover(&self) {
        *self.fail_with.lock().await = None;
        *self.fail_on.lock().await = None;
    }

    pub async fn stored(&self) -> Vec<Post> {
        self.posts.lock().await.clone()
    }

    pub async fn call_log(&self) -> Vec<PostOperation> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, operation: PostOperation) -> Result<(), PostServiceError> {
        self.calls.lock().await.push(operation);
        if let Some(err) = self.fail_with.lock().await.as_ref() {
            return Err(PostServiceError::new(operation, err.clone()));
        }
        match self.fail_on.lock().await.as_ref() {
            Some((failing, err)) if *failing == operation => {
                Err(PostServiceError::new(operation, err.clone()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl PostService for TestPostService {
    async fn list_posts(&self) -> Result<Vec<Post>, PostServiceError> {
        self.record(PostOperation::List).await?;
        Ok(self.posts.lock().await.clone())
    }

    async fn create_post(&self, payload: &PostPayload) -> Result<Option<Post>, PostServiceError> {
        self.record(PostOperation::Create).await?;
        let mut next_id = self.next_id.lock().await;
        let created = Post {
            id: PostId::new(next_id.to_string()),
            title: payload.title.clone(),
            description: payload.description.clone(),
            image: payload.image.clone(),
        };
        *next_id += 1;
        self.posts.lock().await.push(created.clone());
        Ok(Some(created))
    }

    async fn update_post(
        &self,
        id: &PostId,
        payload: &PostPayload,
    ) -> Result<Option<Post>, PostServiceError> {
        self.record(PostOperation::Update).await?;
        let mut posts = self.posts.lock().await;
        let Some(existing) = posts.iter_mut().find(|post| &post.id == id) else {
            return Err(PostServiceError::new(
                PostOperation::Update,
                "status 404 Not Found",
            ));
        };
        existing.title = payload.title.clone();
        existing.description = payload.description.clone();
        existing.image = payload.image.clone();
        Ok(Some(existing.clone()))
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), PostServiceError> {
        self.record(PostOperation::Delete).await?;
        self.posts.lock().await.retain(|post| &post.id != id);
        Ok(())
    }
}

/// Encodes the file name instead of touching the disk; `missing.png` fails.
pub struct TestFileReader;

#[async_trait]
impl LocalFileReader for TestFileReader {
    async fn read_as_data_url(&self, path: &Path) -> Result<String, FileReadError> {
        if path.ends_with("missing.png") {
            return Err(FileReadError {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        let name = path.to_string_lossy();
        Ok(encode_data_url("image/png", name.as_bytes()))
    }
}

pub fn file_reader() -> Arc<TestFileReader> {
    Arc::new(TestFileReader)
}
