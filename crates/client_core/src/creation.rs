//! Upload page state: a single draft post.

use std::{path::Path, sync::Arc};

use shared::{domain::Post, protocol::PostPayload};
use tracing::{error, info, warn};

use crate::{
    file_reader::{file_label, LocalFileReader},
    ControllerError, PostService,
};

pub struct CreationController {
    service: Arc<dyn PostService>,
    file_reader: Arc<dyn LocalFileReader>,
    draft: PostPayload,
    attached_file: Option<String>,
}

impl CreationController {
    pub fn new(service: Arc<dyn PostService>, file_reader: Arc<dyn LocalFileReader>) -> Self {
        Self {
            service,
            file_reader,
            draft: PostPayload::default(),
            attached_file: None,
        }
    }

    pub fn draft(&self) -> &PostPayload {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PostPayload {
        &mut self.draft
    }

    pub fn attached_file(&self) -> Option<&str> {
        self.attached_file.as_deref()
    }

    /// Replaces the draft image with the picked file. `None` is a no-op.
    pub async fn attach_image(&mut self, path: Option<&Path>) -> Result<(), ControllerError> {
        let Some(path) = path else {
            return Ok(());
        };

        match self.file_reader.read_as_data_url(path).await {
            Ok(data_url) => {
                self.draft.image = Some(data_url);
                self.attached_file = Some(file_label(path));
                Ok(())
            }
            Err(err) => {
                error!("Error reading image: {err}");
                Err(err.into())
            }
        }
    }

    /// Creates a post from `draft`. The draft is cleared only on success.
    pub async fn submit(&mut self, draft: PostPayload) -> Result<Option<Post>, ControllerError> {
        self.draft = draft;

        if let Some(field) = self.draft.missing_required_field() {
            warn!(field, "refusing to submit draft with empty field");
            return Err(ControllerError::MissingField(field));
        }

        match self.service.create_post(&self.draft).await {
            Ok(created) => {
                match &created {
                    Some(post) => info!(post_id = %post.id, "post created"),
                    None => info!("post created"),
                }
                self.reset();
                Ok(created)
            }
            Err(err) => {
                error!("Error uploading post: {err}");
                Err(err.into())
            }
        }
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.draft = PostPayload::default();
        self.attached_file = None;
    }
}

#[cfg(test)]
#[path = "tests/creation_tests.rs"]
mod tests;
