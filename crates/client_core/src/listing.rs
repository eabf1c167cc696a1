//! Home page state: the post listing plus a single inline edit session.

use std::{path::Path, sync::Arc};

use shared::{
    domain::{Post, PostId},
    protocol::PostPayload,
};
use tracing::{debug, error, info, warn};

use crate::{
    file_reader::{file_label, LocalFileReader},
    ControllerError, PostService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    Browsing,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target: PostId,
    pub working_copy: PostPayload,
    /// Name of a file picked during this session. Starts empty even when the
    /// target already has an image.
    pub attached_file: Option<String>,
}

/// How a `submit_edit` call ended when it did not fail outright.
#[derive(Debug)]
pub enum EditOutcome {
    /// No edit session was open; nothing was sent.
    NoSession,
    /// The update was stored and the listing re-fetched.
    Saved,
    /// The update was stored but the follow-up re-fetch failed, so `items`
    /// still holds the pre-edit listing.
    SavedWithStaleListing(ControllerError),
}

pub struct ListingController {
    service: Arc<dyn PostService>,
    file_reader: Arc<dyn LocalFileReader>,
    items: Vec<Post>,
    editing: Option<EditSession>,
}

impl ListingController {
    pub fn new(service: Arc<dyn PostService>, file_reader: Arc<dyn LocalFileReader>) -> Self {
        Self {
            service,
            file_reader,
            items: Vec::new(),
            editing: None,
        }
    }

    pub fn items(&self) -> &[Post] {
        &self.items
    }

    pub fn post(&self, id: &PostId) -> Option<&Post> {
        self.items.iter().find(|post| &post.id == id)
    }

    pub fn mode(&self) -> ListingMode {
        if self.editing.is_some() {
            ListingMode::Editing
        } else {
            ListingMode::Browsing
        }
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn working_copy_mut(&mut self) -> Option<&mut PostPayload> {
        self.editing.as_mut().map(|session| &mut session.working_copy)
    }

    /// Replaces `items` with the service's collection. Stale items survive a failure.
    pub async fn refresh(&mut self) -> Result<(), ControllerError> {
        match self.service.list_posts().await {
            Ok(posts) => {
                debug!(count = posts.len(), "post listing refreshed");
                self.items = posts;
                Ok(())
            }
            Err(err) => {
                error!("Error fetching posts: {err}");
                Err(err.into())
            }
        }
    }

    /// Starts editing `post`, silently dropping any edit already in progress.
    pub fn begin_edit(&mut self, post: &Post) {
        if let Some(previous) = &self.editing {
            debug!(previous = %previous.target, next = %post.id, "replacing edit target");
        }
        self.editing = Some(EditSession {
            target: post.id.clone(),
            working_copy: PostPayload::from(post),
            attached_file: None,
        });
    }

    /// Reads `path` into the working copy's image. `None` (nothing picked) is a no-op.
    pub async fn attach_edit_image(&mut self, path: Option<&Path>) -> Result<(), ControllerError> {
        let Some(path) = path else {
            return Ok(());
        };
        if self.editing.is_none() {
            debug!("ignoring image attachment outside an edit session");
            return Ok(());
        }

        let data_url = match self.file_reader.read_as_data_url(path).await {
            Ok(data_url) => data_url,
            Err(err) => {
                error!("Error reading image: {err}");
                return Err(err.into());
            }
        };
        if let Some(session) = self.editing.as_mut() {
            session.working_copy.image = Some(data_url);
            session.attached_file = Some(file_label(path));
        }
        Ok(())
    }

    /// Sends the full replacement field set for the post being edited.
    ///
    /// Success ends the session and re-fetches the listing; a failed re-fetch
    /// does not reopen the session and comes back as
    /// [`EditOutcome::SavedWithStaleListing`]. Any failure before that keeps
    /// the session, holding `working_copy`, open for a retry.
    pub async fn submit_edit(
        &mut self,
        working_copy: PostPayload,
    ) -> Result<EditOutcome, ControllerError> {
        let Some(session) = self.editing.as_mut() else {
            debug!("submit_edit without an active edit session");
            return Ok(EditOutcome::NoSession);
        };
        session.working_copy = working_copy;
        let target = session.target.clone();

        if let Some(field) = session.working_copy.missing_required_field() {
            warn!(post_id = %target, field, "refusing to submit edit with empty field");
            return Err(ControllerError::MissingField(field));
        }

        if let Err(err) = self
            .service
            .update_post(&target, &session.working_copy)
            .await
        {
            error!(post_id = %target, "Error updating post: {err}");
            return Err(err.into());
        }

        info!(post_id = %target, "post updated");
        self.editing = None;
        match self.refresh().await {
            Ok(()) => Ok(EditOutcome::Saved),
            Err(err) => Ok(EditOutcome::SavedWithStaleListing(err)),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Deletes by id and prunes the local listing without re-fetching.
    pub async fn delete_post(&mut self, id: &PostId) -> Result<(), ControllerError> {
        if let Err(err) = self.service.delete_post(id).await {
            error!(post_id = %id, "Error deleting post: {err}");
            return Err(err.into());
        }

        info!(post_id = %id, "post deleted");
        self.items.retain(|post| &post.id != id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
