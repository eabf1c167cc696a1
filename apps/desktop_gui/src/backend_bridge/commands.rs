//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use shared::{domain::PostId, protocol::PostPayload};

#[derive(Debug)]
pub enum BackendCommand {
    RefreshPosts,
    BeginEdit { post_id: PostId },
    AttachEditImage { path: PathBuf },
    SubmitEdit { working_copy: PostPayload },
    CancelEdit,
    DeletePost { post_id: PostId },
    AttachImage { path: PathBuf },
    SubmitDraft { draft: PostPayload },
    CancelDraft,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::RefreshPosts => "refresh_posts",
            BackendCommand::BeginEdit { .. } => "begin_edit",
            BackendCommand::AttachEditImage { .. } => "attach_edit_image",
            BackendCommand::SubmitEdit { .. } => "submit_edit",
            BackendCommand::CancelEdit => "cancel_edit",
            BackendCommand::DeletePost { .. } => "delete_post",
            BackendCommand::AttachImage { .. } => "attach_image",
            BackendCommand::SubmitDraft { .. } => "submit_draft",
            BackendCommand::CancelDraft => "cancel_draft",
        }
    }
}
