//! UI/backend events and error modeling for the desktop GUI.

use client_core::{ControllerError, EditSession};
use shared::{domain::Post, protocol::PostPayload};

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    Error(UiError),
    ListingUpdated {
        items: Vec<Post>,
        editing: Option<EditSession>,
    },
    DraftUpdated {
        draft: PostPayload,
        attached_file: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadPosts,
    SavePost,
    DeletePost,
    CreatePost,
    ReadImage,
}

impl UiErrorContext {
    fn label(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "Backend startup failed",
            UiErrorContext::LoadPosts => "Error fetching posts",
            UiErrorContext::SavePost => "Error updating post",
            UiErrorContext::DeletePost => "Error deleting post",
            UiErrorContext::CreatePost => "Error uploading post",
            UiErrorContext::ReadImage => "Error reading image",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("required")
            || message_lower.contains("invalid")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("connect")
            || message_lower.contains("dns")
            || message_lower.contains("unavailable")
            || message_lower.contains("status 5")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_controller(context: UiErrorContext, err: &ControllerError) -> Self {
        let context = match err {
            ControllerError::FileRead(_) => UiErrorContext::ReadImage,
            _ => context,
        };
        Self::from_message(context, err.to_string())
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-line text for the status bar.
    pub fn status_line(&self) -> String {
        let label = self.context().label();
        match self.category() {
            UiErrorCategory::Transport => format!(
                "{label}: server unreachable or failing; retry when it is back ({})",
                self.message()
            ),
            _ => format!("{label}: {}", self.message()),
        }
    }
}
