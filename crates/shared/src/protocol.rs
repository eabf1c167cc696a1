use serde::{Deserialize, Serialize};

use crate::domain::Post;

/// Request body for both `POST /api/posts` and `PUT /api/posts/{id}`.
///
/// Doubles as the editable field set of a post: the creation draft and the
/// edit working copy are both a `PostPayload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

impl PostPayload {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty() && self.image.is_none()
    }

    /// Name of the first required field left empty, if any.
    pub fn missing_required_field(&self) -> Option<&'static str> {
        if self.title.is_empty() {
            Some("title")
        } else if self.description.is_empty() {
            Some("description")
        } else {
            None
        }
    }
}

impl From<&Post> for PostPayload {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            image: post.image.clone(),
        }
    }
}
