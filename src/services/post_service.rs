//! Domain service for post authoring.

use thiserror::Error;

use crate::auth::SessionClaim;
use crate::db::Post;
use crate::sanitize::SanitizeError;

/// Errors specific to post operations.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Not the author of this post")]
    NotAuthor,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PostError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PostError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<SanitizeError> for PostError {
    fn from(err: SanitizeError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Incoming post fields, before sanitization.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
}

/// Domain service trait for post authoring.
#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    /// Creates a post authored by the session's account. Every field is
    /// sanitized; the author comes from the claim, never from the client.
    async fn create(&self, claim: &SessionClaim, draft: PostDraft) -> Result<Post, PostError>;

    /// Updates a post after locating it and checking authorship, in that
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::NotFound`] when no such post exists and
    /// [`PostError::NotAuthor`] when it belongs to another account.
    async fn update(
        &self,
        claim: &SessionClaim,
        id: i32,
        draft: PostDraft,
    ) -> Result<Post, PostError>;

    /// Deletes a post owned by the session's account.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::NotFound`] both when the post does not exist
    /// and when it is owned by another account.
    async fn delete(&self, claim: &SessionClaim, id: i32) -> Result<(), PostError>;

    async fn get(&self, id: i32) -> Result<Option<Post>, PostError>;

    async fn list_recent(&self, limit: u64) -> Result<Vec<Post>, PostError>;
}
