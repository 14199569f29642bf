//! `SeaORM` implementation of the `PostService` trait.

use async_trait::async_trait;

use crate::auth::{self, SessionClaim};
use crate::db::{Post, Store};
use crate::sanitize::{self, FieldKind};
use crate::services::post_service::{PostDraft, PostError, PostService};

pub struct SeaOrmPostService {
    store: Store,
}

impl SeaOrmPostService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Run each draft field through the sanitizer matching its shape.
/// The cover image is an opaque URL; it is validated at the API boundary.
fn sanitize_draft(draft: &PostDraft) -> Result<PostDraft, PostError> {
    Ok(PostDraft {
        title: sanitize::sanitize(FieldKind::Plain, &draft.title)?,
        summary: sanitize::sanitize(FieldKind::Plain, &draft.summary)?,
        content: sanitize::sanitize(FieldKind::Rich, &draft.content)?,
        cover_image: draft.cover_image.clone(),
    })
}

#[async_trait]
impl PostService for SeaOrmPostService {
    async fn create(&self, claim: &SessionClaim, draft: PostDraft) -> Result<Post, PostError> {
        let clean = sanitize_draft(&draft)?;

        let post = self
            .store
            .create_post(
                claim.sub,
                &clean.title,
                &clean.summary,
                &clean.content,
                clean.cover_image.as_deref(),
            )
            .await?;

        tracing::info!(post_id = post.id, author_id = claim.sub, "Post created");

        Ok(post)
    }

    async fn update(
        &self,
        claim: &SessionClaim,
        id: i32,
        draft: PostDraft,
    ) -> Result<Post, PostError> {
        // Locate before authorizing, so a missing post reads as NotFound
        // rather than as an ownership failure.
        let existing = self.store.get_post(id).await?.ok_or(PostError::NotFound)?;

        if !auth::is_owner(claim, existing.author_id) {
            return Err(PostError::NotAuthor);
        }

        let clean = sanitize_draft(&draft)?;

        self.store
            .update_post(
                id,
                &clean.title,
                &clean.summary,
                &clean.content,
                clean.cover_image.as_deref(),
            )
            .await?
            .ok_or(PostError::NotFound)
    }

    async fn delete(&self, claim: &SessionClaim, id: i32) -> Result<(), PostError> {
        // Ownership is folded into the lookup: a non-owner gets the same
        // NotFound a nonexistent id gets.
        let deleted = self.store.delete_post_owned(id, claim.sub).await?;

        if !deleted {
            return Err(PostError::NotFound);
        }

        tracing::info!(post_id = id, author_id = claim.sub, "Post deleted");

        Ok(())
    }

    async fn get(&self, id: i32) -> Result<Option<Post>, PostError> {
        Ok(self.store.get_post(id).await?)
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<Post>, PostError> {
        Ok(self.store.list_recent_posts(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_draft_covers_every_field() {
        let draft = PostDraft {
            title: "<b>title</b>".to_string(),
            summary: "a & b".to_string(),
            content: "<p>ok</p><script>bad()</script>".to_string(),
            cover_image: Some("https://example.com/x.png".to_string()),
        };

        let clean = sanitize_draft(&draft).unwrap();

        assert_eq!(clean.title, "&lt;b&gt;title&lt;/b&gt;");
        assert_eq!(clean.summary, "a &amp; b");
        assert!(!clean.content.contains("script"));
        assert!(clean.content.contains("<p>ok</p>"));
        assert_eq!(clean.cover_image.as_deref(), Some("https://example.com/x.png"));
    }
}
