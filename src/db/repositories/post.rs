use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{posts, users};

/// Post row joined with its author's username.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub author_id: i32,
    pub author_username: String,
    pub created_at: String,
    pub updated_at: String,
}

fn with_author(post: posts::Model, author: Option<users::Model>) -> Post {
    Post {
        id: post.id,
        title: post.title,
        summary: post.summary,
        content: post.content,
        cover_image: post.cover_image,
        author_id: post.author_id,
        author_username: author.map(|a| a.username).unwrap_or_default(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get a post by ID, with its author joined in
    pub async fn get(&self, id: i32) -> Result<Option<Post>> {
        let found = posts::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query post")?;

        Ok(found.map(|(post, author)| with_author(post, author)))
    }

    /// List posts newest first, with authors joined in
    pub async fn list_recent(&self, limit: u64) -> Result<Vec<Post>> {
        let rows = posts::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(posts::Column::CreatedAt)
            .order_by_desc(posts::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list posts")?;

        Ok(rows
            .into_iter()
            .map(|(post, author)| with_author(post, author))
            .collect())
    }

    pub async fn create(
        &self,
        author_id: i32,
        title: &str,
        summary: &str,
        content: &str,
        cover_image: Option<&str>,
    ) -> Result<Post> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = posts::ActiveModel {
            title: Set(title.to_string()),
            summary: Set(summary.to_string()),
            content: Set(content.to_string()),
            cover_image: Set(cover_image.map(ToString::to_string)),
            author_id: Set(author_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert post")?;

        self.get(model.id)
            .await?
            .context("Inserted post vanished before readback")
    }

    /// Replace the editable fields of an existing post.
    /// Returns `None` when the post does not exist.
    pub async fn update_fields(
        &self,
        id: i32,
        title: &str,
        summary: &str,
        content: &str,
        cover_image: Option<&str>,
    ) -> Result<Option<Post>> {
        let Some(post) = posts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post for update")?
        else {
            return Ok(None);
        };

        let mut active: posts::ActiveModel = post.into();
        active.title = Set(title.to_string());
        active.summary = Set(summary.to_string());
        active.content = Set(content.to_string());
        active.cover_image = Set(cover_image.map(ToString::to_string));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update post")?;

        self.get(model.id).await
    }

    /// Delete a post only when it belongs to the given author.
    ///
    /// Returns `false` for a missing post and for a non-matching author
    /// alike; callers cannot distinguish the two cases.
    pub async fn delete_owned(&self, id: i32, author_id: i32) -> Result<bool> {
        let result = posts::Entity::delete_many()
            .filter(posts::Column::Id.eq(id))
            .filter(posts::Column::AuthorId.eq(author_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete post")?;

        Ok(result.rows_affected > 0)
    }
}
