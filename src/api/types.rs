use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable machine-checkable error discriminator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    pub fn error(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            kind: Some(kind),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorDto {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct PostDto {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub author: AuthorDto,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::db::Post> for PostDto {
    fn from(post: crate::db::Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            summary: post.summary,
            content: post.content,
            cover_image: post.cover_image,
            author: AuthorDto {
                id: post.author_id,
                username: post.author_username,
            },
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
