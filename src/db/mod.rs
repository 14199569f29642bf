use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::post::Post;
pub use repositories::user::Account;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("::memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn post_repo(&self) -> repositories::post::PostRepository {
        repositories::post::PostRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Account> {
        self.user_repo().create(username, password, security).await
    }

    pub async fn verify_account_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>> {
        self.user_repo().verify_password(username, password).await
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    pub async fn get_post(&self, id: i32) -> Result<Option<Post>> {
        self.post_repo().get(id).await
    }

    pub async fn list_recent_posts(&self, limit: u64) -> Result<Vec<Post>> {
        self.post_repo().list_recent(limit).await
    }

    pub async fn create_post(
        &self,
        author_id: i32,
        title: &str,
        summary: &str,
        content: &str,
        cover_image: Option<&str>,
    ) -> Result<Post> {
        self.post_repo()
            .create(author_id, title, summary, content, cover_image)
            .await
    }

    pub async fn update_post(
        &self,
        id: i32,
        title: &str,
        summary: &str,
        content: &str,
        cover_image: Option<&str>,
    ) -> Result<Option<Post>> {
        self.post_repo()
            .update_fields(id, title, summary, content, cover_image)
            .await
    }

    pub async fn delete_post_owned(&self, id: i32, author_id: i32) -> Result<bool> {
        self.post_repo().delete_owned(id, author_id).await
    }
}
