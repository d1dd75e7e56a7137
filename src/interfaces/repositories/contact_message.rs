use async_trait::async_trait;

use crate::{
    entities::contact::NewContactMessage,
    errors::RepositoryError,
    repositories::sqlx_repo::SqlxContactMessageRepo,
};

/// Optional archive of accepted contact messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactMessageRepository: Send + Sync {
    async fn save_contact_message(&self, msg: &NewContactMessage) -> Result<(), RepositoryError>;
    async fn check_connection(&self) -> Result<(), RepositoryError>;
}

impl SqlxContactMessageRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxContactMessageRepo { pool }
    }
}

#[async_trait]
impl ContactMessageRepository for SqlxContactMessageRepo {
    async fn save_contact_message(&self, msg: &NewContactMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO contact_messages (name, email, subject, message, created_at, ip_address)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&msg.name)
        .bind(&msg.email)
        .bind(&msg.subject)
        .bind(&msg.message)
        .bind(msg.created_at)
        .bind(&msg.ip_address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn check_connection(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
