//! User Directory Implementation
//!
//! Read-only PostgreSQL access to the account service's `users` table.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::domain::{UserRepository, UserSummary};
use crate::shared::error::AppError;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserSummaryRow {
    id: i64,
    nickname: String,
    avatar_url: Option<String>,
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_summaries(&self, ids: &[i64]) -> Result<HashMap<i64, UserSummary>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, UserSummaryRow>(
            r#"
            SELECT id,
                   COALESCE(nickname, '') AS nickname,
                   NULLIF(avatar_url, '') AS avatar_url
            FROM users
            WHERE id = ANY($1) AND deleted_at IS NULL
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.id,
                    UserSummary {
                        id: r.id,
                        nickname: r.nickname,
                        avatar_url: r.avatar_url,
                    },
                )
            })
            .collect())
    }
}
