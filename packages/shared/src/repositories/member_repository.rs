use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::member::{Member, NewMember};
use crate::repositories::errors::member_repository_errors::MemberRepositoryError;

#[cfg(test)]
use mockall::automock;

const MEMBER_COLUMNS: &str = "id, email, username, password_hash, role, refresh_token, \
                              refresh_token_expiry, created_at";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn create_member(&self, member: &NewMember) -> Result<Member, MemberRepositoryError>;
    async fn get_member_by_id(&self, member_id: i64) -> Result<Member, MemberRepositoryError>;
    async fn get_member_by_email(&self, email: &str) -> Result<Member, MemberRepositoryError>;
    async fn email_exists(&self, email: &str) -> Result<bool, MemberRepositoryError>;
    async fn delete_member(&self, member_id: i64) -> Result<(), MemberRepositoryError>;
    /// Mirrors the latest refresh token onto the member row.
    async fn store_refresh_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MemberRepositoryError>;
    /// Clears the mirror, but only while it still holds `token`.
    async fn clear_refresh_token(&self, email: &str, token: &str)
        -> Result<(), MemberRepositoryError>;
}

pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn create_member(&self, member: &NewMember) -> Result<Member, MemberRepositoryError> {
        let sql = format!(
            "INSERT INTO members (email, username, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            MEMBER_COLUMNS
        );
        let created = sqlx::query_as::<_, Member>(&sql)
            .bind(&member.email)
            .bind(&member.username)
            .bind(&member.password_hash)
            .bind(member.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get_member_by_id(&self, member_id: i64) -> Result<Member, MemberRepositoryError> {
        let sql = format!("SELECT {} FROM members WHERE id = $1", MEMBER_COLUMNS);
        sqlx::query_as::<_, Member>(&sql)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(MemberRepositoryError::NotFound)
    }

    async fn get_member_by_email(&self, email: &str) -> Result<Member, MemberRepositoryError> {
        let sql = format!("SELECT {} FROM members WHERE email = $1", MEMBER_COLUMNS);
        sqlx::query_as::<_, Member>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(MemberRepositoryError::NotFound)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, MemberRepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM members WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn delete_member(&self, member_id: i64) -> Result<(), MemberRepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Memberships cascade with the member row; their seats are released first.
        sqlx::query(
            "UPDATE meetings SET registered_count = registered_count - 1 \
             WHERE id IN (SELECT meeting_id FROM meeting_members WHERE member_id = $1)",
        )
        .bind(member_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MemberRepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn store_refresh_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MemberRepositoryError> {
        let result = sqlx::query(
            "UPDATE members SET refresh_token = $2, refresh_token_expiry = $3 WHERE email = $1",
        )
        .bind(email)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(MemberRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn clear_refresh_token(
        &self,
        email: &str,
        token: &str,
    ) -> Result<(), MemberRepositoryError> {
        sqlx::query(
            "UPDATE members SET refresh_token = NULL, refresh_token_expiry = NULL \
             WHERE email = $1 AND refresh_token = $2",
        )
        .bind(email)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
