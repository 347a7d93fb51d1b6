//! Users repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::UsersStore;
use crate::{
    error::{AppError, AppResult},
    models::user::{UpdateProfile, UserProfile},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersStore for UsersRepository {
    async fn find(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn insert(&self, profile: &UserProfile) -> AppResult<UserProfile> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, full_name, role, phone, address,
                member_since, max_borrow_limit, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(profile.member_since)
        .bind(profile.max_borrow_limit)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        self.find(profile.id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Profile {} vanished after insert", profile.id)))
    }

    /// `None` keeps a field, an empty phone or address clears it
    async fn update_profile(&self, id: Uuid, update: &UpdateProfile) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                phone = CASE WHEN $3::text IS NULL THEN phone ELSE NULLIF($3, '') END,
                address = CASE WHEN $4::text IS NULL THEN address ELSE NULLIF($4, '') END,
                updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}
