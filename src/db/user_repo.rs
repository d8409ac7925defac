// src/db/user_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PgStore, UserStore},
    models::{
        auth::User,
        events::TraderProfile,
        property::{Property, ServiceCategory},
    },
};

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, full_name, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_property(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            SELECT id, owner_id, tenant_id, title, address, emirate, created_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(property)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<ServiceCategory>, AppError> {
        let category = sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name FROM service_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn find_trader_profile(&self, user_id: Uuid) -> Result<Option<TraderProfile>, AppError> {
        let profile = sqlx::query_as::<_, TraderProfile>(
            "SELECT user_id, completed_jobs, updated_at FROM trader_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn increment_completed_jobs(&self, trader_id: Uuid) -> Result<(), AppError> {
        // Upsert: o perfil do prestador nasce no primeiro job concluído
        sqlx::query(
            r#"
            INSERT INTO trader_profiles (user_id, completed_jobs, updated_at)
            VALUES ($1, 1, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET completed_jobs = trader_profiles.completed_jobs + 1,
                updated_at = NOW()
            "#,
        )
        .bind(trader_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
