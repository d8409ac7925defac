// src/db/inquiry_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InquiryStore, PgStore},
    models::inquiry::{AgentProfile, Inquiry, InquiryFollowUp},
};

const PROFILE_COLUMNS: &str = "id, user_id, subscription_plan, terms_accepted_at, is_available, created_at";

const INQUIRY_COLUMNS: &str = "id, inquiry_type, agent_id, property_id, client_name, client_email, \
                               client_phone, message, budget, preferred_area, source, status, \
                               scheduled_at, closed_at, notes, created_at, updated_at";

const FOLLOW_UP_COLUMNS: &str = "id, inquiry_id, follow_up_type, title, description, outcome, \
                                 scheduled_at, notes, created_at";

async fn update_inquiry<'e, E>(executor: E, inquiry: &Inquiry) -> Result<Inquiry, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        UPDATE inquiries
        SET client_name = $2, client_email = $3, client_phone = $4, message = $5,
            budget = $6, preferred_area = $7, status = $8, scheduled_at = $9,
            closed_at = $10, notes = $11, updated_at = $12
        WHERE id = $1
        RETURNING {INQUIRY_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Inquiry>(&sql)
        .bind(inquiry.id)
        .bind(&inquiry.client_name)
        .bind(&inquiry.client_email)
        .bind(&inquiry.client_phone)
        .bind(&inquiry.message)
        .bind(inquiry.budget)
        .bind(&inquiry.preferred_area)
        .bind(inquiry.status)
        .bind(inquiry.scheduled_at)
        .bind(inquiry.closed_at)
        .bind(&inquiry.notes)
        .bind(inquiry.updated_at)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found("Inquiry not found"))
}

#[async_trait]
impl InquiryStore for PgStore {
    async fn find_agent_profile_by_user(&self, user_id: Uuid) -> Result<Option<AgentProfile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM agent_profiles WHERE user_id = $1");
        let profile = sqlx::query_as::<_, AgentProfile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_agent_profile(&self, id: Uuid) -> Result<Option<AgentProfile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM agent_profiles WHERE id = $1");
        let profile = sqlx::query_as::<_, AgentProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn get_or_create_agent_profile(&self, user_id: Uuid) -> Result<AgentProfile, AppError> {
        let fresh = AgentProfile::new(user_id, chrono::Utc::now());

        // ON CONFLICT DO NOTHING + SELECT: duas requisições simultâneas não duplicam o perfil
        sqlx::query(
            r#"
            INSERT INTO agent_profiles (id, user_id, is_available, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(fresh.id)
        .bind(fresh.user_id)
        .bind(fresh.is_available)
        .bind(fresh.created_at)
        .execute(&self.pool)
        .await?;

        self.find_agent_profile_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("agent profile vanished after upsert")))
    }

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, AppError> {
        let sql = format!(
            r#"
            INSERT INTO inquiries (
                id, inquiry_type, agent_id, property_id, client_name, client_email,
                client_phone, message, budget, preferred_area, source, status,
                scheduled_at, closed_at, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {INQUIRY_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Inquiry>(&sql)
            .bind(inquiry.id)
            .bind(inquiry.inquiry_type)
            .bind(inquiry.agent_id)
            .bind(inquiry.property_id)
            .bind(&inquiry.client_name)
            .bind(&inquiry.client_email)
            .bind(&inquiry.client_phone)
            .bind(&inquiry.message)
            .bind(inquiry.budget)
            .bind(&inquiry.preferred_area)
            .bind(&inquiry.source)
            .bind(inquiry.status)
            .bind(inquiry.scheduled_at)
            .bind(inquiry.closed_at)
            .bind(&inquiry.notes)
            .bind(inquiry.created_at)
            .bind(inquiry.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, AppError> {
        let sql = format!("SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE id = $1");
        let inquiry = sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(inquiry)
    }

    async fn save_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, AppError> {
        update_inquiry(&self.pool, inquiry).await
    }

    async fn delete_inquiry(&self, id: Uuid) -> Result<bool, AppError> {
        // follow-ups saem em cascata
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_follow_up(
        &self,
        follow_up: &InquiryFollowUp,
        inquiry: &Inquiry,
    ) -> Result<(InquiryFollowUp, Inquiry), AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO inquiry_follow_ups (
                id, inquiry_id, follow_up_type, title, description, outcome,
                scheduled_at, notes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {FOLLOW_UP_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, InquiryFollowUp>(&sql)
            .bind(follow_up.id)
            .bind(follow_up.inquiry_id)
            .bind(follow_up.follow_up_type)
            .bind(&follow_up.title)
            .bind(&follow_up.description)
            .bind(&follow_up.outcome)
            .bind(follow_up.scheduled_at)
            .bind(&follow_up.notes)
            .bind(follow_up.created_at)
            .fetch_one(&mut *tx)
            .await?;

        let saved_inquiry = update_inquiry(&mut *tx, inquiry).await?;

        tx.commit().await?;

        Ok((created, saved_inquiry))
    }

    async fn list_follow_ups(&self, inquiry_id: Uuid) -> Result<Vec<InquiryFollowUp>, AppError> {
        let sql = format!(
            "SELECT {FOLLOW_UP_COLUMNS} FROM inquiry_follow_ups WHERE inquiry_id = $1 ORDER BY created_at ASC"
        );
        let follow_ups = sqlx::query_as::<_, InquiryFollowUp>(&sql)
            .bind(inquiry_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(follow_ups)
    }
}
