// src/db/service_request_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PgStore, ServiceRequestStore},
    models::service_request::{JobAssignment, ServiceRequest},
};

const REQUEST_COLUMNS: &str = "id, property_id, category_id, requester_id, title, description, \
                               priority, status, created_at, updated_at";

const JOB_COLUMNS: &str = "id, service_request_id, trader_id, accepted_at, rejected_at, \
                           rejection_reason, started_at, completed_at, created_at, updated_at";

// ---
// Helpers genéricos no executor: rodam tanto na pool quanto dentro de uma transação
// ---

async fn update_request<'e, E>(executor: E, request: &ServiceRequest) -> Result<ServiceRequest, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        UPDATE service_requests
        SET title = $2, description = $3, category_id = $4, priority = $5,
            status = $6, updated_at = $7
        WHERE id = $1
        RETURNING {REQUEST_COLUMNS}
        "#
    );

    sqlx::query_as::<_, ServiceRequest>(&sql)
        .bind(request.id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.category_id)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.updated_at)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found("Service request not found"))
}

async fn update_job<'e, E>(executor: E, job: &JobAssignment) -> Result<JobAssignment, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        UPDATE job_assignments
        SET accepted_at = $2, rejected_at = $3, rejection_reason = $4,
            started_at = $5, completed_at = $6, updated_at = $7
        WHERE id = $1
        RETURNING {JOB_COLUMNS}
        "#
    );

    sqlx::query_as::<_, JobAssignment>(&sql)
        .bind(job.id)
        .bind(job.accepted_at)
        .bind(job.rejected_at)
        .bind(&job.rejection_reason)
        .bind(job.started_at)
        .bind(job.completed_at)
        .bind(job.updated_at)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found("Job not found"))
}

#[async_trait]
impl ServiceRequestStore for PgStore {
    async fn insert_service_request(&self, request: &ServiceRequest) -> Result<ServiceRequest, AppError> {
        let sql = format!(
            r#"
            INSERT INTO service_requests (
                id, property_id, category_id, requester_id, title, description,
                priority, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {REQUEST_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, ServiceRequest>(&sql)
            .bind(request.id)
            .bind(request.property_id)
            .bind(request.category_id)
            .bind(request.requester_id)
            .bind(&request.title)
            .bind(&request.description)
            .bind(request.priority)
            .bind(request.status)
            .bind(request.created_at)
            .bind(request.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_service_request(&self, id: Uuid) -> Result<Option<ServiceRequest>, AppError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM service_requests WHERE id = $1");
        let request = sqlx::query_as::<_, ServiceRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn save_service_request(&self, request: &ServiceRequest) -> Result<ServiceRequest, AppError> {
        update_request(&self.pool, request).await
    }

    async fn delete_service_request(&self, id: Uuid) -> Result<bool, AppError> {
        // job_assignments sai junto (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM service_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobAssignment>, AppError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM job_assignments WHERE id = $1");
        let job = sqlx::query_as::<_, JobAssignment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn find_job_for_request(&self, service_request_id: Uuid) -> Result<Option<JobAssignment>, AppError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM job_assignments WHERE service_request_id = $1");
        let job = sqlx::query_as::<_, JobAssignment>(&sql)
            .bind(service_request_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    async fn save_assignment(
        &self,
        request: &ServiceRequest,
        job: &JobAssignment,
    ) -> Result<(ServiceRequest, JobAssignment), AppError> {
        let mut tx = self.pool.begin().await?;

        // Uma atribuição por pedido: se já existe, atualiza no lugar
        let sql = format!(
            r#"
            INSERT INTO job_assignments (
                id, service_request_id, trader_id, accepted_at, rejected_at,
                rejection_reason, started_at, completed_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (service_request_id) DO UPDATE
            SET trader_id = EXCLUDED.trader_id,
                accepted_at = EXCLUDED.accepted_at,
                rejected_at = EXCLUDED.rejected_at,
                rejection_reason = EXCLUDED.rejection_reason,
                started_at = EXCLUDED.started_at,
                completed_at = EXCLUDED.completed_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {JOB_COLUMNS}
            "#
        );

        let saved_job = sqlx::query_as::<_, JobAssignment>(&sql)
            .bind(job.id)
            .bind(job.service_request_id)
            .bind(job.trader_id)
            .bind(job.accepted_at)
            .bind(job.rejected_at)
            .bind(&job.rejection_reason)
            .bind(job.started_at)
            .bind(job.completed_at)
            .bind(job.created_at)
            .bind(job.updated_at)
            .fetch_one(&mut *tx)
            .await?;

        let saved_request = update_request(&mut *tx, request).await?;

        // Se algo falhar acima, o drop do `tx` faz o rollback
        tx.commit().await?;

        Ok((saved_request, saved_job))
    }

    async fn save_job_transition(
        &self,
        job: &JobAssignment,
        request: &ServiceRequest,
    ) -> Result<(JobAssignment, ServiceRequest), AppError> {
        let mut tx = self.pool.begin().await?;

        let saved_job = update_job(&mut *tx, job).await?;
        let saved_request = update_request(&mut *tx, request).await?;

        tx.commit().await?;

        Ok((saved_job, saved_request))
    }
}
