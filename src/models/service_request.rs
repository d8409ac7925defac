// src/models/service_request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;

use crate::{common::error::AppError, models::events::EventType};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_request_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "URGENT" => Ok(Priority::Urgent),
            _ => Err(AppError::validation("Invalid priority")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "service_request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceRequestStatus {
    Pending,
    Assigned,
    Accepted,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
    PendingPayment,
    Paid,
}

impl ServiceRequestStatus {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        use ServiceRequestStatus::*;
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Pending),
            "ASSIGNED" => Ok(Assigned),
            "ACCEPTED" => Ok(Accepted),
            "REJECTED" => Ok(Rejected),
            "IN_PROGRESS" => Ok(InProgress),
            "COMPLETED" => Ok(Completed),
            "CANCELLED" => Ok(Cancelled),
            "PENDING_PAYMENT" => Ok(PendingPayment),
            "PAID" => Ok(Paid),
            _ => Err(AppError::validation("Invalid status")),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ServiceRequestStatus::Completed
                | ServiceRequestStatus::Rejected
                | ServiceRequestStatus::Cancelled
        )
    }

    /// Cancelado ou em cobrança: o ciclo do job está encerrado para o prestador.
    pub fn locks_job(self) -> bool {
        matches!(
            self,
            ServiceRequestStatus::Cancelled
                | ServiceRequestStatus::PendingPayment
                | ServiceRequestStatus::Paid
        )
    }

    pub fn label(self) -> &'static str {
        use ServiceRequestStatus::*;
        match self {
            Pending => "PENDING",
            Assigned => "ASSIGNED",
            Accepted => "ACCEPTED",
            Rejected => "REJECTED",
            InProgress => "IN_PROGRESS",
            Completed => "COMPLETED",
            Cancelled => "CANCELLED",
            PendingPayment => "PENDING_PAYMENT",
            Paid => "PAID",
        }
    }
}

// --- Entidades ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: Uuid,
    pub property_id: Uuid,
    pub category_id: Option<Uuid>,
    pub requester_id: Uuid,
    #[schema(example = "Leaking kitchen tap")]
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: ServiceRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobAssignment {
    pub id: Uuid,
    pub service_request_id: Uuid,
    pub trader_id: Uuid,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobAssignment {
    pub fn new(service_request_id: Uuid, trader_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_request_id,
            trader_id,
            accepted_at: None,
            rejected_at: None,
            rejection_reason: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reatribuição: troca o prestador e zera todo o progresso anterior.
    pub fn reassign(&mut self, trader_id: Uuid, now: DateTime<Utc>) {
        self.trader_id = trader_id;
        self.accepted_at = None;
        self.rejected_at = None;
        self.rejection_reason = None;
        self.started_at = None;
        self.completed_at = None;
        self.updated_at = now;
    }

    fn is_decided(&self) -> bool {
        self.accepted_at.is_some() || self.rejected_at.is_some()
    }

    /// Aplica a ação no job e devolve o status que deve ser espelhado no pedido.
    /// Não toca em nada se a ação não for válida no estado atual.
    pub fn apply(
        &mut self,
        action: JobAction,
        rejection_reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ServiceRequestStatus, AppError> {
        let status = match action {
            JobAction::Accept => {
                if self.is_decided() {
                    return Err(AppError::validation("Job has already been accepted or rejected"));
                }
                self.accepted_at = Some(now);
                ServiceRequestStatus::Accepted
            }
            JobAction::Reject => {
                let reason = rejection_reason
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| AppError::validation("Rejection reason is required"))?;
                if self.is_decided() {
                    return Err(AppError::validation("Job has already been accepted or rejected"));
                }
                self.rejected_at = Some(now);
                self.rejection_reason = Some(reason.to_string());
                ServiceRequestStatus::Rejected
            }
            JobAction::Start => {
                if self.accepted_at.is_none() || self.started_at.is_some() {
                    return Err(AppError::validation("Job must be accepted before it can be started"));
                }
                self.started_at = Some(now);
                ServiceRequestStatus::InProgress
            }
            JobAction::Complete => {
                if self.started_at.is_none() || self.completed_at.is_some() {
                    return Err(AppError::validation("Job must be in progress before it can be completed"));
                }
                self.completed_at = Some(now);
                ServiceRequestStatus::Completed
            }
        };
        self.updated_at = now;
        Ok(status)
    }
}

// --- Ações do prestador ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Accept,
    Reject,
    Start,
    Complete,
}

impl JobAction {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(JobAction::Accept),
            "reject" => Ok(JobAction::Reject),
            "start" => Ok(JobAction::Start),
            "complete" => Ok(JobAction::Complete),
            _ => Err(AppError::validation("Invalid status")),
        }
    }

    /// Status do pedido que um prestador pode pedir via PATCH no service request.
    pub fn for_status(status: ServiceRequestStatus) -> Option<Self> {
        match status {
            ServiceRequestStatus::Accepted => Some(JobAction::Accept),
            ServiceRequestStatus::Rejected => Some(JobAction::Reject),
            ServiceRequestStatus::InProgress => Some(JobAction::Start),
            ServiceRequestStatus::Completed => Some(JobAction::Complete),
            _ => None,
        }
    }

    pub fn event_type(self) -> EventType {
        match self {
            JobAction::Accept => EventType::JobAccepted,
            JobAction::Reject => EventType::JobRejected,
            JobAction::Start => EventType::JobStarted,
            JobAction::Complete => EventType::JobCompleted,
        }
    }
}
