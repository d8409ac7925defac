// src/models/events.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use utoipa::ToSchema;

// Guardado como TEXT: novos tipos não exigem migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    ServiceRequestCreated,
    ServiceRequestUpdated,
    ServiceRequestDeleted,
    TraderAssigned,
    JobAccepted,
    JobRejected,
    JobStarted,
    JobCompleted,
    InquiryCreated,
    InquiryUpdated,
    InquiryDeleted,
    InquiryFollowUpAdded,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        use EventType::*;
        match self {
            ServiceRequestCreated => "SERVICE_REQUEST_CREATED",
            ServiceRequestUpdated => "SERVICE_REQUEST_UPDATED",
            ServiceRequestDeleted => "SERVICE_REQUEST_DELETED",
            TraderAssigned => "TRADER_ASSIGNED",
            JobAccepted => "JOB_ACCEPTED",
            JobRejected => "JOB_REJECTED",
            JobStarted => "JOB_STARTED",
            JobCompleted => "JOB_COMPLETED",
            InquiryCreated => "INQUIRY_CREATED",
            InquiryUpdated => "INQUIRY_UPDATED",
            InquiryDeleted => "INQUIRY_DELETED",
            InquiryFollowUpAdded => "INQUIRY_FOLLOW_UP_ADDED",
        }
    }

    pub fn entity_type(self) -> &'static str {
        use EventType::*;
        match self {
            ServiceRequestCreated | ServiceRequestUpdated | ServiceRequestDeleted => "ServiceRequest",
            TraderAssigned | JobAccepted | JobRejected | JobStarted | JobCompleted => "JobAssignment",
            InquiryCreated | InquiryUpdated | InquiryDeleted => "Inquiry",
            InquiryFollowUpAdded => "InquiryFollowUp",
        }
    }
}

/// Registro da trilha de auditoria.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemEvent {
    pub id: Uuid,
    #[schema(example = "JOB_ACCEPTED")]
    pub event_type: String,
    pub actor_id: Option<Uuid>,
    #[schema(example = "JobAssignment")]
    pub entity_type: String,
    pub entity_id: Uuid,
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl SystemEvent {
    pub fn new(event_type: EventType, actor_id: Option<Uuid>, entity_id: Uuid, metadata: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.as_str().to_string(),
            actor_id,
            entity_type: event_type.entity_type().to_string(),
            entity_id,
            metadata,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "New job assigned")]
    pub title: String,
    pub body: String,
    #[schema(example = "/trader/jobs/7f1c...")]
    pub link: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, title: impl Into<String>, body: impl Into<String>, link: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            body: body.into(),
            link,
            read_at: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TraderProfile {
    pub user_id: Uuid,
    pub completed_jobs: i32,
    pub updated_at: DateTime<Utc>,
}
