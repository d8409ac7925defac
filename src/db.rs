// src/db.rs
//
// Gateway de persistência. Os serviços só enxergam `dyn Store`; o Postgres
// (`PgStore`) é a implementação de produção e o `MemoryStore` roda nos testes.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        events::{Notification, SystemEvent, TraderProfile},
        inquiry::{AgentProfile, Inquiry, InquiryFollowUp},
        property::{Property, ServiceCategory},
        service_request::{JobAssignment, ServiceRequest},
    },
};

pub mod event_repo;
pub mod inquiry_repo;
#[cfg(test)]
pub mod memory;
pub mod service_request_repo;
pub mod user_repo;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_property(&self, id: Uuid) -> Result<Option<Property>, AppError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<ServiceCategory>, AppError>;
    async fn find_trader_profile(&self, user_id: Uuid) -> Result<Option<TraderProfile>, AppError>;
    /// Incrementa o contador de jobs concluídos (cria o perfil se faltar).
    async fn increment_completed_jobs(&self, trader_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait ServiceRequestStore: Send + Sync {
    async fn insert_service_request(&self, request: &ServiceRequest) -> Result<ServiceRequest, AppError>;
    async fn find_service_request(&self, id: Uuid) -> Result<Option<ServiceRequest>, AppError>;
    async fn save_service_request(&self, request: &ServiceRequest) -> Result<ServiceRequest, AppError>;
    /// Remove o pedido e, em cascata, a atribuição. Retorna `false` se não existia.
    async fn delete_service_request(&self, id: Uuid) -> Result<bool, AppError>;

    async fn find_job(&self, id: Uuid) -> Result<Option<JobAssignment>, AppError>;
    async fn find_job_for_request(&self, service_request_id: Uuid) -> Result<Option<JobAssignment>, AppError>;

    /// Upsert da atribuição (única por pedido) + status do pedido, na mesma transação.
    async fn save_assignment(
        &self,
        request: &ServiceRequest,
        job: &JobAssignment,
    ) -> Result<(ServiceRequest, JobAssignment), AppError>;

    /// Grava o timestamp do job e o status espelhado no pedido, na mesma transação.
    async fn save_job_transition(
        &self,
        job: &JobAssignment,
        request: &ServiceRequest,
    ) -> Result<(JobAssignment, ServiceRequest), AppError>;
}

#[async_trait]
pub trait InquiryStore: Send + Sync {
    async fn find_agent_profile_by_user(&self, user_id: Uuid) -> Result<Option<AgentProfile>, AppError>;
    async fn find_agent_profile(&self, id: Uuid) -> Result<Option<AgentProfile>, AppError>;
    /// Idempotente: devolve o perfil existente ou cria um novo.
    async fn get_or_create_agent_profile(&self, user_id: Uuid) -> Result<AgentProfile, AppError>;

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, AppError>;
    async fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, AppError>;
    async fn save_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, AppError>;
    async fn delete_inquiry(&self, id: Uuid) -> Result<bool, AppError>;

    /// Insere o follow-up e grava os efeitos no lead, na mesma transação.
    async fn insert_follow_up(
        &self,
        follow_up: &InquiryFollowUp,
        inquiry: &Inquiry,
    ) -> Result<(InquiryFollowUp, Inquiry), AppError>;
    async fn list_follow_ups(&self, inquiry_id: Uuid) -> Result<Vec<InquiryFollowUp>, AppError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_system_event(&self, event: &SystemEvent) -> Result<(), AppError>;
    async fn list_system_events(&self, limit: i64) -> Result<Vec<SystemEvent>, AppError>;

    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError>;
    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError>;
    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, AppError>;
}

pub trait Store: UserStore + ServiceRequestStore + InquiryStore + EventStore {}

impl<T> Store for T where T: UserStore + ServiceRequestStore + InquiryStore + EventStore {}

// Implementação Postgres: cada repo (`*_repo.rs`) implementa um dos traits acima.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
