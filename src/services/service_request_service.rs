// src/services/service_request_service.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Store,
    models::{
        auth::{Role, User},
        events::{EventType, Notification, SystemEvent},
        property::Property,
        service_request::{JobAction, JobAssignment, Priority, ServiceRequest, ServiceRequestStatus},
    },
    services::{dispatcher::EventDispatcher, guard},
};

/// Dados de criação já validados pelo handler.
#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub property_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
}

/// PATCH parcial. `category_id: Some(None)` limpa a categoria.
#[derive(Debug, Clone, Default)]
pub struct ServiceRequestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category_id: Option<Option<Uuid>>,
    pub status: Option<ServiceRequestStatus>,
    pub trader_id: Option<Uuid>,
    pub rejection_reason: Option<String>,
}

impl ServiceRequestPatch {
    fn edits_fields(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.priority.is_some()
            || self.category_id.is_some()
            || self.trader_id.is_some()
    }

    fn is_empty(&self) -> bool {
        !self.edits_fields() && self.status.is_none()
    }
}

#[derive(Clone)]
pub struct ServiceRequestService {
    store: Arc<dyn Store>,
    dispatcher: EventDispatcher,
}

impl ServiceRequestService {
    pub fn new(store: Arc<dyn Store>, dispatcher: EventDispatcher) -> Self {
        Self { store, dispatcher }
    }

    // =========================================================================
    //  CRIAÇÃO E LEITURA
    // =========================================================================

    pub async fn create(&self, actor: &User, input: NewServiceRequest) -> Result<ServiceRequest, AppError> {
        let property = self
            .store
            .find_property(input.property_id)
            .await?
            .ok_or_else(|| AppError::not_found("Property not found"))?;

        guard::can_create_service_request(actor, &property)?;

        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        let now = Utc::now();
        let request = ServiceRequest {
            id: Uuid::new_v4(),
            property_id: property.id,
            category_id: input.category_id,
            requester_id: actor.id,
            title: input.title,
            description: input.description,
            priority: input.priority.unwrap_or_default(),
            status: ServiceRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let request = self.store.insert_service_request(&request).await?;
        tracing::info!(request_id = %request.id, property_id = %property.id, "Service request created");

        self.dispatcher.audit(SystemEvent::new(
            EventType::ServiceRequestCreated,
            Some(actor.id),
            request.id,
            json!({ "propertyId": property.id, "priority": request.priority }),
        ));
        if !property.is_owned_by(actor.id) {
            self.dispatcher.notify(Notification::new(
                property.owner_id,
                "New service request",
                format!("{} raised \"{}\" on {}", actor.full_name, request.title, property.title),
                Some(format!("/service-requests/{}", request.id)),
            ));
        }

        Ok(request)
    }

    pub async fn get(
        &self,
        actor: &User,
        id: Uuid,
    ) -> Result<(ServiceRequest, Option<JobAssignment>), AppError> {
        let (request, property) = self.load(id).await?;
        let job = self.store.find_job_for_request(id).await?;
        guard::can_view_service_request(actor, &property, &request, job.as_ref())?;
        Ok((request, job))
    }

    // =========================================================================
    //  ATRIBUIÇÃO DE PRESTADOR
    // =========================================================================

    pub async fn assign(
        &self,
        actor: &User,
        id: Uuid,
        trader_id: Uuid,
    ) -> Result<(ServiceRequest, JobAssignment), AppError> {
        let (request, property) = self.load(id).await?;
        guard::can_manage_service_request(actor, &property)?;
        self.assign_loaded(actor, request, &property, trader_id).await
    }

    async fn assign_loaded(
        &self,
        actor: &User,
        mut request: ServiceRequest,
        property: &Property,
        trader_id: Uuid,
    ) -> Result<(ServiceRequest, JobAssignment), AppError> {
        let trader = self
            .store
            .find_user(trader_id)
            .await?
            .filter(|u| u.role == Role::Trader)
            .ok_or_else(|| AppError::not_found("Trader not found"))?;

        let now = Utc::now();
        // Reatribuição reaproveita a linha existente (uma por pedido)
        let job = match self.store.find_job_for_request(request.id).await? {
            Some(mut existing) => {
                existing.reassign(trader.id, now);
                existing
            }
            None => JobAssignment::new(request.id, trader.id, now),
        };

        let previous_status = request.status;
        request.status = ServiceRequestStatus::Assigned;
        request.updated_at = now;

        let (request, job) = self.store.save_assignment(&request, &job).await?;
        tracing::info!(request_id = %request.id, job_id = %job.id, trader_id = %trader.id, "Trader assigned");

        self.dispatcher.audit(SystemEvent::new(
            EventType::TraderAssigned,
            Some(actor.id),
            job.id,
            json!({
                "serviceRequestId": request.id,
                "traderId": trader.id,
                "previousStatus": previous_status,
            }),
        ));
        self.dispatcher.notify(Notification::new(
            trader.id,
            "New job assigned",
            format!("You have been assigned \"{}\" at {}", request.title, property.title),
            Some(format!("/trader/jobs/{}", job.id)),
        ));

        Ok((request, job))
    }

    // =========================================================================
    //  CICLO DE VIDA DO JOB
    // =========================================================================

    pub async fn transition_job(
        &self,
        actor: &User,
        job_id: Uuid,
        action: JobAction,
        rejection_reason: Option<&str>,
    ) -> Result<JobAssignment, AppError> {
        let job = self
            .store
            .find_job(job_id)
            .await?
            .ok_or_else(|| AppError::not_found("Job not found"))?;

        guard::can_transition_job(actor, &job)?;

        let (job, _) = self.apply_transition(actor, job, action, rejection_reason).await?;
        Ok(job)
    }

    async fn apply_transition(
        &self,
        actor: &User,
        mut job: JobAssignment,
        action: JobAction,
        rejection_reason: Option<&str>,
    ) -> Result<(JobAssignment, ServiceRequest), AppError> {
        let (mut request, property) = self.load(job.service_request_id).await?;

        if request.status.locks_job() {
            return Err(AppError::validation(format!(
                "Job cannot change while the request is {}",
                request.status.label()
            )));
        }

        let now = Utc::now();
        let previous_status = request.status;
        request.status = job.apply(action, rejection_reason, now)?;
        request.updated_at = now;

        // Timestamp do job + status do pedido: tudo ou nada
        let (job, request) = self.store.save_job_transition(&job, &request).await?;
        tracing::info!(
            job_id = %job.id,
            request_id = %request.id,
            from = previous_status.label(),
            to = request.status.label(),
            terminal = request.status.is_terminal(),
            "Job transitioned"
        );

        self.dispatcher.audit(SystemEvent::new(
            action.event_type(),
            Some(actor.id),
            job.id,
            json!({
                "serviceRequestId": request.id,
                "previousStatus": previous_status,
                "status": request.status,
                "rejectionReason": job.rejection_reason,
            }),
        ));

        let mut recipients = vec![request.requester_id];
        if property.owner_id != request.requester_id {
            recipients.push(property.owner_id);
        }
        for user_id in recipients {
            self.dispatcher.notify(Notification::new(
                user_id,
                "Service request update",
                format!("\"{}\" is now {}", request.title, request.status.label()),
                Some(format!("/service-requests/{}", request.id)),
            ));
        }

        if action == JobAction::Complete {
            self.dispatcher.completed_job(job.trader_id);
        }

        Ok((job, request))
    }

    // =========================================================================
    //  EDIÇÃO E REMOÇÃO
    // =========================================================================

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        patch: ServiceRequestPatch,
    ) -> Result<ServiceRequest, AppError> {
        // A atribuição sempre leva a ASSIGNED; um status junto seria descartado
        if patch.status.is_some() && patch.trader_id.is_some() {
            return Err(AppError::validation("status and traderId cannot be combined"));
        }

        let (mut request, property) = self.load(id).await?;

        if guard::can_manage_service_request(actor, &property).is_err() {
            return self.update_as_trader(actor, &request, patch).await;
        }

        if patch.is_empty() {
            return Ok(request);
        }

        if let Some(Some(category_id)) = patch.category_id {
            self.ensure_category(category_id).await?;
        }

        let now = Utc::now();
        if let Some(title) = patch.title {
            request.title = title;
        }
        if let Some(description) = patch.description {
            request.description = description;
        }
        if let Some(priority) = patch.priority {
            request.priority = priority;
        }
        if let Some(category_id) = patch.category_id {
            request.category_id = category_id;
        }
        // Edição direta do dono/admin (inclui CANCELLED, PENDING_PAYMENT, PAID)
        if let Some(status) = patch.status {
            request.status = status;
        }
        request.updated_at = now;

        if let Some(trader_id) = patch.trader_id {
            let (request, _) = self.assign_loaded(actor, request, &property, trader_id).await?;
            return Ok(request);
        }

        let request = self.store.save_service_request(&request).await?;
        self.dispatcher.audit(SystemEvent::new(
            EventType::ServiceRequestUpdated,
            Some(actor.id),
            request.id,
            json!({ "status": request.status, "priority": request.priority }),
        ));

        Ok(request)
    }

    /// O prestador atribuído só mexe no status, e sempre pelo ciclo do job.
    async fn update_as_trader(
        &self,
        actor: &User,
        request: &ServiceRequest,
        patch: ServiceRequestPatch,
    ) -> Result<ServiceRequest, AppError> {
        let job = self
            .store
            .find_job_for_request(request.id)
            .await?
            .filter(|job| job.trader_id == actor.id)
            .ok_or_else(|| AppError::forbidden("Only the property owner can manage this request"))?;

        if patch.edits_fields() {
            return Err(AppError::forbidden("Traders can only update the request status"));
        }

        let Some(status) = patch.status else {
            return Ok(request.clone());
        };
        let action = JobAction::for_status(status)
            .ok_or_else(|| AppError::forbidden("Traders cannot set this status"))?;

        let (_, request) = self
            .apply_transition(actor, job, action, patch.rejection_reason.as_deref())
            .await?;
        Ok(request)
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let (request, property) = self.load(id).await?;
        guard::can_delete_service_request(actor, &property, &request)?;

        if !self.store.delete_service_request(id).await? {
            return Err(AppError::not_found("Service request not found"));
        }
        tracing::info!(request_id = %id, "Service request deleted");

        self.dispatcher.audit(SystemEvent::new(
            EventType::ServiceRequestDeleted,
            Some(actor.id),
            id,
            json!({ "propertyId": property.id, "status": request.status }),
        ));
        Ok(())
    }

    // --- helpers ---

    async fn load(&self, id: Uuid) -> Result<(ServiceRequest, Property), AppError> {
        let request = self
            .store
            .find_service_request(id)
            .await?
            .ok_or_else(|| AppError::not_found("Service request not found"))?;
        let property = self
            .store
            .find_property(request.property_id)
            .await?
            .ok_or_else(|| AppError::not_found("Property not found"))?;
        Ok((request, property))
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), AppError> {
        self.store
            .find_category(category_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Category not found"))
    }
}
