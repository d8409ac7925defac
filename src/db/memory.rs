// src/db/memory.rs
//
// Store em memória para os testes. Cada operação multi-linha acontece sob um
// único lock, o equivalente a uma transação.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EventStore, InquiryStore, ServiceRequestStore, UserStore},
    models::{
        auth::{Role, User},
        events::{Notification, SystemEvent, TraderProfile},
        inquiry::{AgentProfile, Inquiry, InquiryFollowUp},
        property::{Property, ServiceCategory},
        service_request::{JobAssignment, ServiceRequest},
    },
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    properties: HashMap<Uuid, Property>,
    categories: HashMap<Uuid, ServiceCategory>,
    trader_profiles: HashMap<Uuid, TraderProfile>,
    service_requests: HashMap<Uuid, ServiceRequest>,
    jobs: HashMap<Uuid, JobAssignment>,
    agent_profiles: HashMap<Uuid, AgentProfile>,
    inquiries: HashMap<Uuid, Inquiry>,
    follow_ups: Vec<InquiryFollowUp>,
    events: Vec<SystemEvent>,
    notifications: Vec<Notification>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    // Simula indisponibilidade da trilha de auditoria
    fail_events: AtomicBool,
}

impl MemoryStore {
    pub async fn add_user(&self, full_name: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{}@example.ae", full_name.to_lowercase().replace(' ', ".")),
            full_name: full_name.to_string(),
            role,
            created_at: Utc::now(),
        };
        self.tables.lock().await.users.insert(user.id, user.clone());
        user
    }

    pub async fn add_property(&self, owner_id: Uuid, tenant_id: Option<Uuid>) -> Property {
        let property = Property {
            id: Uuid::new_v4(),
            owner_id,
            tenant_id,
            title: "2BR Apartment, Marina Gate".to_string(),
            address: "Marina Gate 1, Dubai Marina".to_string(),
            emirate: "Dubai".to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().await.properties.insert(property.id, property.clone());
        property
    }

    pub async fn add_category(&self, name: &str) -> ServiceCategory {
        let category = ServiceCategory { id: Uuid::new_v4(), name: name.to_string() };
        self.tables.lock().await.categories.insert(category.id, category.clone());
        category
    }

    pub fn fail_events(&self, fail: bool) {
        self.fail_events.store(fail, Ordering::SeqCst);
    }

    pub async fn events(&self) -> Vec<SystemEvent> {
        self.tables.lock().await.events.clone()
    }

    pub async fn notifications_for(&self, user_id: Uuid) -> Vec<Notification> {
        self.tables
            .lock()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn job_count(&self) -> usize {
        self.tables.lock().await.jobs.len()
    }

    pub async fn follow_up_count(&self) -> usize {
        self.tables.lock().await.follow_ups.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_property(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        Ok(self.tables.lock().await.properties.get(&id).cloned())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<ServiceCategory>, AppError> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn find_trader_profile(&self, user_id: Uuid) -> Result<Option<TraderProfile>, AppError> {
        Ok(self.tables.lock().await.trader_profiles.get(&user_id).cloned())
    }

    async fn increment_completed_jobs(&self, trader_id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        let profile = tables.trader_profiles.entry(trader_id).or_insert_with(|| TraderProfile {
            user_id: trader_id,
            completed_jobs: 0,
            updated_at: Utc::now(),
        });
        profile.completed_jobs += 1;
        profile.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl ServiceRequestStore for MemoryStore {
    async fn insert_service_request(&self, request: &ServiceRequest) -> Result<ServiceRequest, AppError> {
        self.tables.lock().await.service_requests.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn find_service_request(&self, id: Uuid) -> Result<Option<ServiceRequest>, AppError> {
        Ok(self.tables.lock().await.service_requests.get(&id).cloned())
    }

    async fn save_service_request(&self, request: &ServiceRequest) -> Result<ServiceRequest, AppError> {
        let mut tables = self.tables.lock().await;
        let slot = tables
            .service_requests
            .get_mut(&request.id)
            .ok_or_else(|| AppError::not_found("Service request not found"))?;
        *slot = request.clone();
        Ok(request.clone())
    }

    async fn delete_service_request(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let existed = tables.service_requests.remove(&id).is_some();
        tables.jobs.retain(|_, job| job.service_request_id != id);
        Ok(existed)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobAssignment>, AppError> {
        Ok(self.tables.lock().await.jobs.get(&id).cloned())
    }

    async fn find_job_for_request(&self, service_request_id: Uuid) -> Result<Option<JobAssignment>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .jobs
            .values()
            .find(|job| job.service_request_id == service_request_id)
            .cloned())
    }

    async fn save_assignment(
        &self,
        request: &ServiceRequest,
        job: &JobAssignment,
    ) -> Result<(ServiceRequest, JobAssignment), AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.service_requests.contains_key(&request.id) {
            return Err(AppError::not_found("Service request not found"));
        }

        // Mesmo contrato do ON CONFLICT (service_request_id): mantém o id existente
        let existing_id = tables
            .jobs
            .values()
            .find(|j| j.service_request_id == job.service_request_id)
            .map(|j| j.id);
        let mut saved = job.clone();
        if let Some(id) = existing_id {
            let created_at = tables.jobs[&id].created_at;
            saved.id = id;
            saved.created_at = created_at;
        }

        tables.jobs.insert(saved.id, saved.clone());
        tables.service_requests.insert(request.id, request.clone());
        Ok((request.clone(), saved))
    }

    async fn save_job_transition(
        &self,
        job: &JobAssignment,
        request: &ServiceRequest,
    ) -> Result<(JobAssignment, ServiceRequest), AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.jobs.contains_key(&job.id) {
            return Err(AppError::not_found("Job not found"));
        }
        if !tables.service_requests.contains_key(&request.id) {
            return Err(AppError::not_found("Service request not found"));
        }
        tables.jobs.insert(job.id, job.clone());
        tables.service_requests.insert(request.id, request.clone());
        Ok((job.clone(), request.clone()))
    }
}

#[async_trait]
impl InquiryStore for MemoryStore {
    async fn find_agent_profile_by_user(&self, user_id: Uuid) -> Result<Option<AgentProfile>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .agent_profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn find_agent_profile(&self, id: Uuid) -> Result<Option<AgentProfile>, AppError> {
        Ok(self.tables.lock().await.agent_profiles.get(&id).cloned())
    }

    async fn get_or_create_agent_profile(&self, user_id: Uuid) -> Result<AgentProfile, AppError> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.agent_profiles.values().find(|p| p.user_id == user_id) {
            return Ok(existing.clone());
        }
        let profile = AgentProfile::new(user_id, Utc::now());
        tables.agent_profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, AppError> {
        self.tables.lock().await.inquiries.insert(inquiry.id, inquiry.clone());
        Ok(inquiry.clone())
    }

    async fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, AppError> {
        Ok(self.tables.lock().await.inquiries.get(&id).cloned())
    }

    async fn save_inquiry(&self, inquiry: &Inquiry) -> Result<Inquiry, AppError> {
        let mut tables = self.tables.lock().await;
        let slot = tables
            .inquiries
            .get_mut(&inquiry.id)
            .ok_or_else(|| AppError::not_found("Inquiry not found"))?;
        *slot = inquiry.clone();
        Ok(inquiry.clone())
    }

    async fn delete_inquiry(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        let existed = tables.inquiries.remove(&id).is_some();
        tables.follow_ups.retain(|f| f.inquiry_id != id);
        Ok(existed)
    }

    async fn insert_follow_up(
        &self,
        follow_up: &InquiryFollowUp,
        inquiry: &Inquiry,
    ) -> Result<(InquiryFollowUp, Inquiry), AppError> {
        let mut tables = self.tables.lock().await;
        if !tables.inquiries.contains_key(&inquiry.id) {
            return Err(AppError::not_found("Inquiry not found"));
        }
        tables.follow_ups.push(follow_up.clone());
        tables.inquiries.insert(inquiry.id, inquiry.clone());
        Ok((follow_up.clone(), inquiry.clone()))
    }

    async fn list_follow_ups(&self, inquiry_id: Uuid) -> Result<Vec<InquiryFollowUp>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .follow_ups
            .iter()
            .filter(|f| f.inquiry_id == inquiry_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_system_event(&self, event: &SystemEvent) -> Result<(), AppError> {
        if self.fail_events.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!("audit log unavailable")));
        }
        self.tables.lock().await.events.push(event.clone());
        Ok(())
    }

    async fn list_system_events(&self, limit: i64) -> Result<Vec<SystemEvent>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .events
            .iter()
            .rev()
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        self.tables.lock().await.notifications.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let mut notifications = self.notifications_for(user_id).await;
        notifications.reverse();
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.read_at.get_or_insert_with(Utc::now);
                n.clone()
            }))
    }
}
