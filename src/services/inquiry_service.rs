// src/services/inquiry_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Store,
    models::{
        auth::User,
        events::{EventType, SystemEvent},
        inquiry::{FollowUpType, Inquiry, InquiryFollowUp, InquiryStatus, InquiryType},
    },
    services::{agent_profile_service::AgentProfileService, dispatcher::EventDispatcher, guard},
};

const DEFAULT_SOURCE: &str = "direct";

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub inquiry_type: InquiryType,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub property_id: Option<Uuid>,
    pub message: Option<String>,
    pub budget: Option<Decimal>,
    pub preferred_area: Option<String>,
    pub source: Option<String>,
    // Só vale para admin criando em nome de um agente
    pub agent_id: Option<Uuid>,
}

/// Campos anuláveis usam `Option<Option<_>>`: `Some(None)` limpa o valor.
#[derive(Debug, Clone, Default)]
pub struct InquiryPatch {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<Option<String>>,
    pub message: Option<Option<String>>,
    pub budget: Option<Option<Decimal>>,
    pub preferred_area: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    pub status: Option<InquiryStatus>,
}

#[derive(Debug, Clone)]
pub struct NewFollowUp {
    pub follow_up_type: FollowUpType,
    pub title: String,
    pub description: Option<String>,
    pub outcome: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct InquiryService {
    store: Arc<dyn Store>,
    agent_profiles: AgentProfileService,
    dispatcher: EventDispatcher,
}

impl InquiryService {
    pub fn new(store: Arc<dyn Store>, agent_profiles: AgentProfileService, dispatcher: EventDispatcher) -> Self {
        Self { store, agent_profiles, dispatcher }
    }

    pub async fn create(&self, actor: &User, input: NewInquiry) -> Result<Inquiry, AppError> {
        if let Some(property_id) = input.property_id {
            self.store
                .find_property(property_id)
                .await?
                .ok_or_else(|| AppError::not_found("Property not found"))?;
        }

        let agent_id = match input.agent_id {
            Some(agent_id) if actor.is_admin() => {
                self.store
                    .find_agent_profile(agent_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Agent profile not found"))?
                    .id
            }
            _ => self.agent_profiles.get_or_create(actor).await?.id,
        };

        let now = Utc::now();
        let inquiry = Inquiry {
            id: Uuid::new_v4(),
            inquiry_type: input.inquiry_type,
            agent_id,
            property_id: input.property_id,
            client_name: input.client_name,
            client_email: input.client_email,
            client_phone: input.client_phone,
            message: input.message,
            budget: input.budget,
            preferred_area: input.preferred_area,
            source: input.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            status: InquiryStatus::Open,
            scheduled_at: None,
            closed_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let inquiry = self.store.insert_inquiry(&inquiry).await?;
        tracing::info!(inquiry_id = %inquiry.id, %agent_id, "Inquiry created");

        self.dispatcher.audit(SystemEvent::new(
            EventType::InquiryCreated,
            Some(actor.id),
            inquiry.id,
            json!({ "type": inquiry.inquiry_type, "agentId": agent_id, "source": inquiry.source }),
        ));
        Ok(inquiry)
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<(Inquiry, Vec<InquiryFollowUp>), AppError> {
        let inquiry = self.load_authorized(actor, id).await?;
        let follow_ups = self.store.list_follow_ups(id).await?;
        Ok((inquiry, follow_ups))
    }

    pub async fn update(&self, actor: &User, id: Uuid, patch: InquiryPatch) -> Result<Inquiry, AppError> {
        let mut inquiry = self.load_authorized(actor, id).await?;
        let previous_status = inquiry.status;
        let now = Utc::now();

        if let Some(client_name) = patch.client_name {
            inquiry.client_name = client_name;
        }
        if let Some(client_email) = patch.client_email {
            inquiry.client_email = client_email;
        }
        if let Some(client_phone) = patch.client_phone {
            inquiry.client_phone = client_phone;
        }
        if let Some(message) = patch.message {
            inquiry.message = message;
        }
        if let Some(budget) = patch.budget {
            inquiry.budget = budget;
        }
        if let Some(preferred_area) = patch.preferred_area {
            inquiry.preferred_area = preferred_area;
        }
        if let Some(notes) = patch.notes {
            inquiry.notes = notes;
        }
        if let Some(scheduled_at) = patch.scheduled_at {
            inquiry.scheduled_at = scheduled_at;
        }
        if let Some(status) = patch.status {
            inquiry.set_status(status, now);
        }
        inquiry.updated_at = now;

        let inquiry = self.store.save_inquiry(&inquiry).await?;
        tracing::info!(inquiry_id = %inquiry.id, status = ?inquiry.status, "Inquiry updated");

        self.dispatcher.audit(SystemEvent::new(
            EventType::InquiryUpdated,
            Some(actor.id),
            inquiry.id,
            json!({ "previousStatus": previous_status, "status": inquiry.status }),
        ));
        Ok(inquiry)
    }

    pub async fn add_follow_up(
        &self,
        actor: &User,
        inquiry_id: Uuid,
        input: NewFollowUp,
    ) -> Result<(InquiryFollowUp, Inquiry), AppError> {
        let mut inquiry = self.load_authorized(actor, inquiry_id).await?;
        let previous_status = inquiry.status;
        let now = Utc::now();

        let follow_up = InquiryFollowUp {
            id: Uuid::new_v4(),
            inquiry_id,
            follow_up_type: input.follow_up_type,
            title: input.title,
            description: input.description,
            outcome: input.outcome,
            scheduled_at: input.scheduled_at,
            notes: input.notes,
            created_at: now,
        };
        inquiry.apply_follow_up(
            follow_up.follow_up_type,
            follow_up.scheduled_at,
            follow_up.outcome.as_deref(),
            now,
        );

        let (follow_up, inquiry) = self.store.insert_follow_up(&follow_up, &inquiry).await?;
        tracing::info!(
            inquiry_id = %inquiry.id,
            follow_up_id = %follow_up.id,
            status = ?inquiry.status,
            "Follow-up recorded"
        );

        self.dispatcher.audit(SystemEvent::new(
            EventType::InquiryFollowUpAdded,
            Some(actor.id),
            follow_up.id,
            json!({
                "inquiryId": inquiry.id,
                "type": follow_up.follow_up_type,
                "outcome": follow_up.outcome,
                "previousStatus": previous_status,
                "status": inquiry.status,
            }),
        ));
        Ok((follow_up, inquiry))
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let inquiry = self.load_authorized(actor, id).await?;

        if !self.store.delete_inquiry(id).await? {
            return Err(AppError::not_found("Inquiry not found"));
        }
        tracing::info!(inquiry_id = %id, "Inquiry deleted");

        self.dispatcher.audit(SystemEvent::new(
            EventType::InquiryDeleted,
            Some(actor.id),
            id,
            json!({ "agentId": inquiry.agent_id, "status": inquiry.status }),
        ));
        Ok(())
    }

    // Carrega (404) e checa o dono (403). A checagem não cria perfil.
    async fn load_authorized(&self, actor: &User, id: Uuid) -> Result<Inquiry, AppError> {
        let inquiry = self
            .store
            .find_inquiry(id)
            .await?
            .ok_or_else(|| AppError::not_found("Inquiry not found"))?;

        let own_profile = if actor.is_admin() {
            None
        } else {
            self.agent_profiles.find(actor).await?
        };
        guard::can_manage_inquiry(actor, own_profile.as_ref(), &inquiry)?;
        Ok(inquiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::auth::Role, test_support::Fixture};
    use chrono::TimeZone;

    fn rent_lead() -> NewInquiry {
        NewInquiry {
            inquiry_type: InquiryType::Rent,
            client_name: "Fatima Al Mansoori".into(),
            client_email: "fatima@example.ae".into(),
            client_phone: Some("+971501234567".into()),
            property_id: None,
            message: Some("Looking for a 2BR near the metro".into()),
            budget: Some(Decimal::new(120_000, 0)),
            preferred_area: Some("Dubai Marina".into()),
            source: None,
            agent_id: None,
        }
    }

    fn follow_up(follow_up_type: FollowUpType) -> NewFollowUp {
        NewFollowUp {
            follow_up_type,
            title: "Viewing at Marina Gate".into(),
            description: None,
            outcome: None,
            scheduled_at: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn new_lead_is_open_and_round_trips() {
        let fx = Fixture::new().await;
        let svc = &fx.state.inquiries;

        let created = svc.create(&fx.agent, rent_lead()).await.unwrap();
        assert_eq!(created.status, InquiryStatus::Open);
        assert!(created.closed_at.is_none());
        assert_eq!(created.source, "direct");

        let (fetched, follow_ups) = svc.get(&fx.agent, created.id).await.unwrap();
        assert!(follow_ups.is_empty());
        assert_eq!(fetched.status, InquiryStatus::Open);
        assert_eq!(fetched.client_name, created.client_name);
        assert_eq!(fetched.client_email, created.client_email);
        assert_eq!(fetched.client_phone, created.client_phone);
        assert_eq!(fetched.budget, created.budget);
        assert_eq!(fetched.preferred_area, created.preferred_area);
    }

    #[tokio::test]
    async fn create_provisions_the_profile_once() {
        let fx = Fixture::new().await;
        let svc = &fx.state.inquiries;

        let first = svc.create(&fx.agent, rent_lead()).await.unwrap();
        let second = svc.create(&fx.agent, rent_lead()).await.unwrap();
        assert_eq!(first.agent_id, second.agent_id);

        let profile = fx.state.agent_profiles.find(&fx.agent).await.unwrap().unwrap();
        assert_eq!(profile.id, first.agent_id);
    }

    #[tokio::test]
    async fn unknown_property_is_not_found() {
        let fx = Fixture::new().await;
        let err = fx
            .state
            .inquiries
            .create(&fx.agent, NewInquiry { property_id: Some(Uuid::new_v4()), ..rent_lead() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(fx.state.agent_profiles.find(&fx.agent).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn accepted_outcome_closes_from_any_status() {
        let fx = Fixture::new().await;
        let svc = &fx.state.inquiries;

        for start in [InquiryStatus::Open, InquiryStatus::Contacted, InquiryStatus::Rejected] {
            let inquiry = svc.create(&fx.agent, rent_lead()).await.unwrap();
            svc.update(&fx.agent, inquiry.id, InquiryPatch { status: Some(start), ..Default::default() })
                .await
                .unwrap();

            let (_, inquiry) = svc
                .add_follow_up(
                    &fx.agent,
                    inquiry.id,
                    NewFollowUp { outcome: Some("accepted".into()), ..follow_up(FollowUpType::Call) },
                )
                .await
                .unwrap();
            assert_eq!(inquiry.status, InquiryStatus::Accepted);
            assert!(inquiry.closed_at.is_some());
        }
    }

    #[tokio::test]
    async fn scheduled_follow_up_moves_open_lead() {
        let fx = Fixture::new().await;
        let svc = &fx.state.inquiries;
        let when = Utc.with_ymd_and_hms(2026, 11, 2, 10, 0, 0).unwrap();

        let meeting = svc.create(&fx.agent, rent_lead()).await.unwrap();
        let (_, meeting) = svc
            .add_follow_up(
                &fx.agent,
                meeting.id,
                NewFollowUp { scheduled_at: Some(when), ..follow_up(FollowUpType::Meeting) },
            )
            .await
            .unwrap();
        assert_eq!(meeting.status, InquiryStatus::MeetingScheduled);
        assert_eq!(meeting.scheduled_at, Some(when));

        let call = svc.create(&fx.agent, rent_lead()).await.unwrap();
        let (_, call) = svc
            .add_follow_up(
                &fx.agent,
                call.id,
                NewFollowUp { scheduled_at: Some(when), ..follow_up(FollowUpType::Call) },
            )
            .await
            .unwrap();
        assert_eq!(call.status, InquiryStatus::FollowUp);

        let (_, follow_ups) = svc.get(&fx.agent, call.id).await.unwrap();
        assert_eq!(follow_ups.len(), 1);
    }

    #[tokio::test]
    async fn status_update_keeps_closed_at_in_sync() {
        let fx = Fixture::new().await;
        let svc = &fx.state.inquiries;
        let inquiry = svc.create(&fx.agent, rent_lead()).await.unwrap();

        let closed = svc
            .update(&fx.agent, inquiry.id, InquiryPatch { status: Some(InquiryStatus::Closed), ..Default::default() })
            .await
            .unwrap();
        assert!(closed.closed_at.is_some());

        let reopened = svc
            .update(
                &fx.agent,
                inquiry.id,
                InquiryPatch {
                    status: Some(InquiryStatus::Contacted),
                    client_phone: Some(None),
                    notes: Some(Some("Prefers WhatsApp".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(reopened.closed_at.is_none());
        assert!(reopened.client_phone.is_none());
        assert_eq!(reopened.notes.as_deref(), Some("Prefers WhatsApp"));
        // Campos não enviados ficam como estavam
        assert_eq!(reopened.client_name, inquiry.client_name);
    }

    #[tokio::test]
    async fn only_owning_agent_or_admin_touches_a_lead() {
        let fx = Fixture::new().await;
        let svc = &fx.state.inquiries;
        let inquiry = svc.create(&fx.agent, rent_lead()).await.unwrap();
        let rival = fx.store.add_user("Rival Agent", Role::Agent).await;
        svc.create(&rival, rent_lead()).await.unwrap();

        assert!(matches!(svc.get(&rival, inquiry.id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(
            svc.add_follow_up(&rival, inquiry.id, follow_up(FollowUpType::Call)).await,
            Err(AppError::Forbidden(_))
        ));
        // Sem perfil nenhum: continua 403 e a checagem não provisiona perfil
        assert!(matches!(svc.delete(&fx.owner, inquiry.id).await, Err(AppError::Forbidden(_))));
        assert!(fx.state.agent_profiles.find(&fx.owner).await.unwrap().is_none());
        assert_eq!(fx.store.follow_up_count().await, 0);

        svc.add_follow_up(&fx.admin, inquiry.id, follow_up(FollowUpType::Paperwork)).await.unwrap();
        assert!(matches!(svc.get(&fx.agent, Uuid::new_v4()).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn admin_may_file_on_behalf_of_an_agent() {
        let fx = Fixture::new().await;
        let svc = &fx.state.inquiries;
        let profile = fx.state.agent_profiles.get_or_create(&fx.agent).await.unwrap();

        let inquiry = svc
            .create(&fx.admin, NewInquiry { agent_id: Some(profile.id), ..rent_lead() })
            .await
            .unwrap();
        assert_eq!(inquiry.agent_id, profile.id);
        svc.get(&fx.agent, inquiry.id).await.unwrap();

        let err = svc
            .create(&fx.admin, NewInquiry { agent_id: Some(Uuid::new_v4()), ..rent_lead() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_cascades_follow_ups() {
        let fx = Fixture::new().await;
        let svc = &fx.state.inquiries;
        let inquiry = svc.create(&fx.agent, rent_lead()).await.unwrap();
        svc.add_follow_up(&fx.agent, inquiry.id, follow_up(FollowUpType::Viewing)).await.unwrap();
        assert_eq!(fx.store.follow_up_count().await, 1);

        svc.delete(&fx.agent, inquiry.id).await.unwrap();
        assert_eq!(fx.store.follow_up_count().await, 0);
        assert!(matches!(svc.get(&fx.agent, inquiry.id).await, Err(AppError::NotFound(_))));

        fx.state.dispatcher.flush().await;
        let kinds: Vec<String> = fx.store.events().await.into_iter().map(|e| e.event_type).collect();
        assert!(kinds.contains(&"INQUIRY_DELETED".to_string()));
        assert!(kinds.contains(&"INQUIRY_FOLLOW_UP_ADDED".to_string()));
    }
}
