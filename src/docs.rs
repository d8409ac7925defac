// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Service Requests ---
        handlers::service_requests::create_service_request,
        handlers::service_requests::get_service_request,
        handlers::service_requests::update_service_request,
        handlers::service_requests::delete_service_request,

        // --- Trader ---
        handlers::trader::update_job_status,
        handlers::trader::get_trader_profile,

        // --- Agent ---
        handlers::agent::get_agent_profile,
        handlers::agent::create_inquiry,
        handlers::agent::get_inquiry,
        handlers::agent::update_inquiry,
        handlers::agent::delete_inquiry,
        handlers::agent::add_follow_up,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,

        // --- Admin ---
        handlers::admin::list_events,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,

            // --- Imóveis ---
            models::property::Property,
            models::property::ServiceCategory,

            // --- Service Requests ---
            models::service_request::Priority,
            models::service_request::ServiceRequestStatus,
            models::service_request::ServiceRequest,
            models::service_request::JobAssignment,

            // --- Inquiries ---
            models::inquiry::InquiryType,
            models::inquiry::InquiryStatus,
            models::inquiry::FollowUpType,
            models::inquiry::AgentProfile,
            models::inquiry::Inquiry,
            models::inquiry::InquiryFollowUp,

            // --- Eventos ---
            models::events::EventType,
            models::events::SystemEvent,
            models::events::Notification,
            models::events::TraderProfile,

            // --- Payloads ---
            handlers::service_requests::CreateServiceRequestPayload,
            handlers::service_requests::UpdateServiceRequestPayload,
            handlers::trader::UpdateJobStatusPayload,
            handlers::agent::CreateInquiryPayload,
            handlers::agent::UpdateInquiryPayload,
            handlers::agent::CreateFollowUpPayload,
        )
    ),
    tags(
        (name = "Service Requests", description = "Pedidos de manutenção e atribuição de prestadores"),
        (name = "Trader", description = "Ciclo de vida do job pelo prestador"),
        (name = "Agent", description = "Leads (inquiries) e follow-ups do agente"),
        (name = "Notifications", description = "Notificações do usuário"),
        (name = "Admin", description = "Trilha de auditoria")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
