// src/services/guard.rs
//
// Regras de acesso por registro. Rodam antes de qualquer escrita.

use crate::{
    common::error::AppError,
    models::{
        auth::{Role, User},
        inquiry::{AgentProfile, Inquiry},
        property::Property,
        service_request::{JobAssignment, ServiceRequest},
    },
};

fn allow_if(condition: bool, message: &str) -> Result<(), AppError> {
    if condition { Ok(()) } else { Err(AppError::forbidden(message)) }
}

/// Dono do imóvel, inquilino do imóvel ou admin.
pub fn can_create_service_request(user: &User, property: &Property) -> Result<(), AppError> {
    let allowed = match user.role {
        Role::Admin => true,
        Role::Owner | Role::Tenant | Role::Trader | Role::Agent => {
            property.is_owned_by(user.id) || property.is_rented_by(user.id)
        }
    };
    allow_if(allowed, "You can only raise requests for properties you own or rent")
}

/// Atribuir prestador e editar o pedido: dono do imóvel ou admin.
pub fn can_manage_service_request(user: &User, property: &Property) -> Result<(), AppError> {
    allow_if(
        user.is_admin() || property.is_owned_by(user.id),
        "Only the property owner can manage this request",
    )
}

/// Só o prestador atribuído (ou admin) move o job.
pub fn can_transition_job(user: &User, job: &JobAssignment) -> Result<(), AppError> {
    allow_if(
        user.is_admin() || job.trader_id == user.id,
        "Only the assigned trader can update this job",
    )
}

pub fn can_delete_service_request(
    user: &User,
    property: &Property,
    request: &ServiceRequest,
) -> Result<(), AppError> {
    allow_if(
        user.is_admin() || property.is_owned_by(user.id) || request.requester_id == user.id,
        "Only the property owner or the requester can delete this request",
    )
}

pub fn can_view_service_request(
    user: &User,
    property: &Property,
    request: &ServiceRequest,
    job: Option<&JobAssignment>,
) -> Result<(), AppError> {
    let allowed = user.is_admin()
        || property.is_owned_by(user.id)
        || property.is_rented_by(user.id)
        || request.requester_id == user.id
        || job.is_some_and(|j| j.trader_id == user.id);
    allow_if(allowed, "You do not have access to this request")
}

/// Admin, ou o agente dono do lead. `own_profile` é o perfil do próprio usuário (se já existir).
pub fn can_manage_inquiry(
    user: &User,
    own_profile: Option<&AgentProfile>,
    inquiry: &Inquiry,
) -> Result<(), AppError> {
    let allowed = match user.role {
        Role::Admin => true,
        _ => own_profile.is_some_and(|p| p.id == inquiry.agent_id),
    };
    allow_if(allowed, "You do not have access to this inquiry")
}
