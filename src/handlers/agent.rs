// src/handlers/agent.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, non_blank, not_blank, nullable},
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::inquiry::{FollowUpType, InquiryStatus, InquiryType},
    services::inquiry_service::{InquiryPatch, NewFollowUp, NewInquiry},
};

// ---
// Payload: CreateInquiry
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryPayload {
    // RENT | SALE | MAINTENANCE
    #[serde(rename = "type", default)]
    #[schema(example = "RENT")]
    pub inquiry_type: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Client name is required"))]
    pub client_name: String,

    #[serde(default)]
    #[validate(email(message = "A valid client email is required"))]
    pub client_email: String,

    pub client_phone: Option<String>,
    pub property_id: Option<Uuid>,
    pub message: Option<String>,

    #[schema(value_type = Option<f64>)]
    pub budget: Option<Decimal>,

    pub preferred_area: Option<String>,

    #[schema(example = "direct")]
    pub source: Option<String>,

    // Respeitado apenas para admin
    pub agent_id: Option<Uuid>,
}

impl CreateInquiryPayload {
    fn into_input(self) -> Result<NewInquiry, AppError> {
        // O tipo é checado antes dos demais campos
        if self.inquiry_type.trim().is_empty() {
            return Err(AppError::validation("Inquiry type is required"));
        }
        let inquiry_type = InquiryType::parse(&self.inquiry_type)?;
        self.validate()?;

        Ok(NewInquiry {
            inquiry_type,
            client_name: self.client_name.trim().to_string(),
            client_email: self.client_email.trim().to_string(),
            client_phone: non_blank(self.client_phone.as_deref()),
            property_id: self.property_id,
            message: non_blank(self.message.as_deref()),
            budget: self.budget,
            preferred_area: non_blank(self.preferred_area.as_deref()),
            source: non_blank(self.source.as_deref()),
            agent_id: self.agent_id,
        })
    }
}

// ---
// Payload: UpdateInquiry (parcial; `null` limpa o campo)
// ---
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInquiryPayload {
    #[validate(custom(function = "not_blank", message = "Client name cannot be empty"))]
    pub client_name: Option<String>,

    #[validate(email(message = "A valid client email is required"))]
    pub client_email: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub client_phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub message: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<f64>)]
    pub budget: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub preferred_area: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub scheduled_at: Option<Option<DateTime<Utc>>>,

    #[schema(example = "CONTACTED")]
    pub status: Option<String>,
}

impl UpdateInquiryPayload {
    fn into_patch(self) -> Result<InquiryPatch, AppError> {
        let status = self.status.as_deref().map(InquiryStatus::parse).transpose()?;
        self.validate()?;

        Ok(InquiryPatch {
            client_name: self.client_name.map(|n| n.trim().to_string()),
            client_email: self.client_email.map(|e| e.trim().to_string()),
            client_phone: self.client_phone,
            message: self.message,
            budget: self.budget,
            preferred_area: self.preferred_area,
            notes: self.notes,
            scheduled_at: self.scheduled_at,
            status,
        })
    }
}

// ---
// Payload: AddFollowUp
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFollowUpPayload {
    // CALL | VIEWING | MEETING | SITE_VISIT | PAPERWORK | OTHER
    #[serde(rename = "type", default)]
    #[schema(example = "MEETING")]
    pub follow_up_type: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,

    // ACCEPTED / DEAL_CLOSED encerram como ganho; REJECTED / CLIENT_DECLINED como perdido
    #[schema(example = "DEAL_CLOSED")]
    pub outcome: Option<String>,

    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl CreateFollowUpPayload {
    fn into_input(self) -> Result<NewFollowUp, AppError> {
        if self.follow_up_type.trim().is_empty() {
            return Err(AppError::validation("Follow-up type is required"));
        }
        let follow_up_type = FollowUpType::parse(&self.follow_up_type)?;
        self.validate()?;

        Ok(NewFollowUp {
            follow_up_type,
            title: self.title.trim().to_string(),
            description: non_blank(self.description.as_deref()),
            outcome: non_blank(self.outcome.as_deref()),
            scheduled_at: self.scheduled_at,
            notes: non_blank(self.notes.as_deref()),
        })
    }
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/agent/profile",
    tag = "Agent",
    responses((status = 200, description = "Perfil do agente (criado se ainda não existir)", body = crate::models::inquiry::AgentProfile)),
    security(("api_jwt" = []))
)]
pub async fn get_agent_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state.agent_profiles.get_or_create(&user).await?;
    Ok(Json(json!({ "agentProfile": profile })))
}

#[utoipa::path(
    post,
    path = "/api/agent/inquiries",
    tag = "Agent",
    request_body = CreateInquiryPayload,
    responses(
        (status = 201, description = "Lead criado (OPEN)", body = crate::models::inquiry::Inquiry),
        (status = 400, description = "Tipo ausente/inválido ou cliente incompleto"),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_inquiry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateInquiryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.into_input()?;
    let inquiry = app_state.inquiries.create(&user, input).await?;

    Ok((StatusCode::CREATED, Json(json!({ "inquiry": inquiry }))))
}

#[utoipa::path(
    get,
    path = "/api/agent/inquiries/{id}",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead e histórico de follow-ups"),
        (status = 403, description = "Lead de outro agente"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_inquiry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (inquiry, follow_ups) = app_state.inquiries.get(&user, id).await?;
    Ok(Json(json!({ "inquiry": inquiry, "followUps": follow_ups })))
}

#[utoipa::path(
    patch,
    path = "/api/agent/inquiries/{id}",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateInquiryPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = crate::models::inquiry::Inquiry),
        (status = 400, description = "Status inválido"),
        (status = 403, description = "Lead de outro agente"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_inquiry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateInquiryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let patch = payload.into_patch()?;
    let inquiry = app_state.inquiries.update(&user, id, patch).await?;

    Ok(Json(json!({ "inquiry": inquiry })))
}

#[utoipa::path(
    delete,
    path = "/api/agent/inquiries/{id}",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead removido (follow-ups em cascata)"),
        (status = 403, description = "Lead de outro agente"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_inquiry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.inquiries.delete(&user, id).await?;
    Ok(Json(json!({ "success": true })))
}

#[utoipa::path(
    post,
    path = "/api/agent/inquiries/{id}/follow-up",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = CreateFollowUpPayload,
    responses(
        (status = 201, description = "Follow-up registrado", body = crate::models::inquiry::InquiryFollowUp),
        (status = 400, description = "Tipo/título ausente ou tipo inválido"),
        (status = 403, description = "Lead de outro agente"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_follow_up(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateFollowUpPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.into_input()?;
    let (follow_up, inquiry) = app_state.inquiries.add_follow_up(&user, id, input).await?;

    Ok((StatusCode::CREATED, Json(json!({ "followUp": follow_up, "inquiry": inquiry }))))
}
