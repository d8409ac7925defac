// src/handlers/service_requests.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
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
    models::service_request::{Priority, ServiceRequestStatus},
    services::service_request_service::{NewServiceRequest, ServiceRequestPatch},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequestPayload {
    #[validate(required(message = "propertyId is required"))]
    pub property_id: Option<Uuid>,

    pub category_id: Option<Uuid>,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    #[schema(example = "Leaking kitchen tap")]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,

    // LOW | MEDIUM | HIGH | URGENT (padrão MEDIUM)
    #[schema(example = "HIGH")]
    pub priority: Option<String>,
}

impl CreateServiceRequestPayload {
    fn into_input(self) -> Result<NewServiceRequest, AppError> {
        self.validate()?;
        let property_id = self
            .property_id
            .ok_or_else(|| AppError::validation("propertyId is required"))?;

        Ok(NewServiceRequest {
            property_id,
            category_id: self.category_id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: non_blank(self.priority.as_deref())
                .map(|p| Priority::parse(&p))
                .transpose()?,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequestPayload {
    #[validate(custom(function = "not_blank", message = "Title cannot be empty"))]
    pub title: Option<String>,

    #[validate(custom(function = "not_blank", message = "Description cannot be empty"))]
    pub description: Option<String>,

    pub priority: Option<String>,

    // `null` remove a categoria
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,

    #[schema(example = "ACCEPTED")]
    pub status: Option<String>,

    pub trader_id: Option<Uuid>,

    pub rejection_reason: Option<String>,
}

impl UpdateServiceRequestPayload {
    fn into_patch(self) -> Result<ServiceRequestPatch, AppError> {
        self.validate()?;
        Ok(ServiceRequestPatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
            priority: self.priority.as_deref().map(Priority::parse).transpose()?,
            category_id: self.category_id,
            status: self.status.as_deref().map(ServiceRequestStatus::parse).transpose()?,
            trader_id: self.trader_id,
            rejection_reason: self.rejection_reason,
        })
    }
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/api/service-requests",
    tag = "Service Requests",
    request_body = CreateServiceRequestPayload,
    responses(
        (status = 201, description = "Pedido criado (PENDING)", body = crate::models::service_request::ServiceRequest),
        (status = 400, description = "Campos obrigatórios faltando"),
        (status = 403, description = "Sem vínculo com o imóvel"),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(payload): AppJson<CreateServiceRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let input = payload.into_input()?;
    let request = app_state.service_requests.create(&user, input).await?;

    Ok((StatusCode::CREATED, Json(json!({ "serviceRequest": request }))))
}

#[utoipa::path(
    get,
    path = "/api/service-requests/{id}",
    tag = "Service Requests",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido e atribuição atual"),
        (status = 403, description = "Sem acesso"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_service_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (request, job) = app_state.service_requests.get(&user, id).await?;
    Ok(Json(json!({ "serviceRequest": request, "job": job })))
}

#[utoipa::path(
    patch,
    path = "/api/service-requests/{id}",
    tag = "Service Requests",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = UpdateServiceRequestPayload,
    responses(
        (status = 200, description = "Pedido atualizado", body = crate::models::service_request::ServiceRequest),
        (status = 400, description = "Status ou prioridade inválidos"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Pedido, categoria ou prestador não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateServiceRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let patch = payload.into_patch()?;
    let request = app_state.service_requests.update(&user, id, patch).await?;

    Ok(Json(json!({ "serviceRequest": request })))
}

#[utoipa::path(
    delete,
    path = "/api/service-requests/{id}",
    tag = "Service Requests",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido removido (atribuição em cascata)"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.service_requests.delete(&user, id).await?;
    Ok(Json(json!({ "success": true })))
}
