// src/handlers/trader.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, extract::AppJson},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequireRole, TraderRole},
    },
    models::{events::TraderProfile, service_request::JobAction},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobStatusPayload {
    // accept | reject | start | complete
    #[serde(default)]
    #[schema(example = "reject")]
    pub status: String,

    // Obrigatório quando status = reject
    #[schema(example = "no materials")]
    pub rejection_reason: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/trader/jobs/{id}/status",
    tag = "Trader",
    params(("id" = Uuid, Path, description = "ID da atribuição (job)")),
    request_body = UpdateJobStatusPayload,
    responses(
        (status = 200, description = "Job atualizado", body = crate::models::service_request::JobAssignment),
        (status = 400, description = "Status inválido, fora de ordem ou sem rejectionReason"),
        (status = 403, description = "Não é o prestador atribuído"),
        (status = 404, description = "Job não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_job_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(job_id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateJobStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let action = JobAction::parse(&payload.status)?;

    let job = app_state
        .service_requests
        .transition_job(&user, job_id, action, payload.rejection_reason.as_deref())
        .await?;

    Ok(Json(json!({ "job": job })))
}

#[utoipa::path(
    get,
    path = "/api/trader/profile",
    tag = "Trader",
    responses(
        (status = 200, description = "Contador de jobs concluídos", body = TraderProfile),
        (status = 403, description = "Apenas prestadores")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_trader_profile(
    State(app_state): State<AppState>,
    guard: RequireRole<TraderRole>,
) -> Result<impl IntoResponse, AppError> {
    let user = guard.user;

    // Sem linha ainda = nenhum job concluído
    let profile = app_state
        .store
        .find_trader_profile(user.id)
        .await?
        .unwrap_or(TraderProfile {
            user_id: user.id,
            completed_jobs: 0,
            updated_at: user.created_at,
        });

    Ok(Json(json!({ "traderProfile": profile })))
}
