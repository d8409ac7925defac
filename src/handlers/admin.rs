// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminRole, RequireRole},
    models::events::SystemEvent,
};

const DEFAULT_EVENT_LIMIT: i64 = 50;
const MAX_EVENT_LIMIT: i64 = 200;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Quantos eventos devolver (padrão 50, máximo 200)
    pub limit: Option<i64>,
}

impl EventsQuery {
    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_EVENT_LIMIT)
            .clamp(1, MAX_EVENT_LIMIT)
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/events",
    tag = "Admin",
    params(EventsQuery),
    responses(
        (status = 200, description = "Trilha de auditoria, mais recentes primeiro", body = Vec<SystemEvent>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminRole>,
    Query(query): Query<EventsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let events = app_state.store.list_system_events(query.limit()).await?;
    Ok(Json(json!({ "events": events })))
}
