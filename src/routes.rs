// src/routes.rs

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn app(app_state: AppState) -> Router {
    // Pedidos de manutenção
    let service_request_routes = Router::new()
        .route("/", post(handlers::service_requests::create_service_request))
        .route(
            "/{id}",
            get(handlers::service_requests::get_service_request)
                .patch(handlers::service_requests::update_service_request)
                .delete(handlers::service_requests::delete_service_request),
        );

    let trader_routes = Router::new()
        .route("/jobs/{id}/status", patch(handlers::trader::update_job_status))
        .route("/profile", get(handlers::trader::get_trader_profile));

    let agent_routes = Router::new()
        .route("/profile", get(handlers::agent::get_agent_profile))
        .route("/inquiries", post(handlers::agent::create_inquiry))
        .route(
            "/inquiries/{id}",
            get(handlers::agent::get_inquiry)
                .patch(handlers::agent::update_inquiry)
                .delete(handlers::agent::delete_inquiry),
        )
        .route("/inquiries/{id}/follow-up", post(handlers::agent::add_follow_up));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route("/{id}/read", patch(handlers::notifications::mark_notification_read));

    let admin_routes = Router::new().route("/events", get(handlers::admin::list_events));

    // Tudo abaixo exige um bearer token válido
    let protected = Router::new()
        .nest("/service-requests", service_request_routes)
        .nest("/trader", trader_routes)
        .nest("/agent", agent_routes)
        .nest("/notifications", notification_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .with_state(app_state)
}
