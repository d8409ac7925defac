// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::Store,
    services::{
        agent_profile_service::AgentProfileService, auth::AuthService, dispatcher::EventDispatcher,
        inquiry_service::InquiryService, service_request_service::ServiceRequestService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address, e.g. 0.0.0.0:3000")?;

        let max_connections = optional_number("DATABASE_MAX_CONNECTIONS", 5)?;
        let acquire_timeout = Duration::from_secs(optional_number("DATABASE_ACQUIRE_TIMEOUT_SECS", 3)?);

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_connections: u32::try_from(max_connections).context("DATABASE_MAX_CONNECTIONS is too large")?,
            acquire_timeout,
        })
    }

    pub async fn connect_pool(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.database_url)
            .await
            .context("failed to connect to the database")?;

        tracing::info!("✅ Database connection established");
        Ok(pool)
    }
}

fn optional_number(key: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a positive integer")),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado, acessível em todos os handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth_service: AuthService,
    pub agent_profiles: AgentProfileService,
    pub service_requests: ServiceRequestService,
    pub inquiries: InquiryService,
    pub dispatcher: EventDispatcher,
}

impl AppState {
    /// Monta o gráfico de dependências a partir de um store já construído.
    /// Precisa de um runtime tokio ativo (o dispatcher sobe uma task).
    pub fn new(store: Arc<dyn Store>, jwt_secret: String) -> Self {
        let dispatcher = EventDispatcher::spawn(store.clone());
        let auth_service = AuthService::new(store.clone(), jwt_secret);
        let agent_profiles = AgentProfileService::new(store.clone());
        let service_requests = ServiceRequestService::new(store.clone(), dispatcher.clone());
        let inquiries = InquiryService::new(store.clone(), agent_profiles.clone(), dispatcher.clone());

        Self {
            store,
            auth_service,
            agent_profiles,
            service_requests,
            inquiries,
            dispatcher,
        }
    }
}
