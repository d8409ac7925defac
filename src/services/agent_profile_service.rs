// src/services/agent_profile_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::Store,
    models::{auth::User, inquiry::AgentProfile},
};

#[derive(Clone)]
pub struct AgentProfileService {
    store: Arc<dyn Store>,
}

impl AgentProfileService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Contrato explícito de "buscar ou criar": chamar duas vezes devolve o mesmo perfil.
    pub async fn get_or_create(&self, user: &User) -> Result<AgentProfile, AppError> {
        if let Some(profile) = self.store.find_agent_profile_by_user(user.id).await? {
            return Ok(profile);
        }

        let profile = self.store.get_or_create_agent_profile(user.id).await?;
        tracing::info!(user_id = %user.id, agent_id = %profile.id, "Agent profile provisioned");
        Ok(profile)
    }

    /// Só leitura: não provisiona nada (usado nas checagens de acesso).
    pub async fn find(&self, user: &User) -> Result<Option<AgentProfile>, AppError> {
        self.store.find_agent_profile_by_user(user.id).await
    }
}
