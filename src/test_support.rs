// src/test_support.rs
//
// Cenário padrão dos testes: um imóvel com dono e inquilino, dois prestadores,
// um agente e um admin, tudo sobre o `MemoryStore`.

use std::sync::Arc;

use crate::{
    config::AppState,
    db::memory::MemoryStore,
    models::{
        auth::{Role, User},
        property::Property,
        service_request::ServiceRequest,
    },
    services::service_request_service::NewServiceRequest,
};

pub const TEST_SECRET: &str = "test-secret";

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub owner: User,
    pub tenant: User,
    pub trader: User,
    pub other_trader: User,
    pub agent: User,
    pub admin: User,
    pub property: Property,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let owner = store.add_user("Layla Owner", Role::Owner).await;
        let tenant = store.add_user("Karim Tenant", Role::Tenant).await;
        let trader = store.add_user("Ravi Trader", Role::Trader).await;
        let other_trader = store.add_user("Joseph Trader", Role::Trader).await;
        let agent = store.add_user("Noura Agent", Role::Agent).await;
        let admin = store.add_user("Sara Admin", Role::Admin).await;
        let property = store.add_property(owner.id, Some(tenant.id)).await;

        let state = AppState::new(store.clone(), TEST_SECRET.to_string());

        Self { store, state, owner, tenant, trader, other_trader, agent, admin, property }
    }

    /// Pedido aberto pelo inquilino, em PENDING.
    pub async fn create_request(&self) -> ServiceRequest {
        self.state
            .service_requests
            .create(
                &self.tenant,
                NewServiceRequest {
                    property_id: self.property.id,
                    category_id: None,
                    title: "Leaking kitchen tap".into(),
                    description: "Water pooling under the sink".into(),
                    priority: None,
                },
            )
            .await
            .expect("fixture request")
    }

    pub fn bearer(&self, user: &User) -> String {
        let token = self
            .state
            .auth_service
            .create_token(user.id)
            .expect("fixture token");
        format!("Bearer {token}")
    }
}
