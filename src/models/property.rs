// src/models/property.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    // Inquilino atual (se houver)
    pub tenant_id: Option<Uuid>,
    #[schema(example = "2BR Apartment, Marina Gate")]
    pub title: String,
    pub address: String,
    #[schema(example = "Dubai")]
    pub emirate: String,
    pub created_at: DateTime<Utc>,
}

impl Property {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn is_rented_by(&self, user_id: Uuid) -> bool {
        self.tenant_id == Some(user_id)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategory {
    pub id: Uuid,
    #[schema(example = "Plumbing")]
    pub name: String,
}
