// src/middleware/rbac.rs
//
// Proteção por papel no nível da rota. As regras por registro (dono do imóvel,
// prestador atribuído, agente do lead) ficam em `services::guard`.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, User},
};

/// O trait que define um papel exigido pela rota
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
    fn describe() -> &'static str;
}

/// O extrator (guardião). Entrega o usuário já validado.
pub struct RequireRole<T> {
    pub user: User,
    _role: PhantomData<T>,
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !T::allows(user.role) {
            return Err(AppError::forbidden(format!(
                "This action requires the {} role",
                T::describe()
            )));
        }

        Ok(RequireRole { user, _role: PhantomData })
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn allows(role: Role) -> bool {
        role == Role::Admin
    }
    fn describe() -> &'static str {
        "ADMIN"
    }
}

pub struct TraderRole;
impl RoleDef for TraderRole {
    fn allows(role: Role) -> bool {
        role == Role::Trader
    }
    fn describe() -> &'static str {
        "TRADER"
    }
}
