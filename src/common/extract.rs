// src/common/extract.rs

use axum::extract::FromRequest;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

use crate::common::error::AppError;

// Igual ao `axum::Json`, mas rejeita com o nosso `AppError` (400 + `{ error }`)
// em vez do 422 em texto puro do axum.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Distingue "campo ausente" (`None`) de "campo enviado como null" (`Some(None)`).
/// Use junto com `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Strings vazias (ou só espaços) contam como ausentes.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Para `#[validate(custom(function = "not_blank", message = "..."))]`.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
