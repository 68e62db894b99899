//! Customer Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::format::{format_cpf, format_phone, validate_cpf, validate_phone};
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub cpf: String,
    pub created_at: DateTime<Utc>,
}

/// Identification step of the checkout; also used by the admin create form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IdentificationForm {
    #[validate(length(min = 2, max = 200))]
    pub nome: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "validate_phone")]
    pub telefone: String,
    #[validate(custom = "validate_cpf")]
    pub cpf: String,
}

impl Customer {
    /// Stores phone and CPF in their masked form.
    pub fn identify(form: IdentificationForm) -> Result<Self> {
        form.validate()?;
        Ok(Self {
            id: Uuid::now_v7(),
            nome: form.nome.trim().to_string(),
            email: form.email.trim().to_lowercase(),
            telefone: format_phone(&form.telefone),
            cpf: format_cpf(&form.cpf),
            created_at: Utc::now(),
        })
    }
}
