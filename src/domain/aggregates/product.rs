//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::value_objects::{Money, Slug, UnknownVariant};
use crate::{CheckoutError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind { #[default] Digital, Fisico }

impl ProductKind {
    pub fn as_str(&self) -> &'static str { match self { Self::Digital => "digital", Self::Fisico => "fisico" } }
}

impl TryFrom<String> for ProductKind {
    type Error = UnknownVariant;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "digital" => Ok(Self::Digital),
            "fisico" => Ok(Self::Fisico),
            _ => Err(UnknownVariant { kind: "tipo", value }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub nome: String,
    pub slug: String,
    pub descricao: Option<String>,
    pub valor: Decimal,
    #[sqlx(try_from = "String")]
    pub tipo: ProductKind,
    pub imagem_url: Option<String>,
    pub banner_url: Option<String>,
    pub banner_ativo: bool,
    pub banner_texto: Option<String>,
    pub pix_chave: Option<String>,
    pub pix_tipo_chave: Option<String>,
    pub pix_beneficiario: Option<String>,
    pub pix_copia_cola: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of product create/update requests.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200))]
    pub nome: String,
    pub slug: Option<String>,
    pub descricao: Option<String>,
    #[validate(custom = "positive_amount")]
    pub valor: Decimal,
    #[serde(default)]
    pub tipo: ProductKind,
    #[validate(url)]
    pub imagem_url: Option<String>,
    #[validate(url)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub banner_ativo: bool,
    pub banner_texto: Option<String>,
    pub pix_chave: Option<String>,
    pub pix_tipo_chave: Option<String>,
    pub pix_beneficiario: Option<String>,
    pub pix_copia_cola: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

fn default_true() -> bool { true }

fn positive_amount(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if *value <= Decimal::ZERO { return Err(ValidationError::new("valor_nao_positivo")); }
    if *value > Money::MAX { return Err(ValidationError::new("valor_acima_do_limite")); }
    Ok(())
}

/// PIX receiving data shown on the payment step.
#[derive(Debug, Clone, Serialize)]
pub struct PixCharge {
    pub chave: String,
    pub tipo_chave: Option<String>,
    pub beneficiario: Option<String>,
    pub copia_cola: Option<String>,
    pub valor: Decimal,
    pub valor_formatado: String,
}

impl Product {
    pub fn create(input: ProductInput) -> Result<Self> {
        input.validate()?;
        let now = Utc::now();
        let slug = input.slug_or_name()?;
        Ok(Self {
            id: Uuid::now_v7(), nome: input.nome, slug, descricao: input.descricao, valor: input.valor,
            tipo: input.tipo, imagem_url: input.imagem_url, banner_url: input.banner_url,
            banner_ativo: input.banner_ativo, banner_texto: input.banner_texto, pix_chave: input.pix_chave,
            pix_tipo_chave: input.pix_tipo_chave, pix_beneficiario: input.pix_beneficiario,
            pix_copia_cola: input.pix_copia_cola, ativo: input.ativo, created_at: now, updated_at: now,
        })
    }

    /// Replaces every editable field, keeping id and creation time.
    pub fn apply(&mut self, input: ProductInput) -> Result<()> {
        input.validate()?;
        self.slug = input.slug_or_name()?;
        self.nome = input.nome;
        self.descricao = input.descricao;
        self.valor = input.valor;
        self.tipo = input.tipo;
        self.imagem_url = input.imagem_url;
        self.banner_url = input.banner_url;
        self.banner_ativo = input.banner_ativo;
        self.banner_texto = input.banner_texto;
        self.pix_chave = input.pix_chave;
        self.pix_tipo_chave = input.pix_tipo_chave;
        self.pix_beneficiario = input.pix_beneficiario;
        self.pix_copia_cola = input.pix_copia_cola;
        self.ativo = input.ativo;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn price(&self) -> Money { Money::brl(self.valor) }

    pub fn pix_charge(&self) -> Result<PixCharge> {
        let chave = self
            .pix_chave
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CheckoutError::Validation("PIX não configurado para este produto".into()))?;
        Ok(PixCharge {
            chave: chave.to_string(),
            tipo_chave: self.pix_tipo_chave.clone(),
            beneficiario: self.pix_beneficiario.clone(),
            copia_cola: self.pix_copia_cola.clone(),
            valor: self.valor,
            valor_formatado: self.price().to_string(),
        })
    }
}

impl ProductInput {
    fn slug_or_name(&self) -> Result<String> {
        let source = self.slug.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or(&self.nome);
        Slug::parse(source).map(Slug::into_inner).map_err(|e| CheckoutError::Validation(e.to_string()))
    }
}
