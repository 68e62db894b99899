//! Merchant-wide checkout configuration.
//!
//! Stored as one JSON document per row; the most recently updated row is the
//! active one.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::countdown::Countdown;
use crate::domain::value_objects::PaymentStatus;
use crate::domain::visitors::VisitorCounter;
use crate::{CheckoutError, Result};

/// Fields a saved config must carry as non-empty strings.
pub const REQUIRED_FIELDS: [&str; 3] = ["cor_primaria", "cor_botao", "texto_botao"];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern"));

fn hex_color(value: &str) -> std::result::Result<(), ValidationError> {
    if HEX_COLOR.is_match(value) { Ok(()) } else { Err(ValidationError::new("cor_invalida")) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CheckoutConfig {
    #[validate(custom = "hex_color")]
    pub cor_primaria: String,
    #[validate(custom = "hex_color")]
    pub cor_secundaria: String,
    #[validate(custom = "hex_color")]
    pub cor_fundo: String,
    #[validate(custom = "hex_color")]
    pub cor_texto: String,
    #[validate(custom = "hex_color")]
    pub cor_botao: String,
    #[validate(custom = "hex_color")]
    pub cor_texto_botao: String,
    #[validate(custom = "hex_color")]
    pub cor_cabecalho: String,

    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(url)]
    pub banner_url: Option<String>,
    pub banner_ativo: bool,
    pub mensagem_topo: String,
    pub mensagem_topo_ativa: bool,

    pub timer_ativo: bool,
    #[validate(range(min = 1, max = 1440))]
    pub timer_minutos: i32,
    pub timer_texto: String,
    #[validate(custom = "hex_color")]
    pub cor_timer: String,

    pub visitantes_ativo: bool,
    pub visitantes_min: u32,
    #[validate(range(max = 100000))]
    pub visitantes_max: u32,
    pub visitantes_texto: String,

    #[validate(length(min = 1, max = 80))]
    pub texto_botao: String,
    pub texto_botao_pix: String,
    pub texto_botao_cartao: String,
    pub titulo_identificacao: String,
    pub titulo_pagamento: String,

    pub pix_ativo: bool,
    #[validate(range(min = 1, max = 1440))]
    pub pix_expiracao_minutos: i32,
    pub pix_titulo: String,
    pub pix_instrucoes: String,
    pub pix_texto_copiar: String,

    pub cartao_ativo: bool,
    #[validate(range(min = 1, max = 12))]
    pub cartao_max_parcelas: i32,
    pub cartao_titulo: String,
    pub status_cartao_padrao: String,

    pub depoimentos_ativo: bool,
    pub depoimentos_titulo: String,

    pub selo_seguranca_ativo: bool,
    pub selo_texto: String,
    #[validate(range(min = 0, max = 365))]
    pub garantia_dias: i32,

    pub rodape_texto: String,
    #[validate(email)]
    pub email_suporte: Option<String>,
    pub whatsapp_suporte: Option<String>,

    pub aprovado_titulo: String,
    pub aprovado_mensagem: String,
    #[validate(custom = "hex_color")]
    pub aprovado_cor: String,
    pub aprovado_botao_texto: String,
    pub aprovado_botao_url: Option<String>,

    pub rejeitado_titulo: String,
    pub rejeitado_mensagem: String,
    #[validate(custom = "hex_color")]
    pub rejeitado_cor: String,
    pub rejeitado_botao_texto: String,
    pub rejeitado_botao_url: Option<String>,

    pub analise_titulo: String,
    pub analise_mensagem: String,
    #[validate(custom = "hex_color")]
    pub analise_cor: String,
    pub analise_botao_texto: String,
    pub analise_botao_url: Option<String>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            cor_primaria: "#16a34a".into(),
            cor_secundaria: "#0f172a".into(),
            cor_fundo: "#f8fafc".into(),
            cor_texto: "#111827".into(),
            cor_botao: "#16a34a".into(),
            cor_texto_botao: "#ffffff".into(),
            cor_cabecalho: "#0f172a".into(),
            logo_url: None,
            banner_url: None,
            banner_ativo: false,
            mensagem_topo: "Oferta por tempo limitado".into(),
            mensagem_topo_ativa: true,
            timer_ativo: true,
            timer_minutos: 15,
            timer_texto: "Esta oferta expira em".into(),
            cor_timer: "#dc2626".into(),
            visitantes_ativo: true,
            visitantes_min: 18,
            visitantes_max: 47,
            visitantes_texto: "pessoas estão vendo esta oferta agora".into(),
            texto_botao: "Finalizar compra".into(),
            texto_botao_pix: "Gerar PIX".into(),
            texto_botao_cartao: "Pagar com cartão".into(),
            titulo_identificacao: "Seus dados".into(),
            titulo_pagamento: "Pagamento".into(),
            pix_ativo: true,
            pix_expiracao_minutos: 30,
            pix_titulo: "Pague com PIX".into(),
            pix_instrucoes: "Abra o aplicativo do seu banco, escolha PIX copia e cola e cole o código abaixo.".into(),
            pix_texto_copiar: "Copiar código PIX".into(),
            cartao_ativo: true,
            cartao_max_parcelas: 12,
            cartao_titulo: "Cartão de crédito".into(),
            status_cartao_padrao: PaymentStatus::Analyzing.as_str().into(),
            depoimentos_ativo: true,
            depoimentos_titulo: "O que nossos clientes dizem".into(),
            selo_seguranca_ativo: true,
            selo_texto: "Compra 100% segura".into(),
            garantia_dias: 7,
            rodape_texto: "Todos os direitos reservados.".into(),
            email_suporte: None,
            whatsapp_suporte: None,
            aprovado_titulo: "Pagamento aprovado!".into(),
            aprovado_mensagem: "Você receberá os detalhes de acesso no seu e-mail.".into(),
            aprovado_cor: "#16a34a".into(),
            aprovado_botao_texto: "Acessar produto".into(),
            aprovado_botao_url: None,
            rejeitado_titulo: "Pagamento recusado".into(),
            rejeitado_mensagem: "Não foi possível concluir o pagamento. Tente outro meio de pagamento.".into(),
            rejeitado_cor: "#dc2626".into(),
            rejeitado_botao_texto: "Tentar novamente".into(),
            rejeitado_botao_url: None,
            analise_titulo: "Pagamento em análise".into(),
            analise_mensagem: "Estamos confirmando seu pagamento. Você será avisado por e-mail.".into(),
            analise_cor: "#f59e0b".into(),
            analise_botao_texto: "Voltar à loja".into(),
            analise_botao_url: None,
        }
    }
}

/// Result panel for one payment status, with the button colors merged in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusPanel {
    pub status: PaymentStatus,
    pub titulo: String,
    pub mensagem: String,
    pub cor: String,
    pub botao_texto: String,
    pub botao_url: Option<String>,
    pub cor_botao: String,
    pub cor_texto_botao: String,
}

impl CheckoutConfig {
    /// Expands a partial payload over the defaults. Required fields must be
    /// present as non-empty strings; everything else is optional.
    pub fn expand(payload: &Value) -> Result<Self> {
        let object = payload
            .as_object()
            .ok_or_else(|| CheckoutError::InvalidConfig("payload deve ser um objeto JSON".into()))?;
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !object.get(*field).and_then(Value::as_str).is_some_and(|v| !v.trim().is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(CheckoutError::Validation(format!("Campos obrigatórios ausentes: {}", missing.join(", "))));
        }
        let config: CheckoutConfig =
            serde_json::from_value(payload.clone()).map_err(|e| CheckoutError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Picks the panel for `status`. A rejected payment without a configured
    /// button target sends the shopper back to the product checkout.
    pub fn status_panel(&self, status: PaymentStatus, slug: &str) -> StatusPanel {
        let (titulo, mensagem, cor, botao_texto, botao_url) = match status {
            PaymentStatus::Approved => (
                &self.aprovado_titulo, &self.aprovado_mensagem, &self.aprovado_cor,
                &self.aprovado_botao_texto, self.aprovado_botao_url.clone(),
            ),
            PaymentStatus::Rejected => (
                &self.rejeitado_titulo, &self.rejeitado_mensagem, &self.rejeitado_cor,
                &self.rejeitado_botao_texto,
                self.rejeitado_botao_url.clone().or_else(|| Some(format!("/checkout/{}", slug))),
            ),
            PaymentStatus::Analyzing => (
                &self.analise_titulo, &self.analise_mensagem, &self.analise_cor,
                &self.analise_botao_texto, self.analise_botao_url.clone(),
            ),
        };
        StatusPanel {
            status,
            titulo: titulo.clone(),
            mensagem: mensagem.clone(),
            cor: cor.clone(),
            botao_texto: botao_texto.clone(),
            botao_url,
            cor_botao: self.cor_botao.clone(),
            cor_texto_botao: self.cor_texto_botao.clone(),
        }
    }

    /// Status a card payment lands on right after submission.
    pub fn card_status(&self) -> PaymentStatus { PaymentStatus::resolve(Some(&self.status_cartao_padrao)) }

    pub fn visitor_counter(&self) -> Option<VisitorCounter> {
        self.visitantes_ativo.then(|| VisitorCounter::new(self.visitantes_min, self.visitantes_max))
    }

    pub fn offer_countdown(&self, started_at: DateTime<Utc>) -> Option<Countdown> {
        self.timer_ativo.then(|| Countdown::minutes(started_at, i64::from(self.timer_minutos)))
    }

    pub fn pix_countdown(&self, sale_created_at: DateTime<Utc>) -> Countdown {
        Countdown::minutes(sale_created_at, i64::from(self.pix_expiracao_minutos))
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredConfig {
    pub id: Uuid,
    pub dados: Json<CheckoutConfig>,
    pub updated_at: DateTime<Utc>,
}

impl StoredConfig {
    /// Reuses the payload's `id` when it carries a valid one.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let config = CheckoutConfig::expand(payload)?;
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::now_v7);
        Ok(Self { id, dados: Json(config), updated_at: Utc::now() })
    }

    pub fn config(&self) -> &CheckoutConfig { &self.dados.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value { json!({"cor_primaria": "#000000", "cor_botao": "#ff0000", "texto_botao": "Comprar agora"}) }

    #[test]
    fn test_expand_fills_defaults() {
        let cfg = CheckoutConfig::expand(&minimal()).unwrap();
        assert_eq!(cfg.cor_primaria, "#000000");
        assert_eq!(cfg.texto_botao, "Comprar agora");
        assert_eq!(cfg.pix_expiracao_minutos, 30);
        assert_eq!(cfg.aprovado_titulo, CheckoutConfig::default().aprovado_titulo);
        let expanded = serde_json::to_value(&cfg).unwrap();
        assert!(expanded.as_object().unwrap().len() > 50);
    }

    #[test]
    fn test_expand_reports_missing_required_fields() {
        let err = CheckoutConfig::expand(&json!({"cor_primaria": "#000", "texto_botao": "  "})).unwrap_err();
        match err {
            CheckoutError::Validation(msg) => {
                assert!(msg.contains("cor_botao"));
                assert!(msg.contains("texto_botao"));
                assert!(!msg.contains("cor_primaria"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(CheckoutConfig::expand(&json!([1, 2])), Err(CheckoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_expand_rejects_bad_types_and_values() {
        let mut p = minimal();
        p["timer_minutos"] = json!("quinze");
        assert!(matches!(CheckoutConfig::expand(&p), Err(CheckoutError::InvalidConfig(_))));
        let mut p = minimal();
        p["cor_fundo"] = json!("azul");
        assert!(matches!(CheckoutConfig::expand(&p), Err(CheckoutError::Validation(_))));
        let mut p = minimal();
        p["cartao_max_parcelas"] = json!(24);
        assert!(CheckoutConfig::expand(&p).is_err());
    }

    #[test]
    fn test_status_panel_selection() {
        let cfg = CheckoutConfig::default();
        let approved = cfg.status_panel(PaymentStatus::Approved, "curso");
        assert_eq!(approved.titulo, "Pagamento aprovado!");
        assert_eq!(approved.cor, "#16a34a");
        assert_eq!(approved.botao_url, None);
        let rejected = cfg.status_panel(PaymentStatus::Rejected, "curso");
        assert_eq!(rejected.botao_url.as_deref(), Some("/checkout/curso"));
        assert_eq!(rejected.cor_botao, cfg.cor_botao);
        assert_eq!(cfg.status_panel(PaymentStatus::Analyzing, "curso").cor, "#f59e0b");
    }

    #[test]
    fn test_card_status_is_lenient() {
        let mut cfg = CheckoutConfig::default();
        cfg.status_cartao_padrao = "rejected".into();
        assert_eq!(cfg.card_status(), PaymentStatus::Rejected);
        cfg.status_cartao_padrao = "whatever".into();
        assert_eq!(cfg.card_status(), PaymentStatus::Analyzing);
    }

    #[test]
    fn test_stored_config_reuses_payload_id() {
        let id = Uuid::now_v7();
        let mut p = minimal();
        p["id"] = json!(id.to_string());
        assert_eq!(StoredConfig::from_payload(&p).unwrap().id, id);
        p["id"] = json!("nope");
        assert_ne!(StoredConfig::from_payload(&p).unwrap().id, id);
    }

    #[test]
    fn test_toggles_disable_widgets() {
        let mut cfg = CheckoutConfig::default();
        assert!(cfg.visitor_counter().is_some());
        cfg.visitantes_ativo = false;
        cfg.timer_ativo = false;
        assert!(cfg.visitor_counter().is_none());
        assert!(cfg.offer_countdown(Utc::now()).is_none());
    }
}
