//! Card payment records.
//!
//! Only brand, last four digits, holder, expiry and installments are kept.
//! The full number and security code are dropped once the capture is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::Sale;
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::format::{format_expiry, validate_expiry};
use crate::domain::value_objects::{CardBrand, MaskedCard};
use crate::{CheckoutError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CardCapture {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub produto_id: Uuid,
    pub venda_id: Uuid,
    pub titular: String,
    #[sqlx(try_from = "String")]
    pub bandeira: CardBrand,
    pub ultimos_digitos: String,
    pub validade: String,
    pub parcelas: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Deserialize, Validate)]
pub struct CardForm {
    #[validate(length(min = 2, max = 200))]
    pub titular: String,
    pub numero: String,
    #[validate(custom = "validate_expiry")]
    pub validade: String,
    #[validate(length(min = 3, max = 4))]
    pub cvv: String,
    #[serde(default = "single_installment")]
    #[validate(range(min = 1, max = 12))]
    pub parcelas: i32,
}

fn single_installment() -> i32 { 1 }

impl std::fmt::Debug for CardForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardForm")
            .field("titular", &self.titular)
            .field("numero", &"<redacted>")
            .field("validade", &self.validade)
            .field("cvv", &"<redacted>")
            .field("parcelas", &self.parcelas)
            .finish()
    }
}

impl CardCapture {
    /// `max_installments` comes from the checkout config.
    pub fn capture(sale: &Sale, form: CardForm, max_installments: i32) -> Result<Self> {
        form.validate()?;
        if form.parcelas > max_installments {
            return Err(CheckoutError::Validation(format!("máximo de {} parcelas", max_installments)));
        }
        let masked = MaskedCard::from_number(&form.numero).map_err(|e| CheckoutError::Validation(e.to_string()))?;
        Ok(Self {
            id: Uuid::now_v7(),
            cliente_id: sale.cliente_id,
            produto_id: sale.produto_id,
            venda_id: sale.id,
            titular: form.titular.trim().to_uppercase(),
            bandeira: masked.brand,
            ultimos_digitos: masked.last_four,
            validade: format_expiry(&form.validade),
            parcelas: form.parcelas,
            created_at: Utc::now(),
        })
    }

    pub fn event(&self) -> DomainEvent {
        DomainEvent::CardCaptured { capture_id: self.id, sale_id: self.venda_id, brand: self.bandeira }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::aggregates::customer::tests::form as identification;
    use crate::domain::aggregates::product::tests::input;
    use crate::domain::aggregates::{Customer, Product, SaleMethod};
    use crate::domain::value_objects::PaymentStatus;
    use rust_decimal::Decimal;

    pub(crate) fn card_form(numero: &str) -> CardForm {
        CardForm { titular: "maria silva".into(), numero: numero.into(), validade: "1230".into(), cvv: "123".into(), parcelas: 3 }
    }

    fn sale() -> Sale {
        let c = Customer::identify(identification()).unwrap();
        let p = Product::create(input("Curso", Decimal::new(100, 0))).unwrap();
        Sale::register(&c, &p, SaleMethod::Cartao, PaymentStatus::Analyzing)
    }

    #[test]
    fn test_capture_keeps_only_masked_data() {
        let s = sale();
        let cap = CardCapture::capture(&s, card_form("5555 5555 5555 4444"), 12).unwrap();
        assert_eq!(cap.bandeira, CardBrand::Mastercard);
        assert_eq!(cap.ultimos_digitos, "4444");
        assert_eq!(cap.validade, "12/30");
        assert_eq!(cap.titular, "MARIA SILVA");
        assert_eq!(cap.venda_id, s.id);
        let json = serde_json::to_string(&cap).unwrap();
        assert!(!json.contains("5555555555554444"));
    }

    #[test]
    fn test_capture_limits_installments() {
        assert!(CardCapture::capture(&sale(), card_form("4111111111111111"), 2).is_err());
    }

    #[test]
    fn test_debug_redacts_number() {
        let dbg = format!("{:?}", card_form("4111111111111111"));
        assert!(!dbg.contains("4111"));
        assert!(!dbg.contains("123\""));
    }
}
