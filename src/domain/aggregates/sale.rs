//! Sale Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::{Customer, Product};
use crate::domain::events::{DomainEvent, SaleEvent};
use crate::domain::value_objects::{Money, PaymentStatus, UnknownVariant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleMethod { Pix, Cartao }

impl SaleMethod {
    pub fn as_str(&self) -> &'static str { match self { Self::Pix => "pix", Self::Cartao => "cartao" } }
}

impl TryFrom<String> for SaleMethod {
    type Error = UnknownVariant;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "pix" => Ok(Self::Pix),
            "cartao" => Ok(Self::Cartao),
            _ => Err(UnknownVariant { kind: "metodo", value }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub produto_id: Uuid,
    pub valor: Decimal,
    #[sqlx(try_from = "String")]
    pub metodo: SaleMethod,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Sale {
    pub fn register(customer: &Customer, product: &Product, method: SaleMethod, status: PaymentStatus) -> Self {
        let now = Utc::now();
        let mut sale = Self {
            id: Uuid::now_v7(), cliente_id: customer.id, produto_id: product.id, valor: product.valor,
            metodo: method, status, created_at: now, updated_at: now, events: vec![],
        };
        sale.raise_event(DomainEvent::Sale(SaleEvent::Registered {
            sale_id: sale.id, product_id: product.id, method, amount: sale.amount(), status,
        }));
        sale
    }

    pub fn amount(&self) -> Money { Money::brl(self.valor) }

    /// Returns whether the status actually changed.
    pub fn set_status(&mut self, to: PaymentStatus) -> bool {
        if self.status == to { return false; }
        let from = self.status;
        self.status = to;
        self.updated_at = Utc::now();
        self.raise_event(DomainEvent::Sale(SaleEvent::StatusChanged { sale_id: self.id, from, to }));
        true
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

/// Admin listing row with the customer and product names joined in.
#[derive(Debug, Clone, Serialize)]
pub struct SaleView {
    #[serde(flatten)]
    pub sale: Sale,
    pub cliente_nome: Option<String>,
    pub cliente_email: Option<String>,
    pub produto_nome: Option<String>,
    pub valor_formatado: String,
}

impl SaleView {
    /// Rows whose customer or product no longer exists keep `None` names.
    pub fn join(sales: Vec<Sale>, customers: &[Customer], products: &[Product]) -> Vec<SaleView> {
        sales
            .into_iter()
            .map(|sale| {
                let customer = customers.iter().find(|c| c.id == sale.cliente_id);
                let product = products.iter().find(|p| p.id == sale.produto_id);
                SaleView {
                    cliente_nome: customer.map(|c| c.nome.clone()),
                    cliente_email: customer.map(|c| c.email.clone()),
                    produto_nome: product.map(|p| p.nome.clone()),
                    valor_formatado: sale.amount().to_string(),
                    sale,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::customer::tests::form;
    use crate::domain::aggregates::product::tests::input;

    fn fixtures() -> (Customer, Product) {
        (Customer::identify(form()).unwrap(), Product::create(input("Curso", Decimal::new(4990, 2))).unwrap())
    }

    #[test]
    fn test_method_column_decodes_strictly() {
        assert_eq!(SaleMethod::try_from("cartao".to_string()), Ok(SaleMethod::Cartao));
        assert!(SaleMethod::try_from("boleto".to_string()).is_err());
    }

    #[test]
    fn test_register_raises_event() {
        let (c, p) = fixtures();
        let mut sale = Sale::register(&c, &p, SaleMethod::Pix, PaymentStatus::Analyzing);
        assert_eq!(sale.valor, p.valor);
        let events = sale.take_events();
        assert!(matches!(events.as_slice(), [DomainEvent::Sale(SaleEvent::Registered { method: SaleMethod::Pix, .. })]));
        assert!(sale.take_events().is_empty());
    }

    #[test]
    fn test_status_change_only_when_different() {
        let (c, p) = fixtures();
        let mut sale = Sale::register(&c, &p, SaleMethod::Cartao, PaymentStatus::Analyzing);
        sale.take_events();
        assert!(!sale.set_status(PaymentStatus::Analyzing));
        assert!(sale.take_events().is_empty());
        assert!(sale.set_status(PaymentStatus::Approved));
        assert_eq!(
            sale.take_events(),
            vec![DomainEvent::Sale(SaleEvent::StatusChanged { sale_id: sale.id, from: PaymentStatus::Analyzing, to: PaymentStatus::Approved })]
        );
    }

    #[test]
    fn test_join_resolves_names() {
        let (c, p) = fixtures();
        let sale = Sale::register(&c, &p, SaleMethod::Pix, PaymentStatus::Approved);
        let mut orphan = sale.clone();
        orphan.produto_id = Uuid::now_v7();
        let views = SaleView::join(vec![sale, orphan], &[c], &[p]);
        assert_eq!(views[0].produto_nome.as_deref(), Some("Curso"));
        assert_eq!(views[0].cliente_nome.as_deref(), Some("Maria Silva"));
        assert_eq!(views[0].valor_formatado, "R$ 49,90");
        assert_eq!(views[1].produto_nome, None);
    }
}
