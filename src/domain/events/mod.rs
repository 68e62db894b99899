//! Domain events
use crate::domain::aggregates::SaleMethod;
use crate::domain::value_objects::{CardBrand, Money, PaymentStatus};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Sale(SaleEvent),
    CardCaptured { capture_id: Uuid, sale_id: Uuid, brand: CardBrand },
    ConfigSaved { config_id: Uuid },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SaleEvent {
    Registered { sale_id: Uuid, product_id: Uuid, method: SaleMethod, amount: Money, status: PaymentStatus },
    StatusChanged { sale_id: Uuid, from: PaymentStatus, to: PaymentStatus },
}

impl DomainEvent {
    /// Emits the event as a structured log record.
    pub fn trace(&self) {
        match self {
            Self::Sale(SaleEvent::Registered { sale_id, product_id, method, amount, status }) => {
                tracing::info!(%sale_id, %product_id, method = method.as_str(), %amount, %status, "sale registered")
            }
            Self::Sale(SaleEvent::StatusChanged { sale_id, from, to }) => {
                tracing::info!(%sale_id, %from, %to, "sale status changed")
            }
            Self::CardCaptured { capture_id, sale_id, brand } => {
                tracing::info!(%capture_id, %sale_id, %brand, "card captured")
            }
            Self::ConfigSaved { config_id } => tracing::info!(%config_id, "checkout config saved"),
        }
    }
}
