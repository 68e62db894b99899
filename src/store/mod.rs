//! Table access. Every method is a single read or write with no
//! coordination between calls.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{
    CardCapture, Customer, PixMessage, PixSection, Product, Sale, StoredConfig, Testimonial,
};
use crate::domain::value_objects::PaymentStatus;
use crate::Result;

/// Page window plus optional text filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
}

impl Page {
    pub fn new(page: Option<u32>, per_page: Option<u32>, search: Option<String>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(20).clamp(1, 100),
            search: search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }

    pub fn limit(&self) -> i64 { i64::from(self.per_page) }
    pub fn offset(&self) -> i64 { i64::from(self.page - 1) * i64::from(self.per_page) }
}

impl Default for Page {
    fn default() -> Self { Self::new(None, None, None) }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn list_products(&self, page: &Page) -> Result<(Vec<Product>, i64)>;
    async fn all_products(&self) -> Result<Vec<Product>>;
    async fn product(&self, id: Uuid) -> Result<Option<Product>>;
    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>>;
    async fn insert_product(&self, product: &Product) -> Result<Product>;
    async fn update_product(&self, product: &Product) -> Result<Option<Product>>;
    async fn delete_product(&self, id: Uuid) -> Result<bool>;

    async fn list_customers(&self, page: &Page) -> Result<(Vec<Customer>, i64)>;
    async fn all_customers(&self) -> Result<Vec<Customer>>;
    async fn count_customers(&self) -> Result<i64>;
    async fn insert_customer(&self, customer: &Customer) -> Result<Customer>;
    async fn delete_customer(&self, id: Uuid) -> Result<bool>;

    async fn list_sales(&self, page: &Page) -> Result<(Vec<Sale>, i64)>;
    async fn all_sales(&self) -> Result<Vec<Sale>>;
    async fn sale(&self, id: Uuid) -> Result<Option<Sale>>;
    async fn insert_sale(&self, sale: &Sale) -> Result<Sale>;
    async fn update_sale_status(&self, id: Uuid, status: PaymentStatus) -> Result<Option<Sale>>;
    async fn delete_sale(&self, id: Uuid) -> Result<bool>;

    async fn list_card_captures(&self, page: &Page) -> Result<(Vec<CardCapture>, i64)>;
    async fn count_card_captures(&self) -> Result<i64>;
    async fn insert_card_capture(&self, capture: &CardCapture) -> Result<CardCapture>;
    async fn delete_card_capture(&self, id: Uuid) -> Result<bool>;

    async fn testimonials_for(&self, produto_id: Uuid) -> Result<Vec<Testimonial>>;
    async fn testimonial(&self, id: Uuid) -> Result<Option<Testimonial>>;
    async fn insert_testimonial(&self, testimonial: &Testimonial) -> Result<Testimonial>;
    async fn update_testimonial(&self, testimonial: &Testimonial) -> Result<Option<Testimonial>>;
    async fn delete_testimonial(&self, id: Uuid) -> Result<bool>;

    async fn pix_messages_for(&self, produto_id: Uuid) -> Result<Vec<PixMessage>>;
    async fn replace_pix_messages(&self, produto_id: Uuid, messages: &[PixMessage]) -> Result<Vec<PixMessage>>;
    async fn pix_sections_for(&self, produto_id: Uuid) -> Result<Vec<PixSection>>;
    async fn replace_pix_sections(&self, produto_id: Uuid, sections: &[PixSection]) -> Result<Vec<PixSection>>;

    /// Most recently updated config row.
    async fn latest_config(&self) -> Result<Option<StoredConfig>>;
    async fn upsert_config(&self, config: &StoredConfig) -> Result<StoredConfig>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        let p = Page::new(Some(0), Some(500), Some("  ".into()));
        assert_eq!((p.page, p.per_page, p.search), (1, 100, None));
        let p = Page::new(Some(3), Some(10), None);
        assert_eq!((p.limit(), p.offset()), (10, 20));
        assert_eq!(Page::default().per_page, 20);
    }
}
