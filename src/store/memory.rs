//! In-process store for demo mode and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Page, Store};
use crate::domain::aggregates::{
    CardCapture, Customer, PixMessage, PixSection, Product, Sale, StoredConfig, Testimonial,
};
use crate::domain::value_objects::PaymentStatus;
use crate::{CheckoutError, Result};

#[derive(Default)]
struct Tables {
    products: Vec<Product>,
    customers: Vec<Customer>,
    sales: Vec<Sale>,
    cards: Vec<CardCapture>,
    testimonials: Vec<Testimonial>,
    pix_messages: Vec<PixMessage>,
    pix_sections: Vec<PixSection>,
    configs: Vec<StoredConfig>,
}

#[derive(Default)]
pub struct MemoryStore { tables: RwLock<Tables> }

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

/// Sorts with `order`, then windows by `page`. The total counts all rows.
fn paginate<T>(mut rows: Vec<T>, page: &Page, order: impl Fn(&T, &T) -> std::cmp::Ordering) -> (Vec<T>, i64) {
    rows.sort_by(order);
    let total = rows.len() as i64;
    let data = rows
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(page.per_page as usize)
        .collect();
    (data, total)
}

fn contains(haystack: &str, needle: &str) -> bool { haystack.to_lowercase().contains(&needle.to_lowercase()) }

fn remove_by<T>(rows: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|r| !pred(r));
    rows.len() != before
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> { Ok(()) }

    async fn list_products(&self, page: &Page) -> Result<(Vec<Product>, i64)> {
        let t = self.tables.read().await;
        let rows = t
            .products
            .iter()
            .filter(|p| page.search.as_deref().map_or(true, |q| contains(&p.nome, q) || contains(&p.slug, q)))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |a, b| b.created_at.cmp(&a.created_at)))
    }

    async fn all_products(&self) -> Result<Vec<Product>> {
        let mut rows = self.tables.read().await.products.clone();
        rows.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(rows)
    }

    async fn product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.iter().find(|p| p.id == id).cloned())
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.iter().find(|p| p.slug == slug).cloned())
    }

    async fn insert_product(&self, product: &Product) -> Result<Product> {
        let mut t = self.tables.write().await;
        if t.products.iter().any(|p| p.slug == product.slug) {
            return Err(CheckoutError::slug_taken(&product.slug));
        }
        t.products.push(product.clone());
        Ok(product.clone())
    }

    async fn update_product(&self, product: &Product) -> Result<Option<Product>> {
        let mut t = self.tables.write().await;
        if t.products.iter().any(|p| p.slug == product.slug && p.id != product.id) {
            return Err(CheckoutError::slug_taken(&product.slug));
        }
        Ok(t.products.iter_mut().find(|p| p.id == product.id).map(|p| {
            *p = product.clone();
            p.clone()
        }))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let mut t = self.tables.write().await;
        t.testimonials.retain(|x| x.produto_id != id);
        t.pix_messages.retain(|x| x.produto_id != id);
        t.pix_sections.retain(|x| x.produto_id != id);
        Ok(remove_by(&mut t.products, |p| p.id == id))
    }

    async fn list_customers(&self, page: &Page) -> Result<(Vec<Customer>, i64)> {
        let t = self.tables.read().await;
        let rows = t
            .customers
            .iter()
            .filter(|c| page.search.as_deref().map_or(true, |q| contains(&c.nome, q) || contains(&c.email, q) || c.cpf.contains(q)))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |a, b| b.created_at.cmp(&a.created_at)))
    }

    async fn all_customers(&self) -> Result<Vec<Customer>> { Ok(self.tables.read().await.customers.clone()) }

    async fn count_customers(&self) -> Result<i64> { Ok(self.tables.read().await.customers.len() as i64) }

    async fn insert_customer(&self, customer: &Customer) -> Result<Customer> {
        self.tables.write().await.customers.push(customer.clone());
        Ok(customer.clone())
    }

    async fn delete_customer(&self, id: Uuid) -> Result<bool> {
        Ok(remove_by(&mut self.tables.write().await.customers, |c| c.id == id))
    }

    async fn list_sales(&self, page: &Page) -> Result<(Vec<Sale>, i64)> {
        let t = self.tables.read().await;
        let rows = t
            .sales
            .iter()
            .filter(|s| page.search.as_deref().map_or(true, |q| s.status.as_str() == q || s.metodo.as_str() == q))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |a, b| b.created_at.cmp(&a.created_at)))
    }

    async fn all_sales(&self) -> Result<Vec<Sale>> {
        let mut rows = self.tables.read().await.sales.clone();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn sale(&self, id: Uuid) -> Result<Option<Sale>> {
        Ok(self.tables.read().await.sales.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_sale(&self, sale: &Sale) -> Result<Sale> {
        let mut stored = sale.clone();
        stored.take_events();
        self.tables.write().await.sales.push(stored.clone());
        Ok(stored)
    }

    async fn update_sale_status(&self, id: Uuid, status: PaymentStatus) -> Result<Option<Sale>> {
        let mut t = self.tables.write().await;
        Ok(t.sales.iter_mut().find(|s| s.id == id).map(|s| {
            s.status = status;
            s.updated_at = Utc::now();
            s.clone()
        }))
    }

    async fn delete_sale(&self, id: Uuid) -> Result<bool> {
        Ok(remove_by(&mut self.tables.write().await.sales, |s| s.id == id))
    }

    async fn list_card_captures(&self, page: &Page) -> Result<(Vec<CardCapture>, i64)> {
        let t = self.tables.read().await;
        let rows = t
            .cards
            .iter()
            .filter(|c| page.search.as_deref().map_or(true, |q| contains(&c.titular, q) || c.bandeira.as_str() == q))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |a, b| b.created_at.cmp(&a.created_at)))
    }

    async fn count_card_captures(&self) -> Result<i64> { Ok(self.tables.read().await.cards.len() as i64) }

    async fn insert_card_capture(&self, capture: &CardCapture) -> Result<CardCapture> {
        self.tables.write().await.cards.push(capture.clone());
        Ok(capture.clone())
    }

    async fn delete_card_capture(&self, id: Uuid) -> Result<bool> {
        Ok(remove_by(&mut self.tables.write().await.cards, |c| c.id == id))
    }

    async fn testimonials_for(&self, produto_id: Uuid) -> Result<Vec<Testimonial>> {
        let mut rows: Vec<Testimonial> =
            self.tables.read().await.testimonials.iter().filter(|t| t.produto_id == produto_id).cloned().collect();
        rows.sort_by(|a, b| a.ordem.cmp(&b.ordem).then(a.created_at.cmp(&b.created_at)));
        Ok(rows)
    }

    async fn testimonial(&self, id: Uuid) -> Result<Option<Testimonial>> {
        Ok(self.tables.read().await.testimonials.iter().find(|t| t.id == id).cloned())
    }

    async fn insert_testimonial(&self, testimonial: &Testimonial) -> Result<Testimonial> {
        self.tables.write().await.testimonials.push(testimonial.clone());
        Ok(testimonial.clone())
    }

    async fn update_testimonial(&self, testimonial: &Testimonial) -> Result<Option<Testimonial>> {
        let mut t = self.tables.write().await;
        Ok(t.testimonials.iter_mut().find(|x| x.id == testimonial.id).map(|x| {
            *x = testimonial.clone();
            x.clone()
        }))
    }

    async fn delete_testimonial(&self, id: Uuid) -> Result<bool> {
        Ok(remove_by(&mut self.tables.write().await.testimonials, |t| t.id == id))
    }

    async fn pix_messages_for(&self, produto_id: Uuid) -> Result<Vec<PixMessage>> {
        let mut rows: Vec<PixMessage> =
            self.tables.read().await.pix_messages.iter().filter(|m| m.produto_id == produto_id).cloned().collect();
        rows.sort_by_key(|m| m.ordem);
        Ok(rows)
    }

    async fn replace_pix_messages(&self, produto_id: Uuid, messages: &[PixMessage]) -> Result<Vec<PixMessage>> {
        {
            let mut t = self.tables.write().await;
            t.pix_messages.retain(|m| m.produto_id != produto_id);
            t.pix_messages.extend(messages.iter().cloned());
        }
        self.pix_messages_for(produto_id).await
    }

    async fn pix_sections_for(&self, produto_id: Uuid) -> Result<Vec<PixSection>> {
        let mut rows: Vec<PixSection> =
            self.tables.read().await.pix_sections.iter().filter(|s| s.produto_id == produto_id).cloned().collect();
        rows.sort_by_key(|s| s.ordem);
        Ok(rows)
    }

    async fn replace_pix_sections(&self, produto_id: Uuid, sections: &[PixSection]) -> Result<Vec<PixSection>> {
        {
            let mut t = self.tables.write().await;
            t.pix_sections.retain(|s| s.produto_id != produto_id);
            t.pix_sections.extend(sections.iter().cloned());
        }
        self.pix_sections_for(produto_id).await
    }

    async fn latest_config(&self) -> Result<Option<StoredConfig>> {
        Ok(self.tables.read().await.configs.iter().max_by_key(|c| c.updated_at).cloned())
    }

    async fn upsert_config(&self, config: &StoredConfig) -> Result<StoredConfig> {
        let mut t = self.tables.write().await;
        match t.configs.iter_mut().find(|c| c.id == config.id) {
            Some(existing) => *existing = config.clone(),
            None => t.configs.push(config.clone()),
        }
        Ok(config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::tests::input;
    use crate::domain::aggregates::testimonial::TestimonialInput;
    use crate::api::ApiError;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_product_slug_is_unique() {
        let store = MemoryStore::new();
        let p = Product::create(input("Curso", Decimal::ONE)).unwrap();
        store.insert_product(&p).await.unwrap();
        let dup = Product::create(input("Curso", Decimal::ONE)).unwrap();
        let err = store.insert_product(&dup).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert_eq!(ApiError::from(err).status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.product_by_slug("curso").await.unwrap().map(|x| x.id), Some(p.id));
    }

    #[tokio::test]
    async fn test_pagination_and_search() {
        let store = MemoryStore::new();
        for name in ["Alpha", "Beta", "Gamma"] {
            store.insert_product(&Product::create(input(name, Decimal::ONE)).unwrap()).await.unwrap();
        }
        let (rows, total) = store.list_products(&Page::new(Some(2), Some(2), None)).await.unwrap();
        assert_eq!((rows.len(), total), (1, 3));
        let (rows, total) = store.list_products(&Page::new(None, None, Some("amm".into()))).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].nome, "Gamma");
    }

    #[tokio::test]
    async fn test_delete_product_cascades_copy() {
        let store = MemoryStore::new();
        let p = Product::create(input("Curso", Decimal::ONE)).unwrap();
        store.insert_product(&p).await.unwrap();
        let t = Testimonial::create(p.id, TestimonialInput {
            nome: "Ana".into(), texto: "Ótimo".into(), avatar_url: None, estrelas: 5, ativo: true, ordem: 0,
        }).unwrap();
        store.insert_testimonial(&t).await.unwrap();
        assert!(store.delete_product(p.id).await.unwrap());
        assert!(store.testimonials_for(p.id).await.unwrap().is_empty());
        assert!(!store.delete_product(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_latest_config_wins() {
        let store = MemoryStore::new();
        assert!(store.latest_config().await.unwrap().is_none());
        let payload = serde_json::json!({"cor_primaria": "#111111", "cor_botao": "#222222", "texto_botao": "A"});
        let first = StoredConfig::from_payload(&payload).unwrap();
        store.upsert_config(&first).await.unwrap();
        let mut second = StoredConfig::from_payload(&payload).unwrap();
        second.dados.0.texto_botao = "B".into();
        second.updated_at = first.updated_at + chrono::Duration::seconds(1);
        store.upsert_config(&second).await.unwrap();
        assert_eq!(store.latest_config().await.unwrap().unwrap().config().texto_botao, "B");
    }
}
