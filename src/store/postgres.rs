//! Postgres-backed store.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{Page, Store};
use crate::domain::aggregates::{
    CardCapture, Customer, PixMessage, PixSection, Product, Sale, StoredConfig, Testimonial,
};
use crate::domain::value_objects::PaymentStatus;
use crate::{CheckoutError, Result};

#[derive(Clone)]
pub struct PgStore { pool: PgPool }

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| CheckoutError::Storage(e.to_string()))
    }

    pub fn from_pool(pool: PgPool) -> Self { Self { pool } }
}

/// A concurrent create can still trip the unique index after the handler's check.
fn slug_conflict(e: sqlx::Error, slug: &str) -> CheckoutError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() { return CheckoutError::slug_taken(slug); }
    }
    e.into()
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_products(&self, page: &Page) -> Result<(Vec<Product>, i64)> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM produtos WHERE ($3::text IS NULL OR nome ILIKE '%' || $3 || '%' OR slug ILIKE '%' || $3 || '%') ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(page.limit()).bind(page.offset()).bind(&page.search).fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM produtos WHERE ($1::text IS NULL OR nome ILIKE '%' || $1 || '%' OR slug ILIKE '%' || $1 || '%')")
            .bind(&page.search).fetch_one(&self.pool).await?;
        Ok((products, total.0))
    }

    async fn all_products(&self) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>("SELECT * FROM produtos ORDER BY nome").fetch_all(&self.pool).await?)
    }

    async fn product(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>("SELECT * FROM produtos WHERE id = $1").bind(id).fetch_optional(&self.pool).await?)
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>("SELECT * FROM produtos WHERE slug = $1").bind(slug).fetch_optional(&self.pool).await?)
    }

    async fn insert_product(&self, p: &Product) -> Result<Product> {
        Ok(sqlx::query_as::<_, Product>("INSERT INTO produtos (id, nome, slug, descricao, valor, tipo, imagem_url, banner_url, banner_ativo, banner_texto, pix_chave, pix_tipo_chave, pix_beneficiario, pix_copia_cola, ativo, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) RETURNING *")
            .bind(p.id).bind(&p.nome).bind(&p.slug).bind(&p.descricao).bind(p.valor).bind(p.tipo.as_str())
            .bind(&p.imagem_url).bind(&p.banner_url).bind(p.banner_ativo).bind(&p.banner_texto)
            .bind(&p.pix_chave).bind(&p.pix_tipo_chave).bind(&p.pix_beneficiario).bind(&p.pix_copia_cola)
            .bind(p.ativo).bind(p.created_at).bind(p.updated_at)
            .fetch_one(&self.pool).await.map_err(|e| slug_conflict(e, &p.slug))?)
    }

    async fn update_product(&self, p: &Product) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>("UPDATE produtos SET nome = $2, slug = $3, descricao = $4, valor = $5, tipo = $6, imagem_url = $7, banner_url = $8, banner_ativo = $9, banner_texto = $10, pix_chave = $11, pix_tipo_chave = $12, pix_beneficiario = $13, pix_copia_cola = $14, ativo = $15, updated_at = $16 WHERE id = $1 RETURNING *")
            .bind(p.id).bind(&p.nome).bind(&p.slug).bind(&p.descricao).bind(p.valor).bind(p.tipo.as_str())
            .bind(&p.imagem_url).bind(&p.banner_url).bind(p.banner_ativo).bind(&p.banner_texto)
            .bind(&p.pix_chave).bind(&p.pix_tipo_chave).bind(&p.pix_beneficiario).bind(&p.pix_copia_cola)
            .bind(p.ativo).bind(p.updated_at)
            .fetch_optional(&self.pool).await.map_err(|e| slug_conflict(e, &p.slug))?)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool> {
        let r = sqlx::query("DELETE FROM produtos WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(r.rows_affected() > 0)
    }

    async fn list_customers(&self, page: &Page) -> Result<(Vec<Customer>, i64)> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM clientes WHERE ($3::text IS NULL OR nome ILIKE '%' || $3 || '%' OR email ILIKE '%' || $3 || '%' OR cpf LIKE '%' || $3 || '%') ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(page.limit()).bind(page.offset()).bind(&page.search).fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clientes WHERE ($1::text IS NULL OR nome ILIKE '%' || $1 || '%' OR email ILIKE '%' || $1 || '%' OR cpf LIKE '%' || $1 || '%')")
            .bind(&page.search).fetch_one(&self.pool).await?;
        Ok((customers, total.0))
    }

    async fn all_customers(&self) -> Result<Vec<Customer>> {
        Ok(sqlx::query_as::<_, Customer>("SELECT * FROM clientes").fetch_all(&self.pool).await?)
    }

    async fn count_customers(&self) -> Result<i64> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clientes").fetch_one(&self.pool).await?;
        Ok(total.0)
    }

    async fn insert_customer(&self, c: &Customer) -> Result<Customer> {
        Ok(sqlx::query_as::<_, Customer>("INSERT INTO clientes (id, nome, email, telefone, cpf, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *")
            .bind(c.id).bind(&c.nome).bind(&c.email).bind(&c.telefone).bind(&c.cpf).bind(c.created_at)
            .fetch_one(&self.pool).await?)
    }

    async fn delete_customer(&self, id: Uuid) -> Result<bool> {
        let r = sqlx::query("DELETE FROM clientes WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(r.rows_affected() > 0)
    }

    async fn list_sales(&self, page: &Page) -> Result<(Vec<Sale>, i64)> {
        let sales = sqlx::query_as::<_, Sale>("SELECT * FROM vendas WHERE ($3::text IS NULL OR status = $3 OR metodo = $3) ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(page.limit()).bind(page.offset()).bind(&page.search).fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vendas WHERE ($1::text IS NULL OR status = $1 OR metodo = $1)")
            .bind(&page.search).fetch_one(&self.pool).await?;
        Ok((sales, total.0))
    }

    async fn all_sales(&self) -> Result<Vec<Sale>> {
        Ok(sqlx::query_as::<_, Sale>("SELECT * FROM vendas ORDER BY created_at").fetch_all(&self.pool).await?)
    }

    async fn sale(&self, id: Uuid) -> Result<Option<Sale>> {
        Ok(sqlx::query_as::<_, Sale>("SELECT * FROM vendas WHERE id = $1").bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_sale(&self, s: &Sale) -> Result<Sale> {
        Ok(sqlx::query_as::<_, Sale>("INSERT INTO vendas (id, cliente_id, produto_id, valor, metodo, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *")
            .bind(s.id).bind(s.cliente_id).bind(s.produto_id).bind(s.valor).bind(s.metodo.as_str()).bind(s.status.as_str())
            .bind(s.created_at).bind(s.updated_at)
            .fetch_one(&self.pool).await?)
    }

    async fn update_sale_status(&self, id: Uuid, status: PaymentStatus) -> Result<Option<Sale>> {
        Ok(sqlx::query_as::<_, Sale>("UPDATE vendas SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(id).bind(status.as_str()).fetch_optional(&self.pool).await?)
    }

    async fn delete_sale(&self, id: Uuid) -> Result<bool> {
        let r = sqlx::query("DELETE FROM vendas WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(r.rows_affected() > 0)
    }

    async fn list_card_captures(&self, page: &Page) -> Result<(Vec<CardCapture>, i64)> {
        let captures = sqlx::query_as::<_, CardCapture>("SELECT * FROM cartoes WHERE ($3::text IS NULL OR titular ILIKE '%' || $3 || '%' OR bandeira = $3) ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(page.limit()).bind(page.offset()).bind(&page.search).fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cartoes WHERE ($1::text IS NULL OR titular ILIKE '%' || $1 || '%' OR bandeira = $1)")
            .bind(&page.search).fetch_one(&self.pool).await?;
        Ok((captures, total.0))
    }

    async fn count_card_captures(&self) -> Result<i64> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cartoes").fetch_one(&self.pool).await?;
        Ok(total.0)
    }

    async fn insert_card_capture(&self, c: &CardCapture) -> Result<CardCapture> {
        Ok(sqlx::query_as::<_, CardCapture>("INSERT INTO cartoes (id, cliente_id, produto_id, venda_id, titular, bandeira, ultimos_digitos, validade, parcelas, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *")
            .bind(c.id).bind(c.cliente_id).bind(c.produto_id).bind(c.venda_id).bind(&c.titular).bind(c.bandeira.as_str())
            .bind(&c.ultimos_digitos).bind(&c.validade).bind(c.parcelas).bind(c.created_at)
            .fetch_one(&self.pool).await?)
    }

    async fn delete_card_capture(&self, id: Uuid) -> Result<bool> {
        let r = sqlx::query("DELETE FROM cartoes WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(r.rows_affected() > 0)
    }

    async fn testimonials_for(&self, produto_id: Uuid) -> Result<Vec<Testimonial>> {
        Ok(sqlx::query_as::<_, Testimonial>("SELECT * FROM depoimentos WHERE produto_id = $1 ORDER BY ordem, created_at")
            .bind(produto_id).fetch_all(&self.pool).await?)
    }

    async fn testimonial(&self, id: Uuid) -> Result<Option<Testimonial>> {
        Ok(sqlx::query_as::<_, Testimonial>("SELECT * FROM depoimentos WHERE id = $1").bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_testimonial(&self, t: &Testimonial) -> Result<Testimonial> {
        Ok(sqlx::query_as::<_, Testimonial>("INSERT INTO depoimentos (id, produto_id, nome, texto, avatar_url, estrelas, ativo, ordem, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *")
            .bind(t.id).bind(t.produto_id).bind(&t.nome).bind(&t.texto).bind(&t.avatar_url).bind(t.estrelas).bind(t.ativo).bind(t.ordem).bind(t.created_at)
            .fetch_one(&self.pool).await?)
    }

    async fn update_testimonial(&self, t: &Testimonial) -> Result<Option<Testimonial>> {
        Ok(sqlx::query_as::<_, Testimonial>("UPDATE depoimentos SET nome = $2, texto = $3, avatar_url = $4, estrelas = $5, ativo = $6, ordem = $7 WHERE id = $1 RETURNING *")
            .bind(t.id).bind(&t.nome).bind(&t.texto).bind(&t.avatar_url).bind(t.estrelas).bind(t.ativo).bind(t.ordem)
            .fetch_optional(&self.pool).await?)
    }

    async fn delete_testimonial(&self, id: Uuid) -> Result<bool> {
        let r = sqlx::query("DELETE FROM depoimentos WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(r.rows_affected() > 0)
    }

    async fn pix_messages_for(&self, produto_id: Uuid) -> Result<Vec<PixMessage>> {
        Ok(sqlx::query_as::<_, PixMessage>("SELECT * FROM pix_mensagens WHERE produto_id = $1 ORDER BY ordem")
            .bind(produto_id).fetch_all(&self.pool).await?)
    }

    async fn replace_pix_messages(&self, produto_id: Uuid, messages: &[PixMessage]) -> Result<Vec<PixMessage>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM pix_mensagens WHERE produto_id = $1").bind(produto_id).execute(&mut *tx).await?;
        for m in messages {
            sqlx::query("INSERT INTO pix_mensagens (id, produto_id, texto, ordem) VALUES ($1, $2, $3, $4)")
                .bind(m.id).bind(produto_id).bind(&m.texto).bind(m.ordem).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        self.pix_messages_for(produto_id).await
    }

    async fn pix_sections_for(&self, produto_id: Uuid) -> Result<Vec<PixSection>> {
        Ok(sqlx::query_as::<_, PixSection>("SELECT * FROM pix_secoes WHERE produto_id = $1 ORDER BY ordem")
            .bind(produto_id).fetch_all(&self.pool).await?)
    }

    async fn replace_pix_sections(&self, produto_id: Uuid, sections: &[PixSection]) -> Result<Vec<PixSection>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM pix_secoes WHERE produto_id = $1").bind(produto_id).execute(&mut *tx).await?;
        for s in sections {
            sqlx::query("INSERT INTO pix_secoes (id, produto_id, titulo, conteudo, ordem, ativo) VALUES ($1, $2, $3, $4, $5, $6)")
                .bind(s.id).bind(produto_id).bind(&s.titulo).bind(&s.conteudo).bind(s.ordem).bind(s.ativo).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        self.pix_sections_for(produto_id).await
    }

    async fn latest_config(&self) -> Result<Option<StoredConfig>> {
        Ok(sqlx::query_as::<_, StoredConfig>("SELECT id, dados, updated_at FROM config_checkout ORDER BY updated_at DESC LIMIT 1")
            .fetch_optional(&self.pool).await?)
    }

    async fn upsert_config(&self, c: &StoredConfig) -> Result<StoredConfig> {
        Ok(sqlx::query_as::<_, StoredConfig>("INSERT INTO config_checkout (id, dados, updated_at) VALUES ($1, $2, $3) ON CONFLICT (id) DO UPDATE SET dados = EXCLUDED.dados, updated_at = EXCLUDED.updated_at RETURNING id, dados, updated_at")
            .bind(c.id).bind(&c.dados).bind(c.updated_at)
            .fetch_one(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::fmt;

    #[derive(Debug)]
    struct UniqueViolation;

    impl fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("duplicate key value violates unique constraint") }
    }

    impl std::error::Error for UniqueViolation {}

    impl DatabaseError for UniqueViolation {
        fn message(&self) -> &str { "duplicate key value violates unique constraint \"produtos_slug_key\"" }
        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) { self }
        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) { self }
        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> { self }
        fn kind(&self) -> ErrorKind { ErrorKind::UniqueViolation }
    }

    #[test]
    fn test_unique_violation_is_a_slug_conflict() {
        let err = slug_conflict(sqlx::Error::Database(Box::new(UniqueViolation)), "curso");
        assert!(matches!(&err, CheckoutError::Validation(m) if m.contains("curso")));
        assert!(matches!(slug_conflict(sqlx::Error::RowNotFound, "curso"), CheckoutError::Storage(_)));
    }
}
