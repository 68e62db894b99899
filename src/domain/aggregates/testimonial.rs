//! Testimonials shown under the checkout form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Testimonial {
    pub id: Uuid,
    pub produto_id: Uuid,
    pub nome: String,
    pub texto: String,
    pub avatar_url: Option<String>,
    pub estrelas: i32,
    pub ativo: bool,
    pub ordem: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TestimonialInput {
    #[validate(length(min = 1, max = 120))]
    pub nome: String,
    #[validate(length(min = 1, max = 2000))]
    pub texto: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[serde(default = "five_stars")]
    #[validate(range(min = 1, max = 5))]
    pub estrelas: i32,
    #[serde(default = "default_true")]
    pub ativo: bool,
    #[serde(default)]
    pub ordem: i32,
}

fn five_stars() -> i32 { 5 }
fn default_true() -> bool { true }

impl Testimonial {
    pub fn create(produto_id: Uuid, input: TestimonialInput) -> Result<Self> {
        input.validate()?;
        Ok(Self {
            id: Uuid::now_v7(), produto_id, nome: input.nome, texto: input.texto, avatar_url: input.avatar_url,
            estrelas: input.estrelas, ativo: input.ativo, ordem: input.ordem, created_at: Utc::now(),
        })
    }

    pub fn apply(&mut self, input: TestimonialInput) -> Result<()> {
        input.validate()?;
        self.nome = input.nome;
        self.texto = input.texto;
        self.avatar_url = input.avatar_url;
        self.estrelas = input.estrelas;
        self.ativo = input.ativo;
        self.ordem = input.ordem;
        Ok(())
    }
}

/// Active testimonials in display order.
pub fn visible(mut items: Vec<Testimonial>) -> Vec<Testimonial> {
    items.retain(|t| t.ativo);
    items.sort_by(|a, b| a.ordem.cmp(&b.ordem).then(a.created_at.cmp(&b.created_at)));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(nome: &str, estrelas: i32, ordem: i32) -> TestimonialInput {
        TestimonialInput { nome: nome.into(), texto: "Excelente!".into(), avatar_url: None, estrelas, ativo: true, ordem }
    }

    #[test]
    fn test_star_range() {
        let pid = Uuid::now_v7();
        assert!(Testimonial::create(pid, input("Ana", 5, 0)).is_ok());
        assert!(Testimonial::create(pid, input("Ana", 0, 0)).is_err());
        assert!(Testimonial::create(pid, input("Ana", 6, 0)).is_err());
    }

    #[test]
    fn test_visible_filters_and_orders() {
        let pid = Uuid::now_v7();
        let a = Testimonial::create(pid, input("A", 5, 2)).unwrap();
        let b = Testimonial::create(pid, input("B", 4, 1)).unwrap();
        let mut c = Testimonial::create(pid, input("C", 3, 0)).unwrap();
        c.ativo = false;
        let names: Vec<_> = visible(vec![a, b, c]).into_iter().map(|t| t.nome).collect();
        assert_eq!(names, ["B", "A"]);
    }
}
