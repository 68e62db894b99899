//! Instructional copy on the PIX payment step: short messages and
//! collapsible sections, both replaced as a whole per product.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PixMessage {
    pub id: Uuid,
    pub produto_id: Uuid,
    pub texto: String,
    pub ordem: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PixSection {
    pub id: Uuid,
    pub produto_id: Uuid,
    pub titulo: String,
    pub conteudo: String,
    pub ordem: i32,
    pub ativo: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PixMessageInput {
    #[validate(length(min = 1, max = 500))]
    pub texto: String,
    pub ordem: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PixSectionInput {
    #[validate(length(min = 1, max = 200))]
    pub titulo: String,
    #[validate(length(max = 5000))]
    pub conteudo: String,
    pub ordem: Option<i32>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

fn default_true() -> bool { true }

fn position(ordem: Option<i32>, index: usize) -> i32 { ordem.unwrap_or(i32::try_from(index).unwrap_or(i32::MAX)) }

/// Builds the replacement message set; missing `ordem` falls back to list position.
pub fn message_set(produto_id: Uuid, inputs: Vec<PixMessageInput>) -> Result<Vec<PixMessage>> {
    let mut out = inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| -> Result<PixMessage> {
            input.validate()?;
            Ok(PixMessage { id: Uuid::now_v7(), produto_id, texto: input.texto, ordem: position(input.ordem, i) })
        })
        .collect::<Result<Vec<_>>>()?;
    out.sort_by_key(|m| m.ordem);
    Ok(out)
}

pub fn section_set(produto_id: Uuid, inputs: Vec<PixSectionInput>) -> Result<Vec<PixSection>> {
    let mut out = inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| -> Result<PixSection> {
            input.validate()?;
            Ok(PixSection {
                id: Uuid::now_v7(), produto_id, titulo: input.titulo, conteudo: input.conteudo,
                ordem: position(input.ordem, i), ativo: input.ativo,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    out.sort_by_key(|s| s.ordem);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_set_orders_by_position() {
        let pid = Uuid::now_v7();
        let set = message_set(pid, vec![
            PixMessageInput { texto: "Abra o app do banco".into(), ordem: None },
            PixMessageInput { texto: "Copie o código".into(), ordem: Some(-1) },
        ]).unwrap();
        assert_eq!(set[0].texto, "Copie o código");
        assert_eq!(set[1].ordem, 0);
        assert!(set.iter().all(|m| m.produto_id == pid));
    }

    #[test]
    fn test_section_set_rejects_empty_title() {
        let err = section_set(Uuid::now_v7(), vec![PixSectionInput { titulo: "".into(), conteudo: "x".into(), ordem: None, ativo: true }]);
        assert!(err.is_err());
    }
}
