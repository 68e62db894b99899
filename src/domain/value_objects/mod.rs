//! Value Objects for the checkout

pub mod card;
pub mod format;
pub mod status;

pub use card::{CardBrand, MaskedCard};
pub use status::PaymentStatus;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL slug value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    /// Builds a slug from a product name, folding Portuguese accents to ASCII.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_dash = false;
        for c in name.chars().flat_map(char::to_lowercase) {
            let c = fold_accent(c);
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() { out.push('-'); }
                pending_dash = false;
                out.push(c);
            } else {
                pending_dash = true;
            }
        }
        if out.is_empty() { return Err(SlugError::Empty); }
        if out.len() > 120 { return Err(SlugError::TooLong); }
        Ok(Self(out))
    }

    /// Accepts an already formed slug, normalizing it the same way.
    pub fn parse(value: &str) -> Result<Self, SlugError> { Self::from_name(value) }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_inner(self) -> String { self.0 }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SlugError { Empty, TooLong }
impl std::error::Error for SlugError {}
impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "slug vazio"), Self::TooLong => write!(f, "slug muito longo") }
    }
}

/// A stored TEXT column held a value outside its enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("valor inválido para {kind}: '{value}'")]
pub struct UnknownVariant { pub kind: &'static str, pub value: String }

/// Money value object. Amounts are always in BRL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Largest amount a `NUMERIC(12, 2)` column holds.
    pub const MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

    pub fn brl(amount: Decimal) -> Self { Self(amount) }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn add(&self, other: &Money) -> Money { Money(self.0.saturating_add(other.0)) }
    pub fn is_positive(&self) -> bool { self.0 > Decimal::ZERO }

    /// Divides into `parts` equal shares rounded to cents. Zero parts yields zero.
    pub fn split(&self, parts: u32) -> Money {
        if parts == 0 { return Money::zero(); }
        Money((self.0 / Decimal::from(parts)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self { iter.fold(Money::zero(), |acc, m| acc.add(&m)) }
}

/// Renders in pt-BR currency format: `R$ 1.234,50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let reais = rounded.abs().trunc().normalize().to_string();
        let cents = (rounded.abs().fract() * Decimal::ONE_HUNDRED).to_u32().unwrap_or(0);
        let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
        for (i, digit) in reais.chars().enumerate() {
            if i > 0 && (reais.len() - i) % 3 == 0 { grouped.push('.'); }
            grouped.push(digit);
        }
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        write!(f, "{}R$ {},{:02}", sign, grouped, cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(Slug::from_name("Curso de Inglês Avançado").unwrap().as_str(), "curso-de-ingles-avancado");
        assert_eq!(Slug::from_name("  --E-book: Ação!! ").unwrap().as_str(), "e-book-acao");
        assert_eq!(Slug::from_name("!!!"), Err(SlugError::Empty));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::brl(Decimal::new(12345, 1)).to_string(), "R$ 1.234,50");
        assert_eq!(Money::brl(Decimal::new(1234567891, 2)).to_string(), "R$ 12.345.678,91");
        assert_eq!(Money::brl(Decimal::ZERO).to_string(), "R$ 0,00");
        assert_eq!(Money::brl(Decimal::new(999, 3)).to_string(), "R$ 1,00");
        assert_eq!(Money::brl(Decimal::new(-100, 2)).to_string(), "-R$ 1,00");
        assert_eq!(Money::brl(Decimal::new(100, 0)).to_string(), "R$ 100,00");
        assert_eq!(Money::brl(Money::MAX).to_string(), "R$ 9.999.999.999,99");
    }

    #[test]
    fn test_money_extremes_do_not_overflow() {
        assert_eq!(Money::MAX, Decimal::new(999_999_999_999, 2));
        assert_eq!(Money::brl(Decimal::MAX).to_string(), "R$ 79.228.162.514.264.337.593.543.950.335,00");
        assert_eq!(Money::brl(Decimal::MAX).add(&Money::brl(Decimal::ONE)).amount(), Decimal::MAX);
    }

    #[test]
    fn test_money_sum_and_split() {
        let total: Money = [Money::brl(Decimal::new(1050, 2)), Money::brl(Decimal::new(950, 2))].into_iter().sum();
        assert_eq!(total.amount(), Decimal::new(20, 0));
        assert_eq!(Money::brl(Decimal::new(100, 0)).split(3).amount(), Decimal::new(3333, 2));
        assert_eq!(Money::brl(Decimal::new(100, 0)).split(0), Money::zero());
    }
}
