//! Card brand detection and card masking.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::format::digits;
use super::UnknownVariant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand { Visa, Mastercard, Amex, Discover, Jcb, Diners, Elo, Desconhecida }

/// Prefix rules, checked in declaration order. First match wins, so the
/// `65` prefix shared by Discover and Elo resolves to Discover.
static BRAND_PATTERNS: LazyLock<Vec<(CardBrand, Regex)>> = LazyLock::new(|| {
    [
        (CardBrand::Visa, r"^4"),
        (CardBrand::Mastercard, r"^5[1-5]"),
        (CardBrand::Amex, r"^3[47]"),
        (CardBrand::Discover, r"^(6011|65)"),
        (CardBrand::Jcb, r"^(2131|1800|35)"),
        (CardBrand::Diners, r"^(30[0-5]|36|38)"),
        (CardBrand::Elo, r"^6"),
    ]
    .into_iter()
    .filter_map(|(brand, pattern)| Regex::new(pattern).ok().map(|re| (brand, re)))
    .collect()
});

impl CardBrand {
    /// Classifies a card number by prefix. Non-digit characters are ignored.
    pub fn detect(number: &str) -> Self {
        let digits = digits(number);
        BRAND_PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(&digits))
            .map(|(brand, _)| *brand)
            .unwrap_or(CardBrand::Desconhecida)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
            Self::Jcb => "jcb",
            Self::Diners => "diners",
            Self::Elo => "elo",
            Self::Desconhecida => "desconhecida",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "visa" => Some(Self::Visa),
            "mastercard" => Some(Self::Mastercard),
            "amex" => Some(Self::Amex),
            "discover" => Some(Self::Discover),
            "jcb" => Some(Self::Jcb),
            "diners" => Some(Self::Diners),
            "elo" => Some(Self::Elo),
            "desconhecida" => Some(Self::Desconhecida),
            _ => None,
        }
    }
}

impl TryFrom<String> for CardBrand {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(UnknownVariant { kind: "bandeira", value })
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// What is kept of a card once the number leaves the request: brand and last four digits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MaskedCard {
    pub brand: CardBrand,
    pub last_four: String,
}

impl MaskedCard {
    pub fn from_number(number: &str) -> Result<Self, CardNumberError> {
        let digits = digits(number);
        if digits.len() < 13 || digits.len() > 19 { return Err(CardNumberError::Length(digits.len())); }
        if !luhn_valid(&digits) { return Err(CardNumberError::Checksum); }
        Ok(Self { brand: CardBrand::detect(&digits), last_four: digits[digits.len() - 4..].to_string() })
    }

    /// `**** **** **** 1234`
    pub fn display(&self) -> String { format!("**** **** **** {}", self.last_four) }
}

fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 { if d * 2 > 9 { d * 2 - 9 } else { d * 2 } } else { d }
        })
        .sum();
    sum % 10 == 0
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CardNumberError { Length(usize), Checksum }
impl std::error::Error for CardNumberError {}
impl fmt::Display for CardNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(n) => write!(f, "número de cartão com {} dígitos", n),
            Self::Checksum => write!(f, "número de cartão inválido"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_prefix() {
        assert_eq!(CardBrand::detect("4111111111111111"), CardBrand::Visa);
        assert_eq!(CardBrand::detect("4"), CardBrand::Visa);
        for p in ["51", "52", "53", "54", "55"] {
            assert_eq!(CardBrand::detect(&format!("{}00000000000000", p)), CardBrand::Mastercard);
        }
        assert_eq!(CardBrand::detect("5600000000000000"), CardBrand::Desconhecida);
        assert_eq!(CardBrand::detect("340000000000000"), CardBrand::Amex);
        assert_eq!(CardBrand::detect("370000000000000"), CardBrand::Amex);
        assert_eq!(CardBrand::detect("6011000000000000"), CardBrand::Discover);
        assert_eq!(CardBrand::detect("3530111333300000"), CardBrand::Jcb);
        assert_eq!(CardBrand::detect("2131000000000000"), CardBrand::Jcb);
        assert_eq!(CardBrand::detect("30500000000000"), CardBrand::Diners);
        assert_eq!(CardBrand::detect("36000000000000"), CardBrand::Diners);
        assert_eq!(CardBrand::detect("38000000000000"), CardBrand::Diners);
        assert_eq!(CardBrand::detect("306000000000000"), CardBrand::Desconhecida);
    }

    #[test]
    fn test_detect_priority_and_fallbacks() {
        // 65 is claimed by Discover before the generic 6 rule.
        assert_eq!(CardBrand::detect("6500000000000000"), CardBrand::Discover);
        assert_eq!(CardBrand::detect("6362970000457013"), CardBrand::Elo);
        assert_eq!(CardBrand::detect("5067000000000000"), CardBrand::Desconhecida);
        assert_eq!(CardBrand::detect(""), CardBrand::Desconhecida);
        assert_eq!(CardBrand::detect("abc"), CardBrand::Desconhecida);
        assert_eq!(CardBrand::detect("4111 1111 1111 1111"), CardBrand::Visa);
    }

    #[test]
    fn test_brand_names_round_trip_through_strings() {
        assert_eq!(serde_json::to_string(&CardBrand::Desconhecida).unwrap(), "\"desconhecida\"");
        assert_eq!(CardBrand::try_from("mastercard".to_string()), Ok(CardBrand::Mastercard));
        assert_eq!(CardBrand::try_from("desconhecida".to_string()), Ok(CardBrand::Desconhecida));
        assert!(CardBrand::try_from("???".to_string()).is_err());
    }

    #[test]
    fn test_masked_card() {
        let card = MaskedCard::from_number("4111 1111 1111 1111").unwrap();
        assert_eq!(card.brand, CardBrand::Visa);
        assert_eq!(card.last_four, "1111");
        assert_eq!(card.display(), "**** **** **** 1111");
        assert_eq!(MaskedCard::from_number("4111 1111 1111 1112"), Err(CardNumberError::Checksum));
        assert_eq!(MaskedCard::from_number("4111"), Err(CardNumberError::Length(4)));
    }
}
