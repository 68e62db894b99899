use serde::{Deserialize, Serialize};
use std::fmt;

use super::UnknownVariant;

/// Outcome shown to the shopper after paying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Analyzing,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [Self::Analyzing, Self::Approved, Self::Rejected];

    /// Strict parse; `None` for anything outside the three known values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "analyzing" => Some(Self::Analyzing),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Lenient resolution for URL parameters and stored settings: unknown,
    /// empty or missing values fall back to `Analyzing`.
    pub fn resolve(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self { Self::Analyzing => "analyzing", Self::Approved => "approved", Self::Rejected => "rejected" }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(UnknownVariant { kind: "status", value })
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_pass_through() {
        for status in PaymentStatus::ALL {
            assert_eq!(PaymentStatus::resolve(Some(status.as_str())), status);
        }
    }

    #[test]
    fn test_unknown_values_fall_back_to_analyzing() {
        assert_eq!(PaymentStatus::resolve(None), PaymentStatus::Analyzing);
        assert_eq!(PaymentStatus::resolve(Some("")), PaymentStatus::Analyzing);
        assert_eq!(PaymentStatus::resolve(Some("APPROVED")), PaymentStatus::Analyzing);
        assert_eq!(PaymentStatus::resolve(Some("paid")), PaymentStatus::Analyzing);
        assert_eq!(PaymentStatus::parse("paid"), None);
    }

    #[test]
    fn test_stored_values_decode_strictly() {
        assert_eq!(PaymentStatus::try_from("approved".to_string()), Ok(PaymentStatus::Approved));
        let err = PaymentStatus::try_from("pago".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "valor inválido para status: 'pago'");
    }
}
