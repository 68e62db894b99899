//! Input masks for the identification and card forms.
//!
//! Each formatter strips everything but digits, truncates to the field's
//! maximum length and re-applies punctuation for the digit count reached so
//! far, so feeding a formatter its own output returns it unchanged.

use validator::ValidationError;

pub fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn truncated(value: &str, max: usize) -> String {
    let mut d = digits(value);
    d.truncate(max);
    d
}

/// `(##) ####-####` for landlines, `(##) #####-####` for 11-digit mobiles.
pub fn format_phone(value: &str) -> String {
    let d = truncated(value, 11);
    match d.len() {
        0 => String::new(),
        1..=2 => format!("({}", d),
        3..=6 => format!("({}) {}", &d[..2], &d[2..]),
        7..=10 => format!("({}) {}-{}", &d[..2], &d[2..6], &d[6..]),
        _ => format!("({}) {}-{}", &d[..2], &d[2..7], &d[7..]),
    }
}

/// `###.###.###-##`
pub fn format_cpf(value: &str) -> String {
    let d = truncated(value, 11);
    match d.len() {
        0..=3 => d,
        4..=6 => format!("{}.{}", &d[..3], &d[3..]),
        7..=9 => format!("{}.{}.{}", &d[..3], &d[3..6], &d[6..]),
        _ => format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..]),
    }
}

/// Groups of four digits separated by spaces, up to 16 digits.
pub fn format_card_number(value: &str) -> String {
    let d = truncated(value, 16);
    d.as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `MM/YY`
pub fn format_expiry(value: &str) -> String {
    let d = truncated(value, 4);
    if d.len() <= 2 { d } else { format!("{}/{}", &d[..2], &d[2..]) }
}

/// Checks the two CPF verification digits. Repeated-digit sequences are rejected.
pub fn cpf_is_valid(value: &str) -> bool {
    let d: Vec<u32> = digits(value).bytes().map(|b| u32::from(b - b'0')).collect();
    if d.len() != 11 || d.iter().all(|x| *x == d[0]) { return false; }
    let check = |len: usize| {
        let sum: u32 = d[..len].iter().enumerate().map(|(i, x)| x * (len as u32 + 1 - i as u32)).sum();
        let rest = (sum * 10) % 11;
        if rest == 10 { 0 } else { rest }
    };
    check(9) == d[9] && check(10) == d[10]
}

pub fn validate_cpf(value: &str) -> Result<(), ValidationError> {
    if cpf_is_valid(value) { Ok(()) } else { Err(ValidationError::new("cpf_invalido")) }
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    match digits(value).len() {
        10 | 11 => Ok(()),
        _ => Err(ValidationError::new("telefone_invalido")),
    }
}

/// Accepts `MM/YY` (or four digits) with a month between 01 and 12.
pub fn validate_expiry(value: &str) -> Result<(), ValidationError> {
    let d = digits(value);
    let month: u32 = d.get(..2).and_then(|m| m.parse().ok()).unwrap_or(0);
    if d.len() == 4 && (1..=12).contains(&month) { Ok(()) } else { Err(ValidationError::new("validade_invalida")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_boundaries() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("1"), "(1");
        assert_eq!(format_phone("11"), "(11");
        assert_eq!(format_phone("119"), "(11) 9");
        assert_eq!(format_phone("119876"), "(11) 9876");
        assert_eq!(format_phone("1198765"), "(11) 9876-5");
        assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("119876543210000"), "(11) 98765-4321");
    }

    #[test]
    fn test_phone_idempotent() {
        for raw in ["11", "119876", "1133334444", "11987654321"] {
            let once = format_phone(raw);
            assert_eq!(format_phone(&once), once);
        }
    }

    #[test]
    fn test_cpf_boundaries_and_idempotence() {
        assert_eq!(format_cpf("123"), "123");
        assert_eq!(format_cpf("1234"), "123.4");
        assert_eq!(format_cpf("1234567"), "123.456.7");
        assert_eq!(format_cpf("1234567890"), "123.456.789-0");
        assert_eq!(format_cpf("12345678909"), "123.456.789-09");
        assert_eq!(format_cpf("123.456.789-09"), "123.456.789-09");
    }

    #[test]
    fn test_card_and_expiry() {
        assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("41111"), "4111 1");
        assert_eq!(format_card_number("4111 1111 1111 1111"), "4111 1111 1111 1111");
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("1228"), "12/28");
        assert_eq!(format_expiry("12/28"), "12/28");
    }

    #[test]
    fn test_cpf_validation() {
        assert!(cpf_is_valid("529.982.247-25"));
        assert!(cpf_is_valid("12345678909"));
        assert!(!cpf_is_valid("529.982.247-26"));
        assert!(!cpf_is_valid("111.111.111-11"));
        assert!(!cpf_is_valid("1234"));
    }

    #[test]
    fn test_field_validators() {
        assert!(validate_phone("(11) 98765-4321").is_ok());
        assert!(validate_phone("98765-4321").is_err());
        assert!(validate_expiry("12/28").is_ok());
        assert!(validate_expiry("13/28").is_err());
        assert!(validate_expiry("1/28").is_err());
    }
}
