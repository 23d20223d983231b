//! Input validation utilities

use std::sync::LazyLock;

use regex::Regex;

use crate::constants;

static CURRENCY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"));

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid slug regex"));

static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid separator regex"));

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < constants::MIN_PASSWORD_LENGTH as usize {
        return Err("Password must be at least 8 characters");
    }
    if password.len() > constants::MAX_PASSWORD_LENGTH as usize {
        return Err("Password must be at most 128 characters");
    }
    if !password.chars().any(|c| c.is_alphabetic()) || !password.chars().any(|c| c.is_numeric()) {
        return Err("Password must contain letters and numbers");
    }
    Ok(())
}

/// Validate feedback language
pub fn validate_language(language: &str) -> Result<(), &'static str> {
    if language.is_empty() || constants::languages::ALL.contains(&language) {
        Ok(())
    } else {
        Err("Unsupported feedback language")
    }
}

/// ISO 4217 style three-letter code
pub fn validate_currency(code: &str) -> Result<(), &'static str> {
    if CURRENCY_CODE.is_match(code) {
        Ok(())
    } else {
        Err("Currency must be a three-letter upper-case code")
    }
}

/// Validate user role
pub fn validate_role(role: &str) -> Result<(), &'static str> {
    if constants::roles::ALL.contains(&role) {
        Ok(())
    } else {
        Err("Invalid role")
    }
}

/// Lower-cased, hyphen separated slug; unicode letters are kept
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lowered, "");
    SLUG_SEPARATORS
        .replace_all(&cleaned, "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}

/// Sanitize string input (remove control characters, trim whitespace)
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password123").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("nodigitshere").is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("PLN").is_ok());
        assert!(validate_currency("pln").is_err());
        assert!(validate_currency("EURO").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Mead Cup 2025"), "mead-cup-2025");
        assert_eq!(slugify("  Miód pitny: Trójniak! "), "miód-pitny-trójniak");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn test_validate_language() {
        assert!(validate_language("pl").is_ok());
        assert!(validate_language("").is_ok());
        assert!(validate_language("de").is_err());
    }
}
