//! Field normalization for scraped listing data.
//!
//! Pure functions that canonicalize raw phone strings, infer a pincode from a
//! free-form address, and derive the identity-normalized forms used as dedup
//! keys. Nothing here touches I/O.

use crate::error::{LeadscanError, Result};
use crate::types::{NOT_AVAILABLE, NOT_FOUND};
use once_cell::sync::Lazy;
use regex::Regex;

/// Number of digits in a canonical phone number.
pub const PHONE_DIGITS: usize = 10;

/// Leading digits accepted by the default pincode matcher (Karnataka circle).
pub const DEFAULT_PINCODE_PREFIXES: &str = "5";

static DEFAULT_MATCHER: Lazy<PincodeMatcher> = Lazy::new(|| {
    PincodeMatcher::new(DEFAULT_PINCODE_PREFIXES).expect("default pincode prefixes are valid")
});

/// Canonicalize a raw phone string.
///
/// Strips every non-digit character. Returns an empty string for empty or
/// sentinel input, the last 10 digits when at least 10 remain, and otherwise
/// whatever digits are left. A result shorter than 10 digits is never a valid
/// contact number.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NOT_FOUND || trimmed == NOT_AVAILABLE {
        return String::new();
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    last_ten(digits)
}

/// Keep the trailing [`PHONE_DIGITS`] digits of an all-digit string.
pub(crate) fn last_ten(digits: String) -> String {
    if digits.len() >= PHONE_DIGITS {
        digits[digits.len() - PHONE_DIGITS..].to_string()
    } else {
        digits
    }
}

/// Whether `value` is exactly a 10-digit phone number.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    value.len() == PHONE_DIGITS && value.chars().all(|c| c.is_ascii_digit())
}

/// Infer a pincode from `address` with the default region prefixes,
/// falling back to `fallback` when none is present.
#[must_use]
pub fn extract_pincode(address: &str, fallback: &str) -> String {
    DEFAULT_MATCHER.extract(address, fallback)
}

/// Matches 6-digit postal codes whose first digit is in a restricted set.
#[derive(Debug, Clone)]
pub struct PincodeMatcher {
    prefixes: String,
    pattern: Regex,
}

impl PincodeMatcher {
    /// Build a matcher accepting pincodes that begin with any digit in `prefixes`.
    ///
    /// # Errors
    /// Returns a validation error if `prefixes` is empty or contains a
    /// character other than `1`-`9`.
    pub fn new(prefixes: &str) -> Result<Self> {
        if prefixes.is_empty() || !prefixes.chars().all(|c| ('1'..='9').contains(&c)) {
            return Err(LeadscanError::Validation(format!(
                "pincode prefixes must be digits 1-9, got '{prefixes}'"
            )));
        }

        let pattern = Regex::new(&format!(r"\b([{prefixes}]\d{{5}})\b"))
            .map_err(|e| LeadscanError::Validation(format!("invalid pincode pattern: {e}")))?;

        Ok(Self {
            prefixes: prefixes.to_string(),
            pattern,
        })
    }

    /// The accepted leading digits.
    #[must_use]
    pub fn prefixes(&self) -> &str {
        &self.prefixes
    }

    /// Find the first matching pincode in `address`.
    #[must_use]
    pub fn find<'a>(&self, address: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(address)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// The first matching pincode in `address`, or `fallback` unchanged.
    #[must_use]
    pub fn extract(&self, address: &str, fallback: &str) -> String {
        self.find(address).unwrap_or(fallback).to_string()
    }
}

impl Default for PincodeMatcher {
    fn default() -> Self {
        DEFAULT_MATCHER.clone()
    }
}

/// Derive the location segment of an address: everything before the first comma.
#[must_use]
pub fn location_from_address(address: &str) -> String {
    let location = address.split(',').next().unwrap_or_default().trim();
    if location.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        location.to_string()
    }
}

/// Identity form of a business name: trimmed, lowercased, inner whitespace collapsed.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_keeps_last_ten() {
        assert_eq!(normalize_phone("919876543210"), "9876543210");
        assert_eq!(normalize_phone("9876543210"), "9876543210");
        assert_eq!(normalize_phone("00919876543210"), "9876543210");
    }

    #[test]
    fn test_normalize_phone_strips_formatting() {
        assert_eq!(normalize_phone("Phone: +91 98765 43210 "), "9876543210");
        assert_eq!(normalize_phone("(0820) 252-0000"), "8202520000");
    }

    #[test]
    fn test_normalize_phone_preserves_short_runs() {
        assert_eq!(normalize_phone("ext 2520"), "2520");
        assert_eq!(normalize_phone("0820-25200"), "082025200");
        assert!(!is_valid_phone(&normalize_phone("0820-25200")));
    }

    #[test]
    fn test_normalize_phone_placeholders() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("   "), "");
        assert_eq!(normalize_phone("Not Found"), "");
        assert_eq!(normalize_phone("N/A"), "");
        assert_eq!(normalize_phone("no digits here"), "");
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("9876543210"));
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone("98765 4321"));
        assert!(!is_valid_phone("Not Found"));
    }

    #[test]
    fn test_extract_pincode_from_address() {
        assert_eq!(extract_pincode("Main Rd, Udupi 576102", "576101"), "576102");
        assert_eq!(
            extract_pincode("Shop 4, Manipal-576104, Karnataka", "576101"),
            "576104"
        );
    }

    #[test]
    fn test_extract_pincode_fallback() {
        assert_eq!(extract_pincode("Main Rd, Udupi", "576101"), "576101");
        // Wrong region prefix
        assert_eq!(extract_pincode("MG Road, Mumbai 400001", "576101"), "576101");
        // Seven digits is not a pincode
        assert_eq!(extract_pincode("Plot 5761023", "576101"), "576101");
        assert_eq!(extract_pincode("", "576101"), "576101");
    }

    #[test]
    fn test_custom_prefixes() {
        let matcher = PincodeMatcher::new("14").expect("prefixes 14 are valid");
        assert_eq!(matcher.prefixes(), "14");
        assert_eq!(matcher.extract("MG Road, Mumbai 400001", "x"), "400001");
        assert_eq!(matcher.extract("Udupi 576102", "x"), "x");
    }

    #[test]
    fn test_invalid_prefixes() {
        assert!(PincodeMatcher::new("").is_err());
        assert!(PincodeMatcher::new("0").is_err());
        assert!(PincodeMatcher::new("5a").is_err());
    }

    #[test]
    fn test_location_from_address() {
        assert_eq!(location_from_address("Main Rd, Udupi 576102"), "Main Rd");
        assert_eq!(location_from_address("Udupi"), "Udupi");
        assert_eq!(location_from_address(" , Udupi"), NOT_AVAILABLE);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Sri  Ganesh Bakery "), "sri ganesh bakery");
        assert_eq!(normalize_name("SRI GANESH BAKERY"), "sri ganesh bakery");
    }
}
