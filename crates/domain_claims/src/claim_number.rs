//! Claim numbers
//!
//! Format: `PREFIX-YYYYMMDD-XXXXXXXX`, where the suffix is eight upper-case
//! alphanumeric characters drawn from a random v4 UUID.

use chrono::NaiveDate;
use uuid::Uuid;

const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 8;

/// Generates a claim number for a claim created on `date`
pub fn generate_claim_number(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), random_suffix())
}

/// Returns true if `value` has the claim number shape for `prefix`
pub fn is_well_formed_claim_number(value: &str, prefix: &str) -> bool {
    let mut parts = value.splitn(3, '-');
    let (Some(head), Some(date), Some(suffix)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    head == prefix
        && date.len() == 8
        && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
        && suffix.len() == SUFFIX_LEN
        && suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b))
}

fn random_suffix() -> String {
    // The low bits of a v4 UUID are all random; the fixed version and
    // variant bits sit well above the ~42 bits consumed here.
    let mut bits = Uuid::new_v4().as_u128();
    (0..SUFFIX_LEN)
        .map(|_| {
            let digit = (bits % 36) as usize;
            bits /= 36;
            SUFFIX_ALPHABET[digit] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_number_is_well_formed() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let number = generate_claim_number("CLM", date);

        assert!(number.starts_with("CLM-20250301-"));
        assert_eq!(number.len(), "CLM-20250301-".len() + 8);
        assert!(is_well_formed_claim_number(&number, "CLM"));
    }

    #[test]
    fn test_numbers_differ() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let numbers: HashSet<String> = (0..500).map(|_| generate_claim_number("CLM", date)).collect();
        assert_eq!(numbers.len(), 500);
    }

    #[test]
    fn test_malformed_numbers() {
        assert!(!is_well_formed_claim_number("CLM-20250301-ab12cd34", "CLM"));
        assert!(!is_well_formed_claim_number("CLM-20251301-AB12CD34", "CLM"));
        assert!(!is_well_formed_claim_number("CLM-20250301-AB12CD3", "CLM"));
        assert!(!is_well_formed_claim_number("INV-20250301-AB12CD34", "CLM"));
        assert!(!is_well_formed_claim_number("CLM20250301AB12CD34", "CLM"));
    }
}
