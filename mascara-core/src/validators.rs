// File: mascara-core/src/validators.rs
//! Programmatic validation for the pattern-based PII types.
//!
//! Extraction is deliberately loose; these checks decide whether a candidate
//! is `Verified` (structurally and, for CPF, arithmetically sound) or merely
//! `Suspect`. They never reject a candidate outright.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;

use crate::entity::{Candidate, PiiType, ValidatedEntity, Verdict};

const CPF_LENGTH: usize = 11;

/// Canonical RG layouts: `12.345.678`, `1.234.567-8`, `12.345.678-X`.
static CANONICAL_RG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}\.\d{3}\.\d{3}(?:-[0-9Xx])?$").expect("static RG pattern is valid"));

fn digits_of(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn from_verdict(ok: bool) -> Verdict {
    if ok {
        Verdict::Verified
    } else {
        Verdict::Suspect
    }
}

/// Modulo-11 check digit over `digits`, with weights counting down to 2.
fn mod11_digit(digits: &[u32]) -> u32 {
    let first_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (first_weight - i as u32))
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        dv => dv,
    }
}

/// Computes both CPF check digits from the first nine digits.
///
/// Returns `None` unless `base` has exactly nine elements, each in `0..=9`.
pub fn cpf_check_digits(base: &[u32]) -> Option<(u32, u32)> {
    if base.len() != 9 || base.iter().any(|d| *d > 9) {
        return None;
    }
    let dv1 = mod11_digit(base);
    let mut extended = base.to_vec();
    extended.push(dv1);
    let dv2 = mod11_digit(&extended);
    Some((dv1, dv2))
}

/// True when `cpf` has 11 digits (punctuation ignored), both check digits
/// match, and the digits are not all the same.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits = digits_of(cpf);
    if digits.len() != CPF_LENGTH {
        return false;
    }
    // 000.000.000-00 through 999.999.999-99 pass the arithmetic.
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }
    match cpf_check_digits(&digits[..9]) {
        Some((dv1, dv2)) => dv1 == digits[9] && dv2 == digits[10],
        None => false,
    }
}

pub fn classify_cpf(value: &str) -> Verdict {
    from_verdict(is_valid_cpf(value))
}

/// RG has no national checksum; only the canonical punctuated layouts verify.
pub fn classify_rg(value: &str) -> Verdict {
    from_verdict(CANONICAL_RG.is_match(value))
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

/// Simplified strict address grammar: one `@`, a clean local part and a dotted
/// domain ending in an alphabetic TLD of two or more letters.
pub fn is_strict_email(value: &str) -> bool {
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty()
        || !local.chars().all(is_local_char)
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || !labels.iter().all(|l| is_valid_label(l)) {
        return false;
    }

    let Some(tld) = labels.last() else { return false };
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn classify_email(value: &str) -> Verdict {
    from_verdict(is_strict_email(value))
}

/// Splits a phone into `(area code, subscriber digits)`.
///
/// A parenthesized prefix is always the area code; otherwise the first two
/// digits are taken as area code only when at least ten digits are present.
pub fn split_phone(value: &str) -> (Option<u32>, Vec<u32>) {
    let trimmed = value.trim_start();
    if let Some(rest) = trimmed.strip_prefix('(') {
        if let Some((area, local)) = rest.split_once(')') {
            let area_digits = digits_of(area);
            let area = if area_digits.len() == 2 {
                Some(area_digits[0] * 10 + area_digits[1])
            } else {
                // Malformed area codes are reported as out of range.
                Some(0)
            };
            return (area, digits_of(local));
        }
    }

    let digits = digits_of(value);
    if digits.len() >= 10 {
        let area = digits[0] * 10 + digits[1];
        (Some(area), digits[2..].to_vec())
    } else {
        (None, digits)
    }
}

/// Verified when the subscriber number has 8 or 9 digits (a 9-digit mobile
/// number starts with 9) and the area code, if any, lies in 11..=99.
pub fn classify_telefone(value: &str) -> Verdict {
    let (area, local) = split_phone(value);
    let local_ok = match local.len() {
        8 => true,
        9 => local[0] == 9,
        _ => false,
    };
    let area_ok = area.map_or(true, |a| (11..=99).contains(&a));
    from_verdict(local_ok && area_ok)
}

/// Classifies one value of a pattern-based type. Contextual types have no
/// deterministic check and are reported as `Suspect`.
pub fn classify(pii_type: PiiType, value: &str) -> Verdict {
    match pii_type {
        PiiType::Cpf => classify_cpf(value),
        PiiType::Rg => classify_rg(value),
        PiiType::Email => classify_email(value),
        PiiType::Telefone => classify_telefone(value),
        PiiType::Nome | PiiType::Endereco => Verdict::Suspect,
    }
}

pub fn validate(candidate: Candidate) -> ValidatedEntity {
    let verdict = classify(candidate.pii_type, &candidate.value);
    ValidatedEntity { candidate, verdict }
}
