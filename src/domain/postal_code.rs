// src/domain/postal_code.rs

use regex::Regex;
use std::sync::LazyLock;

/// Dutch postal code: four digits without a leading zero, an optional single
/// space, two letters. Also used as the HTML `pattern` attribute.
pub const POSTAL_CODE_PATTERN: &str = "^[1-9][0-9]{3} ?[A-Za-z]{2}$";

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(POSTAL_CODE_PATTERN).expect("Invalid postal code regex"));

pub fn validate_postal_code(postal_code: &str) -> bool {
    POSTAL_CODE_RE.is_match(postal_code)
}
