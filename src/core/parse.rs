use num_bigint::BigUint;
use regex::Regex;
use std::sync::LazyLock;

static STRICT_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid integer pattern"));

static SEPARATED_INTEGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+(?:[_,][0-9]+)*$").expect("valid separated integer pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRejection {
    Empty,
    Malformed,
}

/// Sign plus significant decimal digits, before any big-integer conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    negative: bool,
    digits: String,
}

impl ParsedInput {
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.digits == "0"
    }

    pub fn digit_count(&self) -> usize {
        self.digits.len()
    }

    pub fn magnitude(&self) -> Option<BigUint> {
        BigUint::parse_bytes(self.digits.as_bytes(), 10)
    }
}

/// Trims, checks the shape of the text and strips sign, separators and leading zeros.
pub fn parse_input(input: &str, allow_separators: bool) -> Result<ParsedInput, ParseRejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseRejection::Empty);
    }

    let pattern = if allow_separators {
        &SEPARATED_INTEGER
    } else {
        &STRICT_INTEGER
    };
    if !pattern.is_match(trimmed) {
        return Err(ParseRejection::Malformed);
    }

    let negative = trimmed.starts_with('-');
    let significant: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit())
        .skip_while(|&c| c == '0')
        .collect();

    let digits = if significant.is_empty() {
        "0".to_string()
    } else {
        significant
    };

    Ok(ParsedInput { negative, digits })
}
