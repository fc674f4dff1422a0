use crate::utils::error::Result;
use num_bigint::{BigInt, BigUint, Sign};
use serde::Serialize;
use std::fmt;

/// An exact, signed integer read from user text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateNumber(BigInt);

impl CandidateNumber {
    pub fn from_magnitude(negative: bool, magnitude: BigUint) -> Self {
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Self(BigInt::from_biguint(sign, magnitude))
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    pub fn magnitude(&self) -> &BigUint {
        self.0.magnitude()
    }
}

impl fmt::Display for CandidateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Certainty {
    /// Settled by trial division or by a base set proven for the candidate's range.
    Deterministic,
    /// Passed `rounds` Miller-Rabin witnesses (plus the Lucas test when enabled).
    Probabilistic { rounds: u32 },
}

impl fmt::Display for Certainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Certainty::Deterministic => write!(f, "deterministic"),
            Certainty::Probabilistic { rounds } => {
                write!(f, "probabilistic ({} rounds)", rounds)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainReason {
    NotGreaterThanOne,
    Negative,
}

impl DomainReason {
    pub fn message(&self) -> &'static str {
        match self {
            DomainReason::NotGreaterThanOne => "Number must be greater than 1.",
            DomainReason::Negative => "Negative numbers cannot be prime.",
        }
    }
}

impl fmt::Display for DomainReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainReason::NotGreaterThanOne => write!(f, "n <= 1"),
            DomainReason::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimalityVerdict {
    Prime { certainty: Certainty },
    Composite { factor: Option<BigUint> },
    NotANumber,
    OutOfDomain(DomainReason),
    TooLarge,
}

impl PrimalityVerdict {
    pub fn is_prime(&self) -> bool {
        matches!(self, PrimalityVerdict::Prime { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PrimalityVerdict::Prime { .. } => "prime",
            PrimalityVerdict::Composite { .. } => "composite",
            PrimalityVerdict::NotANumber => "not_a_number",
            PrimalityVerdict::OutOfDomain(_) => "out_of_domain",
            PrimalityVerdict::TooLarge => "too_large",
        }
    }

    /// Sentence shown to the user. `number` is the canonical decimal form of the candidate.
    pub fn render(&self, number: &str) -> String {
        match self {
            PrimalityVerdict::Prime { .. } => format!("{} is prime.", number),
            PrimalityVerdict::Composite { factor: Some(f) } => {
                format!("{} is not prime (divisible by {}).", number, f)
            }
            PrimalityVerdict::Composite { factor: None } => format!("{} is not prime.", number),
            PrimalityVerdict::NotANumber => "Please enter a valid number.".to_string(),
            PrimalityVerdict::OutOfDomain(reason) => reason.message().to_string(),
            PrimalityVerdict::TooLarge => "Number is too large to check.".to_string(),
        }
    }
}

/// A verdict together with the parsed candidate, when parsing got that far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub candidate: Option<CandidateNumber>,
    pub verdict: PrimalityVerdict,
}

impl Classification {
    pub fn new(verdict: PrimalityVerdict) -> Self {
        Self {
            candidate: None,
            verdict,
        }
    }

    pub fn with_candidate(candidate: CandidateNumber, verdict: PrimalityVerdict) -> Self {
        Self {
            candidate: Some(candidate),
            verdict,
        }
    }

    pub fn render(&self) -> String {
        let number = self
            .candidate
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default();
        self.verdict.render(&number)
    }
}

/// Machine-readable form of one check, emitted by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictReport {
    pub input: String,
    pub verdict: &'static str,
    pub factor: Option<String>,
    pub certainty: Option<String>,
    pub reason: Option<String>,
    pub message: String,
}

impl VerdictReport {
    pub fn new(input: &str, classification: &Classification) -> Self {
        let verdict = &classification.verdict;
        Self {
            input: input.to_string(),
            verdict: verdict.kind(),
            factor: match verdict {
                PrimalityVerdict::Composite { factor } => factor.as_ref().map(|f| f.to_string()),
                _ => None,
            },
            certainty: match verdict {
                PrimalityVerdict::Prime { certainty } => Some(certainty.to_string()),
                _ => None,
            },
            reason: match verdict {
                PrimalityVerdict::OutOfDomain(reason) => Some(reason.to_string()),
                _ => None,
            },
            message: classification.render(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_messages() {
        let prime = PrimalityVerdict::Prime {
            certainty: Certainty::Deterministic,
        };
        assert_eq!(prime.render("97"), "97 is prime.");

        let with_factor = PrimalityVerdict::Composite {
            factor: Some(BigUint::from(7u32)),
        };
        assert_eq!(with_factor.render("91"), "91 is not prime (divisible by 7).");

        let without_factor = PrimalityVerdict::Composite { factor: None };
        assert_eq!(without_factor.render("91"), "91 is not prime.");

        assert_eq!(
            PrimalityVerdict::NotANumber.render(""),
            "Please enter a valid number."
        );
        assert_eq!(
            PrimalityVerdict::OutOfDomain(DomainReason::NotGreaterThanOne).render("1"),
            "Number must be greater than 1."
        );
        assert_eq!(
            PrimalityVerdict::TooLarge.render(""),
            "Number is too large to check."
        );
    }

    #[test]
    fn test_domain_reason_display() {
        assert_eq!(DomainReason::NotGreaterThanOne.to_string(), "n <= 1");
        assert_eq!(DomainReason::Negative.to_string(), "negative");
    }

    #[test]
    fn test_candidate_display_is_canonical() {
        let candidate = CandidateNumber::from_magnitude(false, BigUint::from(1234u32));
        assert_eq!(candidate.to_string(), "1234");
        assert!(!candidate.is_negative());

        let negative = CandidateNumber::from_magnitude(true, BigUint::from(7u32));
        assert_eq!(negative.to_string(), "-7");
        assert!(negative.is_negative());
        assert_eq!(negative.magnitude(), &BigUint::from(7u32));
    }

    #[test]
    fn test_report_fields() {
        let classification = Classification::with_candidate(
            CandidateNumber::from_magnitude(false, BigUint::from(100u32)),
            PrimalityVerdict::Composite {
                factor: Some(BigUint::from(2u32)),
            },
        );
        let report = VerdictReport::new("100", &classification);
        assert_eq!(report.verdict, "composite");
        assert_eq!(report.factor.as_deref(), Some("2"));
        assert_eq!(report.message, "100 is not prime (divisible by 2).");
    }
}
