use crate::config::OracleSettings;
use crate::core::cancel::{CancellationToken, Checkpoint, Uninterruptible};
use crate::core::lucas;
use crate::core::miller_rabin::{self, MillerRabin, DETERMINISTIC_BASE_COUNT, DETERMINISTIC_BOUND};
use crate::core::parse::{self, ParseRejection};
use crate::core::sieve::{self, TrialOutcome};
use crate::domain::model::{
    CandidateNumber, Certainty, Classification, DomainReason, PrimalityVerdict,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use std::sync::Arc;

/// Staged primality engine: parse, domain checks, trial division, witness tests.
///
/// Immutable once built; the prime tables are shared between clones, so one
/// oracle can serve any number of threads.
#[derive(Debug, Clone)]
pub struct PrimalityOracle {
    settings: OracleSettings,
    small_primes: Arc<[u32]>,
    witnesses: Arc<[u32]>,
}

impl Default for PrimalityOracle {
    fn default() -> Self {
        Self::build(OracleSettings::default())
    }
}

impl PrimalityOracle {
    pub fn new(settings: OracleSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(OracleSettings::from_provider(config))
    }

    fn build(settings: OracleSettings) -> Self {
        let small_primes = sieve::primes_below(settings.small_prime_limit);
        let witness_count = (settings.witness_rounds as usize).max(DETERMINISTIC_BASE_COUNT);
        let witnesses = sieve::first_primes(witness_count);

        tracing::debug!(
            table_size = small_primes.len(),
            witnesses = witnesses.len(),
            max_digits = settings.max_digits,
            "Primality oracle ready"
        );

        Self {
            settings,
            small_primes: small_primes.into(),
            witnesses: witnesses.into(),
        }
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    pub fn classify(&self, input: &str) -> PrimalityVerdict {
        self.examine(input).verdict
    }

    /// Like [`classify`](Self::classify), keeping the parsed candidate for rendering.
    pub fn examine(&self, input: &str) -> Classification {
        match self.run(input, &Uninterruptible) {
            Ok(classification) => classification,
            Err(never) => match never {},
        }
    }

    /// Stops with [`OracleError::Cancelled`](crate::OracleError::Cancelled) once `token` is cancelled.
    pub fn classify_cancellable(
        &self,
        input: &str,
        token: &CancellationToken,
    ) -> Result<PrimalityVerdict> {
        Ok(self.examine_cancellable(input, token)?.verdict)
    }

    pub fn examine_cancellable(
        &self,
        input: &str,
        token: &CancellationToken,
    ) -> Result<Classification> {
        self.run(input, token)
    }

    fn run<C: Checkpoint>(&self, input: &str, checkpoint: &C) -> std::result::Result<Classification, C::Error> {
        let parsed = match parse::parse_input(input, self.settings.allow_separators) {
            Ok(parsed) => parsed,
            Err(rejection) => {
                tracing::debug!(
                    input_len = input.len(),
                    empty = rejection == ParseRejection::Empty,
                    "Input is not a number"
                );
                return Ok(Classification::new(PrimalityVerdict::NotANumber));
            }
        };

        if parsed.is_negative() && !parsed.is_zero() {
            return Ok(Classification::new(PrimalityVerdict::OutOfDomain(
                DomainReason::Negative,
            )));
        }

        if parsed.digit_count() > self.settings.max_digits {
            tracing::debug!(
                digits = parsed.digit_count(),
                max_digits = self.settings.max_digits,
                "Candidate exceeds digit limit"
            );
            return Ok(Classification::new(PrimalityVerdict::TooLarge));
        }

        let magnitude = match parsed.magnitude() {
            Some(magnitude) => magnitude,
            None => return Ok(Classification::new(PrimalityVerdict::NotANumber)),
        };
        let candidate = CandidateNumber::from_magnitude(false, magnitude);

        if *candidate.magnitude() <= BigUint::one() {
            return Ok(Classification::with_candidate(
                candidate,
                PrimalityVerdict::OutOfDomain(DomainReason::NotGreaterThanOne),
            ));
        }

        let verdict = self.decide(candidate.magnitude(), checkpoint)?;
        tracing::debug!(
            digits = parsed.digit_count(),
            verdict = verdict.kind(),
            "Classified candidate"
        );
        Ok(Classification::with_candidate(candidate, verdict))
    }

    fn decide<C: Checkpoint>(&self, n: &BigUint, checkpoint: &C) -> std::result::Result<PrimalityVerdict, C::Error> {
        if let Some(small) = n.to_u64() {
            return self.decide_u64(small, checkpoint);
        }

        if let Some(p) = sieve::trial_divide(n, &self.small_primes, checkpoint)? {
            return Ok(PrimalityVerdict::Composite {
                factor: Some(BigUint::from(p)),
            });
        }

        let test = MillerRabin::new(n);

        if *n < BigUint::from(DETERMINISTIC_BOUND) {
            for &base in &self.witnesses[..DETERMINISTIC_BASE_COUNT] {
                checkpoint.poll()?;
                if !test.passes(base) {
                    return Ok(PrimalityVerdict::Composite { factor: None });
                }
            }
            return Ok(PrimalityVerdict::Prime {
                certainty: Certainty::Deterministic,
            });
        }

        let rounds = self.settings.witness_rounds;
        for (round, &base) in self.witnesses[..rounds as usize].iter().enumerate() {
            checkpoint.poll()?;
            if !test.passes(base) {
                tracing::debug!(round, base, "Miller-Rabin witness found");
                return Ok(PrimalityVerdict::Composite { factor: None });
            }
        }

        if self.settings.strong_lucas && !lucas::is_strong_lucas_probable_prime(n, checkpoint)? {
            tracing::debug!(bits = n.bits(), "Strong Lucas test rejected candidate");
            return Ok(PrimalityVerdict::Composite { factor: None });
        }

        Ok(PrimalityVerdict::Prime {
            certainty: Certainty::Probabilistic { rounds },
        })
    }

    fn decide_u64<C: Checkpoint>(&self, n: u64, checkpoint: &C) -> std::result::Result<PrimalityVerdict, C::Error> {
        let verdict = match sieve::trial_divide_u64(n, &self.small_primes, checkpoint)? {
            TrialOutcome::Prime => PrimalityVerdict::Prime {
                certainty: Certainty::Deterministic,
            },
            TrialOutcome::Factor(p) => PrimalityVerdict::Composite {
                factor: Some(BigUint::from(p)),
            },
            TrialOutcome::Inconclusive => {
                checkpoint.poll()?;
                if miller_rabin::is_prime_u64(n) {
                    PrimalityVerdict::Prime {
                        certainty: Certainty::Deterministic,
                    }
                } else {
                    PrimalityVerdict::Composite { factor: None }
                }
            }
        };
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::OracleError;

    fn oracle() -> PrimalityOracle {
        PrimalityOracle::default()
    }

    fn deterministic_prime() -> PrimalityVerdict {
        PrimalityVerdict::Prime {
            certainty: Certainty::Deterministic,
        }
    }

    #[test]
    fn test_table_primes_are_prime() {
        let oracle = oracle();
        for n in ["2", "3", "7", "97", "7919"] {
            assert_eq!(oracle.classify(n), deterministic_prime(), "{}", n);
        }
    }

    #[test]
    fn test_small_composites_report_smallest_factor() {
        let oracle = oracle();
        let factor = |n: &str| match oracle.classify(n) {
            PrimalityVerdict::Composite { factor } => factor,
            other => panic!("{} classified as {:?}", n, other),
        };
        assert_eq!(factor("4"), Some(BigUint::from(2u32)));
        assert_eq!(factor("100"), Some(BigUint::from(2u32)));
        assert_eq!(factor("91"), Some(BigUint::from(7u32)));
        assert_eq!(factor("561"), Some(BigUint::from(3u32)));
    }

    #[test]
    fn test_u64_candidates_past_the_table() {
        let oracle = oracle();
        // 2^61 - 1
        assert_eq!(oracle.classify("2305843009213693951"), deterministic_prime());
        // 10007 * 10009, both just past the default table
        assert_eq!(
            oracle.classify("100160063"),
            PrimalityVerdict::Composite { factor: None }
        );
    }

    #[test]
    fn test_deterministic_range_above_u64() {
        let oracle = oracle();
        // 2^64 + 13, the first prime past u64
        assert_eq!(oracle.classify("18446744073709551629"), deterministic_prime());
        // Strong pseudoprime to the first twelve prime bases.
        assert_eq!(
            oracle.classify("318665857834031151167461"),
            PrimalityVerdict::Composite { factor: None }
        );
    }

    #[test]
    fn test_probabilistic_range() {
        let oracle = oracle();
        let m127 = "170141183460469231731687303715884105727";
        assert_eq!(
            oracle.classify(m127),
            PrimalityVerdict::Prime {
                certainty: Certainty::Probabilistic { rounds: 64 }
            }
        );
    }

    #[test]
    fn test_bound_pseudoprime_is_caught() {
        let oracle = oracle();
        assert_eq!(
            oracle.classify("3317044064679887385961981"),
            PrimalityVerdict::Composite { factor: None }
        );
    }

    #[test]
    fn test_parse_and_domain_outcomes() {
        let oracle = oracle();
        assert_eq!(oracle.classify(""), PrimalityVerdict::NotANumber);
        assert_eq!(oracle.classify("abc"), PrimalityVerdict::NotANumber);
        assert_eq!(oracle.classify("12.5"), PrimalityVerdict::NotANumber);
        assert_eq!(
            oracle.classify("0"),
            PrimalityVerdict::OutOfDomain(DomainReason::NotGreaterThanOne)
        );
        assert_eq!(
            oracle.classify("1"),
            PrimalityVerdict::OutOfDomain(DomainReason::NotGreaterThanOne)
        );
        assert_eq!(
            oracle.classify("-7"),
            PrimalityVerdict::OutOfDomain(DomainReason::Negative)
        );
        assert_eq!(
            oracle.classify("-0"),
            PrimalityVerdict::OutOfDomain(DomainReason::NotGreaterThanOne)
        );
    }

    #[test]
    fn test_digit_limit_counts_significant_digits() {
        let oracle = PrimalityOracle::new(OracleSettings::default().with_max_digits(5)).unwrap();
        assert_eq!(oracle.classify("123456"), PrimalityVerdict::TooLarge);
        assert_eq!(oracle.classify("0000012347"), deterministic_prime());
    }

    #[test]
    fn test_examine_keeps_canonical_candidate() {
        let classification = oracle().examine("  +00091 ");
        assert_eq!(
            classification.candidate.map(|c| c.to_string()),
            Some("91".to_string())
        );
        assert_eq!(
            oracle().examine("+0097").render(),
            "97 is prime."
        );
    }

    #[test]
    fn test_cancelled_token_stops_classification() {
        let token = CancellationToken::new();
        token.cancel();
        let result = oracle().classify_cancellable("170141183460469231731687303715884105727", &token);
        assert!(matches!(result, Err(OracleError::Cancelled)));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let settings = OracleSettings::default().with_witness_rounds(0);
        assert!(PrimalityOracle::new(settings).is_err());
    }
}
