use crate::core::cancel::Checkpoint;
use num_bigint::BigUint;
use num_traits::Zero;

/// How often trial division polls for cancellation, in primes.
const POLL_INTERVAL: usize = 256;

/// All primes strictly below `limit`, by the sieve of Eratosthenes.
pub fn primes_below(limit: u32) -> Vec<u32> {
    if limit < 3 {
        return Vec::new();
    }

    let limit = limit as usize;
    let mut composite = vec![false; limit];
    let mut primes = Vec::new();

    for i in 2..limit {
        if composite[i] {
            continue;
        }
        primes.push(i as u32);
        let mut multiple = i * i;
        while multiple < limit {
            composite[multiple] = true;
            multiple += i;
        }
    }

    primes
}

/// The first `count` primes, in increasing order.
pub fn first_primes(count: usize) -> Vec<u32> {
    let mut limit: u32 = 64;
    loop {
        let mut primes = primes_below(limit);
        if primes.len() >= count {
            primes.truncate(count);
            return primes;
        }
        limit = limit.saturating_mul(2);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// No table prime up to the square root divides n.
    Prime,
    /// The smallest table prime dividing n.
    Factor(u32),
    /// The table ran out before reaching the square root.
    Inconclusive,
}

pub fn trial_divide_u64<C: Checkpoint>(
    n: u64,
    primes: &[u32],
    checkpoint: &C,
) -> Result<TrialOutcome, C::Error> {
    for (index, &p) in primes.iter().enumerate() {
        if index % POLL_INTERVAL == 0 {
            checkpoint.poll()?;
        }
        let p = u64::from(p);
        if p * p > n {
            return Ok(TrialOutcome::Prime);
        }
        if n % p == 0 {
            return Ok(if n == p {
                TrialOutcome::Prime
            } else {
                TrialOutcome::Factor(p as u32)
            });
        }
    }
    Ok(TrialOutcome::Inconclusive)
}

/// Trial division for candidates wider than 64 bits; every table prime is below the square root.
pub fn trial_divide<C: Checkpoint>(
    n: &BigUint,
    primes: &[u32],
    checkpoint: &C,
) -> Result<Option<u32>, C::Error> {
    for (index, &p) in primes.iter().enumerate() {
        if index % POLL_INTERVAL == 0 {
            checkpoint.poll()?;
        }
        if (n % p).is_zero() {
            return Ok(Some(p));
        }
    }
    Ok(None)
}
