//! Miller-Rabin strong probable-prime tests.
//!
//! Two flavours share the same decomposition n - 1 = d * 2^s: a native one for
//! 64-bit candidates using 128-bit intermediates, and a big-integer one for
//! everything wider.

use num_bigint::BigUint;
use num_traits::One;

/// The first twelve primes. As Miller-Rabin bases they never pass a composite
/// below 318 665 857 834 031 151 167 461, which covers every `u64`.
pub const U64_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Below this value the first thirteen primes form a proven base set.
pub const DETERMINISTIC_BOUND: u128 = 3_317_044_064_679_887_385_961_981;

/// Number of leading primes used as bases below [`DETERMINISTIC_BOUND`].
pub const DETERMINISTIC_BASE_COUNT: usize = 13;

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Strong probable-prime test of odd `n > 2` to base `a`.
pub fn is_strong_probable_prime_u64(n: u64, a: u64) -> bool {
    let a = a % n;
    if a == 0 {
        return true;
    }

    let n_minus_one = n - 1;
    let s = n_minus_one.trailing_zeros();
    let d = n_minus_one >> s;

    let mut x = pow_mod(a, d, n);
    if x == 1 || x == n_minus_one {
        return true;
    }
    for _ in 1..s {
        x = mul_mod(x, x, n);
        if x == n_minus_one {
            return true;
        }
    }
    false
}

/// Deterministic primality for any `u64`.
pub fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &U64_BASES {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }
    U64_BASES
        .iter()
        .all(|&a| is_strong_probable_prime_u64(n, a))
}

/// Precomputed decomposition of an odd candidate for repeated witness rounds.
#[derive(Debug, Clone)]
pub struct MillerRabin<'a> {
    n: &'a BigUint,
    n_minus_one: BigUint,
    d: BigUint,
    s: u64,
}

impl<'a> MillerRabin<'a> {
    /// `n` must be odd and greater than every base later passed to [`passes`](Self::passes).
    pub fn new(n: &'a BigUint) -> Self {
        let n_minus_one = n - 1u32;
        let s = n_minus_one.trailing_zeros().unwrap_or(0);
        let d = &n_minus_one >> s;
        Self {
            n,
            n_minus_one,
            d,
            s,
        }
    }

    /// True when `base` is not a witness to the compositeness of n.
    pub fn passes(&self, base: u32) -> bool {
        let base = BigUint::from(base);
        let mut x = base.modpow(&self.d, self.n);
        if x.is_one() || x == self.n_minus_one {
            return true;
        }
        for _ in 1..self.s {
            x = (&x * &x) % self.n;
            if x == self.n_minus_one {
                return true;
            }
            if x.is_one() {
                return false;
            }
        }
        false
    }
}
