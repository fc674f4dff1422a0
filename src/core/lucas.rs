//! Strong Lucas probable-prime test with Selfridge's parameter choice.
//!
//! Paired with a base-2 Miller-Rabin round this is the Baillie-PSW test.

use crate::core::cancel::Checkpoint;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Bits processed between cancellation polls in the Lucas ladder.
const POLL_INTERVAL: u64 = 64;

fn low_word(x: &BigUint) -> u32 {
    x.iter_u32_digits().next().unwrap_or(0)
}

/// `a mod n` for a signed machine integer.
fn to_residue(a: i64, n: &BigUint) -> BigUint {
    let r = BigUint::from(a.unsigned_abs()) % n;
    if a < 0 && !r.is_zero() {
        n - r
    } else {
        r
    }
}

/// Jacobi symbol (a / n) for odd positive `n`.
pub fn jacobi(a: i64, n: &BigUint) -> i32 {
    let mut a = to_residue(a, n);
    let mut n = n.clone();
    let mut result = 1;

    while !a.is_zero() {
        while a.is_even() {
            a >>= 1u32;
            let r = low_word(&n) & 7;
            if r == 3 || r == 5 {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if low_word(&a) & 3 == 3 && low_word(&n) & 3 == 3 {
            result = -result;
        }
        a %= &n;
    }

    if n.is_one() {
        result
    } else {
        0
    }
}

/// x / 2 mod odd n.
fn half_mod(x: BigUint, n: &BigUint) -> BigUint {
    let x = x % n;
    if x.is_even() {
        x >> 1u32
    } else {
        (x + n) >> 1u32
    }
}

/// (x * x - 2 * q) mod n
fn double_v(v: &BigUint, q: &BigUint, n: &BigUint) -> BigUint {
    let square = (v * v) % n;
    let twice_q = (q << 1u32) % n;
    (square + n - twice_q) % n
}

/// Selfridge method A: first D in 5, -7, 9, -11, ... with (D / n) = -1.
/// Returns `None` when a D sharing a factor with n proves it composite.
fn select_d<C: Checkpoint>(n: &BigUint, checkpoint: &C) -> Result<Option<i64>, C::Error> {
    let mut d: i64 = 5;
    loop {
        match jacobi(d, n) {
            -1 => return Ok(Some(d)),
            0 if BigUint::from(d.unsigned_abs()) != *n => return Ok(None),
            _ => {}
        }
        d = if d > 0 { -(d + 2) } else { -d + 2 };
        if d.unsigned_abs() % 64 == 1 {
            checkpoint.poll()?;
        }
    }
}

/// Strong Lucas test of odd `n > 3`. `Ok(false)` means n is certainly composite.
pub fn is_strong_lucas_probable_prime<C: Checkpoint>(
    n: &BigUint,
    checkpoint: &C,
) -> Result<bool, C::Error> {
    checkpoint.poll()?;

    // A square never yields (D / n) = -1, so the search below would not end.
    let root = n.sqrt();
    if &root * &root == *n {
        return Ok(false);
    }

    let d = match select_d(n, checkpoint)? {
        Some(d) => d,
        None => return Ok(false),
    };
    // P = 1, Q = (1 - D) / 4
    let q = to_residue((1 - d) / 4, n);
    let d_residue = to_residue(d, n);

    let n_plus_one = n + 1u32;
    let s = n_plus_one.trailing_zeros().unwrap_or(0);
    let k = &n_plus_one >> s;

    let mut u = BigUint::one();
    let mut v = BigUint::one();
    let mut q_k = q.clone();

    for bit in (0..k.bits().saturating_sub(1)).rev() {
        if bit % POLL_INTERVAL == 0 {
            checkpoint.poll()?;
        }
        u = (&u * &v) % n;
        v = double_v(&v, &q_k, n);
        q_k = (&q_k * &q_k) % n;
        if k.bit(bit) {
            let next_u = half_mod(&u + &v, n);
            let next_v = half_mod(&d_residue * &u + &v, n);
            u = next_u;
            v = next_v;
            q_k = (&q_k * &q) % n;
        }
    }

    if u.is_zero() || v.is_zero() {
        return Ok(true);
    }
    for r in 1..s {
        if r % POLL_INTERVAL == 0 {
            checkpoint.poll()?;
        }
        v = double_v(&v, &q_k, n);
        if v.is_zero() {
            return Ok(true);
        }
        q_k = (&q_k * &q_k) % n;
    }
    Ok(false)
}
