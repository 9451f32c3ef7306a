use num_integer::Integer;

use crate::bigint::BigNat;
use crate::error::{Error, Result};
use crate::factor::Factorization;
use crate::stats::OperationCount;

/// Least non-negative residue of a signed integer, p >= 2.
pub fn modulo(n: i64, p: u64) -> u64 {
    debug_assert!(p >= 2);
    (i128::from(n)).rem_euclid(i128::from(p)) as u64
}

pub fn gcd(a: u64, b: u64) -> u64 {
    a.gcd(&b)
}

pub fn mul_mod(a: u64, b: u64, p: u64) -> u64 {
    (u128::from(a) * u128::from(b) % u128::from(p)) as u64
}

/// a^e mod p by square-and-multiply.
pub fn power_mod(a: u64, e: u64, p: u64) -> u64 {
    debug_assert!(p >= 2);
    let mut result = 1 % p;
    let mut base = a % p;
    let mut e = e;
    while e > 0 {
        if e & 1 == 1 {
            result = mul_mod(result, base, p);
        }
        base = mul_mod(base, base, p);
        e >>= 1;
    }
    result
}

/// Multiplicative inverse of a mod p via the extended Euclidean algorithm.
pub fn inverse_mod(a: u64, p: u64) -> Result<u64> {
    let a = a % p;
    let (mut r0, mut r1) = (i128::from(p), i128::from(a));
    let (mut t0, mut t1) = (0i128, 1i128);
    while r1 != 0 {
        let q = r0 / r1;
        (r0, r1) = (r1, r0 - q * r1);
        (t0, t1) = (t1, t0 - q * t1);
    }
    if r0 != 1 {
        return Err(Error::NotInvertible(a, p));
    }
    Ok(t0.rem_euclid(i128::from(p)) as u64)
}

/// True iff a has order p-1 in (Z/pZ)*: a^((p-1)/q) != 1 for every distinct
/// prime q of p-1. Precondition: p prime.
pub fn is_primitive_root(a: u64, p: u64, counts: &mut OperationCount) -> Result<bool> {
    let factors = Factorization::factor(&BigNat::from(p - 1), None, counts)?;
    is_primitive_root_with(a, p, &factors)
}

/// Same test against a caller-cached factorization of p-1.
pub fn is_primitive_root_with(a: u64, p: u64, p_minus_1: &Factorization) -> Result<bool> {
    let a = a % p;
    if a == 0 {
        return Ok(false);
    }
    if p == 2 {
        return Ok(a == 1);
    }
    for q in p_minus_1.distinct_primes() {
        let q = q.to_u64_exact()?;
        if power_mod(a, (p - 1) / q, p) == 1 {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Necessary condition on the constant term of a primitive polynomial:
/// (-1)^n a0 must be a primitive root of p.
pub fn const_coeff_is_primitive_root(
    a0: u64,
    n: u64,
    p: u64,
    p_minus_1: &Factorization,
) -> Result<bool> {
    let signed = if n % 2 == 0 { a0 % p } else { (p - a0 % p) % p };
    is_primitive_root_with(signed, p, p_minus_1)
}
