use std::collections::HashMap;
use std::sync::OnceLock;

use num_traits::One;
use tracing::debug;

use crate::bigint::BigNat;
use crate::error::{Error, Result};
use crate::parser;
use crate::rng;
use crate::stats::OperationCount;

/// Verdict of a single Miller-Rabin round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primality {
    Prime,
    Composite,
    ProbablyPrime,
    Undefined,
}

/// Number of independent random bases behind `is_almost_surely_prime`.
pub const NUM_PRIME_TEST_TRIALS: u32 = 25;

/// Trial division gives up on candidates above this and hands the residual
/// to Miller-Rabin / Pollard rho.
const TRIAL_DIVISION_BOUND: u64 = 100_000;

/// Pollard rho retries with c = 2, 3, ... before reporting failure.
const RHO_RETRY_LIMIT: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeFactor {
    pub prime: BigNat,
    pub multiplicity: u32,
}

/// Ordered prime-power decomposition: primes strictly increasing, the
/// product of prime^multiplicity reconstructs the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Factorization {
    factors: Vec<PrimeFactor>,
}

impl Factorization {
    /// Factor n, optionally hinted with (p, m) such that n = p^m - 1 so the
    /// embedded table can be consulted first.
    pub fn factor(
        n: &BigNat,
        hint: Option<(u64, u64)>,
        counts: &mut OperationCount,
    ) -> Result<Factorization> {
        if n.is_zero() {
            return Err(Error::Range("cannot factor zero".into()));
        }
        let mut fact = Factorization {
            factors: Vec::new(),
        };
        if n.is_one() {
            return Ok(fact);
        }

        let mut remaining = n.clone();
        if let Some((p, m)) = hint {
            if let Some(entry) = table_lookup(p, m)? {
                let expected = BigNat::pow_u64(p, m).checked_sub(&BigNat::one())?;
                if expected == *n {
                    let mut product = entry.residual.clone().unwrap_or_else(BigNat::one);
                    for (prime, multiplicity) in &entry.factors {
                        for _ in 0..*multiplicity {
                            product = &product * prime;
                        }
                    }
                    if product != *n {
                        return Err(Error::Factor(format!(
                            "factor table entry for {p}^{m} - 1 does not multiply back"
                        )));
                    }
                    for (prime, multiplicity) in &entry.factors {
                        fact.insert_with(prime.clone(), *multiplicity);
                    }
                    remaining = entry.residual.clone().unwrap_or_else(BigNat::one);
                    debug!(p, m, residual = %remaining, "factor table hit");
                }
            }
        }

        if !remaining.is_one() {
            remaining = fact.trial_division(remaining, counts)?;
        }
        if !remaining.is_one() {
            fact.factor_unknown(remaining, counts)?;
        }

        if fact.product() != *n {
            return Err(Error::Internal(format!(
                "factorization of {n} does not multiply back"
            )));
        }
        Ok(fact)
    }

    pub fn num_distinct_factors(&self) -> usize {
        self.factors.len()
    }

    pub fn prime_factor(&self, i: usize) -> &BigNat {
        &self.factors[i].prime
    }

    pub fn multiplicity(&self, i: usize) -> u32 {
        self.factors[i].multiplicity
    }

    pub fn factors(&self) -> &[PrimeFactor] {
        &self.factors
    }

    pub fn distinct_primes(&self) -> impl Iterator<Item = &BigNat> {
        self.factors.iter().map(|f| &f.prime)
    }

    pub fn product(&self) -> BigNat {
        let mut product = BigNat::one();
        for f in &self.factors {
            for _ in 0..f.multiplicity {
                product = &product * &f.prime;
            }
        }
        product
    }

    /// Euler phi of the factored number.
    pub fn euler_phi(&self) -> BigNat {
        let mut phi = BigNat::one();
        for f in &self.factors {
            let q_minus_1 = f
                .prime
                .checked_sub(&BigNat::one())
                .expect("prime factor is at least 2");
            phi = &phi * &q_minus_1;
            for _ in 1..f.multiplicity {
                phi = &phi * &f.prime;
            }
        }
        phi
    }

    /// Multiset difference: the factorization of self's number divided by
    /// other's. Fails if other is not a sub-multiset of self.
    pub fn divide_out(&self, other: &Factorization) -> Result<Factorization> {
        let mut out = Factorization {
            factors: Vec::new(),
        };
        for f in &other.factors {
            let have = self
                .factors
                .iter()
                .find(|g| g.prime == f.prime)
                .map(|g| g.multiplicity)
                .unwrap_or(0);
            if have < f.multiplicity {
                return Err(Error::Internal(format!(
                    "{} does not divide the factored number",
                    f.prime
                )));
            }
        }
        for f in &self.factors {
            let sub = other
                .factors
                .iter()
                .find(|g| g.prime == f.prime)
                .map(|g| g.multiplicity)
                .unwrap_or(0);
            if f.multiplicity > sub {
                out.insert_with(f.prime.clone(), f.multiplicity - sub);
            }
        }
        Ok(out)
    }

    /// True iff the i-th prime divides p - 1; the order-m check for that
    /// prime is then implied by the constant-term test.
    pub fn skip_test(&self, i: usize, p: u64) -> bool {
        match self.factors[i].prime.to_u64() {
            Some(q) => (p - 1) % q == 0,
            None => false,
        }
    }

    fn insert(&mut self, prime: BigNat) {
        self.insert_with(prime, 1);
    }

    fn insert_with(&mut self, prime: BigNat, multiplicity: u32) {
        match self.factors.binary_search_by(|f| f.prime.cmp(&prime)) {
            Ok(i) => self.factors[i].multiplicity += multiplicity,
            Err(i) => self.factors.insert(
                i,
                PrimeFactor {
                    prime,
                    multiplicity,
                },
            ),
        }
    }

    /// Peel off candidates 2, 3, 6k+-1 while candidate^2 <= remaining, up
    /// to the trial-division bound. Returns the unfactored residual.
    fn trial_division(
        &mut self,
        mut remaining: BigNat,
        counts: &mut OperationCount,
    ) -> Result<BigNat> {
        let mut candidate = 2u64;
        let mut step = 2u64;
        loop {
            if candidate > TRIAL_DIVISION_BOUND {
                return Ok(remaining);
            }
            let big = BigNat::from(candidate);
            if &big * &big > remaining {
                break;
            }
            counts.trial_divisions += 1;
            let (q, r) = remaining.div_rem(&big)?;
            if r.is_zero() {
                self.insert(big);
                remaining = q;
            } else {
                (candidate, step) = match candidate {
                    2 => (3, 2),
                    3 => (5, 2),
                    _ => (candidate + step, 6 - step),
                };
            }
        }
        // Loop exit means candidate^2 exceeds the residual, so whatever is
        // left has no divisor below its square root: it is prime.
        if !remaining.is_one() {
            self.insert(remaining);
        }
        Ok(BigNat::one())
    }

    /// Residual with no small divisors: accept it if probably prime, else
    /// split with Pollard rho and recurse on both halves.
    fn factor_unknown(&mut self, n: BigNat, counts: &mut OperationCount) -> Result<()> {
        if n.is_one() {
            return Ok(());
        }
        if is_almost_surely_prime(&n, counts)? {
            self.insert(n);
            return Ok(());
        }
        let mut c = 2u64;
        loop {
            if let Some(divisor) = pollard_rho(&n, c, counts)? {
                debug!(n = %n, c, divisor = %divisor, "pollard rho split");
                let (quotient, r) = n.div_rem(&divisor)?;
                debug_assert!(r.is_zero());
                self.factor_unknown(divisor, counts)?;
                self.factor_unknown(quotient, counts)?;
                return Ok(());
            }
            c += 1;
            if c - 2 >= RHO_RETRY_LIMIT {
                return Err(Error::Factor(format!("Pollard rho failed to split {n}")));
            }
        }
    }
}

/// One Miller-Rabin round on base x: write n - 1 = 2^s d with d odd,
/// compute x^d mod n, then square up to s - 1 times looking for n - 1.
pub fn is_probably_prime(n: &BigNat, x: &BigNat, counts: &mut OperationCount) -> Result<Primality> {
    let two = BigNat::from(2u64);
    if *n < two {
        return Ok(Primality::Undefined);
    }
    if *n == two {
        return Ok(Primality::Prime);
    }
    if n.is_even() {
        return Ok(Primality::Composite);
    }
    counts.primality_tests += 1;

    let n_minus_1 = n.checked_sub(&BigNat::one())?;
    let mut d = n_minus_1.clone();
    let mut s = 0u32;
    while d.is_even() {
        d = d.div_rem(&two)?.0;
        s += 1;
    }

    let mut y = x.pow_mod(&d, n)?;
    if y.is_one() || y == n_minus_1 {
        return Ok(Primality::ProbablyPrime);
    }
    for _ in 1..s {
        y = y.mul_mod(&y, n)?;
        counts.squarings += 1;
        if y == n_minus_1 {
            return Ok(Primality::ProbablyPrime);
        }
        if y.is_one() {
            return Ok(Primality::Composite);
        }
    }
    Ok(Primality::Composite)
}

/// Probabilistic primality: `NUM_PRIME_TEST_TRIALS` Miller-Rabin rounds on
/// independent random bases from the shared generator.
pub fn is_almost_surely_prime(n: &BigNat, counts: &mut OperationCount) -> Result<bool> {
    match n.to_u64() {
        Some(0) | Some(1) => return Ok(false),
        Some(2) | Some(3) => return Ok(true),
        _ => {}
    }
    if n.is_even() {
        return Ok(false);
    }
    // Bases are drawn from [2, n-2).
    let span = n.checked_sub(&BigNat::from(4u64))?;
    for _ in 0..NUM_PRIME_TEST_TRIALS {
        let x = &rng::uniform(&span)? + 2u64;
        if is_probably_prime(n, &x, counts)? == Primality::Composite {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn gcd_bignat(a: &BigNat, b: &BigNat) -> Result<BigNat> {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = a.rem_bignat(&b)?;
        a = b;
        b = r;
    }
    Ok(a)
}

/// Brent-style Pollard rho with iteration x <- x^2 + c mod n. Returns a
/// nontrivial divisor, or None when the cycle collapses (gcd hit n) and the
/// caller should retry with the next c.
fn pollard_rho(n: &BigNat, c: u64, counts: &mut OperationCount) -> Result<Option<BigNat>> {
    let c = BigNat::from(c);
    let mut x = BigNat::from(2u64);
    let mut snapshot = x.clone();
    let mut limit = 1u64;
    let mut steps = 0u64;
    loop {
        x = (&x.mul_mod(&x, n)? + &c).rem_bignat(n)?;
        counts.squarings += 1;
        steps += 1;

        let diff = if x >= snapshot {
            x.checked_sub(&snapshot)?
        } else {
            snapshot.checked_sub(&x)?
        };
        counts.gcds += 1;
        let g = gcd_bignat(&diff, n)?;
        if !g.is_one() {
            if g == *n {
                return Ok(None);
            }
            return Ok(Some(g));
        }

        // Brent: teleport the comparison point to the current iterate at
        // powers of two, doubling the cycle-length bound.
        if steps == limit {
            snapshot = x.clone();
            limit *= 2;
            steps = 0;
        }
    }
}

pub(crate) struct TableEntry {
    pub(crate) factors: Vec<(BigNat, u32)>,
    pub(crate) residual: Option<BigNat>,
}

static FACTOR_TABLE: OnceLock<std::result::Result<HashMap<(u64, u64), TableEntry>, String>> =
    OnceLock::new();

/// Known factorizations of p^m - 1, parsed once from the embedded table.
fn table_lookup(p: u64, m: u64) -> Result<Option<&'static TableEntry>> {
    let table = FACTOR_TABLE.get_or_init(|| {
        parser::parse_factor_table(include_str!("../data/factor-table.txt"))
            .map_err(|e| e.to_string())
    });
    match table {
        Ok(entries) => Ok(entries.get(&(p, m))),
        Err(msg) => Err(Error::Factor(format!("factor table unusable: {msg}"))),
    }
}
