use num_traits::One;
use tracing::debug;

use crate::arith;
use crate::bigint::BigNat;
use crate::error::{Error, Result};
use crate::factor::{self, Factorization};
use crate::gf::Residue;
use crate::poly::{Poly, ReductionTable};
use crate::stats::OperationCount;

/// Primitivity tester for degree-n candidates mod p. Factors p - 1 and
/// r = (p^n - 1)/(p - 1) once at construction; candidates are then judged
/// by a cascade of conditions ordered cheapest first.
pub struct PolyOrder {
    p: u64,
    n: u64,
    p_to_n_minus_1: BigNat,
    r: BigNat,
    factors_of_p_minus_1: Factorization,
    factors_of_r: Factorization,
    num_primitive_poly: BigNat,
    skip_optimization: bool,
    pub statistics: OperationCount,
}

impl PolyOrder {
    pub fn new(p: u64, n: u64) -> Result<PolyOrder> {
        if n < 2 {
            return Err(Error::Range(format!("degree {n} must be at least 2")));
        }
        let mut statistics = OperationCount::new(p, n);
        if !factor::is_almost_surely_prime(&BigNat::from(p), &mut statistics)? {
            return Err(Error::PNotPrime(p));
        }

        let p_to_n_minus_1 = BigNat::pow_u64(p, n).checked_sub(&BigNat::one())?;
        let (r, rem) = p_to_n_minus_1.div_rem(&BigNat::from(p - 1))?;
        if !rem.is_zero() {
            return Err(Error::Internal(format!(
                "{p}^{n} - 1 is not divisible by {}",
                p - 1
            )));
        }

        let factors_of_p_minus_1 =
            Factorization::factor(&BigNat::from(p - 1), None, &mut statistics)?;
        let factors_of_whole =
            Factorization::factor(&p_to_n_minus_1, Some((p, n)), &mut statistics)?;
        let factors_of_r = factors_of_whole.divide_out(&factors_of_p_minus_1)?;
        if factors_of_r.product() != r {
            return Err(Error::Internal(format!(
                "derived factorization of ({p}^{n} - 1)/({p} - 1) does not multiply back"
            )));
        }

        // phi(p^n - 1) / n primitive polynomials; the division is exact.
        let (num_primitive_poly, rem) = factors_of_whole.euler_phi().div_rem(&BigNat::from(n))?;
        if !rem.is_zero() {
            return Err(Error::Internal(format!(
                "phi({p}^{n} - 1) is not divisible by {n}"
            )));
        }

        statistics.max_num_possible_poly = BigNat::pow_u64(p, n);
        statistics.num_primitive_poly = num_primitive_poly.clone();
        debug!(p, n, r = %r, primitives = %num_primitive_poly, "tester ready");

        Ok(PolyOrder {
            p,
            n,
            p_to_n_minus_1,
            r,
            factors_of_p_minus_1,
            factors_of_r,
            num_primitive_poly,
            skip_optimization: false,
            statistics,
        })
    }

    /// Skip order-m checks for primes of r that also divide p - 1. The
    /// decision is unchanged; the full cascade remains the reference.
    pub fn with_skip_optimization(mut self, enabled: bool) -> PolyOrder {
        self.skip_optimization = enabled;
        self
    }

    pub fn modulus(&self) -> u64 {
        self.p
    }

    pub fn degree(&self) -> u64 {
        self.n
    }

    /// phi(p^n - 1) / n.
    pub fn num_primitive_polys(&self) -> &BigNat {
        &self.num_primitive_poly
    }

    pub fn field_order_minus_1(&self) -> &BigNat {
        &self.p_to_n_minus_1
    }

    pub fn subfield_exponent(&self) -> &BigNat {
        &self.r
    }

    /// The full cascade. Every stage must hold; the first failure rejects.
    pub fn is_primitive(&mut self, f: &Poly, table: &ReductionTable) -> Result<bool> {
        if f.modulus() != self.p || f.degree() as u64 != self.n {
            return Err(Error::Range(format!(
                "candidate {f} does not have degree {} mod {}",
                self.n, self.p
            )));
        }
        self.statistics.polys_tested += 1;
        let (p, n) = (self.p, self.n);
        let a0 = f.coeff(0);

        // The product of the roots of a primitive f is (-1)^n a0 and must
        // generate (Z/pZ)*.
        if !arith::const_coeff_is_primitive_root(a0, n, p, &self.factors_of_p_minus_1)? {
            return Ok(false);
        }
        self.statistics.const_coeff_primitive_root += 1;

        if f.has_linear_factor() {
            return Ok(false);
        }
        self.statistics.free_of_linear_factors += 1;

        if self.has_multiple_irreducible_factors(table)? {
            return Ok(false);
        }
        self.statistics.irreducible_to_power += 1;

        // x^r must land in the prime subfield.
        let x_to_r = Residue::x_to_power(&self.r, table, &mut self.statistics);
        if !x_to_r.is_constant() {
            return Ok(false);
        }
        self.statistics.order_r += 1;

        // ... and the constant it lands on is forced to (-1)^n a0.
        let expected = if n % 2 == 0 { a0 } else { (p - a0) % p };
        if x_to_r.constant_term() != expected {
            return Ok(false);
        }
        self.statistics.passed_const_coeff_check += 1;

        if !self.order_m(table)? {
            return Ok(false);
        }
        self.statistics.order_m += 1;

        debug!(candidate = %f, "primitive");
        Ok(true)
    }

    /// x^(r/q) must stay outside the prime subfield for every distinct
    /// prime q of r, otherwise ord(x) is a proper divisor of p^n - 1.
    fn order_m(&mut self, table: &ReductionTable) -> Result<bool> {
        for i in 0..self.factors_of_r.num_distinct_factors() {
            if self.skip_optimization && self.factors_of_r.skip_test(i, self.p) {
                continue;
            }
            let q = self.factors_of_r.prime_factor(i);
            let (m, rem) = self.r.div_rem(q)?;
            debug_assert!(rem.is_zero());
            let x_to_m = Residue::x_to_power(&m, table, &mut self.statistics);
            if x_to_m.is_constant() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Berlekamp: f is a power of a single irreducible iff the Q - I matrix
    /// has nullity exactly 1, where row i of Q holds x^(i p) mod f.
    fn has_multiple_irreducible_factors(&mut self, table: &ReductionTable) -> Result<bool> {
        let n = self.n as usize;
        let p = self.p;
        let mut q_minus_i = vec![0u64; n * n];

        let x_to_p = Residue::x_to_power(&BigNat::from(p), table, &mut self.statistics);
        let mut row = Residue::one(n);
        for i in 0..n {
            if i > 0 {
                row = row.product(&x_to_p, table);
            }
            let dst = &mut q_minus_i[i * n..(i + 1) * n];
            dst.copy_from_slice(row.coeffs());
            // subtract the identity
            dst[i] = ((u128::from(dst[i]) + u128::from(p) - 1) % u128::from(p)) as u64;
        }

        let nullity = nullity_mod_p(&mut q_minus_i, n, p)?;
        Ok(nullity != 1)
    }

    /// Brute-force confirmation: multiply by x until 1 reappears and check
    /// the step count is exactly p^n - 1. Exponentially slower than the
    /// cascade; a cross-check only.
    pub fn maximal_order(&mut self, f: &Poly, table: &ReductionTable) -> Result<bool> {
        if f.modulus() != self.p || f.degree() as u64 != self.n {
            return Err(Error::Range(format!(
                "candidate {f} does not have degree {} mod {}",
                self.n, self.p
            )));
        }
        let n = self.n as usize;
        let mut g = Residue::x(n);
        let mut k = BigNat::one();
        while !g.is_one() {
            g.times_x(table);
            k += BigNat::one();
            if k > self.p_to_n_minus_1 {
                // x is not invertible mod f (or its cycle avoids 1).
                return Ok(false);
            }
        }
        Ok(k == self.p_to_n_minus_1)
    }
}

/// Dimension of the kernel of an n x n matrix over Z/pZ, by Gaussian
/// elimination on a contiguous row-major buffer.
fn nullity_mod_p(m: &mut [u64], n: usize, p: u64) -> Result<usize> {
    let mut rank = 0;
    for col in 0..n {
        let pivot = match (rank..n).find(|&row| m[row * n + col] != 0) {
            Some(row) => row,
            None => continue,
        };
        if pivot != rank {
            for j in 0..n {
                m.swap(pivot * n + j, rank * n + j);
            }
        }
        let inv = arith::inverse_mod(m[rank * n + col], p)?;
        for j in 0..n {
            m[rank * n + j] = arith::mul_mod(m[rank * n + j], inv, p);
        }
        for row in 0..n {
            if row == rank || m[row * n + col] == 0 {
                continue;
            }
            let scale = m[row * n + col];
            for j in 0..n {
                let sub = arith::mul_mod(scale, m[rank * n + j], p);
                m[row * n + j] =
                    ((u128::from(m[row * n + j]) + u128::from(p - sub)) % u128::from(p)) as u64;
            }
        }
        rank += 1;
    }
    Ok(n - rank)
}
