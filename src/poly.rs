use std::fmt;
use std::str::FromStr;

use crate::bigint::BigNat;
use crate::error::{Error, Result};
use crate::parser;

/// Monic dense polynomial over Z/pZ with fixed modulus and degree.
/// Coefficients a0..an little endian, an = 1, each in [0, p).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    p: u64,
    coeffs: Vec<u64>,
}

impl Poly {
    pub fn new(coeffs: Vec<u64>, p: u64) -> Result<Poly> {
        if p < 2 {
            return Err(Error::Range(format!("modulus {p} must be at least 2")));
        }
        if coeffs.len() < 2 {
            return Err(Error::Range("polynomial must have degree at least 1".into()));
        }
        if let Some(c) = coeffs.iter().find(|&&c| c >= p) {
            return Err(Error::Range(format!("coefficient {c} is not below {p}")));
        }
        if *coeffs.last().unwrap() != 1 {
            return Err(Error::Range("polynomial must be monic".into()));
        }
        Ok(Poly { p, coeffs })
    }

    /// First trial candidate x^n - 1, i.e. x^n + (p-1).
    pub fn initial_trial(n: u64, p: u64) -> Result<Poly> {
        if n < 2 {
            return Err(Error::Range(format!("degree {n} must be at least 2")));
        }
        if p < 2 {
            return Err(Error::Range(format!("modulus {p} must be at least 2")));
        }
        let n = n as usize;
        let mut coeffs = vec![0; n + 1];
        coeffs[0] = p - 1;
        coeffs[n] = 1;
        Ok(Poly { p, coeffs })
    }

    /// Base-p odometer over a0..a(n-1) with an pinned at 1. Returns false
    /// when the increment carries out of a(n-1): the monic degree-n set is
    /// exhausted.
    pub fn next_trial(&mut self) -> bool {
        let n = self.degree();
        for i in 0..n {
            self.coeffs[i] += 1;
            if self.coeffs[i] < self.p {
                return true;
            }
            self.coeffs[i] = 0;
        }
        false
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn modulus(&self) -> u64 {
        self.p
    }

    pub fn coeff(&self, i: usize) -> u64 {
        self.coeffs.get(i).copied().unwrap_or(0)
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    /// Number of monic polynomials of this degree mod p, p^n.
    pub fn num_candidates(&self) -> BigNat {
        BigNat::pow_u64(self.p, self.degree() as u64)
    }

    /// Horner evaluation mod p.
    pub fn eval_at(&self, x: u64) -> u64 {
        let x = x % self.p;
        let mut acc = 0u64;
        for &c in self.coeffs.iter().rev() {
            let t = u128::from(acc) * u128::from(x) + u128::from(c);
            acc = (t % u128::from(self.p)) as u64;
        }
        acc
    }

    /// True iff f(a) = 0 for some a in [0, p).
    pub fn has_linear_factor(&self) -> bool {
        (0..self.p).any(|a| self.eval_at(a) == 0)
    }

    /// Reductions of x^n .. x^(2n-2) mod f, each as its n low coefficients.
    pub fn reduction_table(&self) -> ReductionTable {
        let n = self.degree();
        let p = self.p;
        let mut rows = vec![0u64; (n - 1) * n];

        // x^n = -(a(n-1) x^(n-1) + ... + a0)
        for j in 0..n {
            rows[j] = (p - self.coeffs[j]) % p;
        }
        // Each further power is x times the previous row, reduced by the
        // first row when the shift spills into degree n.
        for k in 1..n - 1 {
            let (done, current) = rows.split_at_mut(k * n);
            let prev = &done[(k - 1) * n..k * n];
            let spill = prev[n - 1];
            current[0] = 0;
            for j in 1..n {
                current[j] = prev[j - 1];
            }
            for j in 0..n {
                let add = u128::from(spill) * u128::from(done[j]) % u128::from(p);
                current[j] = ((u128::from(current[j]) + add) % u128::from(p)) as u64;
            }
        }

        ReductionTable { p, n, rows }
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in (0..=self.degree()).rev() {
            let c = self.coeffs[e];
            if c == 0 {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            match (c, e) {
                (c, 0) => write!(f, "{c}")?,
                (1, 1) => write!(f, "x")?,
                (1, e) => write!(f, "x^{e}")?,
                (c, 1) => write!(f, "{c}x")?,
                (c, e) => write!(f, "{c}x^{e}")?,
            }
        }
        write!(f, ", {}", self.p)
    }
}

impl FromStr for Poly {
    type Err = Error;

    fn from_str(s: &str) -> Result<Poly> {
        let (coeffs, p) = parser::parse_poly(s)?;
        Poly::new(coeffs, p)
    }
}

/// Precomputed reductions T[k][0..n] of x^k mod f for k = n .. 2n-2, stored
/// as one contiguous row-major buffer. Computed once per candidate and read
/// by every squaring.
#[derive(Clone, Debug)]
pub struct ReductionTable {
    p: u64,
    n: usize,
    rows: Vec<u64>,
}

impl ReductionTable {
    pub fn modulus(&self) -> u64 {
        self.p
    }

    pub fn degree(&self) -> usize {
        self.n
    }

    /// Coefficients of x^k mod f, n <= k <= 2n-2.
    pub fn row(&self, k: usize) -> &[u64] {
        debug_assert!(k >= self.n && k <= 2 * self.n - 2);
        let i = k - self.n;
        &self.rows[i * self.n..(i + 1) * self.n]
    }
}
