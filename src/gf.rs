use crate::bigint::BigNat;
use crate::poly::ReductionTable;
use crate::stats::OperationCount;

/// Element of Z/pZ[x] / <f(x)>: a polynomial of degree below n, reduced
/// against the candidate's precomputed table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Residue {
    coeffs: Vec<u64>,
}

impl Residue {
    pub fn one(n: usize) -> Residue {
        let mut coeffs = vec![0; n];
        coeffs[0] = 1;
        Residue { coeffs }
    }

    pub fn x(n: usize) -> Residue {
        debug_assert!(n >= 2);
        let mut coeffs = vec![0; n];
        coeffs[1] = 1;
        Residue { coeffs }
    }

    pub fn from_coeffs(coeffs: Vec<u64>) -> Residue {
        Residue { coeffs }
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    /// Degree-0 check: the element lies in the prime subfield.
    pub fn is_constant(&self) -> bool {
        self.coeffs[1..].iter().all(|&c| c == 0)
    }

    pub fn constant_term(&self) -> u64 {
        self.coeffs[0]
    }

    pub fn is_one(&self) -> bool {
        self.coeffs[0] == 1 && self.is_constant()
    }

    /// Multiply by x: shift coefficients up and fold the spilled x^n term
    /// back through the table's first row.
    pub fn times_x(&mut self, table: &ReductionTable) {
        let n = table.degree();
        let p = table.modulus();
        let spill = self.coeffs[n - 1];
        for j in (1..n).rev() {
            self.coeffs[j] = self.coeffs[j - 1];
        }
        self.coeffs[0] = 0;
        if spill != 0 {
            let row = table.row(n);
            for j in 0..n {
                let add = u128::from(spill) * u128::from(row[j]) % u128::from(p);
                self.coeffs[j] = ((u128::from(self.coeffs[j]) + add) % u128::from(p)) as u64;
            }
        }
    }

    /// Square in place: auto-convolution (one symmetric product plus the
    /// doubled i < j pairs per target index), then one table-reduction
    /// sweep over the coefficients at x^n and above.
    pub fn square(&mut self, table: &ReductionTable, counts: &mut OperationCount) {
        counts.squarings += 1;
        let n = table.degree();
        let p = u128::from(table.modulus());
        let mut conv = vec![0u64; 2 * n - 1];
        for (k, c) in conv.iter_mut().enumerate() {
            let mut acc = 0u128;
            let lower = k.saturating_sub(n - 1);
            let upper = k / 2;
            for i in lower..=upper {
                let j = k - i;
                let term = u128::from(self.coeffs[i]) * u128::from(self.coeffs[j]) % p;
                let term = if i < j { term * 2 % p } else { term };
                acc = (acc + term) % p;
            }
            *c = acc as u64;
        }
        self.reduce(&conv, table);
    }

    /// Full product against another residue.
    pub fn product(&self, rhs: &Residue, table: &ReductionTable) -> Residue {
        let n = table.degree();
        let p = u128::from(table.modulus());
        let mut conv = vec![0u64; 2 * n - 1];
        for (k, c) in conv.iter_mut().enumerate() {
            let mut acc = 0u128;
            let lower = k.saturating_sub(n - 1);
            let upper = k.min(n - 1);
            for i in lower..=upper {
                acc = (acc + u128::from(self.coeffs[i]) * u128::from(rhs.coeffs[k - i]) % p) % p;
            }
            *c = acc as u64;
        }
        let mut out = Residue {
            coeffs: vec![0; n],
        };
        out.reduce(&conv, table);
        out
    }

    /// Fold a length 2n-1 convolution back below degree n using the table:
    /// out[j] = conv[j] + sum over k >= n of conv[k] * T[k][j].
    fn reduce(&mut self, conv: &[u64], table: &ReductionTable) {
        let n = table.degree();
        let p = u128::from(table.modulus());
        for j in 0..n {
            let mut acc = u128::from(conv[j]);
            for k in n..=2 * n - 2 {
                acc = (acc + u128::from(conv[k]) * u128::from(table.row(k)[j]) % p) % p;
            }
            self.coeffs[j] = (acc % p) as u64;
        }
    }

    /// x^m mod f: scan m's bits from most to least significant, squaring at
    /// every step and multiplying by x on set bits.
    pub fn x_to_power(m: &BigNat, table: &ReductionTable, counts: &mut OperationCount) -> Residue {
        let n = table.degree();
        let mut result = Residue::one(n);
        for i in (0..m.bit_length()).rev() {
            result.square(table, counts);
            if m.bit(i) {
                result.times_x(table);
            }
        }
        result
    }
}
