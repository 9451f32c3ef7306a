use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_traits::{One, Zero};

use crate::error::{Error, Result};

/// Base-2^32 digits, little endian. Canonical form: no high zero digits,
/// except the value zero which is the single digit 0.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BigNat {
    digits: Vec<u32>,
}

const BASE_BITS: u32 = 32;
const DECIMAL_CHUNK: u32 = 1_000_000_000;
const DECIMAL_CHUNK_LEN: usize = 9;

impl BigNat {
    fn from_digits(mut digits: Vec<u32>) -> Self {
        while digits.len() > 1 && *digits.last().unwrap() == 0 {
            digits.pop();
        }
        if digits.is_empty() {
            digits.push(0);
        }
        BigNat { digits }
    }

    pub fn to_u64(&self) -> Option<u64> {
        match self.digits.len() {
            1 => Some(u64::from(self.digits[0])),
            2 => Some(u64::from(self.digits[0]) | u64::from(self.digits[1]) << BASE_BITS),
            _ => None,
        }
    }

    /// Narrowing conversion that treats loss as an error.
    pub fn to_u64_exact(&self) -> Result<u64> {
        self.to_u64().ok_or(Error::Overflow)
    }

    pub fn is_zero(&self) -> bool {
        self.digits.len() == 1 && self.digits[0] == 0
    }

    pub fn is_one(&self) -> bool {
        self.digits.len() == 1 && self.digits[0] == 1
    }

    pub fn is_even(&self) -> bool {
        self.digits[0] & 1 == 0
    }

    pub fn num_digits(&self) -> usize {
        self.digits.len()
    }

    pub fn bit_length(&self) -> usize {
        let top = *self.digits.last().unwrap();
        if self.is_zero() {
            return 0;
        }
        (self.digits.len() - 1) * BASE_BITS as usize + (BASE_BITS - top.leading_zeros()) as usize
    }

    pub fn bit(&self, i: usize) -> bool {
        let digit = i / BASE_BITS as usize;
        if digit >= self.digits.len() {
            return false;
        }
        self.digits[digit] >> (i % BASE_BITS as usize) & 1 == 1
    }

    /// Shift left by whole base-B digits (multiply by B^n).
    pub fn shl_digits(&self, n: usize) -> BigNat {
        if self.is_zero() {
            return BigNat::zero();
        }
        let mut digits = vec![0; n];
        digits.extend_from_slice(&self.digits);
        BigNat::from_digits(digits)
    }

    /// Shift right by whole base-B digits (divide by B^n, discarding remainder).
    pub fn shr_digits(&self, n: usize) -> BigNat {
        if n >= self.digits.len() {
            return BigNat::zero();
        }
        BigNat::from_digits(self.digits[n..].to_vec())
    }

    fn shr1(&self) -> BigNat {
        let mut digits = vec![0u32; self.digits.len()];
        let mut carry = 0u32;
        for (i, &d) in self.digits.iter().enumerate().rev() {
            digits[i] = d >> 1 | carry << (BASE_BITS - 1);
            carry = d & 1;
        }
        BigNat::from_digits(digits)
    }

    pub fn checked_sub(&self, rhs: &BigNat) -> Result<BigNat> {
        if *self < *rhs {
            return Err(Error::Underflow);
        }
        let mut digits = Vec::with_capacity(self.digits.len());
        let mut borrow = 0i64;
        for i in 0..self.digits.len() {
            let r = if i < rhs.digits.len() {
                i64::from(rhs.digits[i])
            } else {
                0
            };
            let mut d = i64::from(self.digits[i]) - r - borrow;
            if d < 0 {
                d += 1i64 << BASE_BITS;
                borrow = 1;
            } else {
                borrow = 0;
            }
            digits.push(d as u32);
        }
        debug_assert_eq!(borrow, 0);
        Ok(BigNat::from_digits(digits))
    }

    pub fn div_rem(&self, divisor: &BigNat) -> Result<(BigNat, BigNat)> {
        if divisor.is_zero() {
            return Err(Error::ZeroDivide);
        }
        if *self < *divisor {
            return Ok((BigNat::zero(), self.clone()));
        }
        if let Some(d) = divisor.to_u64() {
            if d <= u64::from(u32::MAX) {
                let (q, r) = self.div_rem_u32(d as u32);
                return Ok((q, BigNat::from(r)));
            }
        }
        // Binary long division: bring down one bit of the dividend at a time.
        let bits = self.bit_length();
        let mut quotient = vec![0u32; self.digits.len()];
        let mut rem = BigNat::zero();
        for i in (0..bits).rev() {
            rem = rem.shl1_with(self.bit(i));
            if rem >= *divisor {
                rem = rem.checked_sub(divisor)?;
                quotient[i / BASE_BITS as usize] |= 1 << (i % BASE_BITS as usize);
            }
        }
        Ok((BigNat::from_digits(quotient), rem))
    }

    fn shl1_with(&self, low_bit: bool) -> BigNat {
        let mut digits = Vec::with_capacity(self.digits.len() + 1);
        let mut carry = u32::from(low_bit);
        for &d in &self.digits {
            digits.push(d << 1 | carry);
            carry = d >> (BASE_BITS - 1);
        }
        if carry != 0 {
            digits.push(carry);
        }
        BigNat::from_digits(digits)
    }

    fn div_rem_u32(&self, divisor: u32) -> (BigNat, u64) {
        let d = u64::from(divisor);
        let mut digits = vec![0u32; self.digits.len()];
        let mut rem = 0u64;
        for (i, &digit) in self.digits.iter().enumerate().rev() {
            let acc = rem << BASE_BITS | u64::from(digit);
            digits[i] = (acc / d) as u32;
            rem = acc % d;
        }
        (BigNat::from_digits(digits), rem)
    }

    pub fn rem_bignat(&self, modulus: &BigNat) -> Result<BigNat> {
        Ok(self.div_rem(modulus)?.1)
    }

    pub fn rem_u64(&self, modulus: u64) -> Result<u64> {
        if modulus == 0 {
            return Err(Error::ZeroDivide);
        }
        let m = u128::from(modulus);
        let mut rem = 0u128;
        for &digit in self.digits.iter().rev() {
            rem = (rem << BASE_BITS | u128::from(digit)) % m;
        }
        Ok(rem as u64)
    }

    pub fn mul_mod(&self, rhs: &BigNat, modulus: &BigNat) -> Result<BigNat> {
        (self * rhs).rem_bignat(modulus)
    }

    /// Floor of the square root, by Newton iteration.
    pub fn isqrt(&self) -> BigNat {
        if self.to_u64().map(|n| n < 2).unwrap_or(false) {
            return self.clone();
        }
        // Start above the true root and descend; the iteration is monotone
        // once past the fixed point.
        let mut x = BigNat::one().shl_bits(self.bit_length() / 2 + 1);
        loop {
            let (q, _) = self.div_rem(&x).expect("isqrt iterate is nonzero");
            let y = (&x + &q).shr1();
            if y >= x {
                return x;
            }
            x = y;
        }
    }

    fn shl_bits(&self, n: usize) -> BigNat {
        let mut out = self.shl_digits(n / BASE_BITS as usize);
        for _ in 0..(n % BASE_BITS as usize) {
            out = out.shl1_with(false);
        }
        out
    }

    /// base^exp as a big natural.
    pub fn pow_u64(base: u64, exp: u64) -> BigNat {
        let mut result = BigNat::one();
        let mut b = BigNat::from(base);
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &b;
            }
            b = &b * &b;
            e >>= 1;
        }
        result
    }

    /// self^exp mod modulus by square-and-multiply.
    pub fn pow_mod(&self, exp: &BigNat, modulus: &BigNat) -> Result<BigNat> {
        if modulus.is_zero() {
            return Err(Error::ZeroDivide);
        }
        let mut result = BigNat::one().rem_bignat(modulus)?;
        let mut base = self.rem_bignat(modulus)?;
        for i in 0..exp.bit_length() {
            if exp.bit(i) {
                result = result.mul_mod(&base, modulus)?;
            }
            base = base.mul_mod(&base, modulus)?;
        }
        Ok(result)
    }
}

impl From<u32> for BigNat {
    fn from(n: u32) -> Self {
        BigNat { digits: vec![n] }
    }
}

impl From<u64> for BigNat {
    fn from(n: u64) -> Self {
        BigNat::from_digits(vec![n as u32, (n >> BASE_BITS) as u32])
    }
}

impl Zero for BigNat {
    fn zero() -> Self {
        BigNat { digits: vec![0] }
    }

    fn is_zero(&self) -> bool {
        BigNat::is_zero(self)
    }
}

impl One for BigNat {
    fn one() -> Self {
        BigNat { digits: vec![1] }
    }

    fn is_one(&self) -> bool {
        BigNat::is_one(self)
    }
}

impl Ord for BigNat {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.digits.len() != other.digits.len() {
            return self.digits.len().cmp(&other.digits.len());
        }
        for (a, b) in self.digits.iter().rev().zip(other.digits.iter().rev()) {
            if a != b {
                return a.cmp(b);
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for BigNat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::ops::Add for &BigNat {
    type Output = BigNat;

    fn add(self, rhs: &BigNat) -> BigNat {
        let (longer, shorter) = if self.digits.len() >= rhs.digits.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut digits = Vec::with_capacity(longer.digits.len() + 1);
        let mut carry = 0u64;
        for i in 0..longer.digits.len() {
            let s = if i < shorter.digits.len() {
                u64::from(shorter.digits[i])
            } else {
                0
            };
            let acc = u64::from(longer.digits[i]) + s + carry;
            digits.push(acc as u32);
            carry = acc >> BASE_BITS;
        }
        if carry != 0 {
            digits.push(carry as u32);
        }
        BigNat::from_digits(digits)
    }
}

impl std::ops::Add<BigNat> for BigNat {
    type Output = BigNat;

    fn add(self, rhs: BigNat) -> BigNat {
        &self + &rhs
    }
}

impl std::ops::Add<u64> for &BigNat {
    type Output = BigNat;

    fn add(self, rhs: u64) -> BigNat {
        self + &BigNat::from(rhs)
    }
}

impl std::ops::AddAssign<&BigNat> for BigNat {
    fn add_assign(&mut self, rhs: &BigNat) {
        *self = &*self + rhs;
    }
}

impl std::ops::AddAssign for BigNat {
    fn add_assign(&mut self, rhs: BigNat) {
        *self += &rhs;
    }
}

impl std::ops::Mul for &BigNat {
    type Output = BigNat;

    fn mul(self, rhs: &BigNat) -> BigNat {
        if self.is_zero() || rhs.is_zero() {
            return BigNat::zero();
        }
        let mut acc = vec![0u64; self.digits.len() + rhs.digits.len()];
        for (i, &a) in self.digits.iter().enumerate() {
            let mut carry = 0u64;
            for (j, &b) in rhs.digits.iter().enumerate() {
                let t = acc[i + j] + u64::from(a) * u64::from(b) + carry;
                acc[i + j] = t & u64::from(u32::MAX);
                carry = t >> BASE_BITS;
            }
            acc[i + rhs.digits.len()] += carry;
        }
        BigNat::from_digits(acc.into_iter().map(|d| d as u32).collect())
    }
}

impl std::ops::Mul<BigNat> for BigNat {
    type Output = BigNat;

    fn mul(self, rhs: BigNat) -> BigNat {
        &self * &rhs
    }
}

impl FromStr for BigNat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Parse(format!("not a decimal natural: {s:?}")));
        }
        let mut value = BigNat::zero();
        let bytes = s.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let end = (i + DECIMAL_CHUNK_LEN).min(bytes.len());
            let chunk: u32 = s[i..end].parse().expect("chunk is ascii digits");
            let scale = 10u32.pow((end - i) as u32);
            value = &value.mul_u32(scale) + &BigNat::from(chunk);
            i = end;
        }
        Ok(value)
    }
}

impl BigNat {
    fn mul_u32(&self, m: u32) -> BigNat {
        let mut digits = Vec::with_capacity(self.digits.len() + 1);
        let mut carry = 0u64;
        for &d in &self.digits {
            let acc = u64::from(d) * u64::from(m) + carry;
            digits.push(acc as u32);
            carry = acc >> BASE_BITS;
        }
        if carry != 0 {
            digits.push(carry as u32);
        }
        BigNat::from_digits(digits)
    }
}

impl fmt::Display for BigNat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut chunks = Vec::new();
        let mut n = self.clone();
        while !n.is_zero() {
            let (q, r) = n.div_rem_u32(DECIMAL_CHUNK);
            chunks.push(r as u32);
            n = q;
        }
        let mut out = String::new();
        for (i, chunk) in chunks.iter().rev().enumerate() {
            if i == 0 {
                out.push_str(&chunk.to_string());
            } else {
                out.push_str(&format!("{chunk:09}"));
            }
        }
        write!(f, "{out}")
    }
}
