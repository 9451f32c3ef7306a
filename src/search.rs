use num_traits::{One, Zero};
use tracing::{debug, info};

use crate::bigint::BigNat;
use crate::error::{Error, Result};
use crate::order::PolyOrder;
use crate::poly::Poly;

/// Walk the trial sequence from x^n - 1 and return the first primitive
/// polynomial. Exhausting the odometer without a hit cannot happen for a
/// prime p and n >= 2, so it reports as an internal error.
pub fn find_one(order: &mut PolyOrder) -> Result<Poly> {
    let p = order.modulus();
    let n = order.degree();
    let mut f = Poly::initial_trial(n, p)?;
    loop {
        let table = f.reduction_table();
        if order.is_primitive(&f, &table)? {
            info!(candidate = %f, tested = order.statistics.polys_tested, "found primitive");
            return Ok(f);
        }
        if !f.next_trial() {
            return Err(Error::Internal(format!(
                "tested every monic degree {n} polynomial mod {p} without finding a primitive one"
            )));
        }
    }
}

/// Walk the whole trial sequence, handing each primitive polynomial to
/// `emit`, stopping early once the a priori count phi(p^n - 1)/n is
/// reached. Returns the number found.
pub fn find_all(order: &mut PolyOrder, mut emit: impl FnMut(&Poly)) -> Result<BigNat> {
    let p = order.modulus();
    let n = order.degree();
    let expected = order.num_primitive_polys().clone();
    let mut found = BigNat::zero();
    let mut f = Poly::initial_trial(n, p)?;
    loop {
        let table = f.reduction_table();
        if order.is_primitive(&f, &table)? {
            emit(&f);
            found += BigNat::one();
            debug!(candidate = %f, found = %found, of = %expected, "primitive");
            if found >= expected {
                break;
            }
        }
        if !f.next_trial() {
            break;
        }
    }
    if found != expected {
        return Err(Error::Internal(format!(
            "found {found} primitive polynomials of degree {n} mod {p}, expected {expected}"
        )));
    }
    Ok(found)
}

/// phi(p^n - 1) / n, the number of primitive degree-n polynomials mod p.
pub fn num_primitive_polys(p: u64, n: u64) -> Result<BigNat> {
    Ok(PolyOrder::new(p, n)?.num_primitive_polys().clone())
}
