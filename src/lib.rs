//! Primitive polynomials of degree n modulo a prime p: a primitivity
//! testing engine with the number theory it needs, plus driver loops for
//! finding one or all primitive polynomials of a given degree.

pub mod arith;
pub mod bigint;
pub mod error;
pub mod factor;
pub mod gf;
pub mod order;
pub mod parser;
pub mod poly;
pub mod rng;
pub mod search;
pub mod stats;

pub use bigint::BigNat;
pub use error::{Error, ExitStatus, Result};
pub use factor::{Factorization, Primality, PrimeFactor, NUM_PRIME_TEST_TRIALS};
pub use gf::Residue;
pub use order::PolyOrder;
pub use parser::parse_poly;
pub use poly::{Poly, ReductionTable};
pub use rng::Jkiss;
pub use search::{find_all, find_one, num_primitive_polys};
pub use stats::OperationCount;
