use std::fmt;

use num_traits::Zero;

use crate::bigint::BigNat;

/// Operation tallies for one search run, updated by the factorizer and the
/// primitivity tester and rendered on request.
#[derive(Clone, Debug)]
pub struct OperationCount {
    pub n: u64,
    pub p: u64,

    pub max_num_possible_poly: BigNat,
    pub num_primitive_poly: BigNat,

    pub trial_divisions: u64,
    pub gcds: u64,
    pub primality_tests: u64,
    pub squarings: u64,

    pub polys_tested: u64,
    pub const_coeff_primitive_root: u64,
    pub free_of_linear_factors: u64,
    pub irreducible_to_power: u64,
    pub order_r: u64,
    pub passed_const_coeff_check: u64,
    pub order_m: u64,
}

impl OperationCount {
    pub fn new(p: u64, n: u64) -> Self {
        OperationCount {
            n,
            p,
            max_num_possible_poly: BigNat::zero(),
            num_primitive_poly: BigNat::zero(),
            trial_divisions: 0,
            gcds: 0,
            primality_tests: 0,
            squarings: 0,
            polys_tested: 0,
            const_coeff_primitive_root: 0,
            free_of_linear_factors: 0,
            irreducible_to_power: 0,
            order_r: 0,
            passed_const_coeff_check: 0,
            order_m: 0,
        }
    }
}

impl fmt::Display for OperationCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+--------- OperationCount --------------------------------")?;
        writeln!(f, "|")?;
        writeln!(
            f,
            "| Integer factorization:  Table lookup + Trial division + Pollard Rho"
        )?;
        writeln!(f, "|")?;
        writeln!(f, "| Number of trial divisions :           {}", self.trial_divisions)?;
        writeln!(f, "| Number of gcd's computed :            {}", self.gcds)?;
        writeln!(f, "| Number of primality tests :           {}", self.primality_tests)?;
        writeln!(f, "| Number of squarings :                 {}", self.squarings)?;
        writeln!(f, "|")?;
        writeln!(f, "| Polynomial Testing")?;
        writeln!(f, "|")?;
        writeln!(
            f,
            "| Total num. degree {} poly mod {} :      {}",
            self.n, self.p, self.max_num_possible_poly
        )?;
        writeln!(
            f,
            "| Number of possible primitive poly :   {}",
            self.num_primitive_poly
        )?;
        writeln!(f, "| Polynomials tested :                  {}", self.polys_tested)?;
        writeln!(
            f,
            "| Const. coeff. was primitive root :    {}",
            self.const_coeff_primitive_root
        )?;
        writeln!(
            f,
            "| Free of linear factors :              {}",
            self.free_of_linear_factors
        )?;
        writeln!(
            f,
            "| Irreducible to power >=1 :            {}",
            self.irreducible_to_power
        )?;
        writeln!(f, "| Had order r (x^r = integer) :         {}", self.order_r)?;
        writeln!(
            f,
            "| Passed const. coeff. test :           {}",
            self.passed_const_coeff_check
        )?;
        writeln!(f, "| Had order m (x^m != integer) :        {}", self.order_m)?;
        writeln!(f, "|")?;
        write!(f, "+-----------------------------------------------------")
    }
}
