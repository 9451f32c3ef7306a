use std::str::FromStr;

use primigen::{BigNat, Error, Jkiss, OperationCount, Poly, Residue};

fn counts() -> OperationCount {
    OperationCount::new(0, 0)
}

fn poly(s: &str) -> Poly {
    Poly::from_str(s).expect("parse polynomial")
}

/// x^k mod f by plain long division against the monic f, for checking the
/// table rows independently.
fn naive_x_power_mod(f: &Poly, k: usize) -> Vec<u64> {
    let n = f.degree();
    let p = f.modulus();
    let mut v = vec![0u64; k + 1];
    v[k] = 1;
    for i in (n..=k).rev() {
        let c = v[i];
        if c == 0 {
            continue;
        }
        v[i] = 0;
        for j in 0..n {
            let sub = u128::from(c) * u128::from(f.coeff(j)) % u128::from(p);
            let neg = (u128::from(p) - sub) % u128::from(p);
            v[i - n + j] = ((u128::from(v[i - n + j]) + neg) % u128::from(p)) as u64;
        }
    }
    v.truncate(n);
    v
}

#[test]
fn initial_trial_is_x_n_minus_1() {
    let f = Poly::initial_trial(4, 2).unwrap();
    assert_eq!(f.coeffs(), &[1, 0, 0, 0, 1]);
    assert_eq!(f.to_string(), "x^4 + 1, 2");

    let g = Poly::initial_trial(3, 7).unwrap();
    assert_eq!(g.coeffs(), &[6, 0, 0, 1]);
    assert_eq!(g.to_string(), "x^3 + 6, 7");

    assert!(Poly::initial_trial(1, 2).is_err());
    assert!(Poly::initial_trial(4, 1).is_err());
}

#[test]
fn odometer_counts_the_window() {
    // Starting at x^2 + 2 mod 3, the odometer walks the remaining base-3
    // values of (a0, a1) and stops on carry out of a1.
    let mut f = Poly::initial_trial(2, 3).unwrap();
    let mut visited = 1u64;
    while f.next_trial() {
        visited += 1;
    }
    assert_eq!(visited, 9 - 2); // p^n minus the skipped x^2 + c, c < p - 1
}

#[test]
fn odometer_order_is_low_coefficient_first() {
    let mut f = Poly::initial_trial(2, 2).unwrap();
    assert_eq!(f.coeffs(), &[1, 0, 1]); // x^2 + 1
    assert!(f.next_trial());
    assert_eq!(f.coeffs(), &[0, 1, 1]); // x^2 + x
    assert!(f.next_trial());
    assert_eq!(f.coeffs(), &[1, 1, 1]); // x^2 + x + 1
    assert!(!f.next_trial());
}

#[test]
fn construction_validates() {
    assert!(Poly::new(vec![1, 1, 1], 2).is_ok());
    assert!(matches!(Poly::new(vec![1, 2, 1], 2), Err(Error::Range(_)))); // coeff >= p
    assert!(matches!(Poly::new(vec![1, 1, 2], 3), Err(Error::Range(_)))); // not monic
    assert!(matches!(Poly::new(vec![1], 2), Err(Error::Range(_)))); // constant
    assert!(matches!(Poly::new(vec![1, 1], 1), Err(Error::Range(_)))); // bad modulus
}

#[test]
fn horner_evaluation() {
    let f = poly("x^2 + x + 1, 2");
    assert_eq!(f.eval_at(0), 1);
    assert_eq!(f.eval_at(1), 1);

    let g = poly("x^2 + 3x + 4, 5");
    assert_eq!(g.eval_at(0), 4);
    assert_eq!(g.eval_at(2), 4); // 4 + 6 + 4 = 14 = 4 mod 5
    assert_eq!(g.eval_at(7), g.eval_at(2)); // arguments reduce mod p
}

#[test]
fn linear_factor_detection() {
    assert!(poly("x^2 + 1, 2").has_linear_factor()); // (x + 1)^2
    assert!(!poly("x^2 + x + 1, 2").has_linear_factor());
    assert!(poly("x^3 + x + 2, 3").has_linear_factor()); // f(1) = 4 = 1? no: 1+1+2 = 4 = 1
    assert!(!poly("x^2 + 1, 3").has_linear_factor());
}

#[test]
fn display_matches_external_form() {
    assert_eq!(poly("x^4 + x + 1, 2").to_string(), "x^4 + x + 1, 2");
    assert_eq!(
        poly("x ^ 19 + 9 x + 2, 13").to_string(),
        "x^19 + 9x + 2, 13"
    );
    // Default modulus is 2.
    assert_eq!(poly("x^4 + x^3 + 1").to_string(), "x^4 + x^3 + 1, 2");
}

#[test]
fn parse_rejects_bad_input() {
    assert!(matches!(Poly::from_str("x^4 + 2, 2"), Err(Error::Range(_))));
    assert!(matches!(Poly::from_str("x^2 + 1, 1"), Err(Error::Range(_))));
    assert!(matches!(
        Poly::from_str("2x^2 + 1, 3"),
        Err(Error::Range(_))
    ));
    assert!(Poly::from_str("x^2 + + 1, 3").is_err());
    assert!(Poly::from_str("y^2 + 1, 3").is_err());
    assert!(matches!(
        Poly::from_str("x^2 + x^2 + 1, 3"),
        Err(Error::Parse(_))
    ));
}

#[test]
fn reduction_table_known_rows() {
    let f = poly("x^4 + x + 1, 2");
    let table = f.reduction_table();
    assert_eq!(table.row(4), &[1, 1, 0, 0]); // x^4 = x + 1
    assert_eq!(table.row(5), &[0, 1, 1, 0]); // x^5 = x^2 + x
    assert_eq!(table.row(6), &[0, 0, 1, 1]); // x^6 = x^3 + x^2
}

#[test]
fn reduction_table_agrees_with_long_division() {
    let mut rng = Jkiss::seeded(31, 41, 59, 26);
    for p in [2u64, 3, 5, 13] {
        for n in [2usize, 3, 5, 8] {
            for _ in 0..5 {
                let mut coeffs: Vec<u64> =
                    (0..n).map(|_| u64::from(rng.next_u32()) % p).collect();
                coeffs.push(1);
                let f = Poly::new(coeffs, p).unwrap();
                let table = f.reduction_table();
                for k in n..=2 * n - 2 {
                    assert_eq!(
                        table.row(k),
                        naive_x_power_mod(&f, k).as_slice(),
                        "row {k} of {f}"
                    );
                }
            }
        }
    }
}

#[test]
fn square_agrees_with_product() {
    let mut rng = Jkiss::seeded(2, 7, 18, 28);
    for p in [2u64, 3, 13] {
        for n in [2usize, 4, 7] {
            let mut coeffs: Vec<u64> = (0..n).map(|_| u64::from(rng.next_u32()) % p).collect();
            coeffs.push(1);
            let f = Poly::new(coeffs, p).unwrap();
            let table = f.reduction_table();
            for _ in 0..5 {
                let g = Residue::from_coeffs(
                    (0..n).map(|_| u64::from(rng.next_u32()) % p).collect(),
                );
                let via_product = g.product(&g, &table);
                let mut via_square = g.clone();
                via_square.square(&table, &mut counts());
                assert_eq!(via_square, via_product, "g^2 under {f}");
            }
        }
    }
}

#[test]
fn x_to_power_small_exponents() {
    let f = poly("x^4 + x + 1, 2");
    let table = f.reduction_table();
    let mut c = counts();
    assert!(Residue::x_to_power(&BigNat::from(0u64), &table, &mut c).is_one());
    assert_eq!(
        Residue::x_to_power(&BigNat::from(1u64), &table, &mut c),
        Residue::x(4)
    );
    assert_eq!(
        Residue::x_to_power(&BigNat::from(4u64), &table, &mut c).coeffs(),
        &[1, 1, 0, 0]
    );
    // x generates the full group for this f: order 15.
    assert!(Residue::x_to_power(&BigNat::from(15u64), &table, &mut c).is_one());
    assert!(!Residue::x_to_power(&BigNat::from(5u64), &table, &mut c).is_constant());
    assert!(c.squarings > 0);
}

#[test]
fn x_to_power_matches_repeated_times_x() {
    let f = poly("x^3 + 2x + 1, 3");
    let table = f.reduction_table();
    let mut c = counts();
    let mut stepped = Residue::one(3);
    for k in 0..40u64 {
        assert_eq!(
            Residue::x_to_power(&BigNat::from(k), &table, &mut c),
            stepped,
            "x^{k} mod {f}"
        );
        stepped.times_x(&table);
    }
}

#[test]
fn times_x_folds_the_overflow_term() {
    let f = poly("x^2 + 1, 3"); // x^2 = -1 = 2
    let table = f.reduction_table();
    let mut g = Residue::x(2);
    g.times_x(&table); // x * x = x^2 = 2
    assert!(g.is_constant());
    assert_eq!(g.constant_term(), 2);
}

#[test]
fn candidate_space_size() {
    let f = Poly::initial_trial(19, 13).unwrap();
    assert_eq!(f.num_candidates().to_string(), "1461920290375446110677");
}
