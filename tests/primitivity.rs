use std::str::FromStr;

use primigen::{
    find_all, find_one, num_primitive_polys, BigNat, Error, Poly, PolyOrder, Residue,
};

fn all_primitives(p: u64, n: u64, skip: bool) -> Vec<String> {
    let mut order = PolyOrder::new(p, n).unwrap().with_skip_optimization(skip);
    let mut found = Vec::new();
    find_all(&mut order, |f| found.push(f.to_string())).unwrap();
    found
}

#[test]
fn find_one_degree_4_mod_2() {
    let mut order = PolyOrder::new(2, 4).unwrap();
    let f = find_one(&mut order).unwrap();
    assert_eq!(f.to_string(), "x^4 + x + 1, 2");
}

#[test]
fn find_all_degree_4_mod_2() {
    let found = all_primitives(2, 4, false);
    assert_eq!(found, vec!["x^4 + x + 1, 2", "x^4 + x^3 + 1, 2"]);
}

#[test]
fn counts_match_euler_phi_over_n() {
    for (p, n, expected) in [
        (2u64, 2u64, 1u64),
        (2, 3, 2),
        (2, 4, 2),
        (2, 5, 6),
        (2, 6, 6),
        (3, 2, 2),
        (3, 3, 4),
        (3, 4, 8),
        (5, 2, 4),
        (5, 3, 20),
        (7, 2, 8),
    ] {
        assert_eq!(
            num_primitive_polys(p, n).unwrap(),
            BigNat::from(expected),
            "expected count for p = {p}, n = {n}"
        );
        // find_all verifies internally that the emitted count matches.
        let found = all_primitives(p, n, false);
        assert_eq!(found.len() as u64, expected, "found count for p = {p}, n = {n}");
    }
}

#[test]
fn every_reported_primitive_retests_primitive() {
    for (p, n) in [(2u64, 5u64), (3, 3), (5, 2)] {
        for text in all_primitives(p, n, false) {
            let f = Poly::from_str(&text).unwrap();
            let mut fresh = PolyOrder::new(p, n).unwrap();
            let table = f.reduction_table();
            assert!(fresh.is_primitive(&f, &table).unwrap(), "{text}");
        }
    }
}

#[test]
fn test_given_primitive() {
    let f = Poly::from_str("x^4 + x + 1, 2").unwrap();
    let mut order = PolyOrder::new(2, 4).unwrap();
    let table = f.reduction_table();
    assert!(order.is_primitive(&f, &table).unwrap());
}

#[test]
fn test_given_irreducible_but_not_primitive() {
    // Irreducible over GF(2), but x has order 5 rather than 15.
    let f = Poly::from_str("x^4 + x^3 + x^2 + x + 1, 2").unwrap();
    let mut order = PolyOrder::new(2, 4).unwrap();
    let table = f.reduction_table();
    assert!(!order.is_primitive(&f, &table).unwrap());

    let mut c = order.statistics.clone();
    let x5 = Residue::x_to_power(&BigNat::from(5u64), &table, &mut c);
    assert!(x5.is_one());
}

#[test]
fn test_given_reducible() {
    let mut order = PolyOrder::new(2, 4).unwrap();
    for text in ["x^4 + 1, 2", "x^4 + x^2 + 1, 2", "x^4 + x, 2"] {
        let f = Poly::from_str(text).unwrap();
        let table = f.reduction_table();
        assert!(!order.is_primitive(&f, &table).unwrap(), "{text}");
    }
}

#[test]
fn fast_cascade_agrees_with_brute_force() {
    for (p, n) in [(2u64, 4u64), (2, 6), (3, 3), (5, 2)] {
        let mut order = PolyOrder::new(p, n).unwrap();
        let mut f = Poly::initial_trial(n, p).unwrap();
        loop {
            let table = f.reduction_table();
            let fast = order.is_primitive(&f, &table).unwrap();
            let slow = order.maximal_order(&f, &table).unwrap();
            assert_eq!(fast, slow, "fast vs brute force for {f}");
            if !f.next_trial() {
                break;
            }
        }
    }
}

#[test]
fn skip_rule_does_not_change_the_decision() {
    for (p, n) in [(2u64, 6u64), (3, 3), (5, 2), (13, 2)] {
        assert_eq!(
            all_primitives(p, n, false),
            all_primitives(p, n, true),
            "skip rule must be decision-neutral for p = {p}, n = {n}"
        );
    }
}

#[test]
fn primitive_polynomials_have_full_order() {
    for (p, n) in [(2u64, 4u64), (3, 3)] {
        let mut order = PolyOrder::new(p, n).unwrap();
        let group_order = order.field_order_minus_1().clone();
        for text in all_primitives(p, n, false) {
            let f = Poly::from_str(&text).unwrap();
            let table = f.reduction_table();
            let one = Residue::x_to_power(&group_order, &table, &mut order.statistics);
            assert!(one.is_one(), "x^(p^n - 1) = 1 for {text}");
            // x^((p^n-1)/q) != 1 for every prime q certifies the order.
            let whole =
                primigen::Factorization::factor(&group_order, Some((p, n)), &mut order.statistics)
                    .unwrap();
            for q in whole.distinct_primes() {
                let (m, _) = group_order.div_rem(q).unwrap();
                let xm = Residue::x_to_power(&m, &table, &mut order.statistics);
                assert!(!xm.is_one(), "x^({m}) != 1 for {text}");
            }
        }
    }
}

#[test]
fn cascade_counters_advance_stage_by_stage() {
    let mut order = PolyOrder::new(2, 4).unwrap();
    let f = find_one(&mut order).unwrap();
    assert_eq!(f.to_string(), "x^4 + x + 1, 2");

    let s = &order.statistics;
    // x^4 + 1 passes the constant-term test but has a root; x^4 + x dies
    // on its zero constant; x^4 + x + 1 runs the whole cascade.
    assert_eq!(s.polys_tested, 3);
    assert_eq!(s.const_coeff_primitive_root, 2);
    assert_eq!(s.free_of_linear_factors, 1);
    assert_eq!(s.irreducible_to_power, 1);
    assert_eq!(s.order_r, 1);
    assert_eq!(s.passed_const_coeff_check, 1);
    assert_eq!(s.order_m, 1);
    assert_eq!(s.max_num_possible_poly, BigNat::from(16u64));
    assert_eq!(s.num_primitive_poly, BigNat::from(2u64));
    assert!(s.squarings > 0);
}

#[test]
fn statistics_render_stable_fields() {
    let mut order = PolyOrder::new(2, 4).unwrap();
    find_one(&mut order).unwrap();
    let text = order.statistics.to_string();
    for field in [
        "Number of trial divisions",
        "Number of gcd's computed",
        "Number of primality tests",
        "Number of squarings",
        "Polynomials tested",
        "Const. coeff. was primitive root",
        "Free of linear factors",
        "Irreducible to power >=1",
        "Had order r (x^r = integer)",
        "Passed const. coeff. test",
        "Had order m (x^m != integer)",
    ] {
        assert!(text.contains(field), "missing field {field:?}");
    }
}

#[test]
fn invalid_inputs_are_rejected() {
    assert!(matches!(PolyOrder::new(4, 2), Err(Error::PNotPrime(4))));
    assert!(matches!(PolyOrder::new(9, 3), Err(Error::PNotPrime(9))));
    assert!(matches!(PolyOrder::new(2, 1), Err(Error::Range(_))));
    assert!(matches!(PolyOrder::new(2, 0), Err(Error::Range(_))));

    // Candidate shape must match the tester.
    let mut order = PolyOrder::new(2, 4).unwrap();
    let f = Poly::from_str("x^3 + x + 1, 2").unwrap();
    let table = f.reduction_table();
    assert!(matches!(
        order.is_primitive(&f, &table),
        Err(Error::Range(_))
    ));
}

// Minutes of factoring work; run with `cargo test -- --ignored`.
#[test]
#[ignore]
fn find_one_degree_19_mod_13() {
    let mut order = PolyOrder::new(13, 19).unwrap();
    let f = find_one(&mut order).unwrap();
    assert_eq!(f.to_string(), "x^19 + 9x + 2, 13");
    assert_eq!(
        order.statistics.max_num_possible_poly.to_string(),
        "1461920290375446110677"
    );
}

#[test]
fn maximal_order_spots_the_primitive() {
    let mut order = PolyOrder::new(2, 4).unwrap();
    let good = Poly::from_str("x^4 + x + 1, 2").unwrap();
    assert!(order.maximal_order(&good, &good.reduction_table()).unwrap());
    let bad = Poly::from_str("x^4 + x^3 + x^2 + x + 1, 2").unwrap();
    assert!(!order.maximal_order(&bad, &bad.reduction_table()).unwrap());
    // x is not even invertible here; the walk never returns to 1.
    let degenerate = Poly::from_str("x^4 + x, 2").unwrap();
    assert!(!order
        .maximal_order(&degenerate, &degenerate.reduction_table())
        .unwrap());
}
