use primigen::{BigNat, Jkiss};

#[test]
fn seeded_streams_are_deterministic() {
    let mut a = Jkiss::seeded(1, 2, 3, 4);
    let mut b = Jkiss::seeded(1, 2, 3, 4);
    for _ in 0..1000 {
        assert_eq!(a.next_u32(), b.next_u32());
    }
}

#[test]
fn different_seeds_diverge() {
    let mut a = Jkiss::seeded(1, 2, 3, 4);
    let mut b = Jkiss::seeded(4, 3, 2, 1);
    let same = (0..100).filter(|_| a.next_u32() == b.next_u32()).count();
    assert!(same < 100);
}

#[test]
fn uniform_draws_stay_in_range() {
    let mut rng = Jkiss::seeded(7, 77, 777, 7777);
    for range in [1u64, 2, 3, 10, 97, 1 << 20] {
        let bound = BigNat::from(range);
        for _ in 0..200 {
            let draw = rng.uniform(&bound);
            assert!(draw < bound, "draw within [0, {range})");
        }
    }
}

#[test]
fn uniform_range_one_is_always_zero() {
    let mut rng = Jkiss::seeded(9, 99, 999, 9999);
    for _ in 0..50 {
        assert!(rng.uniform(&BigNat::from(1u64)).is_zero());
    }
}

#[test]
fn default_seeds_match_reference_state() {
    // The generator starts from the published default seeds; one step must
    // be reproducible forever.
    let mut a = Jkiss::new();
    let mut b = Jkiss::new();
    assert_eq!(a.next_u32(), b.next_u32());
}

#[test]
fn shared_generator_draws() {
    // Exercises the process-wide generator including its entropy reseed.
    let bound = BigNat::from(1000u64);
    for _ in 0..10 {
        let draw = primigen::rng::uniform(&bound).expect("entropy source available");
        assert!(draw < bound);
    }
}
