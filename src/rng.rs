use std::fs::File;
use std::io::Read;
use std::sync::{Mutex, OnceLock};

use crate::bigint::BigNat;
use crate::error::{Error, Result};

/// JKISS combines a linear congruential stream, an xor-shift stream and a
/// multiply-with-carry stream; period is about 2^127.
#[derive(Clone, Debug)]
pub struct Jkiss {
    x: u32,
    y: u32,
    z: u32,
    c: u32,
}

const MWC_MULTIPLIER: u64 = 4_294_584_393;
const CARRY_LIMIT: u32 = 698_769_068;

/// How many uniform draws between entropy reseeds of the shared generator.
pub const RESEED_INTERVAL: u64 = 10_000;

impl Jkiss {
    /// Fixed default seeds; the shared generator reseeds from the OS before
    /// its first draw.
    pub fn new() -> Self {
        Jkiss {
            x: 123_456_789,
            y: 987_654_321,
            z: 43_219_876,
            c: 6_543_217,
        }
    }

    /// Deterministic generator for tests.
    pub fn seeded(x: u32, y: u32, z: u32, c: u32) -> Self {
        assert!(y != 0, "xor-shift seed must be nonzero");
        Jkiss {
            x,
            y,
            z,
            c: c % CARRY_LIMIT + 1,
        }
    }

    pub fn reseed_from_os(&mut self) -> Result<()> {
        self.x = entropy_word()?;
        // The xor-shift stream sticks at zero.
        loop {
            self.y = entropy_word()?;
            if self.y != 0 {
                break;
            }
        }
        self.z = entropy_word()?;
        // Keep c in range and nonzero so z = c = 0 cannot happen.
        self.c = entropy_word()? % CARRY_LIMIT + 1;
        Ok(())
    }

    pub fn next_u32(&mut self) -> u32 {
        self.x = self.x.wrapping_mul(314_527_869).wrapping_add(1_234_567);

        self.y ^= self.y << 5;
        self.y ^= self.y >> 7;
        self.y ^= self.y << 22;

        let t = MWC_MULTIPLIER * u64::from(self.z) + u64::from(self.c);
        self.c = (t >> 32) as u32;
        self.z = t as u32;

        self.x.wrapping_add(self.y).wrapping_add(self.z)
    }

    /// Uniform draw in [0, range). Values above the largest multiple of
    /// `range` below 2^32 are rejected and redrawn; without that the low
    /// residues would be slightly over-represented.
    pub fn uniform(&mut self, range: &BigNat) -> BigNat {
        assert!(!range.is_zero(), "empty range");
        match range.to_u64() {
            Some(r) if r <= u64::from(u32::MAX) => {
                // Largest multiple of the range at or below 2^32.
                let bound = (1u64 << 32) / r * r;
                let mut draw = u64::from(self.next_u32());
                while draw >= bound {
                    draw = u64::from(self.next_u32());
                }
                BigNat::from(draw % r)
            }
            // Range exceeds the generator; return a raw word rather than
            // scale up non-uniformly.
            _ => BigNat::from(self.next_u32()),
        }
    }
}

impl Default for Jkiss {
    fn default() -> Self {
        Jkiss::new()
    }
}

fn entropy_word() -> Result<u32> {
    let mut file = File::open("/dev/urandom")
        .map_err(|e| Error::Factor(format!("cannot open entropy source: {e}")))?;
    let mut bytes = [0u8; 4];
    file.read_exact(&mut bytes)
        .map_err(|e| Error::Factor(format!("cannot read entropy source: {e}")))?;
    Ok(u32::from_le_bytes(bytes))
}

struct SharedRng {
    generator: Jkiss,
    draws: u64,
}

static SHARED: OnceLock<Mutex<SharedRng>> = OnceLock::new();

/// Uniform draw in [0, range) from the process-wide generator, reseeding
/// from OS entropy on the first draw and every `RESEED_INTERVAL` draws
/// thereafter.
pub fn uniform(range: &BigNat) -> Result<BigNat> {
    let shared = SHARED.get_or_init(|| {
        Mutex::new(SharedRng {
            generator: Jkiss::new(),
            draws: 0,
        })
    });
    let mut rng = shared
        .lock()
        .map_err(|_| Error::Internal("random generator lock poisoned".into()))?;
    if rng.draws % RESEED_INTERVAL == 0 {
        rng.generator.reseed_from_os()?;
    }
    rng.draws += 1;
    Ok(rng.generator.uniform(range))
}
