//! Resample-with-replacement, grounded in the teacher's
//! `src/stats/rand_util.rs` + `src/stats/univariate/resamples.rs` (oorandom-backed,
//! reseeded per resampler from a thread-local generator).

use oorandom::Rand64;
use std::cell::RefCell;
use std::time::{SystemTime, UNIX_EPOCH};

thread_local! {
    static SEED_RNG: RefCell<Rand64> = RefCell::new(Rand64::new(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos(),
    ));
}

fn fresh_rng() -> Rand64 {
    SEED_RNG.with(|r| {
        let mut r = r.borrow_mut();
        let seed = ((r.rand_u64() as u128) << 64) | (r.rand_u64() as u128);
        Rand64::new(seed)
    })
}

/// Draws `values.len()` entries uniformly at random from `values`, with replacement.
pub struct Resampler<'a> {
    values: &'a [f64],
    rng: Rand64,
}

impl<'a> Resampler<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        Resampler {
            values,
            rng: fresh_rng(),
        }
    }

    /// Seeded constructor, for deterministic tests.
    pub fn with_seed(values: &'a [f64], seed: u128) -> Self {
        Resampler {
            values,
            rng: Rand64::new(seed),
        }
    }

    pub fn next_resample(&mut self) -> Vec<f64> {
        let n = self.values.len();
        (0..n)
            .map(|_| {
                let idx = self.rng.rand_range(0..n as u64) as usize;
                self.values[idx]
            })
            .collect()
    }
}

/// One-shot convenience wrapper around [`Resampler`].
pub fn resample_with_replacement(values: &[f64]) -> Vec<f64> {
    Resampler::new(values).next_resample()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn resample_has_same_length() {
        let v: Vec<f64> = (0..37).map(|i| i as f64).collect();
        let r = resample_with_replacement(&v);
        assert_eq!(r.len(), v.len());
    }

    #[test]
    fn resample_is_subset_of_input_values() {
        let v: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let allowed: HashSet<u64> = v.iter().map(|&x| x as u64).collect();
        let mut resampler = Resampler::with_seed(&v, 0xC0FFEE);
        for _ in 0..10 {
            let resample = resampler.next_resample();
            for value in resample {
                assert!(allowed.contains(&(value as u64)));
            }
        }
    }

    #[test]
    fn empty_input_yields_empty_resample() {
        let v: Vec<f64> = vec![];
        assert!(resample_with_replacement(&v).is_empty());
    }
}
