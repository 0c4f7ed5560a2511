//! Injectable randomness for the fallback reply pool.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chooses an index into the fallback pool.
pub trait FallbackPicker: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform pick from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl FallbackPicker for ThreadRngPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible uniform pick from a seeded RNG.
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl FallbackPicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(0..len)
    }
}

/// Always returns the same index (clamped to the pool).
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl FallbackPicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let a = SeededPicker::new(7);
        let b = SeededPicker::new(7);
        let seq_a: Vec<_> = (0..20).map(|_| a.pick(5)).collect();
        let seq_b: Vec<_> = (0..20).map(|_| b.pick(5)).collect();
        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().all(|&i| i < 5));
    }

    #[test]
    fn test_thread_rng_picker_in_range() {
        let picker = ThreadRngPicker;
        for _ in 0..100 {
            assert!(picker.pick(3) < 3);
        }
    }

    #[test]
    fn test_fixed_picker_clamps() {
        assert_eq!(FixedPicker(2).pick(5), 2);
        assert_eq!(FixedPicker(10).pick(5), 4);
    }
}
