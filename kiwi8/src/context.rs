//! Context for accessing functionalities of platform that `Kiwi8` is
//! emulated on.
//!
//! Display, sound and keyboard are pulled or pushed by the host through
//! `Kiwi8` itself, the context only supplies what the interpreter cannot
//! produce deterministically on its own.

use nanorand::{rand::pcg64::Pcg64, RNG};

/// Trait aggregating platform functionalities
pub trait Context {
    /// Generate random 8-bit number
    ///
    /// Called by `step` whenever requested by executing program (CXNN)
    fn gen_random(&mut self) -> u8;
}

/// Context backed by a seedable PCG64 generator
///
/// Two interpreters built from contexts with equal seeds run the same
/// program identically.
pub struct SeededContext {
    rng: Pcg64,
}

impl SeededContext {
    pub fn new(seed: u128) -> Self {
        Self {
            rng: Pcg64::new_seed(seed),
        }
    }
}

impl Context for SeededContext {
    fn gen_random(&mut self) -> u8 {
        self.rng.generate::<u8>()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Seeded randomness, or a constant when built with `fixed`
    pub struct TestingContext {
        rng: SeededContext,
        fixed: Option<u8>,
        draws: usize,
    }

    impl TestingContext {
        pub fn new(seed: u128) -> Self {
            Self {
                rng: SeededContext::new(seed),
                fixed: None,
                draws: 0,
            }
        }

        pub fn fixed(value: u8) -> Self {
            Self {
                fixed: Some(value),
                ..Self::new(0)
            }
        }

        /// Number of random bytes handed out so far
        pub fn draws(&self) -> usize {
            self.draws
        }
    }

    impl Context for TestingContext {
        fn gen_random(&mut self) -> u8 {
            self.draws += 1;
            match self.fixed {
                Some(value) => value,
                None => self.rng.gen_random(),
            }
        }
    }

    #[test]
    fn testing_context() {
        let mut ctx = TestingContext::fixed(0xA5);
        assert_eq!(ctx.gen_random(), 0xA5);
        assert_eq!(ctx.gen_random(), 0xA5);
        assert_eq!(ctx.draws(), 2);
    }

    #[test]
    fn seeded_contexts_agree() {
        let mut lhs = SeededContext::new(0xC0FFEE);
        let mut rhs = SeededContext::new(0xC0FFEE);
        for _ in 0..64 {
            assert_eq!(lhs.gen_random(), rhs.gen_random());
        }
    }
}
