//! `Random` backed by the process-wide thread RNG.

use rand::Rng;

use marbelous_core::Random;

pub struct ThreadRandom(rand::rngs::ThreadRng);

impl ThreadRandom {
    pub fn new() -> Self {
        ThreadRandom(rand::thread_rng())
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        ThreadRandom::new()
    }
}

impl Random for ThreadRandom {
    fn random_range(&mut self, n: u8) -> u8 {
        if n == 0 {
            return 0;
        }
        self.0.gen_range(0..n)
    }

    fn random_inclusive(&mut self, max: u8) -> u8 {
        self.0.gen_range(0..=max)
    }
}
