//! Training state shared between updates: learning rate, update counter
//! (used for weight averaging) and the dropout random source.

use oorandom::Rand64;

/// Default learning rate for perceptron updates.
pub const DEFAULT_LEARN_RATE: f32 = 1.0;

/// Optimizer handle passed to every training update.
#[derive(Debug, Clone)]
pub struct Optimizer {
    learn_rate: f32,
    step: u64,
    rng: Rand64,
}

impl Optimizer {
    pub fn new(learn_rate: f32, seed: u64) -> Self {
        Self {
            learn_rate,
            step: 0,
            rng: Rand64::new(u128::from(seed)),
        }
    }

    pub fn learn_rate(&self) -> f32 {
        self.learn_rate
    }

    /// Number of updates applied so far.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Advance to the next update and return its step number (1-based).
    pub fn next_step(&mut self) -> u64 {
        self.step += 1;
        self.step
    }

    /// Decide whether an input survives dropout at rate `drop`.
    pub fn keep(&mut self, drop: f32) -> bool {
        drop <= 0.0 || self.rng.rand_float() as f32 >= drop
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(DEFAULT_LEARN_RATE, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_counter() {
        let mut opt = Optimizer::default();
        assert_eq!(opt.step(), 0);
        assert_eq!(opt.next_step(), 1);
        assert_eq!(opt.next_step(), 2);
        assert_eq!(opt.step(), 2);
    }

    #[test]
    fn test_keep_without_dropout() {
        let mut opt = Optimizer::new(1.0, 7);
        assert!((0..100).all(|_| opt.keep(0.0)));
    }

    #[test]
    fn test_keep_rate() {
        let mut opt = Optimizer::new(1.0, 42);
        let kept = (0..10_000).filter(|_| opt.keep(0.5)).count();
        assert!(kept > 4_000 && kept < 6_000, "kept {kept}");
    }
}
