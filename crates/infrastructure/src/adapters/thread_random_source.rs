//! Thread-local random source adapter

use application::ports::RandomSource;
use rand::Rng;

/// Random source backed by the thread-local generator
///
/// Stateless; every draw goes to `rand::rng()` of the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandomSource;

impl ThreadRandomSource {
    /// Create a new thread-local random source
    pub const fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRandomSource {
    fn next_f64(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_unit_interval() {
        let source = ThreadRandomSource::new();
        for _ in 0..1_000 {
            let draw = source.next_f64();
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn usable_across_threads() {
        let source = ThreadRandomSource::new();
        let handle = std::thread::spawn(move || source.next_f64());
        let draw = handle.join().unwrap();
        assert!((0.0..1.0).contains(&draw));
    }
}
