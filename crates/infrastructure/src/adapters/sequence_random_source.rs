//! Scripted random source adapter
//!
//! Replays a fixed list of draws in order and starts over when exhausted.
//! Used by harnesses that need to steer individual chaos decisions.

use std::sync::atomic::{AtomicUsize, Ordering};

use application::ports::RandomSource;

/// Largest `f64` strictly below 1.0
const MAX_DRAW: f64 = 1.0 - f64::EPSILON / 2.0;

/// Random source replaying scripted values
///
/// Values are clamped into [0, 1) at construction; `NaN` becomes 0.0. An
/// empty script always yields 0.0.
#[derive(Debug, Default)]
pub struct SequenceRandomSource {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl SequenceRandomSource {
    /// Create a source replaying `values`
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().map(clamp_draw).collect(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of draws taken so far
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Scripted values after clamping
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

fn clamp_draw(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_DRAW)
    }
}

impl RandomSource for SequenceRandomSource {
    fn next_f64(&self) -> f64 {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        if self.values.is_empty() {
            return 0.0;
        }
        self.values[index % self.values.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_in_order_and_cycles() {
        let source = SequenceRandomSource::new([0.1, 0.5, 0.9]);
        let draws: Vec<f64> = (0..5).map(|_| source.next_f64()).collect();
        assert_eq!(draws, vec![0.1, 0.5, 0.9, 0.1, 0.5]);
        assert_eq!(source.draws(), 5);
    }

    #[test]
    fn empty_script_yields_zero() {
        let source = SequenceRandomSource::default();
        assert!(source.next_f64().abs() < f64::EPSILON);
        assert!(source.next_f64().abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let source = SequenceRandomSource::new([-0.5, 1.0, 7.0, f64::NAN]);
        assert_eq!(source.values()[0], 0.0);
        assert!(source.values()[1] < 1.0);
        assert!(source.values()[2] < 1.0);
        assert_eq!(source.values()[3], 0.0);
    }

    #[test]
    fn clamped_one_still_fails_certain_rejection() {
        let source = SequenceRandomSource::new([1.0]);
        let draw = source.next_f64();
        assert!(draw < 1.0);
        assert!(draw > 0.999);
    }
}
