//! Infrastructure adapters
//!
//! Implementations of the application's `RandomSource` port.

mod seeded_random_source;
mod sequence_random_source;
mod thread_random_source;

pub use seeded_random_source::SeededRandomSource;
pub use sequence_random_source::SequenceRandomSource;
pub use thread_random_source::ThreadRandomSource;
