//! Injected comment-id generation seam.
//!
//! Ids used to be derived from creation timestamps, which made them
//! unpredictable in tests and collision-prone within one millisecond. The
//! store now takes a generator so production uses UUIDs while tests inject a
//! deterministic counter.

use uuid::Uuid;

/// Produces fresh comment ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Production generator: random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator for tests: `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};

    #[test]
    fn sequential_ids_are_predictable() {
        let mut generator = SequentialIdGenerator::new("c");
        assert_eq!(generator.next_id(), "c-1");
        assert_eq!(generator.next_id(), "c-2");
    }

    #[test]
    fn uuid_ids_are_distinct() {
        let mut generator = UuidIdGenerator;
        assert_ne!(generator.next_id(), generator.next_id());
    }
}
