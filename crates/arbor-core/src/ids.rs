//! # Identifier Allocation
//!
//! Supplies globally unique ids for topics, versions and resources.

use std::fmt::Debug;
use uuid::Uuid;

/// Allocator handed to the store at construction.
pub trait IdAllocator: Send + Sync + Debug {
    fn allocate(&mut self) -> Uuid;
}

/// Random v4 UUIDs. The production default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdAllocator for RandomIds {
    fn allocate(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Counter-backed UUIDs (`00000000-0000-0000-0000-000000000001`, ...).
///
/// Deterministic, so two stores fed the same operations hand out the same
/// ids. Meant for tests and benchmarks.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdAllocator for SequentialIds {
    fn allocate(&mut self) -> Uuid {
        self.next = self.next.saturating_add(1);
        Uuid::from_u128(self.next)
    }
}
