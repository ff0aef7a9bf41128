pub mod intrusive_list;
pub mod slot_arena;

pub use intrusive_list::IntrusiveList;
pub use slot_arena::{SlotArena, SlotId};

/// Largest node reservation made up front; bigger caches grow on demand.
const MAX_PREALLOCATION: usize = 1 << 16;

/// Node slots reserved for a policy of `capacity` entries, including the one
/// spare slot an evict-after insertion occupies before its victim leaves.
pub(crate) fn preallocation(capacity: usize) -> usize {
    capacity.saturating_add(1).min(MAX_PREALLOCATION)
}
