//! Eviction policies shipped with the evaluation engine.
//!
//! | Policy         | Ranking                                  | Hit cost  | Self-conflicts |
//! |----------------|------------------------------------------|-----------|----------------|
//! | `LruPolicy`    | recency                                  | O(1)      | never          |
//! | `FifoPolicy`   | registration order                       | none      | never          |
//! | `LfuPolicy`    | frequency, first-in on ties, newest kept | O(log F)  | never          |
//! | `RandomPolicy` | uniform, seeded `SmallRng`               | none      | yes            |

pub mod fifo;
pub mod lfu;
pub mod lru;
pub mod random;

pub use fifo::FifoPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;
