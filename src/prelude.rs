pub use crate::builder::{CacheBuilder, CachePolicy, KeyKind};
pub use crate::cache::{CloseReport, EvaluationCache, EvaluationCacheBuilder, EvictionMode};
pub use crate::comparison::{ComparisonPlan, ComparisonPlanBuilder, ComparisonResult, Variation};
pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
pub use crate::entry::{Entry, Victim};
pub use crate::error::{ConfigError, PolicyViolation};
pub use crate::facade::{BenchmarkCache, LoadingCache};
pub use crate::listener::{EvictionListener, EvictionLog};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::EvaluationMetricsSnapshot;
pub use crate::policy::{FifoPolicy, LfuPolicy, LruPolicy, RandomPolicy};
pub use crate::replay::{AccessOutcome, HitRate, Operation, TraceReplay, replay, replay_ops};
pub use crate::trace::{Trace, TraceGenerator, TracePattern};
pub use crate::traits::{EngineStats, EvictionPolicy, IntUniformCache, UniformCache};
