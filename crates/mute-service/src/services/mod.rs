//! Sanction lifecycle services
//!
//! The engine owns every write to the sanction and snapshot stores. The
//! reconciler and the inline timers only ever reach the stores through it.

pub mod context;
pub mod engine;
pub mod error;
pub mod key_lock;
pub mod readiness;
pub mod reconciler;
pub mod timer;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use engine::{AppliedHardSanction, EngineOptions, ExpiryOutcome, ReversalResult, SanctionEngine};
pub use error::{ServiceError, ServiceResult};
pub use readiness::ReadinessGate;
pub use reconciler::{ExpiryReconciler, PassReport};
