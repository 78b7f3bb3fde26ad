//! # mute-service
//!
//! Application layer: the sanction engine, its inline expiry timers and the
//! periodic expiry reconciler.

pub mod services;

pub use services::{
    AppliedHardSanction, EngineOptions, ExpiryOutcome, ExpiryReconciler, PassReport,
    ReadinessGate, ReversalResult, SanctionEngine, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
