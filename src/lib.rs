//! # Nimbus
//!
//! Declarative compute resource management over the `reconcile` engine.
//!
//! Each resource kind in [`tasks`] declares its desired state as a struct
//! of optional fields, knows how to find its actual state through the
//! [`api::ComputeApi`] backend contract, and registers a renderer per
//! supported target: imperative (live backend calls) and declarative
//! (manifest emission). The generic diff, validation, and dispatch logic
//! lives in the `reconcile` crate; nothing here special-cases how a delta
//! is computed or applied.

pub mod api;
pub mod tasks;

pub use api::{ApiResource, ComputeApi, Operation};
pub use tasks::{InstanceGroupManager, InstanceTemplate, TargetPool};
