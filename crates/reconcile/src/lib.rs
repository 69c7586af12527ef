//! # Reconcile
//!
//! A kind-agnostic core for declarative resource reconciliation.
//!
//! This crate provides the abstractions for declaring the desired state of
//! a single infrastructure resource, discovering its actual state from a
//! live backend, computing the minimal field-level delta between the two,
//! and applying that delta through one of several interchangeable render
//! targets.
//!
//! ## Core Concepts
//!
//! - **Resource**: a typed, optional-field description of one resource;
//!   the same shape carries desired state, actual state, and deltas
//! - **Field table**: per-kind descriptors that let one shared delta
//!   engine diff any resource shape without reflection
//! - **ChangeSet**: the fields where desired differs from actual, with
//!   claim tracking so no difference is silently dropped
//! - **Task**: the active contract of a kind - finder, change validator,
//!   and one renderer per supported target
//! - **RenderTarget**: the imperative (live API) or declarative (manifest
//!   emission) backend selected for a pass
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{field, reconcile, Field, Outcome, RenderTarget, Resource, Task};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Bucket {
//!     name: String,
//!     location: Option<String>,
//! }
//!
//! impl Resource for Bucket {
//!     fn kind() -> &'static str { "Bucket" }
//!     fn name(&self) -> &str { &self.name }
//!     fn fields() -> &'static [Field<Self>] {
//!         static FIELDS: [Field<Bucket>; 1] = [field!("location", location)];
//!         &FIELDS
//!     }
//! }
//!
//! impl Task<Storage> for Bucket {
//!     fn find(&self, api: &Storage) -> Result<Option<Self>, reconcile::ReconcileError> {
//!         // query the backend; Ok(None) means "does not exist"
//!     }
//!
//!     fn render_api(
//!         &self,
//!         api: &Storage,
//!         actual: Option<&Self>,
//!         changes: &mut reconcile::ChangeSet<Self>,
//!     ) -> Result<(), reconcile::ReconcileError> {
//!         // create when actual is None, otherwise apply and claim changes
//!     }
//! }
//!
//! let outcome = reconcile(&desired, &storage, RenderTarget::Api)?;
//! assert_eq!(outcome, Outcome::Created);
//! ```
//!
//! The reconcile pass for one resource is strictly sequential: find, diff,
//! validate, render. Concurrency across distinct resources belongs to the
//! caller; this crate holds no shared state between resource instances.

pub mod delta;
pub mod dispatch;
pub mod error;
pub mod fields;
pub mod manifest;
pub mod task;

// Re-export main types at crate root
pub use delta::{diff, ChangeSet, Delta};
pub use dispatch::{reconcile, Outcome, RenderTarget, TargetKind};
pub use error::ReconcileError;
pub use fields::{unordered_eq, Field};
pub use manifest::{ManifestDoc, ManifestValue, ResourceBlock};
pub use task::{Resource, Task};
