//! Error taxonomy for the reconciliation core
//!
//! Every failure a single-resource reconcile pass can produce is one of
//! these variants. All of them surface to the caller of [`reconcile`];
//! nothing is retried or swallowed inside the core.
//!
//! [`reconcile`]: crate::dispatch::reconcile

use thiserror::Error;

use crate::dispatch::TargetKind;

/// Errors surfaced by a single-resource reconcile pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The finder failed for a reason other than not-found.
    #[error("error finding {kind} {name}")]
    Lookup {
        /// Resource kind label
        kind: &'static str,
        /// Identity of the resource being looked up
        name: String,
        /// Underlying backend failure
        #[source]
        source: anyhow::Error,
    },

    /// The ChangeSet holds a modification the backend cannot apply in place.
    ///
    /// Raised by a kind's validator before any backend call is made.
    #[error("cannot change {field} of {kind} {name}: {reason}")]
    Validation {
        kind: &'static str,
        name: String,
        /// The offending ChangeSet field
        field: &'static str,
        reason: String,
    },

    /// The resource kind has no renderer for the active target.
    ///
    /// This is a configuration error, not a backend error.
    #[error("{kind} does not support the {target} target")]
    UnsupportedTarget {
        kind: &'static str,
        target: TargetKind,
    },

    /// A create or update call, or the wait on its operation, failed.
    #[error("error {op} {kind} {name}")]
    Backend {
        kind: &'static str,
        name: String,
        /// What the renderer was doing, e.g. "creating" or "resizing"
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Changed fields survived the imperative renderer.
    ///
    /// Signals a gap between the delta engine's diff granularity and the
    /// renderer's update granularity; no field-level change is ever
    /// silently dropped.
    #[error("cannot apply changes to {kind} {name}: unhandled fields [{}]", .fields.join(", "))]
    IncompleteApply {
        kind: &'static str,
        name: String,
        /// Fields still pending after the renderer ran
        fields: Vec<&'static str>,
    },

    /// Two blocks with the same type and name were emitted into a manifest.
    #[error("duplicate manifest block {block_type}.{name}")]
    DuplicateBlock { block_type: String, name: String },
}
