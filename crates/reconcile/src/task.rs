//! Resource and task contracts
//!
//! [`Resource`] is the passive shape of a kind: identity plus the field
//! table the delta engine consumes. [`Task`] adds the active capabilities a
//! kind registers against a backend handle: the finder, the change
//! validator, and one renderer per supported target.

use std::fmt;

use crate::delta::ChangeSet;
use crate::dispatch::TargetKind;
use crate::error::ReconcileError;
use crate::fields::Field;
use crate::manifest::ManifestDoc;

/// Passive contract of a resource kind: identity and diffable shape.
///
/// The same struct serves as desired state, actual state, and delta
/// payload. `Option` fields distinguish don't-care (`None`) from
/// explicitly set; the identity name is always present once the resource
/// is defined and is therefore not optional.
pub trait Resource: Default + Clone + fmt::Debug {
    /// Kind label used in errors, logs, and backend calls.
    fn kind() -> &'static str;

    /// Identity key for lookup and comparison.
    fn name(&self) -> &str;

    /// Field table consumed by the delta engine.
    fn fields() -> &'static [Field<Self>];
}

/// Active contract of a resource kind against a backend handle `A`.
///
/// `find` and `check_changes` run on every reconcile pass. The `render_*`
/// methods are per-target capabilities: the defaults fail with
/// [`ReconcileError::UnsupportedTarget`], so a kind supports a target by
/// overriding the matching method, and the dispatcher's invocation is the
/// capability lookup.
pub trait Task<A>: Resource {
    /// Fetch the actual state for this resource's identity.
    ///
    /// `Ok(None)` means the backend reports the resource does not exist;
    /// any other failure is a [`ReconcileError::Lookup`]. Must not mutate
    /// the backend, and must canonicalize backend reference formats (full
    /// resource URLs) down to the field shape the desired state uses.
    fn find(&self, api: &A) -> Result<Option<Self>, ReconcileError>;

    /// Reject changes the backend cannot apply in place.
    ///
    /// Runs once per pass, after diffing and before dispatch, so an
    /// unsupported modification fails before any backend call. The default
    /// accepts everything; kinds with update limitations override it.
    fn check_changes(
        &self,
        actual: Option<&Self>,
        changes: &ChangeSet<Self>,
    ) -> Result<(), ReconcileError> {
        let _ = (actual, changes);
        Ok(())
    }

    /// Imperative renderer: create the resource or apply targeted updates.
    ///
    /// With no actual state, builds the full creation request from the set
    /// desired fields and blocks on the backend operation. Otherwise it
    /// issues one update call per recognized field group and
    /// [claims](ChangeSet::claim) each field it handled; the dispatcher
    /// reports anything left pending.
    fn render_api(
        &self,
        api: &A,
        actual: Option<&Self>,
        changes: &mut ChangeSet<Self>,
    ) -> Result<(), ReconcileError> {
        let _ = (api, actual, changes);
        Err(ReconcileError::UnsupportedTarget {
            kind: Self::kind(),
            target: TargetKind::Api,
        })
    }

    /// Declarative renderer: emit the desired end-state as a manifest block.
    ///
    /// Ignores actual state and ChangeSet entirely; declarative targets
    /// always receive the full desired state, never a diff.
    fn render_manifest(&self, doc: &mut ManifestDoc) -> Result<(), ReconcileError> {
        let _ = doc;
        Err(ReconcileError::UnsupportedTarget {
            kind: Self::kind(),
            target: TargetKind::Manifest,
        })
    }
}
