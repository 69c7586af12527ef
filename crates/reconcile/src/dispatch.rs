//! Target dispatch: the single-resource reconcile entry point

use std::fmt;

use log::{debug, info};

use crate::delta::{diff, ChangeSet, Delta};
use crate::error::ReconcileError;
use crate::manifest::ManifestDoc;
use crate::task::{Resource, Task};

/// Render target tags, as reported in capability errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Imperative backend: live API calls.
    Api,
    /// Declarative backend: manifest emission.
    Manifest,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Api => f.write_str("api"),
            TargetKind::Manifest => f.write_str("manifest"),
        }
    }
}

/// The active deployment target for one reconcile pass.
pub enum RenderTarget<'a> {
    /// Converge the live backend through the kind's imperative renderer.
    Api,
    /// Emit the desired end-state into a shared manifest document.
    Manifest(&'a mut ManifestDoc),
}

/// What a reconcile pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No actual state existed; the resource was created.
    Created,
    /// Targeted updates were applied for these fields.
    Updated { fields: Vec<&'static str> },
    /// Actual already matched desired; no backend call was made.
    Unchanged,
    /// A manifest block was emitted.
    Rendered,
}

/// Reconcile a single resource against the active target.
///
/// Runs the fixed sequence find, diff, validate, dispatch. The sequence is
/// synchronous and blocking; operation waits inside the imperative
/// renderer suspend the calling thread. Every error propagates to the
/// caller; nothing is retried and no partial state is rolled back.
pub fn reconcile<A, T: Task<A> + 'static>(
    desired: &T,
    api: &A,
    target: RenderTarget<'_>,
) -> Result<Outcome, ReconcileError> {
    let actual = desired.find(api)?;

    let mut changes = match diff(desired, actual.as_ref()) {
        Delta::Create => ChangeSet::empty(),
        Delta::Update(changes) => changes,
    };

    desired.check_changes(actual.as_ref(), &changes)?;

    match target {
        RenderTarget::Api => {
            if actual.is_some() && changes.is_empty() {
                debug!("{} {}: in sync", T::kind(), desired.name());
                return Ok(Outcome::Unchanged);
            }

            let creating = actual.is_none();
            let changed = changes.pending();
            desired.render_api(api, actual.as_ref(), &mut changes)?;

            if !changes.is_empty() {
                return Err(ReconcileError::IncompleteApply {
                    kind: T::kind(),
                    name: desired.name().to_string(),
                    fields: changes.pending(),
                });
            }

            if creating {
                info!("{} {}: created", T::kind(), desired.name());
                Ok(Outcome::Created)
            } else {
                info!(
                    "{} {}: updated [{}]",
                    T::kind(),
                    desired.name(),
                    changed.join(", ")
                );
                Ok(Outcome::Updated { fields: changed })
            }
        }
        RenderTarget::Manifest(doc) => {
            desired.render_manifest(doc)?;
            Ok(Outcome::Rendered)
        }
    }
}
