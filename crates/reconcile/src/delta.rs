//! Delta computation between desired and actual state

use std::collections::BTreeSet;

use log::debug;

use crate::task::Resource;

/// The set of fields where desired differs from actual.
///
/// Carries the delta payload (a resource value with only the differing
/// fields populated) plus the pending-name set the completeness check runs
/// against. Once validated, a ChangeSet is only ever mutated through
/// [`claim`](ChangeSet::claim).
#[derive(Debug, Clone)]
pub struct ChangeSet<R> {
    delta: R,
    pending: BTreeSet<&'static str>,
}

impl<R: Resource> ChangeSet<R> {
    /// An empty ChangeSet, as used on the creation path.
    pub fn empty() -> Self {
        Self {
            delta: R::default(),
            pending: BTreeSet::new(),
        }
    }

    /// Whether every observed difference has been claimed.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether a field is still pending.
    pub fn contains(&self, field: &str) -> bool {
        self.pending.contains(field)
    }

    /// Mark one field as handled after its update call succeeded.
    ///
    /// Returns whether the field was actually pending.
    pub fn claim(&mut self, field: &str) -> bool {
        self.pending.remove(field)
    }

    /// The delta payload: only differing fields are populated.
    pub fn delta(&self) -> &R {
        &self.delta
    }

    /// Pending field names, sorted.
    pub fn pending(&self) -> Vec<&'static str> {
        self.pending.iter().copied().collect()
    }
}

/// Outcome of diffing desired against actual.
#[derive(Debug)]
pub enum Delta<R> {
    /// No actual state exists: the reconcile is a creation. There is no
    /// ChangeSet to build against a missing baseline.
    Create,
    /// Actual state exists; the ChangeSet may be empty.
    Update(ChangeSet<R>),
}

/// Compare desired against actual, field by field.
///
/// Fields not set on the desired resource are don't-care: they are never
/// compared and never enter the ChangeSet, whatever the actual value.
/// Equality per field comes from the kind's descriptor table, so reference
/// lists and other composites compare by identity, not representation.
pub fn diff<R: Resource + 'static>(desired: &R, actual: Option<&R>) -> Delta<R> {
    let Some(actual) = actual else {
        debug!("{} {}: no actual state", R::kind(), desired.name());
        return Delta::Create;
    };

    let mut delta = R::default();
    let mut pending = BTreeSet::new();
    for field in R::fields() {
        if !(field.is_set)(desired) {
            continue;
        }
        if (field.differs)(desired, actual) {
            (field.copy)(desired, &mut delta);
            pending.insert(field.name);
        }
    }

    if !pending.is_empty() {
        debug!(
            "{} {}: changed fields [{}]",
            R::kind(),
            desired.name(),
            pending.iter().copied().collect::<Vec<_>>().join(", ")
        );
    }

    Delta::Update(ChangeSet { delta, pending })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;
    use crate::fields::{unordered_eq, Field};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Endpoint {
        name: String,
        port: Option<i64>,
        protocol: Option<String>,
        backends: Option<Vec<String>>,
    }

    impl Endpoint {
        fn named(name: &str) -> Self {
            Self {
                name: name.to_string(),
                ..Self::default()
            }
        }
    }

    impl Resource for Endpoint {
        fn kind() -> &'static str {
            "Endpoint"
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn fields() -> &'static [Field<Self>] {
            static FIELDS: [Field<Endpoint>; 3] = [
                field!("port", port),
                field!("protocol", protocol),
                field!("backends", backends, eq = unordered_eq),
            ];
            &FIELDS
        }
    }

    #[test]
    fn test_missing_actual_signals_creation() {
        let desired = Endpoint {
            port: Some(80),
            ..Endpoint::named("web")
        };
        assert!(matches!(diff(&desired, None), Delta::Create));
    }

    #[test]
    fn test_equal_states_yield_empty_changeset() {
        let desired = Endpoint {
            port: Some(80),
            protocol: Some("tcp".to_string()),
            backends: Some(vec!["a".to_string()]),
            ..Endpoint::named("web")
        };
        let actual = desired.clone();

        match diff(&desired, Some(&actual)) {
            Delta::Update(changes) => assert!(changes.is_empty()),
            Delta::Create => panic!("expected an update delta"),
        }
    }

    #[test]
    fn test_changed_field_is_pending_with_value() {
        let desired = Endpoint {
            port: Some(8080),
            protocol: Some("tcp".to_string()),
            ..Endpoint::named("web")
        };
        let actual = Endpoint {
            port: Some(80),
            protocol: Some("tcp".to_string()),
            backends: Some(vec![]),
            ..Endpoint::named("web")
        };

        let Delta::Update(changes) = diff(&desired, Some(&actual)) else {
            panic!("expected an update delta");
        };
        assert_eq!(changes.pending(), vec!["port"]);
        assert_eq!(changes.delta().port, Some(8080));
        assert_eq!(changes.delta().protocol, None);
    }

    #[test]
    fn test_unset_desired_fields_are_never_compared() {
        // The actual differs on every field the desired leaves unset.
        let desired = Endpoint::named("web");
        let actual = Endpoint {
            port: Some(443),
            protocol: Some("udp".to_string()),
            backends: Some(vec!["x".to_string()]),
            ..Endpoint::named("web")
        };

        let Delta::Update(changes) = diff(&desired, Some(&actual)) else {
            panic!("expected an update delta");
        };
        assert!(changes.is_empty());
    }

    #[test]
    fn test_reference_list_compares_as_set() {
        let desired = Endpoint {
            backends: Some(vec!["a".to_string(), "b".to_string()]),
            ..Endpoint::named("web")
        };
        let actual = Endpoint {
            port: Some(80),
            protocol: Some("tcp".to_string()),
            backends: Some(vec!["b".to_string(), "a".to_string()]),
            ..Endpoint::named("web")
        };

        let Delta::Update(changes) = diff(&desired, Some(&actual)) else {
            panic!("expected an update delta");
        };
        assert!(changes.is_empty());
    }

    #[test]
    fn test_explicitly_empty_differs_from_populated() {
        // Some(vec![]) is "explicitly no backends", not don't-care.
        let desired = Endpoint {
            backends: Some(vec![]),
            ..Endpoint::named("web")
        };
        let actual = Endpoint {
            port: Some(80),
            protocol: Some("tcp".to_string()),
            backends: Some(vec!["a".to_string()]),
            ..Endpoint::named("web")
        };

        let Delta::Update(changes) = diff(&desired, Some(&actual)) else {
            panic!("expected an update delta");
        };
        assert_eq!(changes.pending(), vec!["backends"]);
        assert_eq!(changes.delta().backends, Some(vec![]));
    }

    #[test]
    fn test_claim_tracks_pending_fields() {
        let desired = Endpoint {
            port: Some(8080),
            protocol: Some("udp".to_string()),
            ..Endpoint::named("web")
        };
        let actual = Endpoint {
            port: Some(80),
            protocol: Some("tcp".to_string()),
            backends: Some(vec![]),
            ..Endpoint::named("web")
        };

        let Delta::Update(mut changes) = diff(&desired, Some(&actual)) else {
            panic!("expected an update delta");
        };
        assert_eq!(changes.pending(), vec!["port", "protocol"]);

        assert!(changes.claim("port"));
        assert!(!changes.claim("port"), "a field claims only once");
        assert!(!changes.is_empty());

        assert!(changes.claim("protocol"));
        assert!(changes.is_empty());
    }
}
