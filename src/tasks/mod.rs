//! Concrete resource kinds
//!
//! Each kind supplies its field table, a finder that canonicalizes backend
//! reference URLs, an optional change validator, and the renderers for the
//! targets it supports. The diff and dispatch logic all lives in the
//! `reconcile` engine; these modules only describe shapes and backend
//! calls.

mod instance_group_manager;
mod instance_template;
mod target_pool;

pub use instance_group_manager::InstanceGroupManager;
pub use instance_template::InstanceTemplate;
pub use target_pool::TargetPool;

use reconcile::{ReconcileError, Resource};

/// Wrap a backend submit or wait failure into the engine taxonomy.
pub(crate) fn backend_err<R: Resource>(
    resource: &R,
    op: &'static str,
    source: anyhow::Error,
) -> ReconcileError {
    ReconcileError::Backend {
        kind: R::kind(),
        name: resource.name().to_string(),
        op,
        source,
    }
}

/// Wrap a finder failure into the engine taxonomy.
pub(crate) fn lookup_err<R: Resource>(resource: &R, source: anyhow::Error) -> ReconcileError {
    ReconcileError::Lookup {
        kind: R::kind(),
        name: resource.name().to_string(),
        source,
    }
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(test)]
mod tests {
    use reconcile::{reconcile, ManifestDoc, Outcome, RenderTarget};

    use crate::api::mock::MockCompute;
    use crate::tasks::{InstanceGroupManager, InstanceTemplate, TargetPool};

    /// Rendering a whole deployment into one document, with references
    /// resolving to the sibling blocks.
    #[test]
    fn test_full_deployment_manifest() {
        super::init_test_logging();
        let api = MockCompute::new("proj", "us-west1");
        let mut doc = ManifestDoc::new();

        let template = InstanceTemplate {
            machine_type: Some("e2-medium".to_string()),
            source_image: Some("debian-12".to_string()),
            ..InstanceTemplate::new("t1")
        };
        let pool = TargetPool {
            region: Some("us-west1".to_string()),
            ..TargetPool::new("pool-a")
        };
        let group = InstanceGroupManager {
            zone: Some("us-west1-a".to_string()),
            base_instance_name: Some("node".to_string()),
            instance_template: Some("t1".to_string()),
            target_size: Some(3),
            target_pools: Some(vec!["pool-a".to_string()]),
            ..InstanceGroupManager::new("ig1")
        };

        for outcome in [
            reconcile(&template, &api, RenderTarget::Manifest(&mut doc)).unwrap(),
            reconcile(&pool, &api, RenderTarget::Manifest(&mut doc)).unwrap(),
            reconcile(&group, &api, RenderTarget::Manifest(&mut doc)).unwrap(),
        ] {
            assert_eq!(outcome, Outcome::Rendered);
        }

        // Declarative rendering never touches the backend beyond the find.
        assert!(api.mutations().is_empty());

        let rendered = doc.render();
        assert!(rendered.contains("\"compute_instance_template\""));
        assert!(rendered.contains("\"compute_target_pool\""));
        assert!(rendered.contains("\"compute_instance_group_manager\""));
        assert!(rendered.contains("\"${compute_instance_template.t1.self_link}\""));
        assert!(rendered.contains("\"${compute_target_pool.pool-a.self_link}\""));
    }

    /// The emitted document is a function of the desired values alone.
    #[test]
    fn test_manifest_rendering_is_deterministic() {
        let api = MockCompute::new("proj", "us-west1");

        let render = || {
            let mut doc = ManifestDoc::new();
            let group = InstanceGroupManager {
                zone: Some("us-west1-a".to_string()),
                target_size: Some(3),
                target_pools: Some(vec!["pool-a".to_string(), "pool-b".to_string()]),
                ..InstanceGroupManager::new("ig1")
            };
            reconcile(&group, &api, RenderTarget::Manifest(&mut doc)).unwrap();
            doc.render()
        };

        assert_eq!(render(), render());
    }

    /// Reconciling each kind against a live backend that already matches
    /// the desired state issues no mutation at all.
    #[test]
    fn test_converged_deployment_is_a_no_op() {
        let api = MockCompute::new("proj", "us-west1");

        let template = InstanceTemplate {
            machine_type: Some("e2-medium".to_string()),
            ..InstanceTemplate::new("t1")
        };
        let pool = TargetPool {
            region: Some("us-west1".to_string()),
            ..TargetPool::new("pool-a")
        };

        assert_eq!(
            reconcile(&template, &api, RenderTarget::Api).unwrap(),
            Outcome::Created
        );
        assert_eq!(
            reconcile(&pool, &api, RenderTarget::Api).unwrap(),
            Outcome::Created
        );

        assert_eq!(
            reconcile(&template, &api, RenderTarget::Api).unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(
            reconcile(&pool, &api, RenderTarget::Api).unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(api.mutations().len(), 2, "only the two creations");
    }

    #[test]
    fn test_manifest_fields_are_plain_maps() {
        // Field maps keep declarative-schema names, not struct names.
        let api = MockCompute::new("proj", "us-west1");
        let mut doc = ManifestDoc::new();
        let template = InstanceTemplate {
            preemptible: Some(true),
            ..InstanceTemplate::new("t1")
        };
        reconcile(&template, &api, RenderTarget::Manifest(&mut doc)).unwrap();

        let block = &doc.blocks()[0];
        let keys: Vec<&str> = block.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "preemptible"]);
    }
}
