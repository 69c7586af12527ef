//! Target pool resource kind

use std::collections::BTreeMap;

use log::info;
use reconcile::{field, ChangeSet, Field, ManifestDoc, ManifestValue, ReconcileError, Resource, Task};

use super::{backend_err, lookup_err};
use crate::api::{last_component, ApiResource, ComputeApi};

const KIND: &str = "TargetPool";
pub(crate) const MANIFEST_TYPE: &str = "compute_target_pool";

/// A regional pool of instances behind a forwarding rule.
///
/// The session affinity policy can be switched in place; the region is
/// fixed at creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetPool {
    pub name: String,
    pub region: Option<String>,
    pub session_affinity: Option<String>,
}

impl TargetPool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn to_api(&self) -> ApiResource {
        let mut r = ApiResource::new(KIND, &self.name);
        if let Some(region) = &self.region {
            r = r.with("region", region.as_str());
        }
        if let Some(affinity) = &self.session_affinity {
            r = r.with("session_affinity", affinity.as_str());
        }
        r
    }
}

impl Resource for TargetPool {
    fn kind() -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<TargetPool>; 2] = [
            field!("region", region),
            field!("session_affinity", session_affinity),
        ];
        &FIELDS
    }
}

impl<A: ComputeApi> Task<A> for TargetPool {
    fn find(&self, api: &A) -> Result<Option<Self>, ReconcileError> {
        let found = api
            .get(KIND, &self.name)
            .map_err(|source| lookup_err(self, source))?;
        let Some(r) = found else { return Ok(None) };

        Ok(Some(Self {
            name: self.name.clone(),
            region: Some(last_component(r.str_field("region").unwrap_or_default()).to_string()),
            session_affinity: Some(r.str_field("session_affinity").unwrap_or("NONE").to_string()),
        }))
    }

    fn check_changes(
        &self,
        _actual: Option<&Self>,
        changes: &ChangeSet<Self>,
    ) -> Result<(), ReconcileError> {
        if changes.contains("region") {
            return Err(ReconcileError::Validation {
                kind: KIND,
                name: self.name.clone(),
                field: "region",
                reason: "a target pool cannot move between regions".to_string(),
            });
        }
        Ok(())
    }

    fn render_api(
        &self,
        api: &A,
        actual: Option<&Self>,
        changes: &mut ChangeSet<Self>,
    ) -> Result<(), ReconcileError> {
        if actual.is_none() {
            info!("creating target pool {}", self.name);
            let op = api
                .create(self.to_api())
                .map_err(|source| backend_err(self, "creating", source))?;
            api.wait(&op)
                .map_err(|source| backend_err(self, "creating", source))?;
            return Ok(());
        }

        if changes.contains("session_affinity") {
            let affinity = self.session_affinity.as_deref().unwrap_or("NONE");
            info!("setting session affinity of target pool {} to {affinity}", self.name);
            let patch = ApiResource::new(KIND, &self.name).with("session_affinity", affinity);
            let op = api
                .update(KIND, &self.name, "set_session_affinity", patch)
                .map_err(|source| backend_err(self, "updating session affinity of", source))?;
            api.wait(&op)
                .map_err(|source| backend_err(self, "updating session affinity of", source))?;
            changes.claim("session_affinity");
        }

        Ok(())
    }

    fn render_manifest(&self, doc: &mut ManifestDoc) -> Result<(), ReconcileError> {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), ManifestValue::from(self.name.as_str()));
        if let Some(region) = &self.region {
            fields.insert("region".to_string(), ManifestValue::from(region.as_str()));
        }
        if let Some(affinity) = &self.session_affinity {
            fields.insert(
                "session_affinity".to_string(),
                ManifestValue::from(affinity.as_str()),
            );
        }
        doc.emit(MANIFEST_TYPE, &self.name, fields)
    }
}
