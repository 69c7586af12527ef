//! Instance template resource kind

use std::collections::BTreeMap;

use log::info;
use reconcile::{field, ChangeSet, Field, ManifestDoc, ManifestValue, ReconcileError, Resource, Task};

use super::{backend_err, lookup_err};
use crate::api::{ApiResource, ComputeApi};

const KIND: &str = "InstanceTemplate";
pub(crate) const MANIFEST_TYPE: &str = "compute_instance_template";

/// A reusable VM template.
///
/// Templates are immutable on the backend: changing one means creating a
/// replacement under a new name, so any in-place modification is rejected
/// up front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceTemplate {
    pub name: String,
    pub machine_type: Option<String>,
    pub source_image: Option<String>,
    pub preemptible: Option<bool>,
}

impl InstanceTemplate {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn to_api(&self) -> ApiResource {
        let mut r = ApiResource::new(KIND, &self.name);
        if let Some(machine_type) = &self.machine_type {
            r = r.with("machine_type", machine_type.as_str());
        }
        if let Some(source_image) = &self.source_image {
            r = r.with("source_image", source_image.as_str());
        }
        if let Some(preemptible) = self.preemptible {
            r = r.with("preemptible", preemptible);
        }
        r
    }
}

impl Resource for InstanceTemplate {
    fn kind() -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<InstanceTemplate>; 3] = [
            field!("machine_type", machine_type),
            field!("source_image", source_image),
            field!("preemptible", preemptible),
        ];
        &FIELDS
    }
}

impl<A: ComputeApi> Task<A> for InstanceTemplate {
    fn find(&self, api: &A) -> Result<Option<Self>, ReconcileError> {
        let found = api
            .get(KIND, &self.name)
            .map_err(|source| lookup_err(self, source))?;
        let Some(r) = found else { return Ok(None) };

        Ok(Some(Self {
            name: self.name.clone(),
            machine_type: Some(r.str_field("machine_type").unwrap_or_default().to_string()),
            source_image: Some(r.str_field("source_image").unwrap_or_default().to_string()),
            preemptible: Some(r.bool_field("preemptible").unwrap_or(false)),
        }))
    }

    fn check_changes(
        &self,
        _actual: Option<&Self>,
        changes: &ChangeSet<Self>,
    ) -> Result<(), ReconcileError> {
        if let Some(&field) = changes.pending().first() {
            return Err(ReconcileError::Validation {
                kind: KIND,
                name: self.name.clone(),
                field,
                reason: "instance templates are immutable; create a new template".to_string(),
            });
        }
        Ok(())
    }

    fn render_api(
        &self,
        api: &A,
        actual: Option<&Self>,
        _changes: &mut ChangeSet<Self>,
    ) -> Result<(), ReconcileError> {
        // Validation rejects every in-place change, so only creation
        // reaches this renderer.
        if actual.is_some() {
            return Ok(());
        }

        info!("creating instance template {}", self.name);
        let op = api
            .create(self.to_api())
            .map_err(|source| backend_err(self, "creating", source))?;
        api.wait(&op)
            .map_err(|source| backend_err(self, "creating", source))?;
        Ok(())
    }

    fn render_manifest(&self, doc: &mut ManifestDoc) -> Result<(), ReconcileError> {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), ManifestValue::from(self.name.as_str()));
        if let Some(machine_type) = &self.machine_type {
            fields.insert(
                "machine_type".to_string(),
                ManifestValue::from(machine_type.as_str()),
            );
        }
        if let Some(source_image) = &self.source_image {
            fields.insert(
                "source_image".to_string(),
                ManifestValue::from(source_image.as_str()),
            );
        }
        if let Some(preemptible) = self.preemptible {
            fields.insert("preemptible".to_string(), ManifestValue::from(preemptible));
        }
        doc.emit(MANIFEST_TYPE, &self.name, fields)
    }
}
