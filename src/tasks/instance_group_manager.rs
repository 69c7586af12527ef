//! Instance group manager resource kind

use std::collections::BTreeMap;

use log::info;
use reconcile::{
    field, unordered_eq, ChangeSet, Field, ManifestDoc, ManifestValue, ReconcileError, Resource,
    Task,
};

use super::{backend_err, instance_template, lookup_err, target_pool};
use crate::api::{last_component, pool_url, template_url, zone_url, ApiResource, ComputeApi};

const KIND: &str = "InstanceGroupManager";
pub(crate) const MANIFEST_TYPE: &str = "compute_instance_group_manager";

/// A zonal group of identical instances stamped from a template.
///
/// The template, target size, and target pool set can all be changed in
/// place through dedicated backend calls; the zone is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceGroupManager {
    pub name: String,
    pub zone: Option<String>,
    pub base_instance_name: Option<String>,
    /// Referenced instance template, by name.
    pub instance_template: Option<String>,
    pub target_size: Option<i64>,
    /// Referenced target pools, by name. Order is not significant.
    pub target_pools: Option<Vec<String>>,
}

impl InstanceGroupManager {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn to_api(&self, project: &str, region: &str) -> ApiResource {
        let mut r = ApiResource::new(KIND, &self.name);
        if let Some(zone) = &self.zone {
            r = r.with("zone", zone_url(project, zone));
        }
        if let Some(base) = &self.base_instance_name {
            r = r.with("base_instance_name", base.as_str());
        }
        if let Some(template) = &self.instance_template {
            r = r.with("instance_template", template_url(project, template));
        }
        if let Some(size) = self.target_size {
            r = r.with("target_size", size);
        }
        if let Some(pools) = &self.target_pools {
            r = r.with("target_pools", pool_urls(project, region, pools));
        }
        r
    }
}

fn pool_urls(project: &str, region: &str, pools: &[String]) -> Vec<String> {
    pools
        .iter()
        .map(|pool| pool_url(project, region, pool))
        .collect()
}

impl Resource for InstanceGroupManager {
    fn kind() -> &'static str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<InstanceGroupManager>; 5] = [
            field!("zone", zone),
            field!("base_instance_name", base_instance_name),
            field!("instance_template", instance_template),
            field!("target_size", target_size),
            field!("target_pools", target_pools, eq = unordered_eq),
        ];
        &FIELDS
    }
}

impl<A: ComputeApi> Task<A> for InstanceGroupManager {
    fn find(&self, api: &A) -> Result<Option<Self>, ReconcileError> {
        let found = api
            .get(KIND, &self.name)
            .map_err(|source| lookup_err(self, source))?;
        let Some(r) = found else { return Ok(None) };

        let pools = r
            .str_list("target_pools")
            .unwrap_or_default()
            .iter()
            .map(|url| last_component(url).to_string())
            .collect();

        Ok(Some(Self {
            name: self.name.clone(),
            zone: Some(last_component(r.str_field("zone").unwrap_or_default()).to_string()),
            base_instance_name: Some(
                r.str_field("base_instance_name")
                    .unwrap_or_default()
                    .to_string(),
            ),
            instance_template: Some(
                last_component(r.str_field("instance_template").unwrap_or_default()).to_string(),
            ),
            target_size: Some(r.int_field("target_size").unwrap_or(0)),
            target_pools: Some(pools),
        }))
    }

    fn check_changes(
        &self,
        _actual: Option<&Self>,
        changes: &ChangeSet<Self>,
    ) -> Result<(), ReconcileError> {
        if changes.contains("zone") {
            return Err(ReconcileError::Validation {
                kind: KIND,
                name: self.name.clone(),
                field: "zone",
                reason: "an instance group cannot move between zones".to_string(),
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
            info!("creating instance group manager {}", self.name);
            let body = self.to_api(api.project(), api.region());
            let op = api
                .create(body)
                .map_err(|source| backend_err(self, "creating", source))?;
            api.wait(&op)
                .map_err(|source| backend_err(self, "creating", source))?;
            return Ok(());
        }

        if changes.contains("target_size") {
            let size = self.target_size.unwrap_or(0);
            info!("resizing instance group manager {} to {size}", self.name);
            let patch = ApiResource::new(KIND, &self.name).with("target_size", size);
            let op = api
                .update(KIND, &self.name, "resize", patch)
                .map_err(|source| backend_err(self, "resizing", source))?;
            api.wait(&op)
                .map_err(|source| backend_err(self, "resizing", source))?;
            changes.claim("target_size");
        }

        if changes.contains("instance_template") {
            let template = self.instance_template.as_deref().unwrap_or_default();
            info!(
                "switching instance group manager {} to template {template}",
                self.name
            );
            let patch = ApiResource::new(KIND, &self.name)
                .with("instance_template", template_url(api.project(), template));
            let op = api
                .update(KIND, &self.name, "set_instance_template", patch)
                .map_err(|source| backend_err(self, "setting the template of", source))?;
            api.wait(&op)
                .map_err(|source| backend_err(self, "setting the template of", source))?;
            changes.claim("instance_template");
        }

        if changes.contains("target_pools") {
            let pools = self.target_pools.clone().unwrap_or_default();
            info!(
                "setting target pools of instance group manager {} to [{}]",
                self.name,
                pools.join(", ")
            );
            let patch = ApiResource::new(KIND, &self.name).with(
                "target_pools",
                pool_urls(api.project(), api.region(), &pools),
            );
            let op = api
                .update(KIND, &self.name, "set_target_pools", patch)
                .map_err(|source| backend_err(self, "setting the target pools of", source))?;
            api.wait(&op)
                .map_err(|source| backend_err(self, "setting the target pools of", source))?;
            changes.claim("target_pools");
        }

        Ok(())
    }

    fn render_manifest(&self, doc: &mut ManifestDoc) -> Result<(), ReconcileError> {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), ManifestValue::from(self.name.as_str()));
        if let Some(zone) = &self.zone {
            fields.insert("zone".to_string(), ManifestValue::from(zone.as_str()));
        }
        if let Some(base) = &self.base_instance_name {
            fields.insert(
                "base_instance_name".to_string(),
                ManifestValue::from(base.as_str()),
            );
        }
        if let Some(template) = &self.instance_template {
            fields.insert(
                "instance_template".to_string(),
                ManifestValue::reference(instance_template::MANIFEST_TYPE, template, "self_link"),
            );
        }
        if let Some(size) = self.target_size {
            fields.insert("target_size".to_string(), ManifestValue::from(size));
        }
        if let Some(pools) = &self.target_pools {
            if !pools.is_empty() {
                let refs = pools
                    .iter()
                    .map(|pool| {
                        ManifestValue::reference(target_pool::MANIFEST_TYPE, pool, "self_link")
                    })
                    .collect();
                fields.insert("target_pools".to_string(), ManifestValue::List(refs));
            }
        }
        doc.emit(MANIFEST_TYPE, &self.name, fields)
    }
}
