//! Compute backend interface
//!
//! The live collaborator the imperative render target drives. Mutations
//! are asynchronous on the backend side: `create` and `update` return an
//! [`Operation`] handle that [`ComputeApi::wait`] blocks on until the
//! operation reaches a terminal state. Once submitted, a mutation is not
//! retracted; callers wanting cancellation must decide before submitting.

pub mod mock;

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire-level resource representation: a named entity of some kind with a
/// flat field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResource {
    pub kind: String,
    pub name: String,
    pub fields: BTreeMap<String, Value>,
}

impl ApiResource {
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Set one field, builder style.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn int_field(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// A list-of-strings field, e.g. a list of reference URLs.
    pub fn str_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.fields.get(key)?.as_array()?;
        items
            .iter()
            .map(|v| v.as_str().map(str::to_owned))
            .collect()
    }
}

/// Handle for an in-flight backend mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub id: u64,
}

/// Live backend contract.
///
/// Implementations return `Ok(None)` from `get` for not-found; every error
/// is a genuine lookup or mutation failure. Task code wraps these errors
/// into the engine's taxonomy.
pub trait ComputeApi {
    /// Project all resource URLs are scoped to.
    fn project(&self) -> &str;

    /// Region used for regional resource URLs.
    fn region(&self) -> &str;

    /// Fetch one resource by kind and name.
    fn get(&self, kind: &str, name: &str) -> Result<Option<ApiResource>>;

    /// Submit a creation; returns the operation handle to wait on.
    fn create(&self, resource: ApiResource) -> Result<Operation>;

    /// Submit a targeted update action against one resource.
    fn update(&self, kind: &str, name: &str, action: &str, patch: ApiResource)
        -> Result<Operation>;

    /// Block until the operation reaches a terminal state.
    fn wait(&self, op: &Operation) -> Result<()>;
}

/// Final path component of a backend reference URL.
///
/// Backends report references as full URLs; desired state holds bare
/// names, so finders canonicalize through this before any comparison.
pub fn last_component(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}

/// URL of a zone within a project.
pub fn zone_url(project: &str, zone: &str) -> String {
    format!("projects/{project}/zones/{zone}")
}

/// URL of a global instance template.
pub fn template_url(project: &str, name: &str) -> String {
    format!("projects/{project}/global/instanceTemplates/{name}")
}

/// URL of a regional target pool.
pub fn pool_url(project: &str, region: &str, name: &str) -> String {
    format!("projects/{project}/regions/{region}/targetPools/{name}")
}
