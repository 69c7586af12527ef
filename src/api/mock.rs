//! In-memory compute backend for tests
//!
//! Mirrors the live contract closely enough for reconcile round-trips:
//! `create` inserts the resource, targeted updates merge their patch into
//! the stored fields, and every call is recorded for assertions. Submit
//! and wait failures can be scripted to exercise error paths.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Result};

use super::{ApiResource, ComputeApi, Operation};

#[derive(Debug, Default)]
struct MockState {
    resources: BTreeMap<(String, String), ApiResource>,
    calls: Vec<String>,
    next_op: u64,
    fail_get: Option<String>,
    fail_create: Option<String>,
    fail_update: Option<String>,
    fail_wait: Option<String>,
}

/// Shared-state test double for [`ComputeApi`].
pub struct MockCompute {
    project: String,
    region: String,
    state: Mutex<MockState>,
}

impl MockCompute {
    pub fn new(project: &str, region: &str) -> Self {
        Self {
            project: project.to_string(),
            region: region.to_string(),
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Preload actual state, as if the resource already existed.
    pub fn seed(&self, resource: ApiResource) {
        let key = (resource.kind.clone(), resource.name.clone());
        self.state().resources.insert(key, resource);
    }

    /// Stored state of one resource, if any.
    pub fn resource(&self, kind: &str, name: &str) -> Option<ApiResource> {
        self.state()
            .resources
            .get(&(kind.to_string(), name.to_string()))
            .cloned()
    }

    /// Every call made so far, e.g. `"update InstanceGroupManager ig1 resize"`.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Calls that mutate backend state (create and update submissions).
    pub fn mutations(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with("create ") || c.starts_with("update "))
            .cloned()
            .collect()
    }

    /// Make the next lookup fail (with an error, not a not-found).
    pub fn fail_next_get(&self, message: &str) {
        self.state().fail_get = Some(message.to_string());
    }

    /// Make the next create submission fail.
    pub fn fail_next_create(&self, message: &str) {
        self.state().fail_create = Some(message.to_string());
    }

    /// Make the next update submission fail.
    pub fn fail_next_update(&self, message: &str) {
        self.state().fail_update = Some(message.to_string());
    }

    /// Make the next operation wait fail.
    pub fn fail_next_wait(&self, message: &str) {
        self.state().fail_wait = Some(message.to_string());
    }
}

impl ComputeApi for MockCompute {
    fn project(&self) -> &str {
        &self.project
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn get(&self, kind: &str, name: &str) -> Result<Option<ApiResource>> {
        let mut state = self.state();
        state.calls.push(format!("get {kind} {name}"));
        if let Some(message) = state.fail_get.take() {
            bail!(message);
        }
        Ok(state
            .resources
            .get(&(kind.to_string(), name.to_string()))
            .cloned())
    }

    fn create(&self, resource: ApiResource) -> Result<Operation> {
        let mut state = self.state();
        state
            .calls
            .push(format!("create {} {}", resource.kind, resource.name));
        if let Some(message) = state.fail_create.take() {
            bail!(message);
        }
        let key = (resource.kind.clone(), resource.name.clone());
        if state.resources.contains_key(&key) {
            bail!("{} {} already exists", resource.kind, resource.name);
        }
        state.resources.insert(key, resource);
        state.next_op += 1;
        Ok(Operation { id: state.next_op })
    }

    fn update(
        &self,
        kind: &str,
        name: &str,
        action: &str,
        patch: ApiResource,
    ) -> Result<Operation> {
        let mut state = self.state();
        state.calls.push(format!("update {kind} {name} {action}"));
        if let Some(message) = state.fail_update.take() {
            bail!(message);
        }
        let key = (kind.to_string(), name.to_string());
        let Some(stored) = state.resources.get_mut(&key) else {
            bail!("{kind} {name} not found");
        };
        stored.fields.extend(patch.fields);
        state.next_op += 1;
        Ok(Operation { id: state.next_op })
    }

    fn wait(&self, op: &Operation) -> Result<()> {
        let mut state = self.state();
        state.calls.push(format!("wait {}", op.id));
        if let Some(message) = state.fail_wait.take() {
            bail!(message);
        }
        Ok(())
    }
}
