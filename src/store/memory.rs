use super::{FlowStore, new_flow_id, next_revision, not_found};
use crate::error::StoreError;
use crate::flow::{Flow, FlowDraft, TenantId};
use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

/// Flows kept in process memory. Useful for tests and single-process tools.
#[derive(Debug, Default)]
pub struct InMemoryFlowStore {
    flows: RwLock<AHashMap<(TenantId, String), Flow>>,
}

impl InMemoryFlowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowStore for InMemoryFlowStore {
    fn load(&self, tenant_id: &TenantId, name: &str) -> Result<Flow, StoreError> {
        self.flows
            .read()
            .get(&(tenant_id.clone(), name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(tenant_id, name))
    }

    fn create(&self, tenant_id: &TenantId, draft: FlowDraft) -> Result<Flow, StoreError> {
        let mut flows = self.flows.write();
        let key = (tenant_id.clone(), draft.name.clone());
        if flows.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                tenant_id: tenant_id.to_string(),
                name: draft.name,
            });
        }
        let flow = draft.into_flow(new_flow_id(), tenant_id.clone());
        flows.insert(key, flow.clone());
        debug!(tenant = %tenant_id, flow = %flow.name, id = %flow.id, "Created flow");
        Ok(flow)
    }

    fn save(&self, flow: &Flow) -> Result<Flow, StoreError> {
        let mut flows = self.flows.write();
        let key = (flow.tenant_id.clone(), flow.name.clone());
        let stored = flows
            .get(&key)
            .ok_or_else(|| not_found(&flow.tenant_id, &flow.name))?;
        let next = next_revision(stored, flow).inspect_err(|e| {
            warn!(tenant = %flow.tenant_id, flow = %flow.name, error = %e, "Rejected save");
        })?;
        flows.insert(key, next.clone());
        debug!(tenant = %flow.tenant_id, flow = %flow.name, version = next.version, "Saved flow");
        Ok(next)
    }

    fn delete(&self, tenant_id: &TenantId, name: &str) -> Result<(), StoreError> {
        let removed = self
            .flows
            .write()
            .remove(&(tenant_id.clone(), name.to_string()));
        if removed.is_some() {
            debug!(tenant = %tenant_id, flow = name, "Deleted flow");
        }
        Ok(())
    }

    fn list(&self, tenant_id: &TenantId) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .flows
            .read()
            .keys()
            .filter(|(tenant, _)| tenant == tenant_id)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
