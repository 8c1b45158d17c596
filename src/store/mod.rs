//! Flow persistence with optimistic concurrency.
//!
//! Every flow is stored under its tenant and name. A save only succeeds when the
//! caller's `version` equals the stored one, and the stored version then grows by
//! exactly one. There is no locking across a load/edit/save cycle and no merging:
//! a stale save fails with [`StoreError::Conflict`] and the caller reloads.

mod file;
mod memory;
pub(crate) mod naming;

pub use file::JsonFileStore;
pub use memory::InMemoryFlowStore;

use crate::error::StoreError;
use crate::flow::registry::generate_id;
use crate::flow::{Flow, FlowDraft, TenantId};

/// A per-tenant flow repository.
pub trait FlowStore: Send + Sync {
    /// Returns the stored flow or [`StoreError::NotFound`].
    fn load(&self, tenant_id: &TenantId, name: &str) -> Result<Flow, StoreError>;

    /// Stores a new flow with a fresh id and version 0.
    fn create(&self, tenant_id: &TenantId, draft: FlowDraft) -> Result<Flow, StoreError>;

    /// Replaces the stored flow if `flow.version` is current and returns the stored
    /// copy, whose version is `flow.version + 1`.
    fn save(&self, flow: &Flow) -> Result<Flow, StoreError>;

    /// Removes a flow. Deleting a flow that does not exist succeeds.
    fn delete(&self, tenant_id: &TenantId, name: &str) -> Result<(), StoreError>;

    /// Names of the tenant's flows in ascending order.
    fn list(&self, tenant_id: &TenantId) -> Result<Vec<String>, StoreError>;
}

pub(crate) fn new_flow_id() -> String {
    generate_id("flow")
}

/// Checks that `incoming` may overwrite `stored` and returns the next revision.
pub(crate) fn next_revision(stored: &Flow, incoming: &Flow) -> Result<Flow, StoreError> {
    if stored.id != incoming.id {
        return Err(StoreError::IdMismatch {
            name: incoming.name.clone(),
            stored_id: stored.id.clone(),
            given_id: incoming.id.clone(),
        });
    }
    if stored.version != incoming.version {
        return Err(StoreError::Conflict {
            name: incoming.name.clone(),
            expected: incoming.version,
            found: stored.version,
        });
    }
    let version = stored
        .version
        .checked_add(1)
        .ok_or_else(|| StoreError::VersionExhausted {
            name: incoming.name.clone(),
        })?;
    let mut next = incoming.clone();
    next.version = version;
    Ok(next)
}

pub(crate) fn not_found(tenant_id: &TenantId, name: &str) -> StoreError {
    StoreError::NotFound {
        tenant_id: tenant_id.to_string(),
        name: name.to_string(),
    }
}
