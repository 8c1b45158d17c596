use super::naming::{decode_component, encode_component};
use super::{FlowStore, new_flow_id, next_revision, not_found};
use crate::error::StoreError;
use crate::flow::{Flow, FlowDraft, TenantId};
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const EXTENSION: &str = "json";

/// Flows stored as one JSON document per tenant and name:
/// `<root>/<tenant>/<name>.json`, path components percent-encoded.
///
/// Writes go to a temporary file that is then renamed over the target. The
/// version check and the write happen under one lock, which serializes writers
/// within this process.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tenant_dir(&self, tenant_id: &TenantId) -> PathBuf {
        self.root.join(encode_component(tenant_id.as_str()))
    }

    fn flow_path(&self, tenant_id: &TenantId, name: &str) -> PathBuf {
        self.tenant_dir(tenant_id)
            .join(format!("{}.{}", encode_component(name), EXTENSION))
    }

    fn read(&self, tenant_id: &TenantId, name: &str) -> Result<Option<Flow>, StoreError> {
        let path = self.flow_path(tenant_id, name);
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(Flow::from_json(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", &path, e)),
        }
    }

    fn write(&self, flow: &Flow) -> Result<(), StoreError> {
        let dir = self.tenant_dir(&flow.tenant_id);
        fs::create_dir_all(&dir).map_err(|e| io_error("create", &dir, e))?;
        let path = self.flow_path(&flow.tenant_id, &flow.name);
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
        fs::write(&tmp, flow.to_json_pretty()).map_err(|e| io_error("write", &tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error("replace", &path, e))
    }
}

impl FlowStore for JsonFileStore {
    fn load(&self, tenant_id: &TenantId, name: &str) -> Result<Flow, StoreError> {
        self.read(tenant_id, name)?
            .ok_or_else(|| not_found(tenant_id, name))
    }

    fn create(&self, tenant_id: &TenantId, draft: FlowDraft) -> Result<Flow, StoreError> {
        let _guard = self.write_lock.lock();
        if self.read(tenant_id, &draft.name)?.is_some() {
            return Err(StoreError::AlreadyExists {
                tenant_id: tenant_id.to_string(),
                name: draft.name,
            });
        }
        let flow = draft.into_flow(new_flow_id(), tenant_id.clone());
        self.write(&flow)?;
        debug!(tenant = %tenant_id, flow = %flow.name, id = %flow.id, "Created flow file");
        Ok(flow)
    }

    fn save(&self, flow: &Flow) -> Result<Flow, StoreError> {
        let _guard = self.write_lock.lock();
        let stored = self
            .read(&flow.tenant_id, &flow.name)?
            .ok_or_else(|| not_found(&flow.tenant_id, &flow.name))?;
        let next = next_revision(&stored, flow).inspect_err(|e| {
            warn!(tenant = %flow.tenant_id, flow = %flow.name, error = %e, "Rejected save");
        })?;
        self.write(&next)?;
        debug!(tenant = %flow.tenant_id, flow = %flow.name, version = next.version, "Saved flow file");
        Ok(next)
    }

    fn delete(&self, tenant_id: &TenantId, name: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let path = self.flow_path(tenant_id, name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(tenant = %tenant_id, flow = name, "Deleted flow file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete", &path, e)),
        }
    }

    fn list(&self, tenant_id: &TenantId) -> Result<Vec<String>, StoreError> {
        let dir = self.tenant_dir(tenant_id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list", &dir, e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error("list", &dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(name) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(decode_component)
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("Could not {} '{}': {}", action, path.display(), e))
}
