//! Orchestration of the save and publish paths over a store, the telephony engine
//! and an audit collaborator.

use crate::compiler::{Compiler, ValidatedFlow};
use crate::config::PublishPolicy;
use crate::error::{AuditError, PublishError, ServiceError};
use crate::flow::{Flow, FlowDraft, TenantId};
use crate::plan::{PlanArtifact, RoutingPlan};
use crate::store::FlowStore;
use crate::store::naming::encode_component;
use crate::validator::{ValidationReport, validate};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Acknowledgement returned by the telephony engine for an accepted plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub reference: String,
}

/// The external telephony engine that executes routing plans.
pub trait Publisher: Send + Sync {
    fn publish(&self, tenant_id: &TenantId, plan: &RoutingPlan) -> Result<Ack, PublishError>;
}

/// Writes each published plan as a binary artifact under
/// `<dir>/<tenant>/<flow name>.plan`, for engines that pick plans up from disk.
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    dir: PathBuf,
}

impl DirectoryPublisher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Both path components are percent-encoded, so distinct names never share a
    /// file and a tenant id cannot leave `dir`.
    pub fn plan_path(&self, tenant_id: &TenantId, flow_name: &str) -> PathBuf {
        self.dir
            .join(encode_component(tenant_id.as_str()))
            .join(format!("{}.plan", encode_component(flow_name)))
    }
}

impl Publisher for DirectoryPublisher {
    fn publish(&self, tenant_id: &TenantId, plan: &RoutingPlan) -> Result<Ack, PublishError> {
        let path = self.plan_path(tenant_id, &plan.flow_name);
        PlanArtifact::new(plan.clone())
            .save(&path)
            .map_err(|e| PublishError::Rejected(e.to_string()))?;
        Ok(Ack {
            reference: path.display().to_string(),
        })
    }
}

/// What happened to a flow, for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Created,
    Saved,
    Published,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub tenant_id: String,
    pub flow_name: String,
    pub action: AuditAction,
    pub version: Option<u64>,
}

/// Receives audit events. Failures are logged by the caller and never undo or fail
/// the action being audited.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Emits audit events as structured log records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        info!(
            target: "ura::audit",
            tenant = %event.tenant_id,
            flow = %event.flow_name,
            action = ?event.action,
            version = ?event.version,
            "Audit"
        );
        Ok(())
    }
}

/// A persisted flow along with the warnings it was saved with.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub flow: Flow,
    pub report: ValidationReport,
}

#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub plan: RoutingPlan,
    pub ack: Ack,
    pub report: ValidationReport,
}

/// Runs the editor's save and publish paths: validate, persist, compile, publish.
pub struct FlowService<S, P> {
    store: S,
    publisher: P,
    audit: Box<dyn AuditSink>,
    policy: PublishPolicy,
}

impl<S: FlowStore, P: Publisher> FlowService<S, P> {
    pub fn new(store: S, publisher: P) -> Self {
        Self {
            store,
            publisher,
            audit: Box::new(TracingAuditSink),
            policy: PublishPolicy::default(),
        }
    }

    pub fn with_audit_sink(mut self, sink: impl AuditSink + 'static) -> Self {
        self.audit = Box::new(sink);
        self
    }

    pub fn with_policy(mut self, policy: PublishPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn load(&self, tenant_id: &TenantId, name: &str) -> Result<Flow, ServiceError> {
        Ok(self.store.load(tenant_id, name)?)
    }

    pub fn list(&self, tenant_id: &TenantId) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.list(tenant_id)?)
    }

    /// Persists a new flow. Structural errors block creation, like any save.
    pub fn create(&self, tenant_id: &TenantId, draft: FlowDraft) -> Result<Flow, ServiceError> {
        let candidate = draft.clone().into_flow(String::new(), tenant_id.clone());
        let report = validate(&candidate);
        if !report.is_valid() {
            return Err(ServiceError::Invalid {
                name: draft.name,
                report,
            });
        }
        let flow = self.store.create(tenant_id, draft)?;
        self.audit(&flow, AuditAction::Created);
        Ok(flow)
    }

    /// Validates and persists `flow`. Errors block the save, warnings do not.
    pub fn save(&self, flow: &Flow) -> Result<SaveOutcome, ServiceError> {
        let report = validate(flow);
        if !report.is_valid() {
            info!(
                tenant = %flow.tenant_id,
                flow = %flow.name,
                errors = report.errors.len(),
                "Save blocked by validation errors"
            );
            return Err(ServiceError::Invalid {
                name: flow.name.clone(),
                report,
            });
        }
        let saved = self.store.save(flow)?;
        self.audit(&saved, AuditAction::Saved);
        Ok(SaveOutcome {
            flow: saved,
            report,
        })
    }

    /// Compiles the stored flow and hands the plan to the telephony engine.
    pub fn publish(&self, tenant_id: &TenantId, name: &str) -> Result<PublishOutcome, ServiceError> {
        let flow = self.store.load(tenant_id, name)?;
        let report = validate(&flow);
        if !report.is_valid() {
            return Err(ServiceError::Invalid {
                name: flow.name.clone(),
                report,
            });
        }
        if report.has_warnings() && self.policy == PublishPolicy::RejectWarnings {
            return Err(ServiceError::WarningsRejected {
                name: flow.name.clone(),
                report,
            });
        }

        let plan = Compiler::new(ValidatedFlow::new(&flow, &report)?).compile();
        let ack = self
            .publisher
            .publish(tenant_id, &plan)
            .inspect_err(|e| warn!(tenant = %tenant_id, flow = name, error = %e, "Publish rejected"))?;
        info!(
            tenant = %tenant_id,
            flow = name,
            version = flow.version,
            steps = plan.steps.len(),
            reference = %ack.reference,
            "Published routing plan"
        );
        self.audit(&flow, AuditAction::Published);
        Ok(PublishOutcome { plan, ack, report })
    }

    pub fn delete(&self, tenant_id: &TenantId, name: &str) -> Result<(), ServiceError> {
        self.store.delete(tenant_id, name)?;
        let event = AuditEvent {
            tenant_id: tenant_id.to_string(),
            flow_name: name.to_string(),
            action: AuditAction::Deleted,
            version: None,
        };
        self.record(&event);
        Ok(())
    }

    fn audit(&self, flow: &Flow, action: AuditAction) {
        let event = AuditEvent {
            tenant_id: flow.tenant_id.to_string(),
            flow_name: flow.name.clone(),
            action,
            version: Some(flow.version),
        };
        self.record(&event);
    }

    fn record(&self, event: &AuditEvent) {
        if let Err(e) = self.audit.record(event) {
            warn!(
                tenant = %event.tenant_id,
                flow = %event.flow_name,
                action = ?event.action,
                error = %e,
                "Audit sink failed; action already completed"
            );
        }
    }
}
