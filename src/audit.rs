//! Injected collaborator interfaces: audit sink, domain-event publisher
//! and capability checker.
//!
//! Cross-cutting side effects are modeled as explicit collaborators passed
//! into the engine, never as ambient singletons. The in-memory recording
//! implementations here back the test suite and small deployments.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An append-only audit record describing one mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The subsystem that performed the mutation (e.g. "payroll").
    pub module: String,
    /// The operation performed (e.g. "apply").
    pub action: String,
    /// The entity type mutated (e.g. "payroll_period").
    pub entity: String,
    /// The id of the mutated entity.
    pub entity_id: Uuid,
    /// The actor who performed the mutation, when a user.
    pub actor_id: Option<Uuid>,
    /// Human-readable description of the mutation.
    pub description: String,
    /// Image of the entity before the mutation.
    pub before: serde_json::Value,
    /// Image of the entity after the mutation.
    pub after: serde_json::Value,
}

/// Lifecycle events published for notification/listener collaborators
/// outside this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// A payroll period was created in the open state.
    #[serde(rename = "payroll.opened")]
    PayrollOpened {
        /// The payroll that was opened.
        payroll_id: Uuid,
    },
    /// A payroll period was verified.
    #[serde(rename = "payroll.verified")]
    PayrollVerified {
        /// The payroll that was verified.
        payroll_id: Uuid,
    },
    /// A payroll period was applied.
    #[serde(rename = "payroll.applied")]
    PayrollApplied {
        /// The payroll that was applied.
        payroll_id: Uuid,
        /// How many actions were consumed by the apply.
        consumed_actions: usize,
    },
    /// A verified payroll was reopened.
    #[serde(rename = "payroll.reopened")]
    PayrollReopened {
        /// The payroll that was reopened.
        payroll_id: Uuid,
        /// The operator-supplied reason.
        reason: String,
    },
    /// A payroll period was soft-inactivated.
    #[serde(rename = "payroll.deactivated")]
    PayrollDeactivated {
        /// The payroll that was inactivated.
        payroll_id: Uuid,
    },
    /// A personal action was created.
    #[serde(rename = "personal-action.created")]
    ActionCreated {
        /// The action that was created.
        action_id: Uuid,
    },
    /// A personal action was approved.
    #[serde(rename = "personal-action.approved")]
    ActionApproved {
        /// The action that was approved.
        action_id: Uuid,
    },
    /// A personal action was rejected.
    #[serde(rename = "personal-action.rejected")]
    ActionRejected {
        /// The action that was rejected.
        action_id: Uuid,
    },
}

/// An append-only audit-event sink.
pub trait AuditSink: Send + Sync {
    /// Records one audit event.
    fn record(&self, event: AuditEvent);
}

/// A publisher for lifecycle domain events.
pub trait EventPublisher: Send + Sync {
    /// Publishes one domain event.
    fn publish(&self, event: DomainEvent);
}

/// The single capability query the engine consumes from the permission
/// subsystem.
pub trait PermissionChecker: Send + Sync {
    /// Does `actor_id` have `capability` in `company_id`?
    fn has_permission(&self, actor_id: Uuid, company_id: Uuid, capability: &str) -> bool;
}

/// Capability required for payroll lifecycle mutations.
pub const CAP_MANAGE_PAYROLL: &str = "payroll.manage";
/// Capability required to create, approve or reject personal actions.
pub const CAP_MANAGE_ACTIONS: &str = "personal-action.manage";
/// Capability required for vacation account mutations.
pub const CAP_MANAGE_VACATION: &str = "vacation.manage";

/// An audit sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every event recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit sink poisoned").clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().expect("audit sink poisoned").push(event);
    }
}

/// An event publisher that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryEventPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl MemoryEventPublisher {
    /// Creates an empty publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every event published so far.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().expect("event publisher poisoned").clone()
    }
}

impl EventPublisher for MemoryEventPublisher {
    fn publish(&self, event: DomainEvent) {
        self.events
            .lock()
            .expect("event publisher poisoned")
            .push(event);
    }
}

/// A permission checker that grants every capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionChecker for AllowAll {
    fn has_permission(&self, _actor_id: Uuid, _company_id: Uuid, _capability: &str) -> bool {
        true
    }
}

/// A permission checker that denies every capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl PermissionChecker for DenyAll {
    fn has_permission(&self, _actor_id: Uuid, _company_id: Uuid, _capability: &str) -> bool {
        false
    }
}
