//! The payroll lifecycle state machine and the engine's exposed
//! operations.
//!
//! Periods move `Open → Processing → Verified → Applied → Posted`, with
//! soft-inactivation available from any non-terminal state. Every
//! mutating operation checks the caller's capability first, runs inside
//! one store transaction, and reports through the injected audit sink and
//! event publisher.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{
    AuditEvent, AuditSink, DomainEvent, EventPublisher, PermissionChecker, CAP_MANAGE_ACTIONS,
    CAP_MANAGE_PAYROLL, CAP_MANAGE_VACATION,
};
use crate::collector::run_collection;
use crate::config::EngineConfig;
use crate::eligibility::{run_sweep, SweepOutcome, SweepScope};
use crate::error::{EngineError, EngineResult};
use crate::ledger::{
    apply_usage_from_payroll, create_initial_account, reconcile_balance, run_daily_provision,
    AccrualOutcome, BalanceReconciliation,
};
use crate::models::{
    ActionState, ActionType, ActorType, Employee, Invalidation, InvalidationReason,
    PayPeriodType, PayrollPeriod, PayrollState, PersonalAction, ResultTotals, SnapshotSummary,
};
use crate::store::Store;

/// The fields an operator supplies when creating or editing a payroll.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollSpec {
    /// The company the payroll belongs to.
    pub company_id: Uuid,
    /// The pay-period type.
    pub period_type: PayPeriodType,
    /// The payroll currency.
    pub currency: String,
    /// Worked-period start (inclusive).
    pub period_start: NaiveDate,
    /// Worked-period end (inclusive).
    pub period_end: NaiveDate,
    /// Input cutoff date.
    pub cutoff_date: NaiveDate,
    /// Payment window start.
    pub payment_window_start: NaiveDate,
    /// Payment window end.
    pub payment_window_end: NaiveDate,
    /// Scheduled pay date.
    pub pay_date: NaiveDate,
}

/// The fields supplied when creating a personal action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpec {
    /// The company the action is recorded under.
    pub company_id: Uuid,
    /// The employee the action applies to.
    pub employee_id: Uuid,
    /// The kind of action.
    pub action_type: ActionType,
    /// First effective day (inclusive).
    pub effective_start: NaiveDate,
    /// Last effective day (inclusive).
    pub effective_end: NaiveDate,
    /// The full amount.
    pub amount: Decimal,
    /// ISO currency code of the amount.
    pub currency: String,
}

/// The payroll lifecycle engine.
///
/// Owns the store and the injected collaborators. All lifecycle
/// operations go through this type.
pub struct PayrollEngine {
    store: Store,
    config: EngineConfig,
    audit: Arc<dyn AuditSink>,
    events: Arc<dyn EventPublisher>,
    permissions: Arc<dyn PermissionChecker>,
}

impl PayrollEngine {
    /// Creates an engine with the given configuration and collaborators.
    pub fn new(
        config: EngineConfig,
        audit: Arc<dyn AuditSink>,
        events: Arc<dyn EventPublisher>,
        permissions: Arc<dyn PermissionChecker>,
    ) -> Self {
        Self {
            store: Store::new(),
            config,
            audit,
            events,
            permissions,
        }
    }

    fn check_permission(&self, actor: Uuid, company: Uuid, capability: &str) -> EngineResult<()> {
        if self.permissions.has_permission(actor, company, capability) {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied {
                actor_id: actor,
                capability: capability.to_string(),
            })
        }
    }

    fn record_audit(
        &self,
        action: &str,
        entity: &str,
        entity_id: Uuid,
        actor: Option<Uuid>,
        description: String,
        before: serde_json::Value,
        after: serde_json::Value,
    ) {
        self.audit.record(AuditEvent {
            module: "payroll".to_string(),
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id,
            actor_id: actor,
            description,
            before,
            after,
        });
    }

    fn json_of<T: serde::Serialize>(value: &T) -> serde_json::Value {
        serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
    }

    // ------------------------------------------------------------------
    // Roster (maintained by an external CRUD surface; mirrored here)
    // ------------------------------------------------------------------

    /// Registers or replaces an employee record in the engine's roster
    /// mirror.
    pub fn register_employee(&self, employee: Employee) -> EngineResult<()> {
        self.store.transaction(|data| {
            data.employees.insert(employee.id, employee.clone());
            Ok(())
        })
    }

    /// Fetches an employee by id.
    pub fn get_employee(&self, id: Uuid) -> EngineResult<Employee> {
        self.store.read(|data| data.employee(id).cloned())
    }

    // ------------------------------------------------------------------
    // Payroll lifecycle
    // ------------------------------------------------------------------

    /// Creates a payroll period in the `Open` state, reserving its
    /// (company, worked period, type, currency) slot.
    pub fn create_payroll(&self, spec: PayrollSpec, actor: Uuid) -> EngineResult<PayrollPeriod> {
        self.check_permission(actor, spec.company_id, CAP_MANAGE_PAYROLL)?;

        let payroll = PayrollPeriod {
            id: Uuid::new_v4(),
            company_id: spec.company_id,
            period_type: spec.period_type,
            currency: spec.currency,
            period_start: spec.period_start,
            period_end: spec.period_end,
            cutoff_date: spec.cutoff_date,
            payment_window_start: spec.payment_window_start,
            payment_window_end: spec.payment_window_end,
            pay_date: spec.pay_date,
            state: PayrollState::Open,
            inactive: false,
            version: 1,
            requires_recalculation: false,
            last_snapshot_at: None,
        };
        payroll.validate_dates()?;

        let created = self.store.transaction(|data| {
            if data.active_slot_taken(&payroll.slot_key(), payroll.id) {
                return Err(EngineError::SlotConflict);
            }
            data.payrolls.insert(payroll.id, payroll.clone());
            Ok(payroll.clone())
        })?;

        info!(payroll_id = %created.id, company_id = %created.company_id, "payroll opened");
        self.record_audit(
            "create",
            "payroll_period",
            created.id,
            Some(actor),
            format!(
                "opened payroll {} .. {} ({})",
                created.period_start, created.period_end, created.currency
            ),
            serde_json::Value::Null,
            Self::json_of(&created),
        );
        self.events.publish(DomainEvent::PayrollOpened {
            payroll_id: created.id,
        });
        Ok(created)
    }

    /// Edits a payroll's defining fields. Legal only in `Open`; edits
    /// that move the slot re-validate slot uniqueness.
    pub fn update_payroll(
        &self,
        id: Uuid,
        spec: PayrollSpec,
        actor: Uuid,
    ) -> EngineResult<PayrollPeriod> {
        self.check_permission(actor, spec.company_id, CAP_MANAGE_PAYROLL)?;

        let (before, after) = self.store.transaction(|data| {
            let current = data.payroll(id)?.clone();
            if current.state != PayrollState::Open || current.inactive {
                return Err(EngineError::InvalidTransition {
                    id,
                    state: current.state,
                    operation: "edit",
                    message: "editing is only legal while the payroll is open".to_string(),
                });
            }

            let mut updated = current.clone();
            updated.company_id = spec.company_id;
            updated.period_type = spec.period_type;
            updated.currency = spec.currency.clone();
            updated.period_start = spec.period_start;
            updated.period_end = spec.period_end;
            updated.cutoff_date = spec.cutoff_date;
            updated.payment_window_start = spec.payment_window_start;
            updated.payment_window_end = spec.payment_window_end;
            updated.pay_date = spec.pay_date;
            updated.validate_dates()?;

            if updated.slot_key() != current.slot_key()
                && data.active_slot_taken(&updated.slot_key(), id)
            {
                return Err(EngineError::SlotConflict);
            }

            updated.version += 1;
            data.payrolls.insert(id, updated.clone());
            Ok((current, updated))
        })?;

        self.record_audit(
            "update",
            "payroll_period",
            id,
            Some(actor),
            "edited payroll fields".to_string(),
            Self::json_of(&before),
            Self::json_of(&after),
        );
        Ok(after)
    }

    /// Collects snapshots for an open payroll: purges stale actions via
    /// the eligibility sweep, wipes and rebuilds this payroll's
    /// snapshots, inputs and results, then flips to `Processing`.
    pub fn collect(&self, id: Uuid, actor: Uuid) -> EngineResult<PayrollPeriod> {
        let now = Utc::now();
        let after = self.store.transaction(|data| {
            let current = data.payroll(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_PAYROLL)?;
            if current.state != PayrollState::Open || current.inactive {
                return Err(EngineError::InvalidTransition {
                    id,
                    state: current.state,
                    operation: "collect",
                    message: "collection requires an open, active payroll".to_string(),
                });
            }

            // Purge actions that became inapplicable before freezing
            // anything. Expiry is judged against the worked period, not
            // the wall clock: an action that ended before the period
            // began can never bind here.
            let scope = SweepScope {
                company_id: Some(current.company_id),
                target_payroll_id: Some(id),
                actor_id: None,
            };
            run_sweep(data, &scope, current.period_start)?;

            run_collection(data, id, now)?;

            let payroll = data.payroll_mut(id)?;
            payroll.state = PayrollState::Processing;
            payroll.requires_recalculation = false;
            payroll.last_snapshot_at = Some(now);
            payroll.version += 1;
            Ok(payroll.clone())
        })?;

        info!(payroll_id = %id, version = after.version, "payroll collected");
        self.record_audit(
            "collect",
            "payroll_period",
            id,
            Some(actor),
            "collected snapshots and moved to processing".to_string(),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        Ok(after)
    }

    /// Verifies a processing payroll: snapshots and results must exist.
    pub fn verify(&self, id: Uuid, actor: Uuid) -> EngineResult<PayrollPeriod> {
        let after = self.store.transaction(|data| {
            let current = data.payroll(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_PAYROLL)?;
            if current.state != PayrollState::Processing || current.inactive {
                return Err(EngineError::InvalidTransition {
                    id,
                    state: current.state,
                    operation: "verify",
                    message: "verification requires a processing, active payroll".to_string(),
                });
            }
            if data.employee_snapshots_for(id).is_empty() {
                return Err(EngineError::PreconditionFailed {
                    message: "cannot verify a payroll with no employee snapshots".to_string(),
                });
            }
            if data.input_snapshots_for(id).is_empty() {
                return Err(EngineError::PreconditionFailed {
                    message: "cannot verify a payroll with no input snapshots".to_string(),
                });
            }
            if data.results_for(id).is_empty() {
                return Err(EngineError::PreconditionFailed {
                    message: "cannot verify a payroll with no results".to_string(),
                });
            }

            let payroll = data.payroll_mut(id)?;
            payroll.state = PayrollState::Verified;
            payroll.version += 1;
            Ok(payroll.clone())
        })?;

        info!(payroll_id = %id, version = after.version, "payroll verified");
        self.record_audit(
            "verify",
            "payroll_period",
            id,
            Some(actor),
            "verified collected snapshots".to_string(),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        self.events
            .publish(DomainEvent::PayrollVerified { payroll_id: id });
        Ok(after)
    }

    /// Applies a verified payroll.
    ///
    /// The flip is one atomic conditional update: it succeeds only if
    /// the state is still `Verified`, the caller's expected version
    /// matches, and no recalculation is pending. The same transaction
    /// marks every bound consumable action `consumed`. A version
    /// mismatch is a conflict (reload and retry); everything else is a
    /// precondition violation. Vacation usage is posted afterwards as an
    /// idempotent follow-up.
    pub fn apply(
        &self,
        id: Uuid,
        expected_version: Option<u64>,
        actor: Uuid,
    ) -> EngineResult<PayrollPeriod> {
        let (after, consumed) = self.store.transaction(|data| {
            let current = data.payroll(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_PAYROLL)?;
            // The version comparison comes first: a caller holding a
            // stale version is told to reload and retry, even when the
            // payroll has already moved on (a second apply with the
            // same expected version is a conflict, not a bad request).
            if let Some(expected) = expected_version {
                if expected != current.version {
                    return Err(EngineError::VersionConflict {
                        id,
                        expected,
                        actual: current.version,
                    });
                }
            }
            if current.state != PayrollState::Verified || current.inactive {
                return Err(EngineError::InvalidTransition {
                    id,
                    state: current.state,
                    operation: "apply",
                    message: "apply requires a verified, active payroll".to_string(),
                });
            }
            if current.requires_recalculation {
                return Err(EngineError::PreconditionFailed {
                    message: "payroll requires recalculation before it can be applied"
                        .to_string(),
                });
            }

            // The flip and the action consumption are all-or-nothing.
            let bound = data.bound_action_ids(id);
            let mut consumed = 0usize;
            for action_id in bound {
                let action = data.action_mut(action_id)?;
                if action.state.is_consumable() {
                    action.state = ActionState::Consumed;
                    action.version += 1;
                    consumed += 1;
                }
            }

            let payroll = data.payroll_mut(id)?;
            payroll.state = PayrollState::Applied;
            payroll.version += 1;
            Ok((payroll.clone(), consumed))
        })?;

        info!(
            payroll_id = %id,
            version = after.version,
            consumed_actions = consumed,
            "payroll applied"
        );
        self.record_audit(
            "apply",
            "payroll_period",
            id,
            Some(actor),
            format!("applied payroll, consuming {consumed} actions"),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        self.events.publish(DomainEvent::PayrollApplied {
            payroll_id: id,
            consumed_actions: consumed,
        });

        // Ledger usage runs outside the apply transaction; it is keyed
        // by source reference and may be retried via
        // `post_vacation_usage` if it fails here.
        if let Err(error) = self.post_vacation_usage(id) {
            warn!(payroll_id = %id, %error, "vacation usage posting deferred");
        }

        Ok(after)
    }

    /// Posts vacation usage for an applied payroll into the ledger.
    /// Idempotent; safe to retry at any time.
    pub fn post_vacation_usage(&self, id: Uuid) -> EngineResult<usize> {
        self.store
            .transaction(|data| apply_usage_from_payroll(data, &self.config, id, Utc::now()))
    }

    /// Reopens a verified payroll, recording the operator's reason.
    pub fn reopen(&self, id: Uuid, reason: &str, actor: Uuid) -> EngineResult<PayrollPeriod> {
        let after = self.store.transaction(|data| {
            let current = data.payroll(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_PAYROLL)?;
            if current.state != PayrollState::Verified || current.inactive {
                return Err(EngineError::InvalidTransition {
                    id,
                    state: current.state,
                    operation: "reopen",
                    message: "only a verified payroll can be reopened".to_string(),
                });
            }

            let payroll = data.payroll_mut(id)?;
            payroll.state = PayrollState::Open;
            payroll.version += 1;
            Ok(payroll.clone())
        })?;

        info!(payroll_id = %id, reason, "payroll reopened");
        self.record_audit(
            "reopen",
            "payroll_period",
            id,
            Some(actor),
            format!("reopened payroll: {reason}"),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        self.events.publish(DomainEvent::PayrollReopened {
            payroll_id: id,
            reason: reason.to_string(),
        });
        Ok(after)
    }

    /// Marks an applied payroll as posted. Terminal.
    pub fn post(&self, id: Uuid, actor: Uuid) -> EngineResult<PayrollPeriod> {
        let after = self.store.transaction(|data| {
            let current = data.payroll(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_PAYROLL)?;
            if current.state != PayrollState::Applied {
                return Err(EngineError::InvalidTransition {
                    id,
                    state: current.state,
                    operation: "post",
                    message: "only an applied payroll can be posted".to_string(),
                });
            }

            let payroll = data.payroll_mut(id)?;
            payroll.state = PayrollState::Posted;
            payroll.version += 1;
            Ok(payroll.clone())
        })?;

        info!(payroll_id = %id, "payroll posted");
        self.record_audit(
            "post",
            "payroll_period",
            id,
            Some(actor),
            "posted payroll".to_string(),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        Ok(after)
    }

    /// Soft-inactivates a payroll, releasing its slot. Rejected on
    /// terminal states.
    pub fn inactivate(&self, id: Uuid, actor: Uuid) -> EngineResult<PayrollPeriod> {
        let after = self.store.transaction(|data| {
            let current = data.payroll(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_PAYROLL)?;
            if current.state.is_terminal() {
                return Err(EngineError::InvalidTransition {
                    id,
                    state: current.state,
                    operation: "inactivate",
                    message: "an applied or posted payroll is immutable".to_string(),
                });
            }
            if current.inactive {
                return Err(EngineError::PreconditionFailed {
                    message: "payroll is already inactive".to_string(),
                });
            }

            let payroll = data.payroll_mut(id)?;
            payroll.inactive = true;
            payroll.version += 1;
            Ok(payroll.clone())
        })?;

        info!(payroll_id = %id, "payroll inactivated");
        self.record_audit(
            "inactivate",
            "payroll_period",
            id,
            Some(actor),
            "inactivated payroll".to_string(),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        self.events
            .publish(DomainEvent::PayrollDeactivated { payroll_id: id });
        Ok(after)
    }

    /// Fetches a payroll by id.
    pub fn get_payroll(&self, id: Uuid) -> EngineResult<PayrollPeriod> {
        self.store.read(|data| data.payroll(id).cloned())
    }

    /// A read-only summary of a payroll's collected state.
    pub fn snapshot_summary(&self, id: Uuid) -> EngineResult<SnapshotSummary> {
        self.store.read(|data| {
            data.payroll(id)?;
            let results = data.results_for(id);
            let totals = ResultTotals {
                gross: results.iter().map(|r| r.gross).sum(),
                deductions: results.iter().map(|r| r.deductions).sum(),
                net: results.iter().map(|r| r.net).sum(),
            };
            Ok(SnapshotSummary {
                employees: data.employee_snapshots_for(id).len(),
                inputs: data.input_snapshots_for(id).len(),
                bound_actions: data.bound_action_ids(id).len(),
                totals,
            })
        })
    }

    // ------------------------------------------------------------------
    // Personal actions
    // ------------------------------------------------------------------

    /// Creates a personal action awaiting approval.
    pub fn create_action(&self, spec: ActionSpec, actor: Uuid) -> EngineResult<PersonalAction> {
        self.check_permission(actor, spec.company_id, CAP_MANAGE_ACTIONS)?;
        if spec.effective_start > spec.effective_end {
            return Err(EngineError::PreconditionFailed {
                message: "action effective start must not be after its end".to_string(),
            });
        }

        let action = PersonalAction {
            id: Uuid::new_v4(),
            company_id: spec.company_id,
            employee_id: spec.employee_id,
            action_type: spec.action_type,
            state: ActionState::PendingApproval,
            effective_start: spec.effective_start,
            effective_end: spec.effective_end,
            amount: spec.amount,
            currency: spec.currency,
            approved_at: None,
            payroll_id: None,
            version: 1,
            invalidation: None,
        };

        let created = self.store.transaction(|data| {
            data.employee(action.employee_id)?;
            data.actions.insert(action.id, action.clone());
            Ok(action.clone())
        })?;

        self.record_audit(
            "create",
            "personal_action",
            created.id,
            Some(actor),
            format!("created {:?} action for {}", created.action_type, created.amount),
            serde_json::Value::Null,
            Self::json_of(&created),
        );
        self.events.publish(DomainEvent::ActionCreated {
            action_id: created.id,
        });
        Ok(created)
    }

    /// Approves a pending action, making it collectible.
    pub fn approve_action(&self, id: Uuid, actor: Uuid) -> EngineResult<PersonalAction> {
        let after = self.store.transaction(|data| {
            let current = data.action(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_ACTIONS)?;
            if current.state != ActionState::PendingApproval {
                return Err(EngineError::InvalidActionState {
                    id,
                    state: current.state,
                    operation: "approve",
                });
            }
            let action = data.action_mut(id)?;
            action.state = ActionState::Approved;
            action.approved_at = Some(Utc::now());
            action.version += 1;
            Ok(action.clone())
        })?;

        self.record_audit(
            "approve",
            "personal_action",
            id,
            Some(actor),
            "approved action".to_string(),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        self.events
            .publish(DomainEvent::ActionApproved { action_id: id });
        Ok(after)
    }

    /// Rejects a pending action.
    pub fn reject_action(&self, id: Uuid, actor: Uuid) -> EngineResult<PersonalAction> {
        let after = self.store.transaction(|data| {
            let current = data.action(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_ACTIONS)?;
            if current.state != ActionState::PendingApproval {
                return Err(EngineError::InvalidActionState {
                    id,
                    state: current.state,
                    operation: "reject",
                });
            }
            let action = data.action_mut(id)?;
            action.state = ActionState::Rejected;
            action.version += 1;
            Ok(action.clone())
        })?;

        self.record_audit(
            "reject",
            "personal_action",
            id,
            Some(actor),
            "rejected action".to_string(),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        self.events
            .publish(DomainEvent::ActionRejected { action_id: id });
        Ok(after)
    }

    /// Manually invalidates an approved, unbound action.
    pub fn invalidate_action(&self, id: Uuid, actor: Uuid) -> EngineResult<PersonalAction> {
        let after = self.store.transaction(|data| {
            let current = data.action(id)?.clone();
            self.check_permission(actor, current.company_id, CAP_MANAGE_ACTIONS)?;
            if !current.is_bindable() {
                return Err(EngineError::InvalidActionState {
                    id,
                    state: current.state,
                    operation: "invalidate",
                });
            }
            let action = data.action_mut(id)?;
            action.state = ActionState::Invalidated;
            action.version += 1;
            action.invalidation = Some(Invalidation {
                reason: InvalidationReason::Manual,
                actor_type: ActorType::User,
                actor_id: Some(actor),
                at: Utc::now(),
                detail: serde_json::json!({ "rule": "MANUAL" }),
            });
            Ok(action.clone())
        })?;

        self.record_audit(
            "invalidate",
            "personal_action",
            id,
            Some(actor),
            "manually invalidated action".to_string(),
            serde_json::Value::Null,
            Self::json_of(&after),
        );
        Ok(after)
    }

    /// Fetches an action by id.
    pub fn get_action(&self, id: Uuid) -> EngineResult<PersonalAction> {
        self.store.read(|data| data.action(id).cloned())
    }

    // ------------------------------------------------------------------
    // Background jobs and ledger operations
    // ------------------------------------------------------------------

    /// Runs the eligibility sweep. Schedulable nightly and safe to
    /// re-run; the second consecutive run invalidates nothing.
    pub fn run_eligibility_sweep(
        &self,
        scope: SweepScope,
        as_of: Option<NaiveDate>,
    ) -> EngineResult<SweepOutcome> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        self.store.transaction(|data| run_sweep(data, &scope, as_of))
    }

    /// Runs the monthly vacation accrual provision up to `as_of`
    /// (today when `None`). Re-entrant; interrupted runs pick up where
    /// they left off.
    pub fn run_daily_accrual(&self, as_of: Option<NaiveDate>) -> EngineResult<AccrualOutcome> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        self.store
            .transaction(|data| run_daily_provision(data, &self.config, as_of))
    }

    /// Creates an employee's vacation account with its opening balance.
    pub fn create_initial_vacation_account(
        &self,
        employee_id: Uuid,
        initial_balance: Decimal,
        actor: Uuid,
    ) -> EngineResult<()> {
        let account = self.store.transaction(|data| {
            let employee = data.employee(employee_id)?.clone();
            self.check_permission(actor, employee.company_id, CAP_MANAGE_VACATION)?;
            create_initial_account(data, employee_id, initial_balance, Utc::now())
        })?;

        self.record_audit(
            "create",
            "vacation_account",
            employee_id,
            Some(actor),
            format!("opened vacation account with balance {initial_balance}"),
            serde_json::Value::Null,
            Self::json_of(&account),
        );
        Ok(())
    }

    /// Recomputes an employee's vacation balance from scratch and
    /// compares it with the stored running balances.
    pub fn reconcile_vacation_balance(
        &self,
        employee_id: Uuid,
    ) -> EngineResult<BalanceReconciliation> {
        self.store.read(|data| reconcile_balance(data, employee_id))
    }
}
