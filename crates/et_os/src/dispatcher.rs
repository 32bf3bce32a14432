#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use et_engines::listing::{refresh_next_listed_date, NEXT_LISTED_DATE_FIELD};
use et_kernel_contracts::case::{CaseRecord, FieldAccess};
use et_kernel_contracts::envelope::ResponseEnvelope;
use et_kernel_contracts::event::{Credential, LifecycleEvent};
use et_kernel_contracts::ContractViolation;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use et_storage::repo::MigrationRollbackRepo;

use crate::access_roles::{AccessRoleAssigner, CaseAccessClient};
use crate::case_vetting::VettingInitializer;
use crate::clock::CaseClock;
use crate::gate::AuthorizationGate;
use crate::handler::{EventContext, HardFailure, LifecycleHandler};
use crate::hearing_preferences::HearingPreferenceValidator;
use crate::migration_rollback::MigrationRollbackHandler;
use crate::pre_acceptance::AcceptanceValidator;
use crate::tse_respondent::TseApplicationHandler;

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Envelope(ResponseEnvelope),
    AuthorizationDenied,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no handler registered for {0}")]
    HandlerNotRegistered(LifecycleEvent),
    #[error("{event} failed: {source}")]
    HardFailure {
        event: LifecycleEvent,
        #[source]
        source: HardFailure,
    },
    #[error("{event} broke its field contract: {violation}")]
    ContractViolation {
        event: LifecycleEvent,
        violation: ContractViolation,
    },
}

pub struct DispatcherBuilder {
    gate: AuthorizationGate,
    clock: Arc<dyn CaseClock>,
    handlers: BTreeMap<LifecycleEvent, Box<dyn LifecycleHandler>>,
}

impl DispatcherBuilder {
    /// Registers under the handler's own event; a later registration for the
    /// same event replaces the earlier one.
    pub fn handler(mut self, handler: impl LifecycleHandler + 'static) -> Self {
        self.handlers.insert(handler.event(), Box::new(handler));
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            gate: self.gate,
            clock: self.clock,
            handlers: self.handlers,
        }
    }
}

/// Routes one lifecycle callback to its handler and shapes the result.
pub struct Dispatcher {
    gate: AuthorizationGate,
    clock: Arc<dyn CaseClock>,
    handlers: BTreeMap<LifecycleEvent, Box<dyn LifecycleHandler>>,
}

impl Dispatcher {
    pub fn builder(gate: AuthorizationGate, clock: Arc<dyn CaseClock>) -> DispatcherBuilder {
        DispatcherBuilder {
            gate,
            clock,
            handlers: BTreeMap::new(),
        }
    }

    /// All six lifecycle handlers wired to their collaborators.
    pub fn standard(
        gate: AuthorizationGate,
        clock: Arc<dyn CaseClock>,
        case_access: Arc<dyn CaseAccessClient>,
        migration_ledger: Arc<dyn MigrationRollbackRepo>,
    ) -> Dispatcher {
        Dispatcher::builder(gate, clock)
            .handler(AccessRoleAssigner::new(case_access))
            .handler(VettingInitializer)
            .handler(HearingPreferenceValidator)
            .handler(AcceptanceValidator)
            .handler(MigrationRollbackHandler::new(migration_ledger))
            .handler(TseApplicationHandler)
            .build()
    }

    pub fn registered_events(&self) -> Vec<LifecycleEvent> {
        self.handlers.keys().copied().collect()
    }

    /// Gate decision alone. Ungated events always pass.
    pub fn authorize(&self, event: LifecycleEvent, credential: Option<&Credential>) -> bool {
        !event.requires_authorization() || self.gate.verify(credential)
    }

    pub fn dispatch(
        &self,
        event: LifecycleEvent,
        credential: Option<&Credential>,
        mut record: CaseRecord,
    ) -> Result<DispatchOutcome, DispatchError> {
        let handler = self
            .handlers
            .get(&event)
            .ok_or(DispatchError::HandlerNotRegistered(event))?;

        if !self.authorize(event, credential) {
            warn!(%event, case_id = %record.case_id(), "authorization denied");
            return Ok(DispatchOutcome::AuthorizationDenied);
        }

        let mut access: FieldAccess = handler.field_access(&record);
        debug!(%event, case_id = %record.case_id(), reads = ?access.reads, writes = ?access.writes, "dispatching");

        let snapshot = record.case_data.clone();
        let ctx = EventContext {
            today: self.clock.today(),
            now_rfc3339: self.clock.now_rfc3339(),
        };

        let errors = match handler.handle(&ctx, &mut record) {
            Ok(errors) => errors,
            Err(source) => {
                error!(%event, case_id = %record.case_id(), error = %source, "hard failure");
                return Err(DispatchError::HardFailure { event, source });
            }
        };

        if !errors.is_empty() {
            info!(%event, case_id = %record.case_id(), error_count = errors.len(), "validation rejected");
            return Ok(DispatchOutcome::Envelope(ResponseEnvelope::rejected(
                snapshot, errors,
            )));
        }

        if access.refreshes_next_listed_date {
            refresh_next_listed_date(&mut record.case_data, ctx.today);
            access.writes.insert(NEXT_LISTED_DATE_FIELD.to_string());
        }

        let changed = record.case_data.changed_fields(&snapshot);
        access.check_writes(&changed).map_err(|violation| {
            error!(%event, case_id = %record.case_id(), %violation, "undeclared write");
            DispatchError::ContractViolation { event, violation }
        })?;

        info!(%event, case_id = %record.case_id(), changed_fields = changed.len(), "accepted");
        Ok(DispatchOutcome::Envelope(ResponseEnvelope::accepted(
            record.case_data,
        )))
    }
}
