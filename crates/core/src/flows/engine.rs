use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::quotation::QuotationStatus;
use crate::flows::states::{FlowAction, LifecycleEvent, TransitionOutcome};

pub trait FlowDefinition {
    fn initial_state(&self) -> QuotationStatus;
    fn transition(
        &self,
        current: QuotationStatus,
        event: LifecycleEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// draft -> pending -> approved | rejected -> archived.
#[derive(Clone, Debug, Default)]
pub struct LifecycleFlow;

impl FlowDefinition for LifecycleFlow {
    fn initial_state(&self) -> QuotationStatus {
        QuotationStatus::Draft
    }

    fn transition(
        &self,
        current: QuotationStatus,
        event: LifecycleEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_lifecycle(current, event)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> QuotationStatus {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: QuotationStatus,
        event: LifecycleEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: QuotationStatus,
        event: LifecycleEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::from_context(
                        audit,
                        "quotation.transition_applied",
                        AuditCategory::Lifecycle,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", outcome.from.as_str())
                    .with_metadata("to", outcome.to.as_str())
                    .with_metadata("event", outcome.event.as_str()),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::from_context(
                        audit,
                        "quotation.transition_rejected",
                        AuditCategory::Lifecycle,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("event", event.as_str())
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for FlowEngine<LifecycleFlow> {
    fn default() -> Self {
        Self::new(LifecycleFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {state} using event {event:?}")]
    InvalidTransition { state: QuotationStatus, event: LifecycleEvent },
}

fn transition_lifecycle(
    current: QuotationStatus,
    event: LifecycleEvent,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowAction::{NotifyRequestor, RecordApproverNotes, RouteToApprover};
    use LifecycleEvent::{Approve, Archive, Reject, SubmitForApproval};
    use QuotationStatus::{Approved, Archived, Draft, Pending, Rejected};

    let (to, actions) = match (current, event) {
        (Draft, SubmitForApproval) => (Pending, vec![RouteToApprover]),
        (Pending, Approve) => (Approved, vec![RecordApproverNotes, NotifyRequestor]),
        (Pending, Reject) => (Rejected, vec![RecordApproverNotes, NotifyRequestor]),
        (Approved, Archive) | (Rejected, Archive) => (Archived, Vec::new()),
        (Archived, Archive) => (Archived, Vec::new()),
        _ => return Err(FlowTransitionError::InvalidTransition { state: current, event }),
    };

    Ok(TransitionOutcome { from: current, to, event, actions })
}
