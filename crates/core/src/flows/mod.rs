pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, LifecycleFlow};
pub use states::{FlowAction, LifecycleEvent, TransitionOutcome};
