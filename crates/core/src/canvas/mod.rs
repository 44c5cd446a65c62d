pub mod action;
pub mod coordinator;
pub mod protocol;
pub mod state;

pub use action::{
    ActionSource, CanvasAction, CanvasActionType, CanvasPayload, ChartKind, DataType, Location,
};
pub use coordinator::{ActionOutcome, CanvasCoordinator};
pub use protocol::{action_to_message, message_to_action};
pub use state::{CanvasState, CanvasTab, QuotationIntent};
