pub mod audit;
pub mod canvas;
pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod flows;
pub mod generator;
pub mod interrupt;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use canvas::{
    action_to_message, message_to_action, ActionOutcome, ActionSource, CanvasAction,
    CanvasCoordinator, CanvasPayload, CanvasState, CanvasTab,
};
pub use config::{AppConfig, AssistantMode, ChatVisibility, LoadOptions};
pub use domain::chat::{ChatMessage, Sender};
pub use domain::quotation::{LineItem, QuotationId, QuotationRecord, QuotationStatus};
pub use domain::role::{ListScope, QuotationAffordance, Role};
pub use domain::sor::RatedItem;
pub use domain::toast::{Toast, ToastVariant};
pub use errors::{ApplicationError, DomainError, InterfaceError, ValidationError};
pub use export::{PrintDocument, PrintView};
pub use flows::{FlowEngine, LifecycleEvent, LifecycleFlow};
pub use generator::{GenerationRequest, QuotationGenerator};
pub use interrupt::{Interrupt, InterruptAnswer, InterruptController, InterruptPreset};
