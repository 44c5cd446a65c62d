//! Assistant side of quotecanvas.
//!
//! - `prediction`: HTTP client for the hosted prediction endpoint
//! - `sor`: Schedule of Rates lookup and reply parsing
//! - `simulator`: offline canned replies
//! - `runtime`: the chat session (`ChatRuntime`) that ties chat, canvas and interrupts together
//! - `workspace`: the quotation panel's view state (`QuotationWorkspace`)
//!
//! The assistant never prices anything. Prices come from the generator and the rate card.

pub mod prediction;
pub mod runtime;
pub mod simulator;
pub mod sor;
pub mod workspace;

pub use prediction::{AssistantError, HttpPredictionClient, PredictionClient, ResponseFormat};
pub use runtime::{AssistantBackend, ChatRuntime};
pub use simulator::{simulate_reply, SimulatedReply};
pub use sor::{parse_sor_response, SorRetriever};
pub use workspace::{QuotationWorkspace, WorkspaceView};
