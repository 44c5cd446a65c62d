pub mod actions;
pub mod queries;
pub mod storage;

pub use actions::QuotationRepository;
pub use queries::{DraftFilter, ListFilter};
pub use storage::QuotationStorage;
