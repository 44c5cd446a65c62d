pub mod connection;
pub mod migrations;
pub mod quotations;
pub mod store;

pub use connection::{connect, connect_with_settings, DbPool};
pub use quotations::{DraftFilter, ListFilter, QuotationRepository, QuotationStorage};
pub use store::{
    InMemoryKeyValueStore, KeyValueStore, RepositoryError, SqliteKeyValueStore, HAS_VISITED_KEY,
};
