pub mod chat;
pub mod quotation;
pub mod role;
pub mod sor;
pub mod toast;
