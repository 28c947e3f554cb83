//! Data models shared across the pipeline.

pub mod config;
pub mod invoice;

pub use config::InvexConfig;
pub use invoice::{FieldName, InvoiceRecord};
