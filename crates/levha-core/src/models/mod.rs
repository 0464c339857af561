//! Data models and configuration.

pub mod config;
pub mod record;

pub use config::{LevhaConfig, GLYPH_CONFIDENCE_FLOOR, TAX_BASE_FLOOR};
pub use record::{ActivityEntry, DocumentRecord, TaxBaseEntry, TaxType};
