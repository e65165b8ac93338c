//! CSV-backed channel table shared by the discovery and enrichment passes.

pub mod error;
pub mod table;

pub use error::StoreError;
pub use table::ChannelTable;
