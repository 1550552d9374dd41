//! CLI command implementations
//!
//! Commands are organized by dashboard page:
//! - `core` - Shared utilities (config, client, uploads) and the url/config commands
//! - `fisheries` - Fish classification and overfishing monitoring
//! - `ocean` - Chlorophyll prediction and SST forecasting
//! - `biodiversity` - eDNA analysis and species questions
//! - `chat` - Fisheries assistant

pub mod biodiversity;
pub mod chat;
pub mod core;
pub mod fisheries;
pub mod ocean;

// Re-export command functions for main.rs
pub use biodiversity::*;
pub use chat::*;
pub use core::*;
pub use fisheries::*;
pub use ocean::*;
