// MSSQL module - the tiberius-facing side of the crate
//
// This module is split into several sub-modules:
// - config: connection configuration
// - client: raw client creation
// - params: mapping compiled parameters to wire values
// - executor: statement execution
// - transaction: BEGIN/COMMIT/ROLLBACK wrappers

pub mod client;
pub mod config;
pub mod executor;
pub(crate) mod params;
pub mod transaction;

// Re-export the public API
pub use client::connect;
pub use config::{MssqlClient, MssqlConfig};
pub use executor::{execute_batch, execute_dml, execute_select};
pub use transaction::{IsolationLevel, Tx, begin_transaction};
