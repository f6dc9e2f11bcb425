//! Store operations.
//!
//! Every operation splits into a pure `prepare_*` step that performs all
//! validation and expression assembly (no I/O, unit-testable), and an async
//! `execute_*` step that performs the single request/response round trip.
//! No operation spans multiple round trips; pagination loops belong to the
//! caller.

pub mod batch;
pub mod delete;
pub mod get;
pub mod put;
pub mod query;
pub mod scan;
pub mod update;

pub use batch::{BatchGetResult, BatchWriteResult, MAX_BATCH_GET_KEYS, MAX_BATCH_WRITE_ITEMS};
pub use query::QueryOptions;
pub use scan::ScanOptions;
pub use update::{ReturnMode, UpdateResult};
