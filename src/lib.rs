//! Data-access engine for the Scout Spirit progress platform.
//!
//! Maps a logical entity model — partition key, optional sort key, named
//! secondary indices, attribute projections — onto DynamoDB's wire
//! protocol. Every business service (beneficiaries, groups, rewards, logs,
//! tasks) reads and writes through this crate; it is the one place where
//! key schemas, expression escaping, and conditional-write semantics live.
//!
//! # Shape
//!
//! Declare each entity's [`TableDescriptor`] once at startup, register them
//! in a [`Database`], and hand out [`TableIndex`] handles:
//!
//! ```no_run
//! use scoutspirit_db::{
//!     ConnectOptions, Database, Operator, QueryOptions, SortClause, TableDescriptor,
//! };
//! use serde_json::json;
//!
//! # async fn example() -> scoutspirit_db::Result<()> {
//! let mut db = Database::connect(ConnectOptions::default()).await;
//! db.register(
//!     TableDescriptor::new("logs", "user")
//!         .with_sort_key("tag")
//!         .with_index("ByTimestamp", "user", Some("timestamp")),
//! );
//!
//! let logs = db.index("logs", None)?;
//! let page = logs
//!     .query(
//!         &json!("sub-1"),
//!         &[SortClause::new(Operator::BeginsWith, "REWARD::")],
//!         QueryOptions {
//!             limit: Some(25),
//!             scan_forward: Some(false),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! # let _ = page;
//! # Ok(())
//! # }
//! ```
//!
//! # Guarantees and non-guarantees
//!
//! Atomicity is strictly single-item: a conditional write is the unit of
//! atomicity, and when two callers race one key the store picks exactly one
//! winner — the loser sees [`Error::ConditionalCheckFailed`] synchronously.
//! The engine holds no item cache, performs no retries, and never spans
//! more than one round trip per call; pagination and retry policy belong to
//! the caller. Multi-item transactions are out of scope by design.

pub mod client;
pub mod errors;
pub mod expressions;
pub mod keys;
pub mod operations;
pub mod results;
pub mod schema;
pub mod table;
pub mod telemetry;
pub mod value;

pub use client::{ConnectOptions, Database, build_client};
pub use errors::{Error, Result};
pub use expressions::{Guard, Operator, SortClause, UpdateCondition, UpdateSpec};
pub use operations::{
    BatchGetResult, BatchWriteResult, QueryOptions, ReturnMode, ScanOptions, UpdateResult,
};
pub use results::{ConsumedCapacity, Cursor, GetResult, QueryResult};
pub use schema::{KeySchema, TableDescriptor};
pub use table::{KeyPair, TableIndex};
pub use value::Item;
