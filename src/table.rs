//! Per-entity table handle.
//!
//! A [`TableIndex`] is the surface business services talk to: one table,
//! resolved against its primary key schema or a named secondary index.
//! Every method is a single synchronous request/response round trip against
//! the store; pagination loops and retry policy belong to the caller.
//! Write operations go through a handle resolved against the primary
//! schema — the store does not accept writes through secondary indices.

use aws_sdk_dynamodb::Client;
use serde_json::Value;

use crate::errors::Result;
use crate::expressions::{Guard, SortClause, UpdateCondition, UpdateSpec};
use crate::operations::batch::{
    BatchGetResult, BatchWriteResult, execute_batch_get, execute_batch_write, prepare_batch_get,
    prepare_batch_write,
};
use crate::operations::delete::{execute_delete, prepare_delete};
use crate::operations::get::{execute_get, prepare_get};
use crate::operations::put::{execute_put, prepare_put};
use crate::operations::query::{QueryOptions, execute_query, prepare_query};
use crate::operations::scan::{ScanOptions, execute_scan, prepare_scan};
use crate::operations::update::{
    ReturnMode, UpdateResult, execute_update, prepare_update,
};
use crate::results::{GetResult, QueryResult};
use crate::schema::KeySchema;
use crate::value::Item;

/// A partition value plus optional sort value, fed to the batch helpers.
pub type KeyPair = (Value, Option<Value>);

/// One entity's table, resolved against a key schema.
#[derive(Debug, Clone)]
pub struct TableIndex {
    client: Client,
    table: String,
    index_name: Option<String>,
    schema: KeySchema,
}

impl TableIndex {
    pub(crate) fn new(
        client: Client,
        table: String,
        index_name: Option<String>,
        schema: KeySchema,
    ) -> Self {
        Self {
            client,
            table,
            index_name,
            schema,
        }
    }

    /// The resolved key schema this handle operates against.
    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    /// Assemble and validate a full key for this schema.
    pub fn key(&self, partition: &Value, sort: Option<&Value>) -> Result<Item> {
        self.schema.key(Some(partition), sort, true)
    }

    /// Create an item. Key attributes merge into the item body; with a
    /// guard, the write only succeeds when every guard clause holds
    /// ([`Guard::key_absent`] gives "create only if the slot is empty").
    pub async fn create(
        &self,
        partition: &Value,
        item: &Item,
        sort: Option<&Value>,
        guard: Option<&Guard>,
    ) -> Result<()> {
        let key = self.key(partition, sort)?;
        let prepared = prepare_put(&self.table, item, &key, guard)?;
        execute_put(&self.client, prepared).await
    }

    /// Read one item by full key. A missing item is `item: None`.
    pub async fn get(
        &self,
        partition: &Value,
        sort: Option<&Value>,
        attributes: Option<&[String]>,
    ) -> Result<GetResult> {
        let key = self.key(partition, sort)?;
        let prepared = prepare_get(&self.table, &key, attributes)?;
        execute_get(&self.client, prepared).await
    }

    /// Range query within one partition; sort clauses AND together.
    pub async fn query(
        &self,
        partition: &Value,
        sort_clauses: &[SortClause],
        options: QueryOptions,
    ) -> Result<QueryResult> {
        let prepared = prepare_query(
            &self.table,
            self.index_name.as_deref(),
            &self.schema,
            partition,
            sort_clauses,
            options,
        )?;
        execute_query(&self.client, prepared).await
    }

    /// Full iteration of the partition space; use only when no selective
    /// key applies.
    pub async fn scan(&self, options: ScanOptions) -> Result<QueryResult> {
        let prepared = prepare_scan(&self.table, self.index_name.as_deref(), options);
        execute_scan(&self.client, prepared).await
    }

    /// Composite atomic update, optionally gated by a condition.
    pub async fn update(
        &self,
        partition: &Value,
        sort: Option<&Value>,
        updates: &UpdateSpec,
        condition: Option<&UpdateCondition>,
        return_mode: ReturnMode,
    ) -> Result<UpdateResult> {
        let key = self.key(partition, sort)?;
        let prepared = prepare_update(&self.table, &key, updates, condition, return_mode)?;
        execute_update(&self.client, prepared).await
    }

    /// Unconditional delete by full key.
    pub async fn delete(&self, partition: &Value, sort: Option<&Value>) -> Result<()> {
        let key = self.key(partition, sort)?;
        let prepared = prepare_delete(&self.table, &key)?;
        execute_delete(&self.client, prepared).await
    }

    /// One batch-get round trip over fully-specified keys. Unserved keys
    /// come back in the result for the caller to redrive.
    pub async fn batch_get(
        &self,
        keys: &[KeyPair],
        attributes: Option<&[String]>,
    ) -> Result<BatchGetResult> {
        let assembled = self.assemble_keys(keys)?;
        let prepared = prepare_batch_get(&self.table, &assembled, attributes)?;
        execute_batch_get(&self.client, prepared).await
    }

    /// One batch-write round trip: items to put plus keys to delete.
    pub async fn batch_write(
        &self,
        puts: &[Item],
        delete_keys: &[KeyPair],
    ) -> Result<BatchWriteResult> {
        let assembled = self.assemble_keys(delete_keys)?;
        let prepared = prepare_batch_write(&self.table, puts, &assembled)?;
        execute_batch_write(&self.client, prepared).await
    }

    fn assemble_keys(&self, keys: &[KeyPair]) -> Result<Vec<Item>> {
        keys.iter()
            .map(|(partition, sort)| self.key(partition, sort.as_ref()))
            .collect()
    }
}
