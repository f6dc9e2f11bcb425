//! Store client construction and the table registry.
//!
//! Supports multiple credential sources in order of priority:
//! 1. Hardcoded credentials (access_key, secret_key, session_token)
//! 2. AWS profile from ~/.aws/credentials
//! 3. Environment variables (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY)
//! 4. Default credential chain (instance profile, etc.)
//!
//! The [`Database`] registry replaces the per-table memoized global of the
//! platform's first data layer: it is built once at process start, holds
//! the shared client handle plus every registered [`TableDescriptor`], and
//! is passed by reference to everything that needs it. The SDK client is
//! cheap to clone and safe for concurrent use; socket lifecycle and pooling
//! stay inside the SDK.

use std::collections::HashMap;

use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Credentials;

use crate::errors::{Error, Result};
use crate::schema::TableDescriptor;
use crate::table::TableIndex;

/// Client construction options. Absent fields fall back down the credential
/// and region chains.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// AWS region (default: AWS_REGION env var, then us-west-2).
    pub region: Option<String>,
    /// AWS access key ID (optional, uses env/profile if not set).
    pub access_key: Option<String>,
    /// AWS secret access key (optional, uses env/profile if not set).
    pub secret_key: Option<String>,
    /// AWS session token for temporary credentials (optional).
    pub session_token: Option<String>,
    /// AWS profile name from ~/.aws/credentials (optional).
    pub profile: Option<String>,
    /// Custom endpoint URL for local testing (localstack, dynamodb-local).
    pub endpoint_url: Option<String>,
}

/// Build the AWS SDK DynamoDB client with the given configuration.
pub async fn build_client(options: ConnectOptions) -> Client {
    // Region priority: option > env var > platform default
    let region_provider =
        RegionProviderChain::first_try(options.region.map(aws_sdk_dynamodb::config::Region::new))
            .or_default_provider()
            .or_else("us-west-2");

    let mut config_loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

    // Credentials priority: hardcoded > profile > env/default chain
    if let (Some(access_key), Some(secret_key)) = (options.access_key, options.secret_key) {
        let credentials = Credentials::new(
            access_key,
            secret_key,
            options.session_token,
            None,
            "scoutspirit-static",
        );
        config_loader = config_loader.credentials_provider(credentials);
    } else if let Some(profile_name) = options.profile {
        let profile_provider = ProfileFileCredentialsProvider::builder()
            .profile_name(&profile_name)
            .build();
        config_loader = config_loader.credentials_provider(profile_provider);
    }
    // else: default credential chain (env vars, instance profile, etc)

    let sdk_config = config_loader.load().await;

    let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
    if let Some(url) = options.endpoint_url {
        dynamo_config = dynamo_config.endpoint_url(url);
    }

    Client::from_conf(dynamo_config.build())
}

/// The process-wide registry: one client handle plus every entity's table
/// descriptor. Immutable after startup registration; share by reference.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    tables: HashMap<String, TableDescriptor>,
}

impl Database {
    /// Connect and build an empty registry.
    pub async fn connect(options: ConnectOptions) -> Self {
        Self::with_client(build_client(options).await)
    }

    /// Build a registry over an existing client handle.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            tables: HashMap::new(),
        }
    }

    /// Register an entity's table descriptor. Called once per entity during
    /// startup.
    pub fn register(&mut self, descriptor: TableDescriptor) {
        self.tables
            .insert(descriptor.table_name.clone(), descriptor);
    }

    /// Look up a registered descriptor.
    pub fn descriptor(&self, table: &str) -> Result<&TableDescriptor> {
        self.tables
            .get(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))
    }

    /// Resolve a table handle against its primary key schema or a named
    /// secondary index. Fails with `UnknownIndex` for undeclared names.
    pub fn index(&self, table: &str, index_name: Option<&str>) -> Result<TableIndex> {
        let descriptor = self.descriptor(table)?;
        let schema = descriptor.key_schema(index_name)?.clone();
        Ok(TableIndex::new(
            self.client.clone(),
            descriptor.table_name.clone(),
            index_name.map(str::to_string),
            schema,
        ))
    }

    /// The underlying client handle.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
