//! Typed Hive API methods.
//!
//! Thin wrappers over [`RpcClient::call`] for the procedures this crate uses
//! itself or that most callers need. Anything else goes through `call`
//! directly with a caller-chosen result type.

use crate::client::RpcClient;
use crate::error::RpcError;
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote procedure names.
pub mod methods {
    pub const FIND_ACCOUNTS: &str = "database_api.find_accounts";
    pub const GET_DYNAMIC_GLOBAL_PROPERTIES: &str = "database_api.get_dynamic_global_properties";
    pub const GET_BLOCK: &str = "block_api.get_block";
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Parameters for `database_api.find_accounts`.
#[derive(Debug, Clone, Serialize)]
pub struct FindAccountsParams<'a> {
    pub accounts: &'a [&'a str],
}

/// Account record from `database_api.find_accounts`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(default)]
    pub json_metadata: String,
    #[serde(default)]
    pub posting_json_metadata: String,
    /// Catch-all for additional fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct FindAccountsResult {
    #[serde(default)]
    accounts: Vec<Account>,
}

/// Chain head state from `database_api.get_dynamic_global_properties`.
#[derive(Debug, Clone, Deserialize)]
pub struct DynamicGlobalProperties {
    pub head_block_number: u64,
    #[serde(default)]
    pub head_block_id: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub current_witness: String,
    #[serde(default)]
    pub last_irreversible_block_num: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Block from `block_api.get_block`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedBlock {
    #[serde(default)]
    pub block_id: String,
    #[serde(default)]
    pub previous: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub witness: String,
    /// Operations are left undecoded.
    #[serde(default)]
    pub transactions: Vec<Value>,
    #[serde(default)]
    pub transaction_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct GetBlockResult {
    #[serde(default)]
    block: Option<SignedBlock>,
}

// =============================================================================
// Methods
// =============================================================================

impl<T: Transport> RpcClient<T> {
    /// Look up accounts by name. Unknown names are simply absent.
    pub async fn find_accounts(&self, names: &[&str]) -> Result<Vec<Account>, RpcError> {
        let result: FindAccountsResult = self
            .call(methods::FIND_ACCOUNTS, FindAccountsParams { accounts: names })
            .await?;
        Ok(result.accounts)
    }

    /// Get the current chain head state.
    pub async fn get_dynamic_global_properties(&self) -> Result<DynamicGlobalProperties, RpcError> {
        self.call(methods::GET_DYNAMIC_GLOBAL_PROPERTIES, ()).await
    }

    /// Get a block by number. Returns `None` for blocks the node does not have.
    pub async fn get_block(&self, block_num: u64) -> Result<Option<SignedBlock>, RpcError> {
        let result: GetBlockResult = self
            .call(methods::GET_BLOCK, serde_json::json!({ "block_num": block_num }))
            .await?;
        Ok(result.block)
    }
}
