//! Node discovery from a registry account.
//!
//! A registry account publishes the current node list in its `json_metadata`:
//!
//! ```json
//! { "nodes": ["https://api.hive.blog", ...],
//!   "failing_nodes": { "https://broken.example": "timeout" } }
//! ```
//!
//! The metadata is user-edited, so only `nodes` is required. A malformed
//! `failing_nodes` is dropped with a warning rather than failing the lookup.

use crate::client::RpcClient;
use crate::defaults;
use crate::error::RegistryError;
use crate::transport::{HttpTransport, Transport};
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Node list decoded from a registry account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryRecord {
    pub nodes: Vec<String>,
    /// Node URL → reason. Empty when absent or unreadable.
    pub failing_nodes: HashMap<String, String>,
    /// Set when `failing_nodes` was present but could not be decoded.
    pub warning: Option<String>,
}

enum FailingNodesField {
    Absent,
    Valid(HashMap<String, String>),
    Invalid(serde_json::Error),
}

impl FailingNodesField {
    fn take(metadata: &mut Map<String, Value>) -> Self {
        match metadata.remove("failing_nodes") {
            None | Some(Value::Null) => FailingNodesField::Absent,
            Some(raw) => match serde_json::from_value(raw) {
                Ok(map) => FailingNodesField::Valid(map),
                Err(e) => FailingNodesField::Invalid(e),
            },
        }
    }
}

/// Decode a registry account's `json_metadata` text.
pub fn parse_metadata(account: &str, json_metadata: &str) -> Result<RegistryRecord, RegistryError> {
    let mut metadata: Map<String, Value> =
        serde_json::from_str(json_metadata).map_err(|source| RegistryError::InvalidMetadata {
            account: account.to_string(),
            source,
        })?;

    let nodes: Vec<String> = match metadata.remove("nodes") {
        Some(raw) => serde_json::from_value(raw).map_err(|source| RegistryError::InvalidNodes {
            account: account.to_string(),
            source,
        })?,
        None => return Err(RegistryError::MissingNodes(account.to_string())),
    };

    let (failing_nodes, warning) = match FailingNodesField::take(&mut metadata) {
        FailingNodesField::Absent => (HashMap::new(), None),
        FailingNodesField::Valid(map) => (map, None),
        FailingNodesField::Invalid(e) => {
            warn!("ignoring failing_nodes on account '{}': {}", account, e);
            (HashMap::new(), Some(format!("failing_nodes ignored: {}", e)))
        }
    };

    Ok(RegistryRecord {
        nodes,
        failing_nodes,
        warning,
    })
}

/// Resolves node lists from registry accounts through an [`RpcClient`].
pub struct NodeRegistry<'a, T = HttpTransport> {
    client: &'a RpcClient<T>,
}

impl<'a, T: Transport> NodeRegistry<'a, T> {
    pub fn new(client: &'a RpcClient<T>) -> Self {
        Self { client }
    }

    /// Fetch and decode the node list published by `account`.
    ///
    /// Does not change the client's nodes.
    pub async fn fetch(&self, account: &str) -> Result<RegistryRecord, RegistryError> {
        let accounts = self.client.find_accounts(&[account]).await?;
        let found = accounts
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::AccountNotFound(account.to_string()))?;

        parse_metadata(account, &found.json_metadata)
    }

    /// Fetch the node list from `account` and install it on the client.
    ///
    /// On error the client's nodes are left as they were.
    pub async fn refresh(&self, account: &str) -> Result<RegistryRecord, RegistryError> {
        let record = self.fetch(account).await?;
        self.client.set_nodes(record.nodes.iter().cloned(), record.failing_nodes.clone());

        info!(
            "refreshed nodes from '{}': {} listed, {} failing, {} in use",
            account,
            record.nodes.len(),
            record.failing_nodes.len(),
            self.client.nodes().len()
        );
        Ok(record)
    }

    /// [`refresh`](Self::refresh) from the default registry account.
    pub async fn refresh_default(&self) -> Result<RegistryRecord, RegistryError> {
        self.refresh(defaults::REGISTRY_ACCOUNT).await
    }
}

impl<T: Transport> RpcClient<T> {
    /// Registry resolver backed by this client.
    pub fn registry(&self) -> NodeRegistry<'_, T> {
        NodeRegistry::new(self)
    }

    /// Replace this client's nodes with those published by `account`.
    pub async fn update_nodes_from_account(&self, account: &str) -> Result<(), RegistryError> {
        self.registry().refresh(account).await.map(|_| ())
    }
}
