//! Failover JSON-RPC 2.0 client.
//!
//! Holds an ordered list of Hive nodes and runs each call against them one at
//! a time, in order, until one of them returns a usable result. The node list
//! can be replaced at any time with [`RpcClient::set_nodes`]; calls already in
//! flight keep the list they started with.

use crate::defaults;
use crate::error::RpcError;
use crate::transport::{HttpTransport, Transport};
use log::{debug, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Correlation id sent with every request.
const REQUEST_ID: u64 = 1;

/// JSON-RPC 2.0 request envelope.
#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

/// JSON-RPC 2.0 response envelope.
///
/// `result` is `None` only when the field is missing; an explicit `null` is
/// `Some(Value::Null)`. `error` is `Some(None)` for an explicit `null`.
#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    error: Option<Option<JsonRpcError>>,
    #[serde(default)]
    id: Option<Value>,
}

/// Marks a field as present, keeping `null` as a value.
fn present<'de, D, V>(deserializer: D) -> Result<Option<V>, D::Error>
where
    D: serde::Deserializer<'de>,
    V: Deserialize<'de>,
{
    V::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 error object.
#[derive(Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Configuration for an RPC client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Nodes to try, in order. Entries that are not absolute http(s) URLs
    /// are dropped.
    pub nodes: Vec<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nodes: vec![defaults::NODE.to_string()],
            timeout: defaults::TIMEOUT,
        }
    }
}

/// The routing table. Always replaced as a whole.
#[derive(Debug, Default)]
struct NodeSet {
    nodes: Vec<String>,
    failing_nodes: HashMap<String, String>,
}

/// Async JSON-RPC client that fails over across Hive nodes.
pub struct RpcClient<T = HttpTransport> {
    transport: T,
    node_set: RwLock<Arc<NodeSet>>,
}

impl RpcClient<HttpTransport> {
    /// Create a client pointed at the default public node.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create with full configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(HttpTransport::new(config.timeout), config.nodes)
    }
}

impl Default for RpcClient<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> RpcClient<T> {
    /// Create a client over a custom transport.
    ///
    /// Invalid URLs are dropped. An empty list is kept empty, in which case
    /// every call fails with [`RpcError::NoNodes`] until nodes are set.
    pub fn with_transport<I, S>(transport: T, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes = admit_nodes(nodes, &HashMap::new());
        Self {
            transport,
            node_set: RwLock::new(Arc::new(NodeSet {
                nodes,
                failing_nodes: HashMap::new(),
            })),
        }
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Nodes currently tried by [`call`](Self::call), in order.
    pub fn nodes(&self) -> Vec<String> {
        self.snapshot().nodes.clone()
    }

    /// Nodes last reported as failing by the registry, with reasons.
    pub fn failing_nodes(&self) -> HashMap<String, String> {
        self.snapshot().failing_nodes.clone()
    }

    fn snapshot(&self) -> Arc<NodeSet> {
        let guard = self.node_set.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the node list.
    ///
    /// Candidates listed in `failing_nodes` or that are not absolute http(s)
    /// URLs are skipped; the rest keep their order and duplicates. If nothing
    /// survives, the current nodes stay in place. `failing_nodes` is stored
    /// either way. Both changes become visible to callers together.
    pub fn set_nodes<I, S>(&self, candidates: I, failing_nodes: HashMap<String, String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let admitted = admit_nodes(candidates, &failing_nodes);

        let mut guard = self.node_set.write().unwrap_or_else(PoisonError::into_inner);
        let nodes = if admitted.is_empty() {
            debug!("no usable nodes in update, keeping {} current nodes", guard.nodes.len());
            guard.nodes.clone()
        } else {
            admitted
        };
        *guard = Arc::new(NodeSet {
            nodes,
            failing_nodes,
        });
    }

    /// Call a JSON-RPC 2.0 method, failing over across nodes.
    ///
    /// Nodes are tried in order, once each. A node fails if the request does
    /// not complete, the status is not 2xx, the envelope is malformed or
    /// carries an `error`, or the result does not decode into `R`. The first
    /// node that succeeds ends the call. Pass `()` for `params` to send `null`.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let set = self.snapshot();
        if set.nodes.is_empty() {
            return Err(RpcError::NoNodes);
        }

        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params: serde_json::to_value(params)?,
            id: REQUEST_ID,
        };
        let body = serde_json::to_vec(&req)?;

        let mut last_err = RpcError::NoNodes;
        for url in &set.nodes {
            match self.call_node(url, &body).await {
                Ok(val) => return Ok(val),
                Err(e) => {
                    debug!("{} failed on {}: {}", method, url, e);
                    last_err = e;
                }
            }
        }

        warn!("{} failed on all {} nodes", method, set.nodes.len());
        Err(RpcError::AllNodesFailed {
            attempts: set.nodes.len(),
            last: Box::new(last_err),
        })
    }

    async fn call_node<R: DeserializeOwned>(&self, url: &str, body: &[u8]) -> Result<R, RpcError> {
        let resp = self.transport.post_json(url, body).await?;

        if !resp.is_success() {
            return Err(RpcError::HttpStatus {
                url: url.to_string(),
                status: resp.status,
                body: String::from_utf8_lossy(&resp.body).chars().take(500).collect(),
            });
        }

        let envelope: JsonRpcResponse =
            serde_json::from_slice(&resp.body).map_err(|source| RpcError::Decode {
                url: url.to_string(),
                source,
            })?;

        match envelope.id {
            None | Some(Value::Null) => {}
            Some(Value::Number(ref n)) if n.as_u64() == Some(REQUEST_ID) => {}
            Some(other) => {
                return Err(RpcError::IdMismatch {
                    url: url.to_string(),
                    expected: REQUEST_ID,
                    got: other.to_string(),
                });
            }
        }

        let result = match (envelope.result, envelope.error) {
            (_, Some(Some(err))) => {
                return Err(RpcError::Rpc {
                    url: url.to_string(),
                    code: err.code,
                    message: err.message,
                });
            }
            (None, _) | (Some(Value::Null), Some(None)) => {
                return Err(RpcError::NoResult {
                    url: url.to_string(),
                });
            }
            (Some(result), _) => result,
        };

        serde_json::from_value(result).map_err(|source| RpcError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Whether `node` is an absolute http(s) URL with a host.
pub fn is_valid_node_url(node: &str) -> bool {
    match Url::parse(node) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

fn admit_nodes<I, S>(candidates: I, failing_nodes: &HashMap<String, String>) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    candidates
        .into_iter()
        .map(Into::into)
        .filter(|node| {
            if let Some(reason) = failing_nodes.get(node) {
                debug!("skipping failing node {}: {}", node, reason);
                false
            } else if !is_valid_node_url(node) {
                debug!("skipping invalid node URL {:?}", node);
                false
            } else {
                true
            }
        })
        .collect()
}
