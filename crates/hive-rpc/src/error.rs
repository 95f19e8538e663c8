//! RPC and registry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response id mismatch from {url}: expected {expected}, got {got}")]
    IdMismatch {
        url: String,
        expected: u64,
        got: String,
    },

    #[error("no result in response from {url}")]
    NoResult { url: String },

    #[error("RPC error {code} from {url}: {message}")]
    Rpc {
        url: String,
        code: i64,
        message: String,
    },

    #[error("all {attempts} nodes failed, last error: {last}")]
    AllNodesFailed {
        attempts: usize,
        last: Box<RpcError>,
    },

    #[error("no nodes available")]
    NoNodes,

    #[error("failed to encode request: {0}")]
    Json(#[from] serde_json::Error),
}

impl RpcError {
    /// Network failure, timeout, or non-success HTTP status at one node.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RpcError::Http { .. } | RpcError::Timeout { .. } | RpcError::HttpStatus { .. }
        )
    }

    /// The node answered, but not with a usable JSON-RPC envelope or result.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            RpcError::Decode { .. } | RpcError::IdMismatch { .. } | RpcError::NoResult { .. }
        )
    }

    /// The node answered with a populated `error` object.
    pub fn is_remote(&self) -> bool {
        matches!(self, RpcError::Rpc { .. })
    }

    /// The node this error originated from, for per-node failures.
    pub fn url(&self) -> Option<&str> {
        match self {
            RpcError::Http { url, .. }
            | RpcError::Timeout { url }
            | RpcError::HttpStatus { url, .. }
            | RpcError::Decode { url, .. }
            | RpcError::IdMismatch { url, .. }
            | RpcError::NoResult { url }
            | RpcError::Rpc { url, .. } => Some(url.as_str()),
            RpcError::AllNodesFailed { last, .. } => last.url(),
            RpcError::NoNodes | RpcError::Json(_) => None,
        }
    }
}

/// Failure to resolve a node list from a registry account.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("account '{0}' not found")]
    AccountNotFound(String),

    #[error("invalid JSON metadata on account '{account}': {source}")]
    InvalidMetadata {
        account: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no nodes found in metadata of account '{0}'")]
    MissingNodes(String),

    #[error("invalid nodes list on account '{account}': {source}")]
    InvalidNodes {
        account: String,
        #[source]
        source: serde_json::Error,
    },
}
