//! Hive JSON-RPC client library.
//!
//! Provides an async JSON-RPC 2.0 client that fails over across a list of
//! Hive API nodes, and keeps that list current from a registry account's
//! published metadata.
//!
//! # Example
//!
//! ```ignore
//! use hive_rpc::RpcClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = RpcClient::new();
//!     client.update_nodes_from_account("nectarflower").await.unwrap();
//!     let props = client.get_dynamic_global_properties().await.unwrap();
//!     println!("Head block: {}", props.head_block_number);
//! }
//! ```

pub mod error;
pub mod transport;
pub mod client;
pub mod api;
pub mod registry;

pub use client::{ClientConfig, RpcClient};
pub use error::{RegistryError, RpcError};
pub use registry::{NodeRegistry, RegistryRecord};
pub use transport::{HttpResponse, HttpTransport, Transport};

/// Built-in defaults.
pub mod defaults {
    use std::time::Duration;

    /// Public node used until a registry refresh succeeds.
    pub const NODE: &str = "https://api.hive.blog";
    /// Account whose metadata carries the curated node list.
    pub const REGISTRY_ACCOUNT: &str = "nectarflower";
    /// Per-request timeout.
    pub const TIMEOUT: Duration = Duration::from_secs(10);
}
