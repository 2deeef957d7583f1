//!
//! # Introduction
//!
//! Backend for indexing the Crown blockchain through a Crown full node.
//!
//! It retrieves blocks, transactions and fee estimates over the node's
//! JSON-RPC interface and hands them back in one normalized model,
//! whether the node delivered verbose JSON or raw serialized blocks.
//!
//! Node errors are classified, so callers can tell a block or transaction
//! that does not exist (`BlockNotFound`, `TxNotFound`) from a failure
//! worth retrying (`ErrorClass::Transient`) and from one that is not.
//!
//! ## Caveat
//!
//! The node has no mempool introspection and no `estimatefee`; fee
//! estimation goes through `estimatesmartfee`.
//!
//! # Example
//!
//! ```rust
//! use crown_rpc::{ChainConfig, CrownRpc, HttpTransport};
//!
//! let config = ChainConfig::default();
//! let transport = HttpTransport::new(&config).unwrap();
//! let mut rpc = CrownRpc::new(transport, config).unwrap();
//!
//! // select network parameters from the node's chain name
//! rpc.initialize().unwrap();
//!
//! let fee = rpc.estimate_fee(6).unwrap();
//! ```
//!

pub(crate) mod api;
pub mod config;
pub mod parser;
pub mod rpc;

#[doc(inline)]
pub use crate::api::*;
