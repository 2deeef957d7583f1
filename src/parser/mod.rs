//!
//! This module defines how to decode the node's data, binary or JSON,
//! into the structs defined in proto.
//!

/// decimal amounts to minimal units
pub mod amount;

/// decode raw blocks and transactions
pub mod block;

/// error handling
pub mod errors;

/// network constants and their registry
pub mod params;

/// various formats of blockchain data representation
pub mod proto;

/// define binary readers
pub mod reader;

/// script patterns and Crown addresses
pub mod script;
