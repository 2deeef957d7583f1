//!
//! ## Data Representation
//!
//! - `block`: normalized `Block`, `BlockHeader` and `BlockInfo`
//! - `tx`: normalized `Tx` with inputs and outputs, values in minimal units
//! - `json`: result shapes of the node's JSON-RPC methods
//!
//! Raw-decoded and JSON-decoded data end up in the same normalized types.
//!

/// normalized blocks and headers
pub mod block;

/// JSON-RPC result shapes
pub mod json;

/// normalized transactions
pub mod tx;
