use crate::api::CrownRpc;
use crate::parser::errors::{OpError, OpErrorKind, OpResult};
use crate::rpc::Transport;
use serde::Serialize;

/// Mempool view of a transaction, as the indexer expects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MempoolEntry {
    pub size: u32,
    pub time: u64,
    pub height: u32,
    pub depends: Vec<String>,
}

impl<T: Transport> CrownRpc<T> {
    /// The node offers no mempool introspection; nothing to set up.
    pub fn initialize_mempool(&self) -> OpResult<()> {
        Ok(())
    }

    ///
    /// Always `CapabilityUnsupported`. This is permanent for the chain,
    /// retrying does not help.
    ///
    pub fn get_mempool_entry(&self, txid: &str) -> OpResult<MempoolEntry> {
        Err(OpError::new(OpErrorKind::CapabilityUnsupported)
            .join_msg(&format!("GetMempoolEntry: txid {}", txid)))
    }
}
