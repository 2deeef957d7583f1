use crate::parser::amount::JsonNumber;
use crate::parser::proto::json::{RpcBlockFull, RpcBlockHeader, RpcBlockThin};
use crate::parser::proto::tx::Tx;
use serde::Serialize;

///
/// Header as seen by the indexer.
///
/// After decoding raw bytes, `hash` is empty and `height` is 0: the wire
/// format does not carry them, the caller fills them in.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub hash: String,
    pub prev: String,
    pub next: String,
    pub height: u32,
    pub confirmations: i64,
    /// serialized size in bytes
    pub size: usize,
    /// unix seconds
    pub time: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Block {
    pub header: BlockHeader,
    pub txs: Vec<Tx>,
}

///
/// Block summary (`getblock <hash> true`): header plus transaction ids.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    pub header: BlockHeader,
    pub version: JsonNumber,
    pub merkle_root: String,
    pub nonce: JsonNumber,
    pub bits: String,
    pub difficulty: JsonNumber,
    pub txids: Vec<String>,
}

impl From<RpcBlockHeader> for BlockHeader {
    fn from(h: RpcBlockHeader) -> BlockHeader {
        BlockHeader {
            hash: h.hash,
            prev: h.prev,
            next: h.next,
            height: h.height,
            confirmations: h.confirmations,
            size: h.size,
            time: h.time,
        }
    }
}

impl From<RpcBlockThin> for BlockInfo {
    fn from(b: RpcBlockThin) -> BlockInfo {
        BlockInfo {
            header: BlockHeader {
                hash: b.hash,
                prev: b.prev,
                next: b.next,
                height: b.height,
                confirmations: b.confirmations,
                size: b.size,
                time: b.time,
            },
            version: b.version,
            merkle_root: b.merkle_root,
            nonce: b.nonce,
            bits: b.bits,
            difficulty: b.difficulty,
            txids: b.txids,
        }
    }
}

impl RpcBlockFull {
    /// split off the header, leaving the transactions for conversion
    pub(crate) fn take_header(&mut self) -> BlockHeader {
        BlockHeader {
            hash: std::mem::take(&mut self.hash),
            prev: std::mem::take(&mut self.prev),
            next: std::mem::take(&mut self.next),
            height: self.height,
            confirmations: self.confirmations,
            size: self.size,
            time: self.time,
        }
    }
}
