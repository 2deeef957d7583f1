//!
//! Crates APIs, essential structs, functions, methods are all here!
//!
//! To quickly understand how to use this crate, have a look at the
//! documentation for `crown_rpc::CrownRpc`.
//!
//! # Example
//!
//! ```rust
//! use crown_rpc::{ChainConfig, CrownRpc, HttpTransport};
//!
//! let config = ChainConfig::from_json(br#"{"rpc_url": "http://127.0.0.1:9341"}"#).unwrap();
//! let transport = HttpTransport::new(&config).unwrap();
//!
//! let mut rpc = CrownRpc::new(transport, config).unwrap();
//! rpc.initialize().unwrap();
//!
//! let hash = rpc.get_block_hash(1_000_000).unwrap();
//! let block = rpc.get_block(Some(&hash), 1_000_000).unwrap();
//! ```
//!

/// fee estimation with `estimatesmartfee` fallback
pub mod fee;

/// mempool is not supported by this backend
pub mod mempool;

use crate::parser::errors::OpErrorKind;
use crate::parser::params::ParamsRegistry;
use crate::parser::proto::json::{RpcBlockFull, RpcBlockHeader, RpcBlockThin};
use crate::rpc::classify::to_op_error;
use crate::rpc::RpcResponse;
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;

// re-exports
pub use self::mempool::MempoolEntry;
pub use crate::config::ChainConfig;
pub use crate::parser::amount::{AmountParser, JsonNumber};
pub use crate::parser::block::BlockParser;
pub use crate::parser::errors::{ErrorClass, OpError, OpResult};
pub use crate::parser::params::{
    chain_params, register_params, select_params, ChainParams, MAIN_NET_PARAMS, TEST_NET_PARAMS,
};
pub use crate::parser::proto::block::{Block, BlockHeader, BlockInfo};
pub use crate::parser::proto::json::ChainInfo;
pub use crate::parser::proto::tx::{ScriptPubKey, ScriptSig, Tx, Vin, Vout};
pub use crate::parser::script::{evaluate_script, ScriptInfo, ScriptType};
pub use crate::rpc::classify::classify;
pub use crate::rpc::http::HttpTransport;
pub use crate::rpc::{RpcError, RpcRequest, Transport};
pub use num_bigint::BigInt;

/// Network classification reported to the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Livenet,
    /// not produced by `initialize`, see `is_testnet`
    Testnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Livenet => f.write_str("livenet"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

///
/// Decode a raw block with mainnet parameters and default precision.
///
pub fn decode_block(raw: &[u8]) -> OpResult<Block> {
    BlockParser::new(&MAIN_NET_PARAMS, &ChainConfig::default()).parse_block(raw)
}

///
/// This is the main struct of this crate!! Click and read the doc.
///
/// RPC backend for a Crown full node. Every method is one blocking
/// request/response cycle against the injected `Transport`; node errors
/// are classified so that block and transaction absence surface as
/// `BlockNotFound` / `TxNotFound`.
///
pub struct CrownRpc<T: Transport> {
    transport: T,
    config: ChainConfig,
    parser: BlockParser,
    network: Network,
}

impl<T: Transport> CrownRpc<T> {
    ///
    /// The Crown node does not implement `estimatefee`, so direct fee
    /// estimation is switched off regardless of configuration.
    ///
    pub fn new(transport: T, mut config: ChainConfig) -> OpResult<CrownRpc<T>> {
        config.supports_estimate_fee = false;
        let parser = BlockParser::new(&MAIN_NET_PARAMS, &config);
        Ok(CrownRpc {
            transport,
            config,
            parser,
            network: Network::Livenet,
        })
    }

    ///
    /// Query the chain name, register and select network parameters and
    /// rebuild the decoder with them.
    ///
    /// The network classification stays `livenet` even on a test chain.
    ///
    pub fn initialize(&mut self) -> OpResult<()> {
        self.initialize_with(ParamsRegistry::global())
    }

    /// `initialize` against a caller-owned registry
    pub fn initialize_with(&mut self, registry: &ParamsRegistry) -> OpResult<()> {
        let ci = self.get_chain_info()?;
        info!("Chain name {}", ci.chain);
        let params = chain_params(registry, &ci.chain)?;

        self.parser = BlockParser::new(params, &self.config);

        if params.net != MAIN_NET_PARAMS.net {
            warn!(
                "rpc: chain {} uses {} parameters, network still reported as {}",
                ci.chain,
                params.name,
                Network::Livenet
            );
        }
        self.network = Network::Livenet;

        info!("rpc: block chain {}", params.name);
        Ok(())
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn parser(&self) -> &BlockParser {
        &self.parser
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// `false` on every chain, the network stays `Livenet` after `initialize`
    pub fn is_testnet(&self) -> bool {
        self.network == Network::Testnet
    }

    ///
    /// Send a request and decode the envelope. A node error is classified
    /// for `method`; a missing result is a `JsonError`.
    ///
    fn call<R: DeserializeOwned>(&self, method: &'static str, params: Vec<Value>) -> OpResult<R> {
        let request = RpcRequest::new(method, params);
        let body = self.transport.call(&request)?;
        let response: RpcResponse<R> = serde_json::from_slice(&body)?;
        if let Some(err) = response.error {
            return Err(to_op_error(method, &err));
        }
        response.result.ok_or_else(|| {
            OpError::new(OpErrorKind::JsonError).join_msg(&format!("{}: missing result", method))
        })
    }

    /// `getblockchaininfo`
    pub fn get_chain_info(&self) -> OpResult<ChainInfo> {
        debug!("rpc: getblockchaininfo");
        self.call("getblockchaininfo", vec![])
    }

    /// `getbestblockhash`
    pub fn get_best_block_hash(&self) -> OpResult<String> {
        debug!("rpc: getbestblockhash");
        self.call("getbestblockhash", vec![])
    }

    /// `getblockcount`
    pub fn get_best_block_height(&self) -> OpResult<u32> {
        debug!("rpc: getblockcount");
        self.call("getblockcount", vec![])
    }

    ///
    /// Hash of the block at `height`. A height beyond the tip is
    /// `BlockNotFound`.
    ///
    pub fn get_block_hash(&self, height: u32) -> OpResult<String> {
        debug!("rpc: getblockhash {}", height);
        self.call("getblockhash", vec![Value::from(height)])
            .map_err(|e| e.join_msg(&format!("height {}", height)))
    }

    pub fn get_block_header(&self, hash: &str) -> OpResult<BlockHeader> {
        debug!("rpc: getblockheader {}", hash);
        let header: RpcBlockHeader = self
            .call("getblockheader", vec![Value::from(hash), Value::from(true)])
            .map_err(|e| e.join_msg(&format!("hash {}", hash)))?;
        Ok(header.into())
    }

    ///
    /// Block assembled from its transaction id list.
    ///
    /// Without `hash` the hash is resolved from `height` first. Every
    /// transaction is then fetched on its own; one the node no longer
    /// knows is logged and left out, any other failure aborts.
    ///
    pub fn get_block(&self, hash: Option<&str>, height: u32) -> OpResult<Block> {
        let hash = match hash {
            Some(hash) => hash.to_string(),
            None => self.get_block_hash(height)?,
        };

        debug!("rpc: getblock {}", hash);
        let res: RpcBlockThin = self
            .call("getblock", vec![Value::from(hash.as_str()), Value::from(true)])
            .map_err(|e| e.join_msg(&format!("hash {}", hash)))?;

        let mut txs = Vec::with_capacity(res.txids.len());
        for txid in &res.txids {
            match self.get_transaction(txid) {
                Ok(tx) => txs.push(tx),
                Err(e) if e.kind() == &OpErrorKind::TxNotFound => {
                    error!(
                        "rpc: getblock: skipping transaction in block {} due to error: {}",
                        hash, e
                    );
                }
                Err(e) => return Err(e),
            }
        }
        let info = BlockInfo::from(res);
        Ok(Block {
            header: info.header,
            txs,
        })
    }

    /// Block summary: header fields plus transaction ids.
    pub fn get_block_info(&self, hash: &str) -> OpResult<BlockInfo> {
        debug!("rpc: getblock {}", hash);
        let res: RpcBlockThin = self
            .call("getblock", vec![Value::from(hash), Value::from(true)])
            .map_err(|e| e.join_msg(&format!("hash {}", hash)))?;
        Ok(res.into())
    }

    ///
    /// Fully expanded block in one call. Output values are converted from
    /// their decimal text straight into minimal units.
    ///
    pub fn get_block_full(&self, hash: &str) -> OpResult<Block> {
        debug!("rpc: getblock (verbosity=2) {}", hash);
        let mut res: RpcBlockFull = self
            .call("getblock", vec![Value::from(hash), Value::from(2)])
            .map_err(|e| e.join_msg(&format!("hash {}", hash)))?;

        let header = res.take_header();
        let txs = std::mem::take(&mut res.txs)
            .into_iter()
            .map(|tx| Tx::from_rpc(tx, self.parser.amounts()))
            .collect::<OpResult<Vec<Tx>>>()
            .map_err(|e| e.join_msg(&format!("hash {}", hash)))?;
        Ok(Block { header, txs })
    }

    /// Block as serialized hex (`getblock <hash> false`).
    pub fn get_block_raw(&self, hash: &str) -> OpResult<String> {
        debug!("rpc: getblock (raw) {}", hash);
        self.call("getblock", vec![Value::from(hash), Value::from(false)])
            .map_err(|e| e.join_msg(&format!("hash {}", hash)))
    }

    pub fn get_block_bytes(&self, hash: &str) -> OpResult<Vec<u8>> {
        let block = self.get_block_raw(hash)?;
        hex::decode(block).map_err(|e| OpError::from(e).join_msg(&format!("hash {}", hash)))
    }

    ///
    /// Fetch raw bytes and decode them locally. Hash and height are not in
    /// the wire format, they are taken from the arguments.
    ///
    pub fn get_block_without_header(&self, hash: &str, height: u32) -> OpResult<Block> {
        let data = self.get_block_bytes(hash)?;
        let mut block = self
            .parser
            .parse_block(&data)
            .map_err(|e| e.join_msg(&format!("{} {}", height, hash)))?;
        block.header.hash = hash.to_string();
        block.header.height = height;
        Ok(block)
    }

    ///
    /// Transaction by id. The verbose payload returned by the node is
    /// kept in `coin_specific_data`.
    ///
    pub fn get_transaction(&self, txid: &str) -> OpResult<Tx> {
        let raw = self.get_raw_transaction(txid)?;
        let mut tx = self
            .parser
            .parse_tx_from_json(&raw)
            .map_err(|e| e.join_msg(&format!("txid {}", txid)))?;
        tx.coin_specific_data = Some(raw);
        Ok(tx)
    }

    pub fn get_transaction_for_mempool(&self, txid: &str) -> OpResult<Tx> {
        self.get_transaction(txid)
    }

    /// Node JSON of a transaction, without a round trip when it is kept.
    pub fn get_transaction_specific(&self, tx: &Tx) -> OpResult<Box<RawValue>> {
        if let Some(csd) = &tx.coin_specific_data {
            return Ok(csd.clone());
        }
        self.get_raw_transaction(&tx.txid)
    }

    ///
    /// `getrawtransaction <txid> 1`. An unknown transaction is `TxNotFound`.
    ///
    pub fn get_raw_transaction(&self, txid: &str) -> OpResult<Box<RawValue>> {
        debug!("rpc: getrawtransaction {}", txid);
        self.call("getrawtransaction", vec![Value::from(txid), Value::from(1)])
            .map_err(|e| e.join_msg(&format!("txid {}", txid)))
    }
}
