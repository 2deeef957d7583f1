//!
//! Shapes of the node's JSON-RPC results.
//!
//! Kept separate from the normalized types: these mirror exactly what the
//! node sends, decimal amounts included, and are converted right after
//! deserialization.
//!
use crate::parser::amount::JsonNumber;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcBlockHeader {
    pub hash: String,
    #[serde(rename = "previousblockhash")]
    pub prev: String,
    #[serde(rename = "nextblockhash")]
    pub next: String,
    pub height: u32,
    pub confirmations: i64,
    pub size: usize,
    pub time: i64,
}

/// `getblock <hash> true`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcBlockThin {
    pub hash: String,
    #[serde(rename = "previousblockhash")]
    pub prev: String,
    #[serde(rename = "nextblockhash")]
    pub next: String,
    pub height: u32,
    pub confirmations: i64,
    pub size: usize,
    pub time: i64,
    pub version: JsonNumber,
    #[serde(rename = "merkleroot")]
    pub merkle_root: String,
    pub nonce: JsonNumber,
    pub bits: String,
    pub difficulty: JsonNumber,
    #[serde(rename = "tx")]
    pub txids: Vec<String>,
}

/// `getblock <hash> 2`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcBlockFull {
    pub hash: String,
    #[serde(rename = "previousblockhash")]
    pub prev: String,
    #[serde(rename = "nextblockhash")]
    pub next: String,
    pub height: u32,
    pub confirmations: i64,
    pub size: usize,
    pub time: i64,
    #[serde(rename = "tx")]
    pub txs: Vec<RpcTx>,
}

/// `getrawtransaction <txid> 1`, also embedded in `getblock <hash> 2`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcTx {
    pub hex: String,
    pub txid: String,
    pub version: i32,
    pub locktime: u32,
    pub vin: Vec<RpcVin>,
    pub vout: Vec<RpcVout>,
    pub confirmations: u32,
    pub time: i64,
    pub blocktime: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcScriptSig {
    pub hex: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcVin {
    pub coinbase: Option<String>,
    pub txid: String,
    pub vout: u32,
    #[serde(rename = "scriptSig")]
    pub script_sig: RpcScriptSig,
    pub sequence: u32,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcScriptPubKey {
    pub hex: String,
    pub addresses: Vec<String>,
    /// newer nodes report a single `address`
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcVout {
    pub value: JsonNumber,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: RpcScriptPubKey,
}

/// `getblockchaininfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u32,
    pub headers: u32,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: String,
}

/// `estimatesmartfee`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SmartFeeEstimate {
    #[serde(rename = "feerate")]
    pub fee_rate: Option<JsonNumber>,
    pub blocks: u32,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_tx_keeps_decimal_text() {
        let raw = r#"{
            "hex": "0100",
            "txid": "aa",
            "version": 1,
            "locktime": 0,
            "vin": [{"coinbase": "03a08601", "sequence": 4294967295}],
            "vout": [
                {"value": 1.50000000, "n": 0, "scriptPubKey": {"hex": "76a9", "addresses": ["CRWx"]}},
                {"value": 0.10000000, "n": 1, "scriptPubKey": {"hex": "a914", "address": "CRMy"}}
            ],
            "blockhash": "00ff",
            "confirmations": 3,
            "time": 1600000000,
            "blocktime": 1600000000
        }"#;
        let tx: RpcTx = serde_json::from_str(raw).unwrap();
        assert_eq!(tx.vout[0].value.as_str(), "1.50000000");
        assert_eq!(tx.vout[1].value.as_str(), "0.10000000");
        assert_eq!(tx.vout[1].script_pub_key.address.as_deref(), Some("CRMy"));
        assert_eq!(tx.vin[0].coinbase.as_deref(), Some("03a08601"));
        assert_eq!(tx.vin[0].sequence, u32::MAX);
        assert_eq!(tx.confirmations, 3);
    }

    #[test]
    fn test_block_thin_missing_next() {
        let raw = r#"{"hash": "00aa", "previousblockhash": "0099", "height": 7,
            "confirmations": 1, "size": 250, "time": 1600000000, "version": 536870912,
            "merkleroot": "ab", "nonce": 42, "bits": "1d00ffff", "difficulty": 1.5,
            "tx": ["t1", "t2"]}"#;
        let block: RpcBlockThin = serde_json::from_str(raw).unwrap();
        assert_eq!(block.next, "");
        assert_eq!(block.txids, vec!["t1".to_string(), "t2".to_string()]);
        assert_eq!(block.difficulty.as_str(), "1.5");
        assert_eq!(block.version.as_str(), "536870912");
    }
}
