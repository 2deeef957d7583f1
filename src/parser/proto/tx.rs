//!
//! Normalized transaction, shared by raw-decoded and JSON-decoded paths.
//!
use crate::parser::amount::AmountParser;
use crate::parser::errors::{OpError, OpResult};
use crate::parser::params::ChainParams;
use crate::parser::proto::json::{RpcTx, RpcVin, RpcVout};
use crate::parser::script::evaluate_script;
use bitcoin::consensus::serialize;
use bitcoin_hashes::hex::ToHex;
use num_bigint::BigInt;
use serde::Serialize;
use serde_json::value::RawValue;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptSig {
    pub hex: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vin {
    /// coinbase data, set only for the coinbase input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    pub txid: String,
    pub vout: u32,
    pub script_sig: ScriptSig,
    pub sequence: u32,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptPubKey {
    pub hex: String,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vout {
    /// value in minimal units
    pub value_sat: BigInt,
    pub n: u32,
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Tx {
    pub hex: String,
    pub txid: String,
    pub version: i32,
    pub lock_time: u32,
    pub vin: Vec<Vin>,
    pub vout: Vec<Vout>,
    pub confirmations: u32,
    pub time: i64,
    pub blocktime: i64,
    /// backend payload the transaction was built from, kept for re-querying
    #[serde(skip)]
    pub coin_specific_data: Option<Box<RawValue>>,
}

impl Tx {
    ///
    /// Build from a wire transaction.
    ///
    /// Addresses are only rendered when `parse_addresses` is set; the
    /// indexer resolves input addresses from previous outputs itself.
    ///
    pub fn parse(tx: &bitcoin::Transaction, params: &ChainParams, parse_addresses: bool) -> Tx {
        let is_coinbase = tx.is_coin_base();
        let vin = tx
            .input
            .iter()
            .map(|input| {
                let script_hex = hex::encode(input.script_sig.as_bytes());
                if is_coinbase {
                    Vin {
                        coinbase: Some(script_hex),
                        sequence: input.sequence,
                        ..Default::default()
                    }
                } else {
                    Vin {
                        coinbase: None,
                        txid: input.previous_output.txid.to_hex(),
                        vout: input.previous_output.vout,
                        script_sig: ScriptSig { hex: script_hex },
                        sequence: input.sequence,
                        addresses: Vec::new(),
                    }
                }
            })
            .collect();
        let vout = tx
            .output
            .iter()
            .enumerate()
            .map(|(n, out)| {
                let addresses = if parse_addresses {
                    evaluate_script(&out.script_pubkey, params).addresses
                } else {
                    Vec::new()
                };
                Vout {
                    value_sat: BigInt::from(out.value),
                    n: n as u32,
                    script_pub_key: ScriptPubKey {
                        hex: hex::encode(out.script_pubkey.as_bytes()),
                        addresses,
                    },
                }
            })
            .collect();
        Tx {
            hex: hex::encode(serialize(tx)),
            txid: tx.txid().to_hex(),
            version: tx.version,
            lock_time: tx.lock_time,
            vin,
            vout,
            ..Default::default()
        }
    }

    ///
    /// Build from the verbose JSON form of a transaction.
    ///
    /// Each output value goes straight from its decimal text to minimal
    /// units, the decimal text is not kept.
    ///
    pub fn from_rpc(tx: RpcTx, amounts: &AmountParser) -> OpResult<Tx> {
        let RpcTx {
            hex,
            txid,
            version,
            locktime,
            vin,
            vout,
            confirmations,
            time,
            blocktime,
        } = tx;
        let mut outputs = Vec::with_capacity(vout.len());
        for out in vout {
            let out = Vout::from_rpc(out, amounts)
                .map_err(|e| e.join_msg(&format!("txid {}", txid)))?;
            outputs.push(out);
        }
        Ok(Tx {
            hex,
            txid,
            version,
            lock_time: locktime,
            vin: vin.into_iter().map(Vin::from).collect(),
            vout: outputs,
            confirmations,
            time,
            blocktime,
            coin_specific_data: None,
        })
    }

    /// total of all outputs, in minimal units
    pub fn value_out(&self) -> BigInt {
        self.vout.iter().map(|v| &v.value_sat).sum()
    }
}

impl From<RpcVin> for Vin {
    fn from(vin: RpcVin) -> Vin {
        Vin {
            coinbase: vin.coinbase,
            txid: vin.txid,
            vout: vin.vout,
            script_sig: ScriptSig {
                hex: vin.script_sig.hex,
            },
            sequence: vin.sequence,
            addresses: vin.addresses,
        }
    }
}

impl Vout {
    pub fn from_rpc(out: RpcVout, amounts: &AmountParser) -> OpResult<Vout> {
        let n = out.n;
        let value_sat = amounts
            .amount_to_big_int(out.value.as_str())
            .map_err(|e: OpError| e.join_msg(&format!("vout {}", n)))?;
        let mut addresses = out.script_pub_key.addresses;
        if addresses.is_empty() {
            addresses.extend(out.script_pub_key.address);
        }
        Ok(Vout {
            value_sat,
            n,
            script_pub_key: ScriptPubKey {
                hex: out.script_pub_key.hex,
                addresses,
            },
        })
    }
}
