use crate::config::ChainConfig;
use crate::parser::amount::AmountParser;
use crate::parser::errors::{OpError, OpErrorKind, OpResult};
use crate::parser::params::ChainParams;
use crate::parser::proto::block::{Block, BlockHeader};
use crate::parser::proto::json::RpcTx;
use crate::parser::proto::tx::Tx;
use crate::parser::reader::{peek_version, read_tx_count, remaining, BlockchainRead};
use log::debug;
use num_bigint::BigInt;
use serde_json::value::RawValue;
use std::io::Cursor;

/// Version bit announcing merged-mining data after the header.
pub const VERSION_AUXPOW: i32 = 1 << 8;

///
/// Decoder for Crown blocks and transactions.
///
/// Holds the network parameters (for address rendering) and the
/// amount precision (for JSON amounts).
///
#[derive(Debug, Clone, Copy)]
pub struct BlockParser {
    params: &'static ChainParams,
    amounts: AmountParser,
}

impl BlockParser {
    pub fn new(params: &'static ChainParams, config: &ChainConfig) -> BlockParser {
        BlockParser {
            params,
            amounts: AmountParser::new(config.amount_decimal_point),
        }
    }

    pub fn params(&self) -> &'static ChainParams {
        self.params
    }

    pub fn amounts(&self) -> &AmountParser {
        &self.amounts
    }

    ///
    /// Decode a block in its wire format.
    ///
    /// The header is 80 bytes (version, previous block, merkle root, time,
    /// bits, nonce), followed by a compact-size transaction count and the
    /// transactions. Truncated input, impossible counts and merged-mining
    /// versions are `DecodeError`. Data after the last transaction is
    /// ignored.
    ///
    /// Hash and height are not part of the wire format and are left empty.
    ///
    pub fn parse_block(&self, b: &[u8]) -> OpResult<Block> {
        let mut r = Cursor::new(b);

        let version = peek_version(&mut r)?;
        if version & VERSION_AUXPOW != 0 {
            return Err(OpError::new(OpErrorKind::DecodeError)
                .join_msg(&format!("unsupported block version {:#x}", version)));
        }
        let header = r.read_block_header()?;

        let tx_count = read_tx_count(&mut r)?;
        let mut txs = Vec::with_capacity(tx_count);
        for i in 0..tx_count {
            let tx = r
                .read_transaction()
                .map_err(|e| e.join_msg(&format!("tx {} of {}", i, tx_count)))?;
            txs.push(self.tx_from_msg_tx(&tx, false));
        }

        let left = remaining(&r);
        if left > 0 {
            debug!("{} bytes after the last transaction left unread", left);
        }

        Ok(Block {
            header: BlockHeader {
                size: b.len(),
                time: header.time as i64,
                ..Default::default()
            },
            txs,
        })
    }

    /// Normalize a wire transaction.
    pub fn tx_from_msg_tx(&self, tx: &bitcoin::Transaction, parse_addresses: bool) -> Tx {
        Tx::parse(tx, self.params, parse_addresses)
    }

    /// Normalize the verbose JSON of a transaction.
    pub fn parse_tx_from_json(&self, raw: &RawValue) -> OpResult<Tx> {
        let tx: RpcTx = serde_json::from_str(raw.get())?;
        Tx::from_rpc(tx, &self.amounts)
    }

    pub fn amount_to_big_int(&self, amount: &str) -> OpResult<BigInt> {
        self.amounts.amount_to_big_int(amount)
    }

    pub fn amount_to_decimal_string(&self, value: &BigInt) -> String {
        self.amounts.amount_to_decimal_string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::params::MAIN_NET_PARAMS;
    use bitcoin::consensus::serialize;
    use bitcoin::hashes::Hash;
    use bitcoin::{BlockHash, OutPoint, Script, Transaction, TxIn, TxMerkleNode, TxOut, Txid};

    fn p2pkh(fill: u8) -> Script {
        let mut bytes = vec![0x76, 0xa9, 0x14];
        bytes.extend(vec![fill; 20]);
        bytes.extend(vec![0x88, 0xac]);
        Script::from(bytes)
    }

    fn test_tx(prev: Option<Txid>, values: &[u64]) -> Transaction {
        let previous_output = match prev {
            Some(txid) => OutPoint { txid, vout: 1 },
            None => OutPoint::null(),
        };
        Transaction {
            version: 1,
            lock_time: 0,
            input: vec![TxIn {
                previous_output,
                script_sig: Script::from(vec![0x03, 0xa0, 0x86, 0x01]),
                sequence: 0xffff_ffff,
                witness: vec![],
            }],
            output: values
                .iter()
                .enumerate()
                .map(|(i, v)| TxOut {
                    value: *v,
                    script_pubkey: p2pkh(i as u8 + 1),
                })
                .collect(),
        }
    }

    fn test_block(version: i32, txdata: Vec<Transaction>) -> bitcoin::Block {
        bitcoin::Block {
            header: bitcoin::BlockHeader {
                version,
                prev_blockhash: BlockHash::from_slice(&[7u8; 32]).unwrap(),
                merkle_root: TxMerkleNode::from_slice(&[9u8; 32]).unwrap(),
                time: 1_600_000_000,
                bits: 0x1d00_ffff,
                nonce: 42,
            },
            txdata,
        }
    }

    fn parser() -> BlockParser {
        BlockParser::new(&MAIN_NET_PARAMS, &ChainConfig::default())
    }

    #[test]
    fn test_parse_block() {
        let coinbase = test_tx(None, &[150_000_000]);
        let spend = test_tx(Some(coinbase.txid()), &[100_000_000, 49_990_000]);
        let third = test_tx(Some(spend.txid()), &[1]);
        let block = test_block(2, vec![coinbase.clone(), spend.clone(), third]);
        let bytes = serialize(&block);

        let parsed = parser().parse_block(&bytes).unwrap();
        assert_eq!(parsed.txs.len(), 3);
        assert_eq!(parsed.header.size, bytes.len());
        assert_eq!(parsed.header.time, 1_600_000_000);
        assert_eq!(parsed.header.hash, "");
        assert_eq!(parsed.header.height, 0);

        let p = parser();
        assert_eq!(
            parsed.txs[0].vout[0].value_sat,
            p.amount_to_big_int("1.50000000").unwrap()
        );
        assert_eq!(parsed.txs[0].vout[0].value_sat, BigInt::from(150_000_000u64));
        assert_eq!(parsed.txs[0].vin[0].coinbase.as_deref(), Some("03a08601"));
        assert_eq!(parsed.txs[1].txid, spend.txid().to_string());
        assert_eq!(parsed.txs[1].vin[0].txid, coinbase.txid().to_string());
        assert_eq!(parsed.txs[1].vin[0].vout, 1);
        assert_eq!(parsed.txs[1].value_out(), BigInt::from(149_990_000u64));
        assert_eq!(parsed.txs[2].vout[0].value_sat, BigInt::from(1));
        assert_eq!(parsed.txs[1].hex, hex::encode(serialize(&spend)));
    }

    #[test]
    fn test_parse_addresses() {
        let tx = test_tx(None, &[5]);
        let parsed = parser().tx_from_msg_tx(&tx, true);
        assert_eq!(
            parsed.vout[0].script_pub_key.addresses,
            vec!["CRWC4JCW7CAiYvufybRBhupknAJPXx72Q65y".to_string()]
        );
        let parsed = parser().tx_from_msg_tx(&tx, false);
        assert!(parsed.vout[0].script_pub_key.addresses.is_empty());
    }

    #[test]
    fn test_parse_block_truncated() {
        let block = test_block(2, vec![test_tx(None, &[1]), test_tx(None, &[2])]);
        let bytes = serialize(&block);
        for cut in &[0, 3, 40, 80, 81, bytes.len() - 1] {
            let err = parser().parse_block(&bytes[..*cut]).unwrap_err();
            assert_eq!(err.kind(), &OpErrorKind::DecodeError, "cut at {}", cut);
        }
    }

    #[test]
    fn test_parse_block_with_trailer() {
        let tx = test_tx(None, &[7]);
        let mut bytes = serialize(&test_block(2, vec![tx.clone()]));
        bytes.extend(&[0x02, 0xaa, 0xbb]);
        let parsed = parser().parse_block(&bytes).unwrap();
        assert_eq!(parsed.txs.len(), 1);
        assert_eq!(parsed.txs[0].txid, tx.txid().to_string());
        assert_eq!(parsed.txs[0].vout[0].value_sat, BigInt::from(7));
        assert_eq!(parsed.header.size, bytes.len());
    }

    #[test]
    fn test_parse_block_outputless_txs() {
        let empty = |sequence: u32| Transaction {
            version: 1,
            lock_time: 0,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: Script::new(),
                sequence,
                witness: vec![],
            }],
            output: vec![],
        };
        let bytes = serialize(&test_block(2, vec![empty(1), empty(2)]));
        // two 51-byte transactions
        assert_eq!(bytes.len(), 80 + 1 + 2 * 51);
        let parsed = parser().parse_block(&bytes).unwrap();
        assert_eq!(parsed.txs.len(), 2);
        assert!(parsed.txs[0].vout.is_empty());
    }

    #[test]
    fn test_parse_block_auxpow_version() {
        let bytes = serialize(&test_block(0x0001_0102, vec![test_tx(None, &[1])]));
        let err = parser().parse_block(&bytes).unwrap_err();
        assert_eq!(err.kind(), &OpErrorKind::DecodeError);
    }

    #[test]
    fn test_parse_block_huge_count() {
        let mut bytes = serialize(&test_block(2, vec![]));
        // replace the zero count by 0xffffffff transactions
        bytes.truncate(80);
        bytes.extend(&[0xfe, 0xff, 0xff, 0xff, 0xff]);
        let err = parser().parse_block(&bytes).unwrap_err();
        assert_eq!(err.kind(), &OpErrorKind::DecodeError);
    }
}
