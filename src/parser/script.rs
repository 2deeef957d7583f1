use crate::parser::params::ChainParams;
use bitcoin::blockdata::opcodes::{all, All};
use bitcoin::blockdata::script::Instruction;
use bitcoin::hashes::{hash160, Hash};
use bitcoin::util::base58;
use bitcoin::{PublicKey, Script};
use serde::{Deserialize, Serialize};
use std::fmt;
use Instruction::{Op, PushBytes};

///
/// Output script patterns.
///
/// Crown has no segwit addresses; witness patterns are still
/// recognised so they are not reported as non-standard.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScriptType {
    OpReturn,
    Pay2MultiSig,
    Pay2PublicKey,
    Pay2PublicKeyHash,
    Pay2ScriptHash,
    Pay2WitnessPublicKeyHash,
    Pay2WitnessScriptHash,
    WitnessProgram,
    Unspendable,
    NotRecognised,
}

///
/// Base58Check addresses extracted from a ScriptPubKey, rendered with
/// the prefixes of the given network.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInfo {
    pub addresses: Vec<String>,
    pub pattern: ScriptType,
}

impl ScriptInfo {
    fn new(address: Option<String>, pattern: ScriptType) -> Self {
        ScriptInfo {
            addresses: address.into_iter().collect(),
            pattern,
        }
    }
}

pub fn evaluate_script(script: &Script, params: &ChainParams) -> ScriptInfo {
    let bytes = script.as_bytes();
    if script.is_p2pk() {
        ScriptInfo::new(p2pk_to_address(script, params), ScriptType::Pay2PublicKey)
    } else if script.is_p2pkh() {
        // OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
        let address = encode_address(params.pubkey_hash_addr_id, &bytes[3..23]);
        ScriptInfo::new(Some(address), ScriptType::Pay2PublicKeyHash)
    } else if script.is_p2sh() {
        // OP_HASH160 <20> OP_EQUAL
        let address = encode_address(params.script_hash_addr_id, &bytes[2..22]);
        ScriptInfo::new(Some(address), ScriptType::Pay2ScriptHash)
    } else if script.is_v0_p2wpkh() {
        ScriptInfo::new(None, ScriptType::Pay2WitnessPublicKeyHash)
    } else if script.is_v0_p2wsh() {
        ScriptInfo::new(None, ScriptType::Pay2WitnessScriptHash)
    } else if script.is_witness_program() {
        ScriptInfo::new(None, ScriptType::WitnessProgram)
    } else if script.is_op_return() {
        ScriptInfo::new(None, ScriptType::OpReturn)
    } else if script.is_provably_unspendable() {
        ScriptInfo::new(None, ScriptType::Unspendable)
    } else if let Some(addresses) = multisig_addresses(script, params) {
        ScriptInfo {
            addresses,
            pattern: ScriptType::Pay2MultiSig,
        }
    } else {
        ScriptInfo::new(None, ScriptType::NotRecognised)
    }
}

/// `prefix || payload || checksum`, base58
#[inline]
pub fn encode_address(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    base58::check_encode_slice(&data)
}

///
/// Collect the chunks of a bare multisig script:
/// `OP_m <pubkey>... OP_n OP_CHECKMULTISIG[VERIFY]`.
///
/// Returns `None` when the script does not match the pattern.
///
fn multisig_chunks(script: &Script) -> Option<Vec<Instruction<'_>>> {
    let chunks = script
        .instructions()
        .collect::<Result<Vec<Instruction>, _>>()
        .ok()?;
    if chunks.len() < 4 {
        return None;
    }

    match chunks.last()? {
        Op(op) if *op == all::OP_CHECKMULTISIG || *op == all::OP_CHECKMULTISIGVERIFY => {}
        _ => return None,
    }

    let num_keys = get_num_keys(&chunks[chunks.len() - 2])?;
    if num_keys < 1 || (num_keys + 3) as usize != chunks.len() {
        return None;
    }
    if chunks[1..chunks.len() - 2]
        .iter()
        .any(|chunk| matches!(chunk, Op(_)))
    {
        return None;
    }
    match get_num_keys(chunks.first()?) {
        Some(required) if required >= 1 => Some(chunks),
        _ => None,
    }
}

/// one pay-to-pubkey-hash address per key of a multisig output
fn multisig_addresses(script: &Script, params: &ChainParams) -> Option<Vec<String>> {
    let chunks = multisig_chunks(script)?;
    let keys = &chunks[1..chunks.len() - 2];
    let mut addresses = Vec::with_capacity(keys.len());
    for chunk in keys {
        if let PushBytes(data) = chunk {
            match PublicKey::from_slice(data) {
                Ok(pk) => addresses.push(encode_address(
                    params.pubkey_hash_addr_id,
                    &pk.pubkey_hash()[..],
                )),
                // a bogus key still leaves a multisig-shaped script
                Err(_) => return Some(Vec::new()),
            }
        }
    }
    Some(addresses)
}

#[inline]
fn decode_from_op_n(op: &All) -> i32 {
    if *op == all::OP_PUSHBYTES_0 {
        0
    } else if *op == all::OP_PUSHNUM_NEG1 {
        -1
    } else {
        op.into_u8() as i32 + 1 - all::OP_PUSHNUM_1.into_u8() as i32
    }
}

#[inline]
fn get_num_keys(chunk: &Instruction) -> Option<i32> {
    match chunk {
        PushBytes(_) => None,
        Op(op) => {
            let code = op.into_u8();
            let is_op_n = *op == all::OP_PUSHNUM_NEG1
                || *op == all::OP_PUSHBYTES_0
                || (code >= all::OP_PUSHNUM_1.into_u8() && code <= all::OP_PUSHNUM_16.into_u8());
            if is_op_n {
                Some(decode_from_op_n(op))
            } else {
                None
            }
        }
    }
}

/// hash160 of the pushed key, rendered as pay-to-pubkey-hash
#[inline]
fn p2pk_to_address(script: &Script, params: &ChainParams) -> Option<String> {
    match script.instructions().next() {
        Some(Ok(PushBytes(pk))) => {
            let pkh = hash160::Hash::hash(pk);
            Some(encode_address(params.pubkey_hash_addr_id, &pkh[..]))
        }
        _ => None,
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            ScriptType::OpReturn => "nulldata",
            ScriptType::Pay2MultiSig => "multisig",
            ScriptType::Pay2PublicKey => "pubkey",
            ScriptType::Pay2PublicKeyHash => "pubkeyhash",
            ScriptType::Pay2ScriptHash => "scripthash",
            ScriptType::Pay2WitnessPublicKeyHash => "witness_v0_keyhash",
            ScriptType::Pay2WitnessScriptHash => "witness_v0_scripthash",
            ScriptType::WitnessProgram => "witness_unknown",
            ScriptType::Unspendable => "unspendable",
            ScriptType::NotRecognised => "nonstandard",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate_script, ScriptType};
    use crate::parser::params::{MAIN_NET_PARAMS, TEST_NET_PARAMS};
    use bitcoin::hashes::hex::FromHex;
    use bitcoin::Script;

    #[test]
    fn test_crown_script_p2pkh() {
        // OP_DUP OP_HASH160 OP_PUSHDATA0(20 bytes) 12ab8dc588ca9d5787dde7eb29569da63c3a238c OP_EQUALVERIFY OP_CHECKSIG
        let script =
            Script::from_hex("76a91412ab8dc588ca9d5787dde7eb29569da63c3a238c88ac").unwrap();
        let result = evaluate_script(&script, &MAIN_NET_PARAMS);
        assert_eq!(result.pattern, ScriptType::Pay2PublicKeyHash);
        assert_eq!(
            result.addresses,
            vec![String::from("CRWDfhzn1FJo4JxMViB8wHx2g8q5PQqgL4vf")]
        );

        let result = evaluate_script(&script, &TEST_NET_PARAMS);
        assert_eq!(
            result.addresses,
            vec![String::from("tCRWEh6nq4uMei758MTTx21j1yWMMb8WNvddr")]
        );
    }

    #[test]
    fn test_crown_script_p2pk() {
        // OP_PUSHDATA0(65 bytes) 0x044bca... OP_CHECKSIG
        let script = Script::from_hex(
            "41044bca633a91de10df85a63d0a24cb09783148fe0e16c92e937fc4491580c860757148effa0595a955f44078b48ba67fa198782e8bb68115da0daa8fde5301f7f9ac",
        )
        .unwrap();
        let result = evaluate_script(&script, &MAIN_NET_PARAMS);
        assert_eq!(result.pattern, ScriptType::Pay2PublicKey);
        assert_eq!(
            result.addresses,
            vec![String::from("CRWXCWFs1fqjeeERUjNvaC21ZwmTpoKXQ2gw")]
        );
    }

    #[test]
    fn test_crown_script_p2sh() {
        // OP_HASH160 20 0xe9c3dd0c07aac76179ebc76a6c78d4d67c6c160a OP_EQUAL
        let script = Script::from_hex("a914e9c3dd0c07aac76179ebc76a6c78d4d67c6c160a87").unwrap();
        let result = evaluate_script(&script, &MAIN_NET_PARAMS);
        assert_eq!(result.pattern, ScriptType::Pay2ScriptHash);
        assert_eq!(
            result.addresses,
            vec![String::from("CRMhqkjhNL3mQC7kSPs9F2aDLfTVPuyaamsz")]
        );
    }

    #[test]
    fn test_crown_script_p2ms() {
        // 2-of-3
        let script = Script::from_hex(
            "5221022df8750480ad5b26950b25c7ba79d3e37d75f640f8e5d9bcd5b150a0f85014da2103e3818b65bcc73a7d64064106a859cc1a5a728c4345ff0b641209fba0d90de6e921021f2f6e1e50cb6a953935c3601284925decd3fd21bc445712576873fb8c6ebc1853ae",
        )
        .unwrap();
        let result = evaluate_script(&script, &MAIN_NET_PARAMS);
        assert_eq!(result.pattern, ScriptType::Pay2MultiSig);
        assert_eq!(result.addresses.len(), 3);
        assert!(result.addresses.iter().all(|a| a.starts_with("CRW")));
    }

    #[test]
    fn test_crown_script_op_return() {
        let script = Script::from_hex("6a0b68656c6c6f20776f726c64").unwrap();
        let result = evaluate_script(&script, &MAIN_NET_PARAMS);
        assert_eq!(result.pattern, ScriptType::OpReturn);
        assert!(result.addresses.is_empty());
    }

    #[test]
    fn test_crown_script_non_standard() {
        // OP_IFDUP OP_IF OP_2SWAP OP_VERIFY OP_2OVER OP_DEPTH
        let script = Script::from_hex("736372697074").unwrap();
        let result = evaluate_script(&script, &MAIN_NET_PARAMS);
        assert_eq!(result.addresses.get(0), None);
        assert_eq!(result.pattern, ScriptType::NotRecognised);
    }

    #[test]
    fn test_crown_bogus_script() {
        let script = Script::from_hex("4cff00").unwrap();
        let result = evaluate_script(&script, &MAIN_NET_PARAMS);
        assert_eq!(result.addresses.get(0), None);
        assert_eq!(result.pattern, ScriptType::NotRecognised);
    }
}
