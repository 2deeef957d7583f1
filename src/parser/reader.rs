use crate::parser::errors::{OpError, OpErrorKind, OpResult};
use bitcoin::consensus::encode::VarInt;
use bitcoin::consensus::Decodable;
use bitcoin::{BlockHeader, Transaction};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Serialized size of a block header.
pub const BLOCK_HEADER_SIZE: u64 = 80;

///
/// Smallest serialized transaction the decoder accepts:
/// version, one input with empty script, no outputs, locktime.
///
pub const MIN_TX_SIZE: u64 = 4 + 1 + 41 + 1 + 4;

///
/// Readers over the chain's wire format.
///
/// All multi-byte integers are little-endian, collections are
/// prefixed by a compact-size length.
///
pub trait BlockchainRead: std::io::Read {
    #[inline]
    fn read_i32(&mut self) -> OpResult<i32> {
        let u = ReadBytesExt::read_i32::<LittleEndian>(self)?;
        Ok(u)
    }

    #[inline]
    fn read_compact_size(&mut self) -> OpResult<u64> {
        Ok(VarInt::consensus_decode(self)?.0)
    }

    #[inline]
    fn read_transaction(&mut self) -> OpResult<Transaction> {
        Ok(Transaction::consensus_decode(self)?)
    }

    #[inline]
    fn read_block_header(&mut self) -> OpResult<BlockHeader> {
        Ok(BlockHeader::consensus_decode(self)?)
    }
}

impl BlockchainRead for Cursor<&[u8]> {}

///
/// Peek at the little-endian block version without advancing.
///
pub fn peek_version(cursor: &mut Cursor<&[u8]>) -> OpResult<i32> {
    let start = cursor.position();
    let version = BlockchainRead::read_i32(cursor);
    cursor.set_position(start);
    version.map_err(|e| e.join_msg("block version"))
}

/// Bytes left unread in the cursor.
#[inline]
pub fn remaining(cursor: &Cursor<&[u8]>) -> u64 {
    (cursor.get_ref().len() as u64).saturating_sub(cursor.position())
}

///
/// Read the transaction count of a block and make sure the buffer can
/// possibly hold that many transactions before anything is allocated.
///
pub fn read_tx_count(cursor: &mut Cursor<&[u8]>) -> OpResult<usize> {
    let count = cursor.read_compact_size()?;
    let left = remaining(cursor);
    if count.saturating_mul(MIN_TX_SIZE) > left {
        return Err(OpError::new(OpErrorKind::DecodeError).join_msg(&format!(
            "{} transactions declared, only {} bytes left",
            count, left
        )));
    }
    Ok(count as usize)
}
