//! Block and header codec.
//!
//! Header wire layout:
//!
//! ```text
//! height            u64
//! previous_hash     [u8; 32]
//! hash              [u8; 32]
//! timestamp         u64
//! producer          [u8; 32]
//! signature         compact-size + bytes
//! tx_root           [u8; 32]
//! tx_count          u32
//! round_index       u64
//! round_start_time  u64
//! packing_index     u32
//! extend            compact-size + bytes
//! ```
//!
//! The hash preimage is the same sequence without `hash` and `signature`.
//! A block is the header followed by a compact-size transaction count and
//! each transaction (`tx_type u16`, `timestamp u64`, `payload` var bytes).

use super::block::{Block, BlockHeader, ConsensusExtension, Transaction};
use super::wire::{
    get_array, get_len, get_u16, get_u32, get_u64, get_var_bytes, put_bytes, put_u16, put_u32,
    put_u64, put_var_bytes, put_varint, CodecResult, WireDecode, WireEncode,
};

/// Smallest possible encoded transaction, used to bound the pre-allocation.
const MIN_TX_SIZE: usize = 2 + 8 + 1;

/// Upper bound on the transaction count a decoder will accept.
pub const MAX_BLOCK_TXS: usize = 100_000;

impl WireEncode for ConsensusExtension {
    fn encode(&self, out: &mut Vec<u8>) {
        put_bytes(out, &self.tx_root);
        put_u32(out, self.tx_count);
        put_u64(out, self.round_index);
        put_u64(out, self.round_start_time);
        put_u32(out, self.packing_index);
        put_var_bytes(out, &self.extend);
    }
}

impl WireDecode for ConsensusExtension {
    fn decode(input: &mut &[u8]) -> CodecResult<Self> {
        Ok(Self {
            tx_root: get_array(input)?,
            tx_count: get_u32(input)?,
            round_index: get_u64(input)?,
            round_start_time: get_u64(input)?,
            packing_index: get_u32(input)?,
            extend: get_var_bytes(input)?,
        })
    }
}

impl WireEncode for BlockHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        put_u64(out, self.height);
        put_bytes(out, &self.previous_hash);
        put_bytes(out, &self.hash);
        put_u64(out, self.timestamp);
        put_bytes(out, &self.producer);
        put_var_bytes(out, &self.signature);
        self.extension.encode(out);
    }
}

impl WireDecode for BlockHeader {
    fn decode(input: &mut &[u8]) -> CodecResult<Self> {
        Ok(Self {
            height: get_u64(input)?,
            previous_hash: get_array(input)?,
            hash: get_array(input)?,
            timestamp: get_u64(input)?,
            producer: get_array(input)?,
            signature: get_var_bytes(input)?,
            extension: ConsensusExtension::decode(input)?,
        })
    }
}

impl WireEncode for Transaction {
    fn encode(&self, out: &mut Vec<u8>) {
        put_u16(out, self.tx_type);
        put_u64(out, self.timestamp);
        put_var_bytes(out, &self.payload);
    }
}

impl WireDecode for Transaction {
    fn decode(input: &mut &[u8]) -> CodecResult<Self> {
        Ok(Self {
            tx_type: get_u16(input)?,
            timestamp: get_u64(input)?,
            payload: get_var_bytes(input)?,
        })
    }
}

impl WireEncode for Block {
    fn encode(&self, out: &mut Vec<u8>) {
        self.header.encode(out);
        put_varint(out, self.transactions.len() as u64);
        for tx in &self.transactions {
            tx.encode(out);
        }
    }
}

impl WireDecode for Block {
    fn decode(input: &mut &[u8]) -> CodecResult<Self> {
        let header = BlockHeader::decode(input)?;
        let count = get_len(input, MAX_BLOCK_TXS)?;
        let mut transactions = Vec::with_capacity(count.min(input.len() / MIN_TX_SIZE));
        for _ in 0..count {
            transactions.push(Transaction::decode(input)?);
        }
        Ok(Self {
            header,
            transactions,
        })
    }
}

/// Canonical hash preimage: every header field except `hash` and `signature`.
pub fn header_preimage(header: &BlockHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + 32 + 8 + 32 + 32 + 4 + 8 + 8 + 4 + 1);
    put_u64(&mut out, header.height);
    put_bytes(&mut out, &header.previous_hash);
    put_u64(&mut out, header.timestamp);
    put_bytes(&mut out, &header.producer);
    header.extension.encode(&mut out);
    out
}

pub fn decode_header(bytes: &[u8]) -> CodecResult<BlockHeader> {
    BlockHeader::from_bytes(bytes)
}

pub fn decode_block(bytes: &[u8]) -> CodecResult<Block> {
    Block::from_bytes(bytes)
}

pub fn encode_header(header: &BlockHeader) -> Vec<u8> {
    header.to_bytes()
}

pub fn encode_block(block: &Block) -> Vec<u8> {
    block.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wire::CodecError;
    use shared_types::ZERO_HASH;

    fn create_block() -> Block {
        let transactions = vec![
            Transaction {
                tx_type: 1,
                timestamp: 1_000,
                payload: vec![],
            },
            Transaction {
                tx_type: 2,
                timestamp: 1_001,
                payload: vec![0xAA; 300],
            },
        ];
        let header = BlockHeader {
            height: 12,
            previous_hash: [0x11; 32],
            hash: ZERO_HASH,
            timestamp: 1_700_000_010,
            producer: [0x22; 32],
            signature: vec![0x33; 64],
            extension: ConsensusExtension {
                tx_root: [0x44; 32],
                tx_count: 2,
                round_index: 3,
                round_start_time: 1_700_000_000,
                packing_index: 1,
                extend: vec![1, 2, 3],
            },
        }
        .seal();
        Block {
            header,
            transactions,
        }
    }

    #[test]
    fn test_header_layout_is_fixed() {
        let block = create_block();
        let bytes = encode_header(&block.header);

        assert_eq!(&bytes[0..8], &12u64.to_le_bytes());
        assert_eq!(&bytes[8..40], &[0x11; 32]);
        assert_eq!(&bytes[40..72], &block.header.hash);
        assert_eq!(&bytes[72..80], &1_700_000_010u64.to_le_bytes());
        assert_eq!(&bytes[80..112], &[0x22; 32]);
        // signature: one-byte length prefix then 64 bytes
        assert_eq!(bytes[112], 64);
        assert_eq!(&bytes[113..177], &[0x33; 64]);
        assert_eq!(&bytes[177..209], &[0x44; 32]);
        // tx_count + round_index + round_start_time + packing_index + extend
        assert_eq!(bytes.len(), 209 + 4 + 8 + 8 + 4 + 1 + 3);
    }

    #[test]
    fn test_block_decode_matches_encode() {
        let block = create_block();
        let bytes = encode_block(&block);
        assert_eq!(decode_block(&bytes).unwrap(), block);
        assert_eq!(decode_header(&encode_header(&block.header)).unwrap(), block.header);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let block = create_block();
        let mut bytes = encode_header(&block.header);
        bytes.push(0);
        assert_eq!(decode_header(&bytes), Err(CodecError::TrailingBytes(1)));
    }

    #[test]
    fn test_truncated_block_rejected() {
        let block = create_block();
        let bytes = encode_block(&block);
        for cut in [0, 10, 150, bytes.len() - 1] {
            assert!(
                decode_block(&bytes[..cut]).is_err(),
                "decode of {cut} bytes should fail"
            );
        }
    }

    #[test]
    fn test_huge_tx_count_does_not_allocate() {
        let block = create_block();
        let mut bytes = encode_header(&block.header);
        put_varint(&mut bytes, MAX_BLOCK_TXS as u64);
        assert!(matches!(
            decode_block(&bytes),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }
}
