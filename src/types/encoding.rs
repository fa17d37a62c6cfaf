//! Canonical byte encoding of a transaction for signing.
//!
//! The node hashes and verifies `ProtoTransactionCoreInfo` protobuf bytes, so
//! this writer must produce exactly what a protobuf encoder emits: fields in
//! ascending number order, varints for integers, length-delimited bytes and
//! nested `ByteArray { bytes data = 1; }` messages for the big quantities.

use crate::types::address::ADDRESS_LEN;
use crate::types::primitives::PUBLIC_KEY_LEN;

const WIRE_VARINT: u8 = 0;
const WIRE_LEN: u8 = 2;

/// Field numbers of `ProtoTransactionCoreInfo`
mod field {
    pub const VERSION: u32 = 1;
    pub const NONCE: u32 = 2;
    pub const TO_ADDR: u32 = 3;
    pub const SENDER_PUB_KEY: u32 = 4;
    pub const AMOUNT: u32 = 5;
    pub const GAS_PRICE: u32 = 6;
    pub const GAS_LIMIT: u32 = 7;
    pub const CODE: u32 = 8;
    pub const DATA: u32 = 9;
}

/// Field number of the payload inside a `ByteArray` message
const BYTE_ARRAY_DATA: u32 = 1;

/// Minimal protobuf writer
#[derive(Default)]
pub struct ProtoWriter {
    buf: Vec<u8>,
}

impl ProtoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    fn key(&mut self, field: u32, wire_type: u8) {
        self.varint((u64::from(field) << 3) | u64::from(wire_type));
    }

    pub fn uint(&mut self, field: u32, value: u64) {
        self.key(field, WIRE_VARINT);
        self.varint(value);
    }

    pub fn bytes(&mut self, field: u32, value: &[u8]) {
        self.key(field, WIRE_LEN);
        self.varint(value.len() as u64);
        self.buf.extend_from_slice(value);
    }

    /// Nested `ByteArray` message holding `value`
    pub fn byte_array(&mut self, field: u32, value: &[u8]) {
        let mut inner = ProtoWriter::new();
        inner.bytes(BYTE_ARRAY_DATA, value);
        self.bytes(field, &inner.finish());
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Borrowed view of the signed fields of a transaction
pub struct CoreInfo<'a> {
    pub version: u32,
    pub nonce: u64,
    pub to_addr: &'a [u8; ADDRESS_LEN],
    pub sender_pub_key: &'a [u8; PUBLIC_KEY_LEN],
    pub amount: u128,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub code: &'a [u8],
    pub data: &'a [u8],
}

impl CoreInfo<'_> {
    /// Encode to the bytes that are hashed and signed.
    ///
    /// `code` and `data` are omitted when empty; every other field is always written.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ProtoWriter::new();
        w.uint(field::VERSION, u64::from(self.version));
        w.uint(field::NONCE, self.nonce);
        w.bytes(field::TO_ADDR, self.to_addr);
        w.byte_array(field::SENDER_PUB_KEY, self.sender_pub_key);
        w.byte_array(field::AMOUNT, &self.amount.to_be_bytes());
        w.byte_array(field::GAS_PRICE, &self.gas_price.to_be_bytes());
        w.uint(field::GAS_LIMIT, self.gas_limit);
        if !self.code.is_empty() {
            w.bytes(field::CODE, self.code);
        }
        if !self.data.is_empty() {
            w.bytes(field::DATA, self.data);
        }
        w.finish()
    }
}
