//! Contract call batch codec.
//!
//! Packs an ordered [`CallBatch`] into the single opaque payload the hub
//! wallet executes, and unpacks it again. All integers are big endian and
//! there is no padding besides the explicit length fields:
//!
//! ```text
//! u32 count
//! count x { target: 20 bytes | value: 32 bytes | len: u32 | data: len bytes }
//! ```

use alloy::primitives::{Address, Bytes, U256};
use intent_types::{CallBatch, ContractCall};
use thiserror::Error;

pub mod erc20;

const COUNT_SIZE: usize = 4;
const TARGET_SIZE: usize = 20;
const VALUE_SIZE: usize = 32;
const LENGTH_SIZE: usize = 4;
const RECORD_HEADER_SIZE: usize = TARGET_SIZE + VALUE_SIZE + LENGTH_SIZE;

/// Errors that can occur while encoding or decoding a batch.
///
/// A batch produced by [`encode`] always decodes, so `MalformedBatch` on such
/// input indicates a bug, not a condition to retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
	#[error("Malformed batch: {0}")]
	MalformedBatch(String),
	#[error("Batch too large: {0}")]
	TooLarge(String),
}

/// Encodes a batch into its wire payload.
pub fn encode(batch: &CallBatch) -> Result<Bytes, CodecError> {
	let count = u32::try_from(batch.len())
		.map_err(|_| CodecError::TooLarge(format!("{} calls", batch.len())))?;

	let size = COUNT_SIZE
		+ batch
			.calls()
			.iter()
			.map(|call| RECORD_HEADER_SIZE + call.data.len())
			.sum::<usize>();
	let mut out = Vec::with_capacity(size);
	out.extend_from_slice(&count.to_be_bytes());

	for (index, call) in batch.calls().iter().enumerate() {
		let len = u32::try_from(call.data.len()).map_err(|_| {
			CodecError::TooLarge(format!("call {} has {} bytes of data", index, call.data.len()))
		})?;
		out.extend_from_slice(call.target.as_slice());
		out.extend_from_slice(&call.value.to_be_bytes::<VALUE_SIZE>());
		out.extend_from_slice(&len.to_be_bytes());
		out.extend_from_slice(&call.data);
	}

	Ok(Bytes::from(out))
}

/// Decodes a wire payload back into a batch.
///
/// Fails if a length field disagrees with the buffer size or bytes remain
/// after the last record.
pub fn decode(bytes: &[u8]) -> Result<CallBatch, CodecError> {
	let mut reader = Reader::new(bytes);
	let count = reader.read_u32("count")? as usize;

	// Every record needs at least its header, which bounds the allocation
	let max_records = reader.remaining() / RECORD_HEADER_SIZE;
	if count > max_records {
		return Err(CodecError::MalformedBatch(format!(
			"count {} exceeds what {} remaining bytes can hold",
			count,
			reader.remaining()
		)));
	}

	let mut calls = Vec::with_capacity(count);
	for index in 0..count {
		let target = Address::from_slice(reader.take(TARGET_SIZE, "target", index)?);
		let value = U256::from_be_slice(reader.take(VALUE_SIZE, "value", index)?);
		let len = reader.read_u32("length")? as usize;
		let data = Bytes::copy_from_slice(reader.take(len, "data", index)?);
		calls.push(ContractCall {
			target,
			value,
			data,
		});
	}

	if reader.remaining() != 0 {
		return Err(CodecError::MalformedBatch(format!(
			"{} trailing bytes after {} calls",
			reader.remaining(),
			count
		)));
	}

	Ok(CallBatch::from(calls))
}

struct Reader<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	fn remaining(&self) -> usize {
		self.buf.len() - self.pos
	}

	fn take(&mut self, len: usize, field: &str, index: usize) -> Result<&'a [u8], CodecError> {
		if len > self.remaining() {
			return Err(CodecError::MalformedBatch(format!(
				"call {} {} needs {} bytes, {} left",
				index,
				field,
				len,
				self.remaining()
			)));
		}
		let slice = &self.buf[self.pos..self.pos + len];
		self.pos += len;
		Ok(slice)
	}

	fn read_u32(&mut self, field: &str) -> Result<u32, CodecError> {
		if self.remaining() < LENGTH_SIZE {
			return Err(CodecError::MalformedBatch(format!(
				"truncated {} field at offset {}",
				field, self.pos
			)));
		}
		let mut raw = [0u8; LENGTH_SIZE];
		raw.copy_from_slice(&self.buf[self.pos..self.pos + LENGTH_SIZE]);
		self.pos += LENGTH_SIZE;
		Ok(u32::from_be_bytes(raw))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;

	fn sample_batch() -> CallBatch {
		let token = address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
		let pool = address!("D8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
		CallBatch::new()
			.with_call(erc20::approve(token, pool, U256::from(1_000_000u64)))
			.with_call(ContractCall::new(pool, U256::ZERO, vec![0xde, 0xad, 0xbe, 0xef]))
			.with_call(ContractCall::new(pool, U256::MAX, Bytes::new()))
	}

	#[test]
	fn test_roundtrip_preserves_order() {
		let batch = sample_batch();
		let encoded = encode(&batch).unwrap();
		let decoded = decode(&encoded).unwrap();
		assert_eq!(decoded, batch);
		assert_eq!(decoded.calls()[1].data.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
		assert_eq!(decoded.calls()[2].value, U256::MAX);
	}

	#[test]
	fn test_empty_batch() {
		let encoded = encode(&CallBatch::new()).unwrap();
		assert_eq!(encoded.as_ref(), &[0, 0, 0, 0]);
		assert!(decode(&encoded).unwrap().is_empty());
	}

	#[test]
	fn test_layout() {
		let target = address!("0000000000000000000000000000000000000001");
		let batch = CallBatch::new().with_call(ContractCall::new(target, U256::from(7u64), vec![0xaa]));
		let encoded = encode(&batch).unwrap();

		assert_eq!(encoded.len(), COUNT_SIZE + RECORD_HEADER_SIZE + 1);
		assert_eq!(&encoded[..4], &[0, 0, 0, 1]);
		assert_eq!(encoded[4 + 19], 1);
		assert_eq!(encoded[4 + 20 + 31], 7);
		assert_eq!(&encoded[4 + 52..4 + 56], &[0, 0, 0, 1]);
		assert_eq!(encoded[encoded.len() - 1], 0xaa);
	}

	#[test]
	fn test_truncated_buffer_is_malformed() {
		let encoded = encode(&sample_batch()).unwrap();
		for cut in [0, 3, 10, encoded.len() - 1] {
			let result = decode(&encoded[..cut]);
			assert!(
				matches!(result, Err(CodecError::MalformedBatch(_))),
				"cut at {} should fail",
				cut
			);
		}
	}

	#[test]
	fn test_trailing_bytes_are_malformed() {
		let mut encoded = encode(&sample_batch()).unwrap().to_vec();
		encoded.push(0);
		assert!(matches!(decode(&encoded), Err(CodecError::MalformedBatch(_))));
	}

	#[test]
	fn test_inflated_count_is_malformed() {
		let mut encoded = encode(&sample_batch()).unwrap().to_vec();
		encoded[..4].copy_from_slice(&u32::MAX.to_be_bytes());
		assert!(matches!(decode(&encoded), Err(CodecError::MalformedBatch(_))));
	}
}
