//! Byte envelope
//!
//! Every serialized graph starts with a fixed header:
//!
//! | bytes | content |
//! |---|---|
//! | 0..4 | magic `STWG` |
//! | 4 | envelope version |
//! | 5 | strategy tag |
//! | 6 | wire format tag |
//!
//! The document follows immediately.

use crate::error::{CodecError, CodecResult};
use crate::format::{StrategyKind, WireFormat};

pub(crate) const MAGIC: &[u8; 4] = b"STWG";
pub(crate) const VERSION: u8 = 1;
pub(crate) const HEADER_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
	pub strategy: StrategyKind,
	pub format: WireFormat,
}

pub(crate) fn write_header(buf: &mut Vec<u8>, header: Header) {
	buf.extend_from_slice(MAGIC);
	buf.push(VERSION);
	buf.push(header.strategy.tag());
	buf.push(header.format.tag());
}

/// Parse the header, returning it with the remaining payload.
pub(crate) fn read_header(bytes: &[u8]) -> CodecResult<(Header, &[u8])> {
	if bytes.len() < HEADER_LEN {
		return Err(CodecError::malformed(format!(
			"input is {} bytes, shorter than the {}-byte header",
			bytes.len(),
			HEADER_LEN
		)));
	}
	let (head, payload) = bytes.split_at(HEADER_LEN);
	if &head[..4] != MAGIC {
		return Err(CodecError::malformed("missing stowage magic bytes"));
	}
	if head[4] != VERSION {
		return Err(CodecError::malformed(format!(
			"unsupported envelope version {}",
			head[4]
		)));
	}
	let strategy = StrategyKind::from_tag(head[5])
		.ok_or_else(|| CodecError::malformed(format!("unknown strategy tag {}", head[5])))?;
	let format = WireFormat::from_tag(head[6])
		.ok_or_else(|| CodecError::malformed(format!("unknown wire format tag {}", head[6])))?;
	Ok((Header { strategy, format }, payload))
}

/// Parse the header and check it was written by `expected`.
pub(crate) fn expect_strategy(
	bytes: &[u8],
	expected: StrategyKind,
) -> CodecResult<(WireFormat, &[u8])> {
	let (header, payload) = read_header(bytes)?;
	if header.strategy != expected {
		return Err(CodecError::malformed(format!(
			"data was written by the {} strategy, not {}",
			header.strategy, expected
		)));
	}
	Ok((header.format, payload))
}
