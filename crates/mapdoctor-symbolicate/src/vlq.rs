// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ decoding of the `mappings` field.
//!
//! Lines are separated by `;`, segments by `,`. Every field in a segment is
//! delta-encoded against the previous segment; the generated column resets
//! at each line while the source, original line, original column and name
//! deltas carry across lines.

use crate::error::{Result, SymbolicateError};

const CONTINUATION_BIT: u32 = 0b10_0000;
const VALUE_MASK: u32 = 0b01_1111;

fn base64_value(ch: u8) -> Result<u32> {
	let value = match ch {
		b'A'..=b'Z' => ch - b'A',
		b'a'..=b'z' => ch - b'a' + 26,
		b'0'..=b'9' => ch - b'0' + 52,
		b'+' => 62,
		b'/' => 63,
		_ => return Err(SymbolicateError::InvalidVlqChar(ch as char)),
	};
	Ok(u32::from(value))
}

/// Decode one segment into its signed field values.
pub fn decode_segment(segment: &str) -> Result<Vec<i32>> {
	let mut values = Vec::with_capacity(5);
	let mut accum: u64 = 0;
	let mut shift = 0u32;

	for ch in segment.bytes() {
		// Seven digits already cover 35 bits.
		if shift >= 35 {
			return Err(SymbolicateError::VlqOverflow);
		}
		let digit = base64_value(ch)?;
		accum |= u64::from(digit & VALUE_MASK) << shift;
		if accum > u64::from(u32::MAX) {
			return Err(SymbolicateError::VlqOverflow);
		}

		if digit & CONTINUATION_BIT != 0 {
			shift += 5;
			continue;
		}

		// Lowest bit carries the sign.
		let magnitude = (accum >> 1) as i64;
		let value = if accum & 1 == 1 { -magnitude } else { magnitude };
		values.push(i32::try_from(value).map_err(|_| SymbolicateError::VlqOverflow)?);
		accum = 0;
		shift = 0;
	}

	if shift != 0 {
		return Err(SymbolicateError::TruncatedSegment);
	}
	Ok(values)
}

/// One decoded segment that points into an original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
	/// 0-based.
	pub generated_line: u32,
	/// 0-based.
	pub generated_column: u32,
	pub source: u32,
	/// 0-based.
	pub original_line: u32,
	/// 0-based.
	pub original_column: u32,
	pub name: Option<u32>,
}

/// Mappings ordered by generated position.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
	mappings: Vec<Mapping>,
}

impl MappingTable {
	/// Closest mapping at or before `column` on `line`, both 0-based.
	pub fn find(&self, line: u32, column: u32) -> Option<&Mapping> {
		let start = self.mappings.partition_point(|m| m.generated_line < line);
		let end = self.mappings.partition_point(|m| m.generated_line <= line);
		let on_line = &self.mappings[start..end];

		match on_line.partition_point(|m| m.generated_column <= column) {
			0 => None,
			idx => Some(&on_line[idx - 1]),
		}
	}

	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}
}

#[derive(Default)]
struct Cursor {
	source: i64,
	original_line: i64,
	original_column: i64,
	name: i64,
}

fn non_negative(value: i64) -> Result<u32> {
	u32::try_from(value).map_err(|_| SymbolicateError::VlqOverflow)
}

/// Decode a full `mappings` string.
///
/// Segments with a single field carry no source position and are skipped.
pub fn decode_mappings(mappings: &str) -> Result<MappingTable> {
	let mut decoded = Vec::new();
	let mut cursor = Cursor::default();

	for (line_idx, line) in mappings.split(';').enumerate() {
		let generated_line = non_negative(line_idx as i64)?;
		let mut generated_column = 0i64;

		for segment in line.split(',').filter(|s| !s.is_empty()) {
			let fields = decode_segment(segment)?;
			match fields.len() {
				1 | 4 | 5 => {}
				n => return Err(SymbolicateError::InvalidSegmentLength(n)),
			}

			generated_column += i64::from(fields[0]);
			if fields.len() == 1 {
				continue;
			}

			cursor.source += i64::from(fields[1]);
			cursor.original_line += i64::from(fields[2]);
			cursor.original_column += i64::from(fields[3]);
			let name = match fields.get(4) {
				Some(delta) => {
					cursor.name += i64::from(*delta);
					Some(non_negative(cursor.name)?)
				}
				None => None,
			};

			decoded.push(Mapping {
				generated_line,
				generated_column: non_negative(generated_column)?,
				source: non_negative(cursor.source)?,
				original_line: non_negative(cursor.original_line)?,
				original_column: non_negative(cursor.original_column)?,
				name,
			});
		}
	}

	// Generators are not required to emit segments in column order.
	decoded.sort_by_key(|m| (m.generated_line, m.generated_column));
	Ok(MappingTable { mappings: decoded })
}
