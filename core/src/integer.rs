/*
 * integer.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of hpack-rs, an HTTP/2 header compression library.
 *
 * hpack-rs is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * hpack-rs is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with hpack-rs.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Prefix integer codec (RFC 7541 Section 5.1).
//!
//! An integer starts in the low N bits of an octet whose high bits belong to
//! the instruction. Values that do not fit the prefix continue as base-128
//! little-endian groups, high bit set on every octet except the last.

use bytes::BufMut;

use crate::error::DecodeError;

/// Largest integer the decoder accepts.
pub const MAX_INTEGER: usize = u32::MAX as usize;

/// A 32-bit value needs at most five continuation octets.
const MAX_CONTINUATION_SHIFT: u32 = 35;

/// Write `value` with an N-bit prefix. `pattern` supplies the instruction bits
/// above the prefix and must be zero in the low `prefix_bits` bits.
pub fn encode_integer(value: usize, prefix_bits: u8, pattern: u8, out: &mut impl BufMut) {
    debug_assert!((1..=8).contains(&prefix_bits));
    let max_prefix = (1usize << prefix_bits) - 1;
    if value < max_prefix {
        out.put_u8(pattern | value as u8);
        return;
    }
    out.put_u8(pattern | max_prefix as u8);
    let mut value = value - max_prefix;
    while value >= 128 {
        out.put_u8(0x80 | (value % 128) as u8);
        value /= 128;
    }
    out.put_u8(value as u8);
}

/// Encode `value` with an N-bit prefix and no instruction bits.
pub fn encode_int(value: usize, prefix_bits: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(6);
    encode_integer(value, prefix_bits, 0, &mut out);
    out
}

/// Decode an integer whose prefix occupies the low `prefix_bits` of `buf[0]`.
/// Returns the value and the number of octets consumed.
pub fn decode_integer(buf: &[u8], prefix_bits: u8) -> Result<(usize, usize), DecodeError> {
    debug_assert!((1..=8).contains(&prefix_bits));
    let first = *buf.first().ok_or(DecodeError::Truncated)?;
    let max_prefix = (1u64 << prefix_bits) - 1;
    let mut value = u64::from(first) & max_prefix;
    if value < max_prefix {
        return Ok((value as usize, 1));
    }
    let mut shift = 0u32;
    for (i, &b) in buf[1..].iter().enumerate() {
        if shift >= MAX_CONTINUATION_SHIFT {
            return Err(DecodeError::IntegerOverflow);
        }
        value += u64::from(b & 0x7f) << shift;
        if value > MAX_INTEGER as u64 {
            return Err(DecodeError::IntegerOverflow);
        }
        if b & 0x80 == 0 {
            return Ok((value as usize, i + 2));
        }
        shift += 7;
    }
    Err(DecodeError::Truncated)
}
