/*
 * error.rs
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

//! Codec errors.
//!
//! Every error aborts the `encode`/`decode` call that raised it. A decoding
//! error means the two ends of the connection may no longer agree on the
//! dynamic table; HTTP/2 treats it as a connection error of type
//! COMPRESSION_ERROR and the caller is expected to tear the connection down.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HpackError>;

/// Errors from the encoder, decoder, or dynamic table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HpackError {
    /// The header block is malformed.
    #[error("HPACK decoding error: {0}")]
    Decoding(#[from] DecodeError),
    /// A dynamic table size above the allowed maximum was requested.
    #[error("dynamic table size {requested} exceeds allowed maximum {allowed}")]
    TableSize { requested: usize, allowed: usize },
    /// The decoded header list grew past `max_header_list_size`.
    #[error("header list too large: limit is {limit} bytes")]
    HeaderListTooLarge { limit: usize },
    /// The request cannot be represented by this codec.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Why a header block failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The block ended in the middle of an instruction.
    #[error("truncated header block")]
    Truncated,
    /// An integer exceeded 2^32 - 1 or used too many continuation octets.
    #[error("integer overflow")]
    IntegerOverflow,
    /// An index referenced neither the static nor the dynamic table.
    #[error("invalid index {0}")]
    InvalidIndex(usize),
    /// A Huffman-coded string literal was malformed.
    #[error("invalid Huffman string: {0}")]
    Huffman(#[from] HuffmanError),
    /// A header name or value was not valid UTF-8.
    #[error("header is not valid UTF-8")]
    InvalidUtf8,
}

/// Huffman decoding failures (RFC 7541 Section 5.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HuffmanError {
    /// The bit sequence does not match any code.
    #[error("invalid bit sequence")]
    InvalidCode,
    /// The EOS symbol appeared inside the string.
    #[error("EOS symbol in string literal")]
    EosInString,
    /// More than 7 bits of padding.
    #[error("padding longer than 7 bits")]
    PaddingTooLong,
    /// Padding is not a prefix of the EOS code.
    #[error("padding is not all 1-bits")]
    InvalidPadding,
    /// Decoded output passed the caller's ceiling.
    #[error("decoded string longer than {0} bytes")]
    OutputTooLarge(usize),
}

impl HpackError {
    /// True for errors caused by a malformed header block.
    pub fn is_decoding(&self) -> bool {
        matches!(self, HpackError::Decoding(_))
    }
}

impl From<HuffmanError> for HpackError {
    fn from(e: HuffmanError) -> Self {
        HpackError::Decoding(DecodeError::Huffman(e))
    }
}
