/*
 * lib.rs
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

//! HPACK header compression for HTTP/2 (RFC 7541).
//!
//! An [`Encoder`] and a [`Decoder`] each own one dynamic table and are used for
//! one direction of one connection. Header blocks must be decoded in the order
//! they were encoded. Both take `&mut self` for every call that touches the
//! table, so sharing one between tasks needs a mutex.
//!
//! ```
//! use hpack_core::{Decoder, Encoder};
//!
//! let mut encoder = Encoder::new();
//! let mut decoder = Decoder::new();
//! let block = encoder.encode([(":method", "GET"), (":path", "/")]).unwrap();
//! let headers = decoder.decode(&block).unwrap();
//! assert_eq!(headers[0].name, ":method");
//! ```

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod huffman;
pub mod integer;
pub mod static_table;
pub mod table;

pub use config::{DecoderConfig, EncoderConfig, DEFAULT_MAX_HEADER_LIST_SIZE, DEFAULT_TABLE_SIZE};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{DecodeError, HpackError, HuffmanError, Result};
pub use header::{headers_from_map, Header, HeaderField};
pub use table::{DynamicTable, IndexMatch, TableEntry};
