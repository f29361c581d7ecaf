/*
 * decoder.rs
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

//! HPACK decoder (RFC 7541). Decodes header blocks into header lists.
//!
//! Each instruction is parsed and checked in full before the dynamic table is
//! touched, so a failure leaves the table as the preceding instructions left
//! it. Headers decoded before the failure are dropped.

use bytes::Bytes;

use crate::config::DecoderConfig;
use crate::error::{DecodeError, HpackError, HuffmanError, Result};
use crate::header::{Header, HeaderField, ENTRY_OVERHEAD};
use crate::huffman;
use crate::integer::decode_integer;
use crate::table::{DynamicTable, TableEntry};

/// How a literal field interacts with the dynamic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Indexing {
    Incremental,
    Without,
    Never,
}

/// Decoder for one direction of one connection.
#[derive(Debug)]
pub struct Decoder {
    table: DynamicTable,
    max_header_list_size: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        let config = DecoderConfig::default();
        Self {
            table: DynamicTable::new(config.header_table_size),
            max_header_list_size: config.max_header_list_size,
        }
    }

    pub fn with_config(config: &DecoderConfig) -> Result<Self> {
        Ok(Self {
            table: DynamicTable::with_limit(
                config.header_table_size,
                config.max_allowed_table_size,
            )?,
            max_header_list_size: config.max_header_list_size,
        })
    }

    pub fn header_table_size(&self) -> usize {
        self.table.max_size()
    }

    /// Set the dynamic table size directly, as if the peer had sent a size
    /// update.
    pub fn set_header_table_size(&mut self, size: usize) -> Result<()> {
        self.table.size_update(size)
    }

    pub fn max_allowed_table_size(&self) -> usize {
        self.table.max_allowed_size()
    }

    /// Record the SETTINGS_HEADER_TABLE_SIZE we advertised. A lower value
    /// shrinks the table at once rather than waiting for the peer's update.
    pub fn set_max_allowed_table_size(&mut self, size: usize) {
        self.table.set_max_allowed_size(size);
    }

    pub fn max_header_list_size(&self) -> usize {
        self.max_header_list_size
    }

    pub fn set_max_header_list_size(&mut self, size: usize) {
        self.max_header_list_size = size;
    }

    pub fn table(&self) -> &DynamicTable {
        &self.table
    }

    /// Decode a header block into UTF-8 headers.
    pub fn decode(&mut self, block: &[u8]) -> Result<Vec<Header>> {
        self.decode_raw(block)?
            .into_iter()
            .map(|field| -> Result<Header> {
                let (name, value, sensitive) = field.into_parts();
                Ok(Header {
                    name: utf8(name)?,
                    value: utf8(value)?,
                    sensitive,
                })
            })
            .collect()
    }

    /// Decode a header block, leaving names and values as bytes.
    pub fn decode_raw(&mut self, block: &[u8]) -> Result<Vec<HeaderField>> {
        let mut headers = Vec::new();
        let mut list_size = 0usize;
        let mut pos = 0;

        while pos < block.len() {
            let data = &block[pos..];
            let first = data[0];
            let (field, consumed) = if first & 0x80 != 0 {
                // 1xxxxxxx: indexed header field
                let (index, n) = decode_integer(data, 7)?;
                let entry = self.lookup(index)?;
                (Some(HeaderField::new(entry.name, entry.value)), n)
            } else if first & 0x40 != 0 {
                // 01xxxxxx: literal with incremental indexing
                self.decode_literal(data, 6, Indexing::Incremental, list_size)?
            } else if first & 0x20 != 0 {
                // 001xxxxx: dynamic table size update
                (None, self.decode_size_update(data)?)
            } else if first & 0x10 != 0 {
                // 0001xxxx: literal never indexed
                self.decode_literal(data, 4, Indexing::Never, list_size)?
            } else {
                // 0000xxxx: literal without indexing
                self.decode_literal(data, 4, Indexing::Without, list_size)?
            };

            if let Some(field) = field {
                list_size += field.size();
                if list_size > self.max_header_list_size {
                    return Err(self.list_too_large());
                }
                headers.push(field);
            }
            pos += consumed;
        }

        tracing::trace!(
            headers = headers.len(),
            list_size,
            table_entries = self.table.len(),
            table_size = self.table.size(),
            "decoded header block"
        );
        Ok(headers)
    }

    fn lookup(&self, index: usize) -> Result<TableEntry> {
        self.table
            .lookup(index)
            .ok_or(HpackError::Decoding(DecodeError::InvalidIndex(index)))
    }

    fn decode_literal(
        &mut self,
        data: &[u8],
        prefix_bits: u8,
        indexing: Indexing,
        list_size: usize,
    ) -> Result<(Option<HeaderField>, usize)> {
        let (name_index, mut pos) = decode_integer(data, prefix_bits)?;
        // Room left in the header list for this field's name and value.
        let budget = self
            .max_header_list_size
            .saturating_sub(list_size)
            .saturating_sub(ENTRY_OVERHEAD);

        let name = if name_index == 0 {
            let (name, n) = self.decode_string(&data[pos..], budget)?;
            pos += n;
            name
        } else {
            self.lookup(name_index)?.name
        };
        let (value, n) = self.decode_string(&data[pos..], budget.saturating_sub(name.len()))?;
        pos += n;

        let field = match indexing {
            Indexing::Never => HeaderField::sensitive(name, value),
            _ => HeaderField::new(name, value),
        };
        if list_size + field.size() > self.max_header_list_size {
            return Err(self.list_too_large());
        }
        if indexing == Indexing::Incremental {
            let (name, value, _) = field.clone().into_parts();
            self.table.insert(TableEntry { name, value });
        }
        Ok((Some(field), pos))
    }

    /// String literal (RFC 7541 Section 5.2) of at most `limit` decoded bytes.
    fn decode_string(&self, data: &[u8], limit: usize) -> Result<(Bytes, usize)> {
        let first = *data.first().ok_or(DecodeError::Truncated)?;
        let (len, n) = decode_integer(data, 7)?;
        let end = n
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or(DecodeError::Truncated)?;
        let raw = &data[n..end];

        let bytes = if first & 0x80 != 0 {
            match huffman::decode(raw, limit) {
                Ok(decoded) => Bytes::from(decoded),
                Err(HuffmanError::OutputTooLarge(_)) => return Err(self.list_too_large()),
                Err(e) => return Err(e.into()),
            }
        } else {
            if len > limit {
                return Err(self.list_too_large());
            }
            Bytes::copy_from_slice(raw)
        };
        Ok((bytes, end))
    }

    fn decode_size_update(&mut self, data: &[u8]) -> Result<usize> {
        let (size, n) = decode_integer(data, 5)?;
        if let Err(e) = self.table.size_update(size) {
            tracing::warn!(
                requested = size,
                allowed = self.table.max_allowed_size(),
                "peer requested dynamic table size above limit"
            );
            return Err(e);
        }
        Ok(n)
    }

    fn list_too_large(&self) -> HpackError {
        tracing::warn!(
            limit = self.max_header_list_size,
            "decoded header list exceeds limit"
        );
        HpackError::HeaderListTooLarge {
            limit: self.max_header_list_size,
        }
    }
}

fn utf8(bytes: Bytes) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(headers: &[Header]) -> Vec<(&str, &str)> {
        headers
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()))
            .collect()
    }

    #[test]
    fn decode_indexed_static() {
        let mut decoder = Decoder::new();
        let headers = decoder.decode(&[0x82, 0x87, 0x84]).unwrap();
        assert_eq!(
            pairs(&headers),
            vec![(":method", "GET"), (":scheme", "https"), (":path", "/")]
        );
    }

    #[test]
    fn decode_literal_without_indexing_plain() {
        let data: &[u8] = &[
            0x00, // literal without indexing, new name
            0x03, b'f', b'o', b'o', // name
            0x03, b'b', b'a', b'r', // value
        ];
        let mut decoder = Decoder::new();
        let headers = decoder.decode(data).unwrap();
        assert_eq!(pairs(&headers), vec![("foo", "bar")]);
        assert!(!headers[0].sensitive);
        assert!(decoder.table().is_empty());
    }

    #[test]
    fn decode_literal_with_indexing() {
        let data: &[u8] = &[
            0x40, // literal with indexing, new name
            0x04, b't', b'e', b's', b't', // name
            0x05, b'v', b'a', b'l', b'u', b'e', // value
        ];
        let mut decoder = Decoder::new();
        let headers = decoder.decode(data).unwrap();
        assert_eq!(pairs(&headers), vec![("test", "value")]);
        assert_eq!(decoder.table().len(), 1);
        // The new entry is now index 62.
        let headers = decoder.decode(&[0xbe]).unwrap();
        assert_eq!(pairs(&headers), vec![("test", "value")]);
    }

    #[test]
    fn decode_never_indexed_is_sensitive() {
        let data: &[u8] = &[
            0x10, // never indexed, new name
            0x06, b's', b'e', b'c', b'r', b'e', b't', // name
            0x01, b'x', // value
        ];
        let mut decoder = Decoder::new();
        let headers = decoder.decode(data).unwrap();
        assert_eq!(pairs(&headers), vec![("secret", "x")]);
        assert!(headers[0].sensitive);
        assert!(decoder.table().is_empty());
    }

    #[test]
    fn decode_never_indexed_with_indexed_name() {
        // 0x10 | 15 then continuation: name index 23 (authorization)
        let data: &[u8] = &[0x1f, 0x08, 0x02, b'h', b'i'];
        let mut decoder = Decoder::new();
        let headers = decoder.decode(data).unwrap();
        assert_eq!(pairs(&headers), vec![("authorization", "hi")]);
        assert!(headers[0].sensitive);
    }

    #[test]
    fn decode_huffman_string_literal() {
        let data: &[u8] = &[
            0x00, // literal, new name
            0x01, b'x', // name: plain, len 1
            0x82, // value: Huffman, len 2
            0x1c, 0x64, // "abc"
        ];
        let mut decoder = Decoder::new();
        let headers = decoder.decode(data).unwrap();
        assert_eq!(pairs(&headers), vec![("x", "abc")]);
    }

    #[test]
    fn index_zero_is_invalid() {
        let mut decoder = Decoder::new();
        assert_eq!(
            decoder.decode(&[0x80]).unwrap_err(),
            HpackError::Decoding(DecodeError::InvalidIndex(0))
        );
    }

    #[test]
    fn index_past_dynamic_table_is_invalid() {
        let mut decoder = Decoder::new();
        assert_eq!(
            decoder.decode(&[0xbe]).unwrap_err(),
            HpackError::Decoding(DecodeError::InvalidIndex(62))
        );
        // Literal name referencing a missing entry
        assert_eq!(
            decoder.decode(&[0x7f, 0x00, 0x01, b'v']).unwrap_err(),
            HpackError::Decoding(DecodeError::InvalidIndex(63))
        );
    }

    #[test]
    fn truncated_blocks() {
        let mut decoder = Decoder::new();
        let cases: &[&[u8]] = &[
            // index continuation missing
            &[0xff],
            // name length missing
            &[0x40],
            // name shorter than its length
            &[0x40, 0x03, b'f', b'o'],
            // value missing
            &[0x40, 0x01, b'f'],
            // value shorter than its length
            &[0x40, 0x01, b'f', 0x05, b'a'],
            // size update continuation missing
            &[0x3f],
        ];
        for case in cases {
            assert_eq!(
                decoder.decode(case).unwrap_err(),
                HpackError::Decoding(DecodeError::Truncated),
                "{case:02x?}"
            );
        }
        assert!(decoder.table().is_empty());
    }

    #[test]
    fn invalid_huffman_rejected() {
        let mut decoder = Decoder::new();
        // value: Huffman, len 1, 'a' followed by 000 padding
        let err = decoder.decode(&[0x00, 0x01, b'x', 0x81, 0x18]).unwrap_err();
        assert_eq!(
            err,
            HpackError::Decoding(DecodeError::Huffman(HuffmanError::InvalidPadding))
        );
    }

    #[test]
    fn invalid_utf8_rejected_unless_raw() {
        let data: &[u8] = &[0x00, 0x01, b'x', 0x02, 0xc3, 0x28];
        let mut decoder = Decoder::new();
        assert_eq!(
            decoder.decode(data).unwrap_err(),
            HpackError::Decoding(DecodeError::InvalidUtf8)
        );
        let fields = decoder.decode_raw(data).unwrap();
        assert_eq!(fields[0].value(), &[0xc3, 0x28]);
    }

    #[test]
    fn failure_discards_earlier_headers_but_keeps_table() {
        let mut decoder = Decoder::new();
        let data: &[u8] = &[
            0x40, 0x01, b'a', 0x01, b'b', // indexed literal a: b
            0x80, // invalid index 0
        ];
        assert!(decoder.decode(data).is_err());
        // The first instruction completed, so its entry stays.
        assert_eq!(decoder.table().len(), 1);
    }

    #[test]
    fn size_update_evicts() {
        let mut decoder = Decoder::new();
        decoder.decode(&[0x40, 0x01, b'a', 0x01, b'b']).unwrap();
        assert_eq!(decoder.table().len(), 1);
        decoder.decode(&[0x20]).unwrap();
        assert!(decoder.table().is_empty());
        assert_eq!(decoder.header_table_size(), 0);
    }

    #[test]
    fn size_update_above_allowed() {
        let mut decoder = Decoder::new();
        // 4097 = 31 + 4066 -> 0x3f 0xe2 0x1f
        let err = decoder.decode(&[0x3f, 0xe2, 0x1f]).unwrap_err();
        assert_eq!(
            err,
            HpackError::TableSize {
                requested: 4097,
                allowed: 4096
            }
        );
    }

    #[test]
    fn raised_allowed_size_accepts_larger_update() {
        let mut decoder = Decoder::new();
        decoder.set_max_allowed_table_size(8192);
        decoder.decode(&[0x3f, 0xe2, 0x1f]).unwrap();
        assert_eq!(decoder.header_table_size(), 4097);
    }

    #[test]
    fn lowered_allowed_size_caps_table() {
        let mut decoder = Decoder::new();
        decoder.set_max_allowed_table_size(100);
        assert_eq!(decoder.header_table_size(), 100);

        let mut encoder = crate::encoder::Encoder::new();
        for i in 0..20 {
            let block = encoder
                .encode_with([(format!("x-{i}"), "v".repeat(40))], false)
                .unwrap();
            decoder.decode(&block).unwrap();
            assert!(decoder.table().size() <= decoder.max_allowed_table_size());
        }

        // A literal with indexing of 2 + 40 + 32 bytes fits once, never twice.
        let mut data = vec![0x40, 0x02, b'x', b'y', 0x28];
        data.extend(std::iter::repeat(b'v').take(40));
        decoder.decode(&data).unwrap();
        decoder.decode(&data).unwrap();
        assert_eq!(decoder.table().len(), 1);
        assert_eq!(decoder.table().size(), 74);
    }

    #[test]
    fn header_list_too_large() {
        let config = DecoderConfig {
            max_header_list_size: 100,
            ..DecoderConfig::default()
        };
        let mut decoder = Decoder::with_config(&config).unwrap();

        let mut data = vec![0x00, 0x01, b'x', 0x7f, 0x80, 0x01];
        data.extend(std::iter::repeat(b'v').take(127 + 128));
        assert_eq!(
            decoder.decode(&data).unwrap_err(),
            HpackError::HeaderListTooLarge { limit: 100 }
        );

        // Many small headers adding up
        let block: Vec<u8> = std::iter::repeat(0x82).take(4).collect();
        assert_eq!(
            decoder.decode(&block).unwrap_err(),
            HpackError::HeaderListTooLarge { limit: 100 }
        );
        // Three :method GET fields are 3 * 42 = 126 bytes; two fit.
        assert_eq!(decoder.decode(&[0x82, 0x82]).unwrap().len(), 2);
    }

    #[test]
    fn huffman_value_over_limit() {
        let config = DecoderConfig {
            max_header_list_size: 40,
            ..DecoderConfig::default()
        };
        let mut decoder = Decoder::with_config(&config).unwrap();
        let value = huffman::encode(b"aaaaaaaaaaaaaaaaaaaa");
        let mut data = vec![0x00, 0x01, b'x', 0x80 | value.len() as u8];
        data.extend_from_slice(&value);
        assert_eq!(
            decoder.decode(&data).unwrap_err(),
            HpackError::HeaderListTooLarge { limit: 40 }
        );
        assert!(decoder.table().is_empty());
    }
}
