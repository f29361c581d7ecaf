/*
 * encoder.rs
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

//! HPACK encoder (RFC 7541). Turns header lists into header blocks.
//!
//! Representation chosen for each field:
//! - sensitive: literal never indexed, literal name (Section 6.2.3)
//! - name and value in a table: indexed (Section 6.1)
//! - otherwise: literal with incremental indexing (Section 6.2.1), using an
//!   indexed name when one exists. Fields too large for the table are sent
//!   without indexing (Section 6.2.2) so they do not flush it.
//!
//! Pending dynamic table size updates go at the start of the next block.

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::EncoderConfig;
use crate::error::{HpackError, Result};
use crate::header::{headers_from_map, HeaderField};
use crate::huffman;
use crate::integer::{encode_integer, MAX_INTEGER};
use crate::table::{DynamicTable, IndexMatch, TableEntry};

/// Encoder for one direction of one connection.
#[derive(Debug)]
pub struct Encoder {
    table: DynamicTable,
    huffman: bool,
    /// Size the peer's decoder currently uses.
    announced_size: usize,
    /// Smallest size set since the last block.
    smallest_size: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        let config = EncoderConfig::default();
        Self {
            table: DynamicTable::new(config.header_table_size),
            huffman: config.huffman,
            announced_size: config.max_allowed_table_size,
            smallest_size: config.header_table_size,
        }
    }

    /// Build from settings. The peer's decoder is assumed to start at
    /// `max_allowed_table_size`, so a smaller `header_table_size` is announced
    /// in the first block.
    pub fn with_config(config: &EncoderConfig) -> Result<Self> {
        let table =
            DynamicTable::with_limit(config.header_table_size, config.max_allowed_table_size)?;
        Ok(Self {
            table,
            huffman: config.huffman,
            announced_size: config.max_allowed_table_size,
            smallest_size: config.header_table_size,
        })
    }

    pub fn header_table_size(&self) -> usize {
        self.table.max_size()
    }

    /// Change the dynamic table size. Entries are evicted now; the update is
    /// signalled at the start of the next block.
    pub fn set_header_table_size(&mut self, size: usize) -> Result<()> {
        self.table.size_update(size)?;
        self.smallest_size = self.smallest_size.min(size);
        Ok(())
    }

    pub fn max_allowed_table_size(&self) -> usize {
        self.table.max_allowed_size()
    }

    /// Record a new SETTINGS_HEADER_TABLE_SIZE from the peer, shrinking the
    /// table if it is now too large.
    pub fn set_max_allowed_table_size(&mut self, size: usize) {
        self.table.set_max_allowed_size(size);
        self.smallest_size = self.smallest_size.min(self.table.max_size());
    }

    pub fn huffman(&self) -> bool {
        self.huffman
    }

    pub fn set_huffman(&mut self, huffman: bool) {
        self.huffman = huffman;
    }

    pub fn table(&self) -> &DynamicTable {
        &self.table
    }

    /// Encode a header list using the configured Huffman setting.
    pub fn encode<I>(&mut self, headers: I) -> Result<Bytes>
    where
        I: IntoIterator,
        I::Item: Into<HeaderField>,
    {
        self.encode_with(headers, self.huffman)
    }

    /// Encode a name→value mapping; pseudo-header fields go first.
    pub fn encode_map<I, F>(&mut self, map: I) -> Result<Bytes>
    where
        I: IntoIterator<Item = F>,
        F: Into<HeaderField>,
    {
        let fields = headers_from_map(map);
        self.encode_with(fields, self.huffman)
    }

    /// Encode a header list, Huffman-coding literals only if `huffman`.
    pub fn encode_with<I>(&mut self, headers: I, huffman: bool) -> Result<Bytes>
    where
        I: IntoIterator,
        I::Item: Into<HeaderField>,
    {
        let fields: Vec<HeaderField> = headers.into_iter().map(Into::into).collect();
        let mut out = BytesMut::with_capacity(estimate_len(&fields));
        self.encode_into(&fields, huffman, &mut out)?;
        Ok(out.freeze())
    }

    /// Append one header block to `out`. Fails before writing anything or
    /// touching the table if a field cannot be represented.
    pub fn encode_into(
        &mut self,
        fields: &[HeaderField],
        huffman: bool,
        out: &mut impl BufMut,
    ) -> Result<()> {
        if fields
            .iter()
            .any(|f| f.name().len() > MAX_INTEGER || f.value().len() > MAX_INTEGER)
        {
            return Err(HpackError::Unsupported(
                "string literal longer than 2^32 - 1 bytes",
            ));
        }

        self.emit_size_updates(out);
        for field in fields {
            self.encode_field(field, huffman, out);
        }
        tracing::trace!(
            fields = fields.len(),
            table_entries = self.table.len(),
            table_size = self.table.size(),
            "encoded header block"
        );
        Ok(())
    }

    fn emit_size_updates(&mut self, out: &mut impl BufMut) {
        let current = self.table.max_size();
        let smallest = self.smallest_size;
        let mut emitted = false;
        if smallest < current && smallest < self.announced_size {
            tracing::debug!(size = smallest, "emitting dynamic table size update");
            encode_integer(smallest, 5, 0x20, out);
            emitted = true;
        }
        if emitted || current != self.announced_size {
            tracing::debug!(size = current, "emitting dynamic table size update");
            encode_integer(current, 5, 0x20, out);
        }
        self.announced_size = current;
        self.smallest_size = current;
    }

    fn encode_field(&mut self, field: &HeaderField, huffman: bool, out: &mut impl BufMut) {
        if field.is_sensitive() {
            out.put_u8(0x10);
            encode_string(field.name(), huffman, out);
            encode_string(field.value(), huffman, out);
            return;
        }

        let indexable = field.size() <= self.table.max_size();
        match self.table.index_of(field.name(), field.value()) {
            Some(IndexMatch::Full(index)) => {
                encode_integer(index, 7, 0x80, out);
            }
            Some(IndexMatch::Name(index)) if indexable => {
                encode_integer(index, 6, 0x40, out);
                encode_string(field.value(), huffman, out);
                self.insert(field);
            }
            Some(IndexMatch::Name(index)) => {
                encode_integer(index, 4, 0x00, out);
                encode_string(field.value(), huffman, out);
            }
            None if indexable => {
                out.put_u8(0x40);
                encode_string(field.name(), huffman, out);
                encode_string(field.value(), huffman, out);
                self.insert(field);
            }
            None => {
                out.put_u8(0x00);
                encode_string(field.name(), huffman, out);
                encode_string(field.value(), huffman, out);
            }
        }
    }

    fn insert(&mut self, field: &HeaderField) {
        let (name, value, _) = field.clone().into_parts();
        self.table.insert(TableEntry { name, value });
    }
}

/// String literal (RFC 7541 Section 5.2). The Huffman form is used only when
/// requested and strictly shorter.
fn encode_string(s: &[u8], huffman: bool, out: &mut impl BufMut) {
    if huffman {
        let len = huffman::encoded_len(s);
        if len < s.len() {
            encode_integer(len, 7, 0x80, out);
            huffman::encode_into(s, out);
            return;
        }
    }
    encode_integer(s.len(), 7, 0x00, out);
    out.put_slice(s);
}

fn estimate_len(fields: &[HeaderField]) -> usize {
    fields
        .iter()
        .map(|f| f.name().len() + f.value().len() + 4)
        .sum::<usize>()
        + 8
}
