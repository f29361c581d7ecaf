/*
 * config.rs
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

//! Encoder and decoder settings.
//!
//! `header_table_size` mirrors SETTINGS_HEADER_TABLE_SIZE as negotiated by the
//! HTTP/2 layer. The other limits are local policy and never sent to the peer.
//! Both structs deserialize from JSON with every field optional.

use serde::{Deserialize, Serialize};

/// Initial dynamic table size (RFC 7540 Section 6.5.2).
pub const DEFAULT_TABLE_SIZE: usize = 4096;

/// Default cap on the decoded header list (name + value + 32 per field).
pub const DEFAULT_MAX_HEADER_LIST_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Dynamic table size the encoder uses.
    pub header_table_size: usize,
    /// SETTINGS_HEADER_TABLE_SIZE advertised by the peer's decoder.
    pub max_allowed_table_size: usize,
    /// Huffman-code string literals when that makes them shorter.
    pub huffman: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            header_table_size: DEFAULT_TABLE_SIZE,
            max_allowed_table_size: DEFAULT_TABLE_SIZE,
            huffman: true,
        }
    }
}

impl EncoderConfig {
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Dynamic table size the peer's encoder starts with.
    pub header_table_size: usize,
    /// SETTINGS_HEADER_TABLE_SIZE we advertised; size updates above it fail.
    pub max_allowed_table_size: usize,
    /// Largest decoded header list accepted from one block.
    pub max_header_list_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            header_table_size: DEFAULT_TABLE_SIZE,
            max_allowed_table_size: DEFAULT_TABLE_SIZE,
            max_header_list_size: DEFAULT_MAX_HEADER_LIST_SIZE,
        }
    }
}

impl DecoderConfig {
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(
            EncoderConfig::from_json("{}").unwrap(),
            EncoderConfig::default()
        );
        assert_eq!(
            DecoderConfig::from_json("{}").unwrap(),
            DecoderConfig::default()
        );
    }

    #[test]
    fn partial_json() {
        let config = DecoderConfig::from_json(
            r#"{ "max_header_list_size": 16384, "max_allowed_table_size": 65536 }"#,
        )
        .unwrap();
        assert_eq!(config.header_table_size, DEFAULT_TABLE_SIZE);
        assert_eq!(config.max_allowed_table_size, 65536);
        assert_eq!(config.max_header_list_size, 16384);

        let config = EncoderConfig::from_json(r#"{ "huffman": false }"#).unwrap();
        assert!(!config.huffman);
        assert_eq!(config.header_table_size, DEFAULT_TABLE_SIZE);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(EncoderConfig::from_json(r#"{ "header_table_size": "big" }"#).is_err());
    }
}
