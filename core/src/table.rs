/*
 * table.rs
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

//! Dynamic table (RFC 7541 Sections 2.3 and 4).
//!
//! Entries are kept newest first in a `VecDeque` with a running size. Index
//! space is shared with the static table: 1..=61 are static, 62 is the newest
//! dynamic entry, 63 the one before it, and so on.

use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::{HpackError, Result};
use crate::header::ENTRY_OVERHEAD;
use crate::static_table::{self, STATIC_TABLE_LEN};

/// A (name, value) pair held by a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: Bytes,
    pub value: Bytes,
}

impl TableEntry {
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// name + value + 32 (RFC 7541 Section 4.1).
    pub fn size(&self) -> usize {
        self.name.len() + self.value.len() + ENTRY_OVERHEAD
    }
}

/// Result of searching the static and dynamic tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMatch {
    /// Name and value both match the entry at this index.
    Full(usize),
    /// Only the name matches.
    Name(usize),
}

/// Bounded table of recently coded header fields.
#[derive(Debug)]
pub struct DynamicTable {
    /// Newest first.
    entries: VecDeque<TableEntry>,
    /// Sum of entry sizes.
    size: usize,
    /// Current ceiling, changed by size updates.
    max_size: usize,
    /// Hard limit on `max_size`.
    max_allowed_size: usize,
}

impl DynamicTable {
    /// Table whose size can later be lowered but never raised above `max_size`.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            size: 0,
            max_size,
            max_allowed_size: max_size,
        }
    }

    /// Table starting at `max_size` that accepts updates up to `max_allowed_size`.
    pub fn with_limit(max_size: usize, max_allowed_size: usize) -> Result<Self> {
        if max_size > max_allowed_size {
            return Err(HpackError::TableSize {
                requested: max_size,
                allowed: max_allowed_size,
            });
        }
        Ok(Self {
            entries: VecDeque::new(),
            size: 0,
            max_size,
            max_allowed_size,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of entry sizes in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn max_allowed_size(&self) -> usize {
        self.max_allowed_size
    }

    /// Change the hard limit. A current size above the new limit is lowered to
    /// it, evicting as needed.
    pub fn set_max_allowed_size(&mut self, max_allowed_size: usize) {
        self.max_allowed_size = max_allowed_size;
        if self.max_size > max_allowed_size {
            tracing::debug!(
                from = self.max_size,
                to = max_allowed_size,
                "dynamic table clamped to allowed size"
            );
            self.max_size = max_allowed_size;
            self.evict_to_fit(0);
        }
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> {
        self.entries.iter()
    }

    /// Add an entry at the front, evicting from the back until it fits. An
    /// entry larger than the whole table empties it and is not added.
    pub fn insert(&mut self, entry: TableEntry) {
        let entry_size = entry.size();
        if entry_size > self.max_size {
            tracing::trace!(
                entry_size,
                max_size = self.max_size,
                "entry larger than table, clearing"
            );
            self.entries.clear();
            self.size = 0;
            return;
        }
        self.evict_to_fit(entry_size);
        self.size += entry_size;
        self.entries.push_front(entry);
    }

    /// Evict the oldest entries until `required` more bytes fit.
    pub fn evict_to_fit(&mut self, required: usize) {
        while self.size + required > self.max_size {
            match self.entries.pop_back() {
                Some(evicted) => {
                    self.size -= evicted.size();
                    tracing::trace!(size = evicted.size(), "evicted dynamic table entry");
                }
                None => break,
            }
        }
    }

    /// Set a new maximum size, evicting as needed.
    pub fn size_update(&mut self, new_max: usize) -> Result<()> {
        if new_max > self.max_allowed_size {
            return Err(HpackError::TableSize {
                requested: new_max,
                allowed: self.max_allowed_size,
            });
        }
        tracing::debug!(
            from = self.max_size,
            to = new_max,
            "dynamic table size update"
        );
        self.max_size = new_max;
        self.evict_to_fit(0);
        Ok(())
    }

    /// Resolve an index against the static table, then this table.
    pub fn lookup(&self, index: usize) -> Option<TableEntry> {
        if index <= STATIC_TABLE_LEN {
            let (name, value) = static_table::get(index)?;
            return Some(TableEntry::new(
                Bytes::from_static(name),
                Bytes::from_static(value),
            ));
        }
        self.entries.get(index - STATIC_TABLE_LEN - 1).cloned()
    }

    /// Best index for `(name, value)`: a full match beats a name match, and the
    /// static table is preferred within each kind.
    pub fn index_of(&self, name: &[u8], value: &[u8]) -> Option<IndexMatch> {
        if let Some(i) = static_table::find_exact(name, value) {
            return Some(IndexMatch::Full(i));
        }
        let mut name_match = static_table::find_name(name);
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.name == name {
                if entry.value == value {
                    return Some(IndexMatch::Full(STATIC_TABLE_LEN + 1 + i));
                }
                if name_match.is_none() {
                    name_match = Some(STATIC_TABLE_LEN + 1 + i);
                }
            }
        }
        name_match.map(IndexMatch::Name)
    }
}
