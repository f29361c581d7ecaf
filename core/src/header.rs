/*
 * header.rs
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

//! Header field types passed into the encoder and returned by the decoder.

use bytes::Bytes;

/// Per-entry overhead added to name and value lengths (RFC 7541 Section 4.1).
pub const ENTRY_OVERHEAD: usize = 32;

/// A header field as raw bytes.
///
/// A sensitive field is always sent as "never indexed": it never enters a
/// dynamic table and intermediaries must keep it that way when re-encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderField {
    name: Bytes,
    value: Bytes,
    sensitive: bool,
}

impl HeaderField {
    pub fn new(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: false,
        }
    }

    /// A field that must never be indexed (cookies, credentials).
    pub fn sensitive(name: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive: true,
        }
    }

    /// Copy name and value out of borrowed slices.
    pub fn copy_from(name: &[u8], value: &[u8], sensitive: bool) -> Self {
        Self {
            name: Bytes::copy_from_slice(name),
            value: Bytes::copy_from_slice(value),
            sensitive,
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Pseudo-header fields (`:method`, `:status`, ...) start with a colon.
    pub fn is_pseudo(&self) -> bool {
        self.name.first() == Some(&b':')
    }

    /// Size for table and header list accounting: name + value + 32.
    pub fn size(&self) -> usize {
        self.name.len() + self.value.len() + ENTRY_OVERHEAD
    }

    pub fn into_parts(self) -> (Bytes, Bytes, bool) {
        (self.name, self.value, self.sensitive)
    }
}

impl<N: Into<Bytes>, V: Into<Bytes>> From<(N, V)> for HeaderField {
    fn from((name, value): (N, V)) -> Self {
        HeaderField::new(name, value)
    }
}

impl<N: Into<Bytes>, V: Into<Bytes>> From<(N, V, bool)> for HeaderField {
    fn from((name, value, sensitive): (N, V, bool)) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sensitive,
        }
    }
}

impl From<&HeaderField> for HeaderField {
    fn from(field: &HeaderField) -> Self {
        field.clone()
    }
}

/// Decoded header as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    pub name: String,
    pub value: String,
    /// Received as "never indexed"; preserve when forwarding.
    pub sensitive: bool,
}

impl From<Header> for HeaderField {
    fn from(h: Header) -> Self {
        (h.name, h.value, h.sensitive).into()
    }
}

impl From<&Header> for HeaderField {
    fn from(h: &Header) -> Self {
        HeaderField::copy_from(h.name.as_bytes(), h.value.as_bytes(), h.sensitive)
    }
}

/// Turn a name→value mapping into an ordered header list with pseudo-header
/// fields first, as HTTP/2 requires. Each group keeps the mapping's iteration
/// order. A mapping cannot carry duplicate names.
pub fn headers_from_map<I, F>(map: I) -> Vec<HeaderField>
where
    I: IntoIterator<Item = F>,
    F: Into<HeaderField>,
{
    let (mut pseudo, regular): (Vec<HeaderField>, Vec<HeaderField>) = map
        .into_iter()
        .map(Into::<HeaderField>::into)
        .partition(HeaderField::is_pseudo);
    pseudo.extend(regular);
    pseudo
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn size_accounting() {
        let field = HeaderField::new("content-type", "application/json");
        // 12 + 16 + 32
        assert_eq!(field.size(), 60);
        assert_eq!(HeaderField::new("", "").size(), 32);
    }

    #[test]
    fn tuple_conversions() {
        let plain: HeaderField = ("user-agent", "test").into();
        assert!(!plain.is_sensitive());
        assert_eq!(plain.name(), b"user-agent");

        let secret: HeaderField = ("authorization", "Bearer x", true).into();
        assert!(secret.is_sensitive());
        assert_eq!(secret, HeaderField::sensitive("authorization", "Bearer x"));

        let owned: HeaderField = (String::from("x-a"), vec![0xffu8, 0x00]).into();
        assert_eq!(owned.value(), &[0xff, 0x00]);
    }

    #[test]
    fn map_puts_pseudo_headers_first() {
        let mut map = BTreeMap::new();
        map.insert("accept", "*/*");
        map.insert(":path", "/");
        map.insert("host", "example.com");
        map.insert(":method", "GET");

        let fields = headers_from_map(map);
        let names: Vec<&[u8]> = fields.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![&b":method"[..], &b":path"[..], &b"accept"[..], &b"host"[..]]
        );
    }

    #[test]
    fn header_to_field_keeps_sensitivity() {
        let h = Header {
            name: "cookie".into(),
            value: "a=b".into(),
            sensitive: true,
        };
        let f: HeaderField = (&h).into();
        assert!(f.is_sensitive());
        assert_eq!(f, HeaderField::from(h));
    }
}
