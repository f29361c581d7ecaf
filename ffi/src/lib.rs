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

//! C FFI for hpack core. Encoders and decoders are opaque heap handles, one
//! per connection direction; a handle must not be used from two threads at
//! once.
//! Functions returning c_int return 0 on success or a negative HPACK_ERR_*
//! code, with a message available from hpack_last_error on the same thread.

use libc::{c_char, c_int, c_void, size_t};
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::fmt::Display;
use std::ptr;
use std::slice;

use hpack_core::{Decoder, DecoderConfig, Encoder, EncoderConfig, HeaderField, HpackError};

pub const HPACK_OK: c_int = 0;
pub const HPACK_ERR_DECODING: c_int = -1;
pub const HPACK_ERR_TABLE_SIZE: c_int = -2;
pub const HPACK_ERR_HEADER_LIST_TOO_LARGE: c_int = -3;
pub const HPACK_ERR_UNSUPPORTED: c_int = -4;
pub const HPACK_ERR_INVALID_ARGUMENT: c_int = -5;

/// Opaque encoder handle.
pub struct HpackEncoder(Encoder);

/// Opaque decoder handle.
pub struct HpackDecoder(Decoder);

/// One header field passed to hpack_encoder_encode. Name and value need not be
/// NUL-terminated; a pointer may be NULL when its length is 0.
#[repr(C)]
pub struct HpackHeader {
    pub name: *const u8,
    pub name_len: size_t,
    pub value: *const u8,
    pub value_len: size_t,
    /// Non-zero: send as never indexed.
    pub sensitive: c_int,
}

/// Encoded header block owned by the library. Free with hpack_buffer_free.
#[repr(C)]
pub struct HpackBuffer {
    pub data: *mut u8,
    pub len: size_t,
}

/// Called once per decoded header, in order, with (name, name_len, value,
/// value_len, sensitive, user_data). Pointers are valid only for the call.
type OnHeader = extern "C" fn(*const u8, size_t, *const u8, size_t, c_int, *mut c_void);

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: impl Display) {
    let msg = CString::new(msg.to_string()).unwrap_or_default();
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(msg));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

fn error_code(err: &HpackError) -> c_int {
    set_last_error(err);
    match err {
        HpackError::Decoding(_) => HPACK_ERR_DECODING,
        HpackError::TableSize { .. } => HPACK_ERR_TABLE_SIZE,
        HpackError::HeaderListTooLarge { .. } => HPACK_ERR_HEADER_LIST_TOO_LARGE,
        HpackError::Unsupported(_) => HPACK_ERR_UNSUPPORTED,
    }
}

fn invalid_argument(msg: &str) -> c_int {
    set_last_error(msg);
    HPACK_ERR_INVALID_ARGUMENT
}

/// Borrow `len` bytes at `ptr`; NULL is accepted only for an empty slice.
unsafe fn bytes_arg<'a>(ptr: *const u8, len: size_t) -> Option<&'a [u8]> {
    if len == 0 {
        Some(&[])
    } else if ptr.is_null() {
        None
    } else {
        Some(slice::from_raw_parts(ptr, len))
    }
}

unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Version string (static, do not free).
#[no_mangle]
pub extern "C" fn hpack_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Last error message from a failed call on this thread. Valid until the next
/// FFI call. Do not free.
#[no_mangle]
pub extern "C" fn hpack_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a buffer filled by hpack_encoder_encode and reset it to empty. No-op
/// if buf or its data is NULL.
#[no_mangle]
pub unsafe extern "C" fn hpack_buffer_free(buf: *mut HpackBuffer) {
    if buf.is_null() {
        return;
    }
    let b = &mut *buf;
    if !b.data.is_null() {
        let _ = Box::from_raw(ptr::slice_from_raw_parts_mut(b.data, b.len));
    }
    b.data = ptr::null_mut();
    b.len = 0;
}

// ---------- Encoder ----------

/// New encoder with default settings (4096-byte table, Huffman on).
/// Free with hpack_encoder_free.
#[no_mangle]
pub extern "C" fn hpack_encoder_new() -> *mut HpackEncoder {
    clear_last_error();
    Box::into_raw(Box::new(HpackEncoder(Encoder::new())))
}

/// New encoder from a JSON EncoderConfig, e.g.
/// `{"header_table_size": 1024, "huffman": false}`. Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn hpack_encoder_new_json(config: *const c_char) -> *mut HpackEncoder {
    let Some(json) = str_arg(config) else {
        invalid_argument("config must be a UTF-8 string");
        return ptr::null_mut();
    };
    let config = match EncoderConfig::from_json(json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(e);
            return ptr::null_mut();
        }
    };
    match Encoder::with_config(&config) {
        Ok(encoder) => {
            clear_last_error();
            Box::into_raw(Box::new(HpackEncoder(encoder)))
        }
        Err(e) => {
            error_code(&e);
            ptr::null_mut()
        }
    }
}

/// Free an encoder. No-op if enc is NULL.
#[no_mangle]
pub unsafe extern "C" fn hpack_encoder_free(enc: *mut HpackEncoder) {
    if !enc.is_null() {
        let _ = Box::from_raw(enc);
    }
}

/// Current dynamic table size, or 0 if enc is NULL.
#[no_mangle]
pub unsafe extern "C" fn hpack_encoder_header_table_size(enc: *const HpackEncoder) -> size_t {
    enc.as_ref().map(|e| e.0.header_table_size()).unwrap_or(0)
}

/// Change the dynamic table size; announced at the start of the next block.
#[no_mangle]
pub unsafe extern "C" fn hpack_encoder_set_header_table_size(
    enc: *mut HpackEncoder,
    size: size_t,
) -> c_int {
    let Some(enc) = enc.as_mut() else {
        return invalid_argument("encoder is NULL");
    };
    match enc.0.set_header_table_size(size) {
        Ok(()) => {
            clear_last_error();
            HPACK_OK
        }
        Err(e) => error_code(&e),
    }
}

/// Record SETTINGS_HEADER_TABLE_SIZE received from the peer.
#[no_mangle]
pub unsafe extern "C" fn hpack_encoder_set_max_allowed_table_size(
    enc: *mut HpackEncoder,
    size: size_t,
) -> c_int {
    let Some(enc) = enc.as_mut() else {
        return invalid_argument("encoder is NULL");
    };
    enc.0.set_max_allowed_table_size(size);
    clear_last_error();
    HPACK_OK
}

/// Encode `count` headers into one header block. On success `*out` holds a
/// new buffer the caller frees with hpack_buffer_free. Huffman coding is used
/// where it helps when `huffman` is non-zero.
#[no_mangle]
pub unsafe extern "C" fn hpack_encoder_encode(
    enc: *mut HpackEncoder,
    headers: *const HpackHeader,
    count: size_t,
    huffman: c_int,
    out: *mut HpackBuffer,
) -> c_int {
    let Some(enc) = enc.as_mut() else {
        return invalid_argument("encoder is NULL");
    };
    if out.is_null() {
        return invalid_argument("out is NULL");
    }
    if headers.is_null() && count > 0 {
        return invalid_argument("headers is NULL");
    }
    let headers = if count == 0 {
        &[][..]
    } else {
        slice::from_raw_parts(headers, count)
    };

    let mut fields = Vec::with_capacity(headers.len());
    for h in headers {
        let (Some(name), Some(value)) = (
            bytes_arg(h.name, h.name_len),
            bytes_arg(h.value, h.value_len),
        ) else {
            return invalid_argument("header name or value is NULL");
        };
        fields.push(HeaderField::copy_from(name, value, h.sensitive != 0));
    }

    match enc.0.encode_with(fields, huffman != 0) {
        Ok(block) => {
            let boxed: Box<[u8]> = block.to_vec().into_boxed_slice();
            let len = boxed.len();
            *out = HpackBuffer {
                data: Box::into_raw(boxed) as *mut u8,
                len,
            };
            clear_last_error();
            HPACK_OK
        }
        Err(e) => error_code(&e),
    }
}

// ---------- Decoder ----------

/// New decoder with default settings (4096-byte table, 64 KiB header list
/// limit). Free with hpack_decoder_free.
#[no_mangle]
pub extern "C" fn hpack_decoder_new() -> *mut HpackDecoder {
    clear_last_error();
    Box::into_raw(Box::new(HpackDecoder(Decoder::new())))
}

/// New decoder from a JSON DecoderConfig, e.g.
/// `{"max_header_list_size": 16384}`. Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn hpack_decoder_new_json(config: *const c_char) -> *mut HpackDecoder {
    let Some(json) = str_arg(config) else {
        invalid_argument("config must be a UTF-8 string");
        return ptr::null_mut();
    };
    let config = match DecoderConfig::from_json(json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(e);
            return ptr::null_mut();
        }
    };
    match Decoder::with_config(&config) {
        Ok(decoder) => {
            clear_last_error();
            Box::into_raw(Box::new(HpackDecoder(decoder)))
        }
        Err(e) => {
            error_code(&e);
            ptr::null_mut()
        }
    }
}

/// Free a decoder. No-op if dec is NULL.
#[no_mangle]
pub unsafe extern "C" fn hpack_decoder_free(dec: *mut HpackDecoder) {
    if !dec.is_null() {
        let _ = Box::from_raw(dec);
    }
}

/// Current dynamic table size, or 0 if dec is NULL.
#[no_mangle]
pub unsafe extern "C" fn hpack_decoder_header_table_size(dec: *const HpackDecoder) -> size_t {
    dec.as_ref().map(|d| d.0.header_table_size()).unwrap_or(0)
}

#[no_mangle]
pub unsafe extern "C" fn hpack_decoder_set_header_table_size(
    dec: *mut HpackDecoder,
    size: size_t,
) -> c_int {
    let Some(dec) = dec.as_mut() else {
        return invalid_argument("decoder is NULL");
    };
    match dec.0.set_header_table_size(size) {
        Ok(()) => {
            clear_last_error();
            HPACK_OK
        }
        Err(e) => error_code(&e),
    }
}

/// Record the SETTINGS_HEADER_TABLE_SIZE we advertised.
#[no_mangle]
pub unsafe extern "C" fn hpack_decoder_set_max_allowed_table_size(
    dec: *mut HpackDecoder,
    size: size_t,
) -> c_int {
    let Some(dec) = dec.as_mut() else {
        return invalid_argument("decoder is NULL");
    };
    dec.0.set_max_allowed_table_size(size);
    clear_last_error();
    HPACK_OK
}

#[no_mangle]
pub unsafe extern "C" fn hpack_decoder_set_max_header_list_size(
    dec: *mut HpackDecoder,
    size: size_t,
) -> c_int {
    let Some(dec) = dec.as_mut() else {
        return invalid_argument("decoder is NULL");
    };
    dec.0.set_max_header_list_size(size);
    clear_last_error();
    HPACK_OK
}

/// Decode one header block. on_header is called for each header only after
/// the whole block decoded; on error it is not called at all. Names and values
/// are passed as raw bytes (not UTF-8 checked, not NUL-terminated).
#[no_mangle]
pub unsafe extern "C" fn hpack_decoder_decode(
    dec: *mut HpackDecoder,
    data: *const u8,
    len: size_t,
    on_header: Option<OnHeader>,
    user_data: *mut c_void,
) -> c_int {
    let Some(dec) = dec.as_mut() else {
        return invalid_argument("decoder is NULL");
    };
    let Some(block) = bytes_arg(data, len) else {
        return invalid_argument("data is NULL");
    };
    let fields = match dec.0.decode_raw(block) {
        Ok(fields) => fields,
        Err(e) => return error_code(&e),
    };
    if let Some(cb) = on_header {
        for f in &fields {
            cb(
                f.name().as_ptr(),
                f.name().len(),
                f.value().as_ptr(),
                f.value().len(),
                c_int::from(f.is_sensitive()),
                user_data,
            );
        }
    }
    clear_last_error();
    HPACK_OK
}
