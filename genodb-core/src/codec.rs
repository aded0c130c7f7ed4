// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Binary Codec
//!
//! Little-endian primitive fields, length-prefixed byte strings, and
//! recursively nested structures. Index snapshots and point payloads are
//! written through these traits.
//!
//! ```text
//! ┌──────────────┬─────────────────────────────┐
//! │ len: u32 LE  │ bytes[len]                  │   length-prefixed bytes
//! └──────────────┴─────────────────────────────┘
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

use crate::error::{GenoDbError, Result};

/// Upper bound on a single length-prefixed field (64 MiB)
pub const MAX_FIELD_LEN: u32 = 64 * 1024 * 1024;

/// Types that can be written with the binary codec
pub trait Encode {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Encode into a fresh buffer
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }
}

/// Types that can be read back with the binary codec
pub trait Decode: Sized {
    fn decode<R: Read>(reader: &mut R) -> Result<Self>;

    /// Decode from a complete buffer, rejecting trailing bytes
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let value = Self::decode(&mut cursor)?;
        if (cursor.position() as usize) != bytes.len() {
            return Err(GenoDbError::Codec(format!(
                "{} trailing bytes after value",
                bytes.len() - cursor.position() as usize
            )));
        }
        Ok(value)
    }
}

pub fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_FIELD_LEN as usize {
        return Err(GenoDbError::Codec(format!(
            "field of {} bytes exceeds limit {}",
            bytes.len(),
            MAX_FIELD_LEN
        )));
    }
    writer.write_u32::<LittleEndian>(bytes.len() as u32)?;
    writer.write_all(bytes)?;
    Ok(())
}

pub fn read_bytes<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let len = reader.read_u32::<LittleEndian>()?;
    if len > MAX_FIELD_LEN {
        return Err(GenoDbError::Codec(format!(
            "field length {} exceeds limit {}",
            len, MAX_FIELD_LEN
        )));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn write_bool<W: Write>(writer: &mut W, value: bool) -> Result<()> {
    writer.write_u8(value as u8)?;
    Ok(())
}

pub fn read_bool<R: Read>(reader: &mut R) -> Result<bool> {
    match reader.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(GenoDbError::Codec(format!("invalid bool tag {}", other))),
    }
}

impl Encode for String {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_bytes(writer, self.as_bytes())
    }
}

impl Decode for String {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let bytes = read_bytes(reader)?;
        String::from_utf8(bytes).map_err(|e| GenoDbError::Codec(format!("invalid utf-8: {}", e)))
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Some(value) => {
                write_bool(writer, true)?;
                value.encode(writer)
            }
            None => write_bool(writer, false),
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        if read_bool(reader)? {
            Ok(Some(T::decode(reader)?))
        } else {
            Ok(None)
        }
    }
}
